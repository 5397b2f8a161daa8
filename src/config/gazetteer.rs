//! Gazetteer loading
//!
//! File format: `{"locations": [{"name", "state", "latitude", "longitude"}]}`.

use map_intent_types::{Coordinate, GazetteerRecord};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
struct RawGazetteer {
    #[serde(default)]
    locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: String,
    state: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawLocation> for GazetteerRecord {
    type Error = ConfigError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        if !(-90.0..=90.0).contains(&raw.latitude) || !(-180.0..=180.0).contains(&raw.longitude) {
            return Err(ConfigError::InvalidGazetteer {
                name: raw.name,
                reason: format!("coordinate ({}, {}) out of range", raw.latitude, raw.longitude),
            });
        }
        Ok(GazetteerRecord {
            name: raw.name,
            region: raw.state,
            coordinate: Coordinate::new(raw.latitude, raw.longitude),
        })
    }
}

/// Parse a gazetteer JSON document
pub fn parse_gazetteer(json: &str, source: &str) -> Result<Vec<GazetteerRecord>, ConfigError> {
    let raw: RawGazetteer = serde_json::from_str(json).map_err(|e| ConfigError::Json {
        path: source.to_string(),
        source: e,
    })?;
    raw.locations.into_iter().map(GazetteerRecord::try_from).collect()
}

/// Load the gazetteer file
pub fn load_gazetteer<P: AsRef<Path>>(path: P) -> Result<Vec<GazetteerRecord>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = parse_gazetteer(&content, &path.display().to_string())?;
    info!(count = records.len(), path = %path.display(), "Gazetteer loaded");
    Ok(records)
}
