//! Canned collaborators for unit tests

use async_trait::async_trait;
use map_intent_types::{Coordinate, GazetteerRecord, LayerDescriptor, RegionVariant, RenderParams};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::location::{Address, GeocodeHit, Geocoder};
use crate::matcher::SimilarityScorer;

/// Scores looked up by lower-cased `(a, b)`; anything else gets `default`
pub struct TableScorer {
    scores: HashMap<(String, String), f64>,
    failing: Vec<String>,
    default: f64,
}

impl TableScorer {
    pub fn new(default: f64) -> Self {
        Self {
            scores: HashMap::new(),
            failing: vec![],
            default,
        }
    }

    pub fn with(mut self, a: &str, b: &str, score: f64) -> Self {
        self.scores.insert((a.to_lowercase(), b.to_lowercase()), score);
        self
    }

    /// Any call whose `b` equals this text fails
    pub fn failing_on(mut self, b: &str) -> Self {
        self.failing.push(b.to_lowercase());
        self
    }
}

#[async_trait]
impl SimilarityScorer for TableScorer {
    async fn similarity(&self, a: &str, b: &str) -> CollaboratorResult<f64> {
        if self.failing.contains(&b.to_lowercase()) {
            return Err(CollaboratorError::Transport {
                service: "similarity",
                message: "connection refused".to_string(),
            });
        }
        Ok(*self
            .scores
            .get(&(a.to_lowercase(), b.to_lowercase()))
            .unwrap_or(&self.default))
    }
}

/// Geocoder answering from a fixed table and counting calls
#[derive(Default)]
pub struct StaticGeocoder {
    hits: HashMap<String, Vec<GeocodeHit>>,
    pub calls: Mutex<Vec<String>>,
}

impl StaticGeocoder {
    pub fn with_region(mut self, query: &str, region: &str, lat: f64, lon: f64) -> Self {
        self.hits.insert(
            query.to_lowercase(),
            vec![GeocodeHit {
                coordinate: Coordinate::new(lat, lon),
                place_rank: 16,
                place_type: "city".to_string(),
                address: Address {
                    state: Some(region.to_string()),
                    ..Address::default()
                },
                display_name: format!("{}, {}", query, region),
            }],
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, query: &str) -> CollaboratorResult<Vec<GeocodeHit>> {
        self.calls.lock().unwrap().push(query.to_string());
        Ok(self.hits.get(&query.to_lowercase()).cloned().unwrap_or_default())
    }
}

pub fn pune() -> GazetteerRecord {
    GazetteerRecord {
        name: "Pune".to_string(),
        region: "Maharashtra".to_string(),
        coordinate: Coordinate::new(18.52, 73.85),
    }
}

pub fn global_layer(name: &str, description: &str) -> LayerDescriptor {
    LayerDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        render: RenderParams {
            url: format!("https://tiles.example.org/{}", name.to_lowercase()),
            params: BTreeMap::new(),
            z_index: None,
        },
        regions: None,
    }
}

pub fn regional_layer(name: &str, description: &str, regions: &[&str]) -> LayerDescriptor {
    LayerDescriptor {
        regions: Some(
            regions
                .iter()
                .map(|region| RegionVariant {
                    name: region.to_string(),
                    params: BTreeMap::from([(
                        "LAYERS".to_string(),
                        serde_json::Value::String(format!("{}:{}", region, name)),
                    )]),
                })
                .collect(),
        ),
        ..global_layer(name, description)
    }
}
