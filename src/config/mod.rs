//! Engine configuration
//!
//! Three inputs are loaded once at start-up and treated as read-only for the
//! process lifetime:
//!
//! - `EngineConfig` - tuning constants, disambiguation policy, removal grammar
//!   and collaborator endpoints (YAML, every field defaulted)
//! - the layer catalog (`catalog`) - JSON, legacy and current schemas
//! - the gazetteer (`gazetteer`) - JSON place records
//!
//! ## Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MAP_INTENT_DISAMBIGUATION` | `disambiguation` (`automatic` / `interactive`) |
//! | `MAP_INTENT_NER_URL` | `services.ner_url` |
//! | `MAP_INTENT_SIMILARITY_URL` | `services.similarity_url` |
//! | `MAP_INTENT_GEOCODER_URL` | `services.geocoder_url` |
//! | `MAP_INTENT_ACTION_DELAY_MS` | `action_delay_ms` |

pub mod catalog;
pub mod gazetteer;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::removal::RemovalGrammar;

pub use catalog::{append_layer, load_catalog, normalize_layer, parse_catalog};
pub use gazetteer::{load_gazetteer, parse_gazetteer};

/// Minimum region similarity a variant must strictly exceed
pub const DEFAULT_REGION_SIMILARITY_THRESHOLD: f64 = 0.7;
/// Fixed delay between consecutive spatial actions
pub const DEFAULT_ACTION_DELAY_MS: u64 = 1000;
/// Zoom used when centering on a layer's region
pub const DEFAULT_REGION_ZOOM: f64 = 8.0;
/// Zoom used when a navigation target comes from the gazetteer (city tier)
pub const DEFAULT_GAZETTEER_ZOOM: f64 = 12.0;
/// Screen distance of one pan step
pub const DEFAULT_PAN_STEP_PX: f64 = 100.0;
pub const DEFAULT_COUNTRY_QUALIFIER: &str = "India";

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = "map-intent/0.1";

/// How the top candidate group is confirmed before activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisambiguationMode {
    /// Activate every candidate of the top group
    #[default]
    Automatic,
    /// Ask the selection dialog and activate only the chosen candidates
    Interactive,
}

impl std::str::FromStr for DisambiguationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "automatic" | "auto" => Ok(DisambiguationMode::Automatic),
            "interactive" | "manual" => Ok(DisambiguationMode::Interactive),
            other => Err(ConfigError::InvalidSetting {
                key: "disambiguation".to_string(),
                reason: format!("unknown mode '{}'", other),
            }),
        }
    }
}

/// Collaborator endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    /// Token-classification endpoint (POST `{"text": ...}`)
    pub ner_url: Option<String>,
    /// Text similarity endpoint (POST `{"a": ..., "b": ...}`)
    pub similarity_url: Option<String>,
    /// Nominatim-compatible search endpoint
    pub geocoder_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            ner_url: None,
            similarity_url: None,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServiceEndpoints {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Engine tuning and policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub region_similarity_threshold: f64,
    pub action_delay_ms: u64,
    pub region_zoom: f64,
    pub gazetteer_zoom: f64,
    pub pan_step_px: f64,
    /// Appended to region names when geocoding a layer's region
    pub country_qualifier: String,
    pub disambiguation: DisambiguationMode,
    pub removal: RemovalGrammar,
    pub services: ServiceEndpoints,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            region_similarity_threshold: DEFAULT_REGION_SIMILARITY_THRESHOLD,
            action_delay_ms: DEFAULT_ACTION_DELAY_MS,
            region_zoom: DEFAULT_REGION_ZOOM,
            gazetteer_zoom: DEFAULT_GAZETTEER_ZOOM,
            pan_step_px: DEFAULT_PAN_STEP_PX,
            country_qualifier: DEFAULT_COUNTRY_QUALIFIER.to_string(),
            disambiguation: DisambiguationMode::default(),
            removal: RemovalGrammar::default(),
            services: ServiceEndpoints::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string (for testing)
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MAP_INTENT_*` environment overrides
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(mode) = std::env::var("MAP_INTENT_DISAMBIGUATION") {
            self.disambiguation = mode.parse()?;
        }
        if let Ok(url) = std::env::var("MAP_INTENT_NER_URL") {
            self.services.ner_url = Some(url);
        }
        if let Ok(url) = std::env::var("MAP_INTENT_SIMILARITY_URL") {
            self.services.similarity_url = Some(url);
        }
        if let Ok(url) = std::env::var("MAP_INTENT_GEOCODER_URL") {
            self.services.geocoder_url = url;
        }
        if let Ok(delay) = std::env::var("MAP_INTENT_ACTION_DELAY_MS") {
            self.action_delay_ms =
                delay
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidSetting {
                        key: "MAP_INTENT_ACTION_DELAY_MS".to_string(),
                        reason: e.to_string(),
                    })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.region_similarity_threshold) {
            return Err(ConfigError::InvalidSetting {
                key: "region_similarity_threshold".to_string(),
                reason: format!("{} is outside [0, 1]", self.region_similarity_threshold),
            });
        }
        if self.pan_step_px <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                key: "pan_step_px".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        self.removal.validate()
    }
}
