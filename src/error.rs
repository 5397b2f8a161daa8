//! Error types for the map-intent engine
//!
//! Utterance interpretation never fails; errors only surface at
//! configuration loading (fails fast), at collaborator calls (caught by the
//! component that issued them and turned into a sentinel or an empty
//! result) and at direct layer-list operations.

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid layer '{layer}': {reason}")]
    InvalidLayer { layer: String, reason: String },

    #[error("Invalid gazetteer record '{name}': {reason}")]
    InvalidGazetteer { name: String, reason: String },

    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
}

/// Failures of external collaborators (NER, similarity, geocoding, surface)
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Transport error calling {service}: {message}")]
    Transport { service: &'static str, message: String },

    #[error("{service} returned HTTP status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("Could not decode {service} response: {message}")]
    Decode { service: &'static str, message: String },

    #[error("{service} rejected the request: {message}")]
    Rejected { service: &'static str, message: String },
}

impl CollaboratorError {
    /// Map a reqwest failure onto the collaborator taxonomy
    pub(crate) fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            CollaboratorError::Status {
                service,
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            CollaboratorError::Decode {
                service,
                message: err.to_string(),
            }
        } else {
            CollaboratorError::Transport {
                service,
                message: err.to_string(),
            }
        }
    }
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Errors from direct layer-list operations (manual activation, visibility,
/// removal by title)
#[derive(Error, Debug)]
pub enum LayerCommandError {
    #[error("No layer at catalog index {0}")]
    UnknownLayer(usize),

    #[error("Layer '{layer}' has no region variant {index}")]
    UnknownVariant { layer: String, index: usize },

    #[error("Layer '{layer}' is regionalized; a region variant is required")]
    VariantRequired { layer: String },

    #[error("No active layer titled '{0}'")]
    NotActive(String),

    #[error(transparent)]
    Surface(#[from] CollaboratorError),
}
