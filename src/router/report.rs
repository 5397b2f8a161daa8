//! Per-utterance outcome reporting

use map_intent_types::Coordinate;
use serde::Serialize;

use super::sequencer::SequenceReport;

/// What the router did with the map-data part of an utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Blank input; nothing ran
    EmptyInput,
    Removed {
        title: String,
    },
    RemovalTargetNotFound {
        category: String,
        location: Option<String>,
    },
    LayersActivated {
        activated: Vec<String>,
        /// Already active under the same title
        skipped: Vec<String>,
        failed: Vec<String>,
    },
    NoMatchingLayers,
    /// Interactive mode and the dialog returned no choice
    SelectionDeclined,
    Navigated {
        label: String,
        center: Coordinate,
        zoom: f64,
    },
    LocationNotFound {
        phrase: String,
    },
    NavigationFailed {
        diagnostic: String,
    },
    /// Neither layer nor location words were found
    NoTarget,
    NerFailed {
        diagnostic: String,
    },
    SurfaceFailed {
        diagnostic: String,
    },
    /// A newer utterance started before this one could apply its result
    Superseded,
}

impl DispatchOutcome {
    /// One-line human summary
    pub fn summary(&self) -> String {
        match self {
            DispatchOutcome::EmptyInput => "Nothing to do".to_string(),
            DispatchOutcome::Removed { title } => format!("Removed layer: {}", title),
            DispatchOutcome::RemovalTargetNotFound { category, location } => match location {
                Some(location) => format!("No active {} layer for {}", category, location),
                None => format!("No active {} layer", category),
            },
            DispatchOutcome::LayersActivated {
                activated,
                skipped,
                failed,
            } => {
                let mut parts = vec![format!("Activated: {}", activated.join(", "))];
                if !skipped.is_empty() {
                    parts.push(format!("already active: {}", skipped.join(", ")));
                }
                if !failed.is_empty() {
                    parts.push(format!("failed: {}", failed.join(", ")));
                }
                parts.join("; ")
            }
            DispatchOutcome::NoMatchingLayers => "No matching layers".to_string(),
            DispatchOutcome::SelectionDeclined => "No layer selected".to_string(),
            DispatchOutcome::Navigated { label, zoom, .. } => {
                format!("Navigated to {} (zoom {})", label, zoom)
            }
            DispatchOutcome::LocationNotFound { phrase } => {
                format!("Location not found: {}", phrase)
            }
            DispatchOutcome::NavigationFailed { diagnostic } => {
                format!("Navigation failed: {}", diagnostic)
            }
            DispatchOutcome::NoTarget => "No layer or location recognized".to_string(),
            DispatchOutcome::NerFailed { diagnostic } => {
                format!("Could not analyze command: {}", diagnostic)
            }
            DispatchOutcome::SurfaceFailed { diagnostic } => format!("Map error: {}", diagnostic),
            DispatchOutcome::Superseded => "Superseded by a newer command".to_string(),
        }
    }
}

/// Full result of interpreting one utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    pub generation: u64,
    /// Trimmed, lower-cased input
    pub utterance: String,
    pub outcome: DispatchOutcome,
    pub actions: SequenceReport,
}

impl CommandReport {
    pub fn new(generation: u64, utterance: impl Into<String>, outcome: DispatchOutcome) -> Self {
        Self {
            generation,
            utterance: utterance.into(),
            outcome,
            actions: SequenceReport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries() {
        let outcome = DispatchOutcome::LayersActivated {
            activated: vec!["Highways - Goa".to_string()],
            skipped: vec!["Railways".to_string()],
            failed: vec![],
        };
        assert_eq!(
            outcome.summary(),
            "Activated: Highways - Goa; already active: Railways"
        );
        assert_eq!(
            DispatchOutcome::RemovalTargetNotFound {
                category: "railway".to_string(),
                location: None
            }
            .summary(),
            "No active railway layer"
        );
    }

    #[test]
    fn test_serializes_with_outcome_tag() {
        let value = serde_json::to_value(DispatchOutcome::NoMatchingLayers).unwrap();
        assert_eq!(value["outcome"], "no_matching_layers");
    }
}
