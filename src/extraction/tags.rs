//! NER tag vocabulary
//!
//! Phrase tags use a begin/inside scheme over two families (`B-layer`,
//! `I-location`, ...). Action tags are flat (`zoomIn`, `B-panWest`). `O`
//! marks an untagged token.

use map_intent_types::SpatialAction;
use serde::{Deserialize, Serialize};

/// Wordpiece continuation marker
pub const CONTINUATION_MARKER: &str = "##";

/// One token of NER output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedToken {
    /// Tag label, e.g. `B-layer`, `O`
    #[serde(alias = "tag")]
    pub entity: String,
    /// Token fragment; `##`-prefixed when continuing the previous token
    pub word: String,
}

impl TaggedToken {
    pub fn new(entity: impl Into<String>, word: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            word: word.into(),
        }
    }

    pub fn tag(&self) -> EntityTag {
        EntityTag::parse(&self.entity)
    }

    /// Fragment text without the continuation marker, if it is a continuation
    pub fn continuation(&self) -> Option<&str> {
        self.word.strip_prefix(CONTINUATION_MARKER)
    }
}

/// Phrase family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Layer,
    Location,
}

impl Family {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "layer" => Some(Family::Layer),
            "location" => Some(Family::Location),
            _ => None,
        }
    }
}

/// Parsed tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityTag {
    Begin(Family),
    Inside(Family),
    Action(SpatialAction),
    Outside,
    /// Anything else; ignored but still a phrase boundary
    Unknown,
}

impl EntityTag {
    pub fn parse(label: &str) -> Self {
        if label == "O" || label.is_empty() {
            return EntityTag::Outside;
        }
        if let Some(rest) = label.strip_prefix("B-") {
            if let Some(family) = Family::from_label(rest) {
                return EntityTag::Begin(family);
            }
            return SpatialAction::from_label(rest)
                .map(EntityTag::Action)
                .unwrap_or(EntityTag::Unknown);
        }
        if let Some(rest) = label.strip_prefix("I-") {
            return Family::from_label(rest)
                .map(EntityTag::Inside)
                .unwrap_or(EntityTag::Unknown);
        }
        SpatialAction::from_label(label)
            .map(EntityTag::Action)
            .unwrap_or(EntityTag::Unknown)
    }

    /// Phrase family for begin/inside tags
    pub fn family(self) -> Option<Family> {
        match self {
            EntityTag::Begin(f) | EntityTag::Inside(f) => Some(f),
            _ => None,
        }
    }
}
