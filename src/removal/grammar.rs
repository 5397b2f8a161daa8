//! Removal grammar tables

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A removable layer category and the words that name it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalCategory {
    /// Matched against active layer titles (case-insensitive substring)
    pub name: String,
    /// Words that select this category; multi-word synonyms are allowed
    pub synonyms: Vec<String>,
}

impl RemovalCategory {
    pub fn new(name: &str, synonyms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Keyword grammar for removal commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalGrammar {
    /// Any of these turns an utterance into a removal command
    pub keywords: Vec<String>,
    /// Checked in order; the first category with a matching synonym wins
    pub categories: Vec<RemovalCategory>,
    /// Words after the first occurrence of this token form the location
    pub marker: String,
}

impl Default for RemovalGrammar {
    fn default() -> Self {
        Self {
            keywords: ["remove", "delete", "hide", "erase", "clear", "disable"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            categories: vec![
                RemovalCategory::new("highway", &["highway", "road", "nh"]),
                RemovalCategory::new("railway", &["railway", "rail", "train"]),
                RemovalCategory::new("airport", &["airport", "airfield", "aerodrome"]),
                RemovalCategory::new("land use", &["land use", "lulc", "land cover"]),
            ],
            marker: "for".to_string(),
        }
    }
}

impl RemovalGrammar {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSetting {
            key: "removal".to_string(),
            reason: reason.to_string(),
        };

        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(invalid("empty removal keyword"));
        }
        if self.marker.trim().is_empty() || self.marker.contains(char::is_whitespace) {
            return Err(invalid("marker must be a single word"));
        }
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(invalid("category with an empty name"));
            }
            if category.synonyms.is_empty()
                || category.synonyms.iter().any(|s| s.trim().is_empty())
            {
                return Err(ConfigError::InvalidSetting {
                    key: format!("removal.categories.{}", category.name),
                    reason: "synonyms must be non-empty words".to_string(),
                });
            }
        }
        Ok(())
    }
}
