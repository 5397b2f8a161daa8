//! Similarity scorers
//!
//! `SimilarityScorer` is the seam to the sentence-similarity model. Two
//! implementations ship with the crate:
//!
//! - `HttpSimilarityClient` - POSTs `{"a": ..., "b": ...}` to a model server
//!   and reads `{"similarity": f64}`
//! - `LexicalSimilarity` - offline token-level Jaro-Winkler, good enough for
//!   catalogs whose descriptions name the layer literally

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CollaboratorError, CollaboratorResult};

const SERVICE: &str = "similarity";

/// Text similarity contract.
///
/// Scores are in `[0, 1]` and deterministic for a given pair within a
/// session.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn similarity(&self, a: &str, b: &str) -> CollaboratorResult<f64>;
}

// ============================================================================
// LEXICAL
// ============================================================================

/// NFKC fold, lowercase, punctuation to spaces, collapsed whitespace
pub fn normalize_phrase(s: &str) -> String {
    let folded: String = s.nfkc().collect();
    let stripped: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Offline scorer.
///
/// Each token of `a` is matched to its closest token of `b` (Jaro-Winkler)
/// and the best scores are averaged. Whole-phrase similarity is used when it
/// is higher, so "tamilnadu" still scores well against "tamil nadu".
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    pub fn score(a: &str, b: &str) -> f64 {
        let a = normalize_phrase(a);
        let b = normalize_phrase(b);
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        let b_tokens: Vec<&str> = b.split(' ').collect();
        let a_tokens: Vec<&str> = a.split(' ').collect();
        let token_score = a_tokens
            .iter()
            .map(|token| {
                b_tokens
                    .iter()
                    .map(|other| strsim::jaro_winkler(token, other))
                    .fold(0.0, f64::max)
            })
            .sum::<f64>()
            / a_tokens.len() as f64;

        token_score.max(strsim::jaro_winkler(&a, &b)).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl SimilarityScorer for LexicalSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> CollaboratorResult<f64> {
        Ok(Self::score(a, b))
    }
}

// ============================================================================
// HTTP
// ============================================================================

#[derive(Serialize)]
struct SimilarityRequest<'a> {
    a: &'a str,
    b: &'a str,
}

#[derive(Deserialize)]
struct SimilarityResponse {
    similarity: f64,
}

/// Remote sentence-similarity model
pub struct HttpSimilarityClient {
    client: Client,
    endpoint: String,
}

impl HttpSimilarityClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SimilarityScorer for HttpSimilarityClient {
    async fn similarity(&self, a: &str, b: &str) -> CollaboratorResult<f64> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SimilarityRequest { a, b })
            .send()
            .await
            .map_err(|e| CollaboratorError::from_reqwest(SERVICE, e))?
            .error_for_status()
            .map_err(|e| CollaboratorError::from_reqwest(SERVICE, e))?;

        let body: SimilarityResponse =
            response.json().await.map_err(|e| CollaboratorError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        if !body.similarity.is_finite() {
            return Err(CollaboratorError::Decode {
                service: SERVICE,
                message: format!("non-finite score {}", body.similarity),
            });
        }
        Ok(body.similarity.clamp(0.0, 1.0))
    }
}
