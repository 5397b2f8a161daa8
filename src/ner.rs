//! NER collaborator
//!
//! The token classifier runs outside this crate. `HttpNerClient` talks to a
//! JSON endpoint that accepts `{"text": "..."}` and answers with the usual
//! token-classification shape `[{"entity": "B-layer", "word": "high"}, ...]`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::extraction::TaggedToken;

const SERVICE: &str = "ner";

/// Token classifier contract
#[async_trait]
pub trait NerTagger: Send + Sync {
    async fn classify(&self, text: &str) -> CollaboratorResult<Vec<TaggedToken>>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

/// HTTP token classifier
pub struct HttpNerClient {
    client: Client,
    endpoint: String,
}

impl HttpNerClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NerTagger for HttpNerClient {
    async fn classify(&self, text: &str) -> CollaboratorResult<Vec<TaggedToken>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| CollaboratorError::from_reqwest(SERVICE, e))?
            .error_for_status()
            .map_err(|e| CollaboratorError::from_reqwest(SERVICE, e))?;

        let tokens: Vec<TaggedToken> = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        debug!(count = tokens.len(), "NER tokens received");
        Ok(tokens)
    }
}
