//! Geocoding collaborator
//!
//! `NominatimClient` queries a Nominatim-compatible `/search` endpoint with
//! `format=json&addressdetails=1&limit=1`. Only the first hit is ever read.

use async_trait::async_trait;
use map_intent_types::Coordinate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{CollaboratorError, CollaboratorResult};

const SERVICE: &str = "geocoder";

/// Administrative part of a geocoding hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Address {
    /// State, then province, then region; first non-empty wins
    pub fn administrative_region(&self) -> Option<&str> {
        [&self.state, &self.province, &self.region]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

/// One geocoding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    /// Place specificity: higher means more local
    pub place_rank: u32,
    /// Place type (`city`, `state`, `house`, ...)
    pub place_type: String,
    pub address: Address,
    pub display_name: String,
}

/// Geocoder contract
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> CollaboratorResult<Vec<GeocodeHit>>;
}

/// Raw Nominatim search hit (coordinates arrive as strings)
#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    #[serde(default)]
    place_rank: Option<u32>,
    #[serde(rename = "type", default)]
    place_type: Option<String>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    display_name: String,
}

impl TryFrom<NominatimHit> for GeocodeHit {
    type Error = CollaboratorError;

    fn try_from(raw: NominatimHit) -> Result<Self, Self::Error> {
        let parse = |value: &str| {
            value.trim().parse::<f64>().map_err(|e| CollaboratorError::Decode {
                service: SERVICE,
                message: format!("bad coordinate '{}': {}", value, e),
            })
        };
        Ok(GeocodeHit {
            coordinate: Coordinate::new(parse(&raw.lat)?, parse(&raw.lon)?),
            place_rank: raw.place_rank.unwrap_or_default(),
            place_type: raw.place_type.unwrap_or_default(),
            address: raw.address.unwrap_or_default(),
            display_name: raw.display_name,
        })
    }
}

/// Decode a Nominatim search response body
pub fn parse_nominatim_response(body: &str) -> CollaboratorResult<Vec<GeocodeHit>> {
    let raw: Vec<NominatimHit> = serde_json::from_str(body).map_err(|e| CollaboratorError::Decode {
        service: SERVICE,
        message: e.to_string(),
    })?;
    raw.into_iter().map(GeocodeHit::try_from).collect()
}

/// Nominatim-compatible HTTP geocoder
pub struct NominatimClient {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(
        client: Client,
        endpoint: &str,
        user_agent: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("Invalid geocoder URL '{}': {}", endpoint, e))?;
        Ok(Self {
            client,
            endpoint,
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> CollaboratorResult<Vec<GeocodeHit>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "1"),
            ])
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|e| CollaboratorError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CollaboratorError::from_reqwest(SERVICE, e))?;
        let hits = parse_nominatim_response(&body)?;
        debug!(query = %query, hits = hits.len(), "Geocoder response");
        Ok(hits)
    }
}
