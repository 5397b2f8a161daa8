//! Two-tier place resolution: gazetteer first, geocoder second
//!
//! Every public method returns a value, never an error. Geocoder failures
//! become sentinels so callers can treat them as "no match" and move on.

use map_intent_types::Coordinate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::gazetteer::Gazetteer;
use super::geocoder::Geocoder;
use super::zoom::zoom_level;
use crate::config::EngineConfig;

/// Where a resolution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Local,
    Remote,
}

/// Result of mapping a place phrase to its administrative region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegionResolution {
    Resolved {
        region: String,
        source: ResolutionSource,
    },
    /// The geocoder returned no hits
    LocationNotFound,
    /// The first hit carried no state/province/region
    RegionNotFound,
    /// Transport failure, HTTP error or undecodable response
    Error { message: String },
}

impl RegionResolution {
    pub fn region(&self) -> Option<&str> {
        match self {
            RegionResolution::Resolved { region, .. } => Some(region),
            _ => None,
        }
    }
}

/// A place the map can be centered on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationTarget {
    pub label: String,
    pub center: Coordinate,
    pub zoom: f64,
    pub source: ResolutionSource,
}

/// Result of resolving a navigation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NavigationResolution {
    Target(NavigationTarget),
    NotFound,
    Error { message: String },
}

/// Zoom and qualifier settings for the resolver
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub country_qualifier: String,
    pub region_zoom: f64,
    pub gazetteer_zoom: f64,
}

impl From<&EngineConfig> for ResolverSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            country_qualifier: config.country_qualifier.clone(),
            region_zoom: config.region_zoom,
            gazetteer_zoom: config.gazetteer_zoom,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        ResolverSettings::from(&EngineConfig::default())
    }
}

/// Local-first location resolver
pub struct LocationResolver {
    gazetteer: Arc<Gazetteer>,
    geocoder: Arc<dyn Geocoder>,
    settings: ResolverSettings,
}

impl LocationResolver {
    pub fn new(gazetteer: Arc<Gazetteer>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_settings(gazetteer, geocoder, ResolverSettings::default())
    }

    pub fn with_settings(
        gazetteer: Arc<Gazetteer>,
        geocoder: Arc<dyn Geocoder>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            gazetteer,
            geocoder,
            settings,
        }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Map a place phrase to its administrative region.
    ///
    /// A gazetteer hit never reaches the geocoder. Otherwise exactly one
    /// geocoder call is made; failures are not retried.
    #[instrument(skip(self))]
    pub async fn resolve_region(&self, phrase: &str) -> RegionResolution {
        if let Some(record) = self.gazetteer.find_by_name(phrase) {
            debug!(place = %record.name, region = %record.region, "Region resolved from gazetteer");
            return RegionResolution::Resolved {
                region: record.region.clone(),
                source: ResolutionSource::Local,
            };
        }

        let hits = match self.geocoder.geocode(phrase).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Geocoder failed while resolving region");
                return RegionResolution::Error {
                    message: e.to_string(),
                };
            }
        };

        let Some(first) = hits.first() else {
            info!("No geocoder results for location");
            return RegionResolution::LocationNotFound;
        };

        match first.address.administrative_region() {
            Some(region) => {
                debug!(region = %region, "Region resolved from geocoder");
                RegionResolution::Resolved {
                    region: region.to_string(),
                    source: ResolutionSource::Remote,
                }
            }
            None => {
                info!(display_name = %first.display_name, "Geocoder hit has no region");
                RegionResolution::RegionNotFound
            }
        }
    }

    /// Resolve a place phrase for direct navigation.
    ///
    /// Gazetteer hits use the configured gazetteer zoom; geocoder hits are
    /// zoomed by place rank clamped by place type.
    #[instrument(skip(self))]
    pub async fn resolve_place(&self, phrase: &str) -> NavigationResolution {
        if let Some(record) = self.gazetteer.find_by_name(phrase) {
            debug!(place = %record.name, "Navigation target from gazetteer");
            return NavigationResolution::Target(NavigationTarget {
                label: record.name.clone(),
                center: record.coordinate,
                zoom: self.settings.gazetteer_zoom,
                source: ResolutionSource::Local,
            });
        }

        match self.geocoder.geocode(phrase).await {
            Ok(hits) => match hits.into_iter().next() {
                Some(hit) => {
                    let zoom = zoom_level(hit.place_rank, &hit.place_type);
                    info!(
                        place = %hit.display_name,
                        place_rank = hit.place_rank,
                        place_type = %hit.place_type,
                        zoom,
                        "Navigation target from geocoder"
                    );
                    NavigationResolution::Target(NavigationTarget {
                        label: hit.display_name,
                        center: hit.coordinate,
                        zoom: f64::from(zoom),
                        source: ResolutionSource::Remote,
                    })
                }
                None => NavigationResolution::NotFound,
            },
            Err(e) => {
                warn!(error = %e, "Geocoder failed while resolving place");
                NavigationResolution::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Center of an administrative region, at the region zoom.
    ///
    /// Gazetteer records located in the region are used first; otherwise the
    /// geocoder is asked for `"{region}, {country}"`.
    #[instrument(skip(self))]
    pub async fn resolve_region_center(&self, region: &str) -> NavigationResolution {
        if let Some(record) = self.gazetteer.find_by_region(region) {
            return NavigationResolution::Target(NavigationTarget {
                label: record.region.clone(),
                center: record.coordinate,
                zoom: self.settings.region_zoom,
                source: ResolutionSource::Local,
            });
        }

        let query = if self.settings.country_qualifier.is_empty() {
            region.to_string()
        } else {
            format!("{}, {}", region, self.settings.country_qualifier)
        };

        match self.geocoder.geocode(&query).await {
            Ok(hits) => match hits.into_iter().next() {
                Some(hit) => NavigationResolution::Target(NavigationTarget {
                    label: region.to_string(),
                    center: hit.coordinate,
                    zoom: self.settings.region_zoom,
                    source: ResolutionSource::Remote,
                }),
                None => {
                    info!(query = %query, "Region not found by geocoder");
                    NavigationResolution::NotFound
                }
            },
            Err(e) => {
                warn!(error = %e, "Geocoder failed while locating region");
                NavigationResolution::Error {
                    message: e.to_string(),
                }
            }
        }
    }
}
