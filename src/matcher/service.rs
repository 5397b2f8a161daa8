//! Layer matching service
//!
//! ```text
//! layer words ──► similarity(query, description) per layer (joined)
//!                      │
//!        ┌─────────────┴─────────────┐
//!     global                    regionalized
//!   combined = layer     for each location phrase:
//!                          find_best_matching_region
//!                          combined = mean(layer, region)
//!        └─────────────┬─────────────┘
//!                group by name ──► top group
//! ```

use futures::future::join_all;
use map_intent_types::LayerDescriptor;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::candidate::MatchCandidate;
use super::ranking::{rank_groups, CandidateGroup};
use super::region::{find_best_matching_region, ResolutionCache};
use super::similarity::SimilarityScorer;
use crate::config::DEFAULT_REGION_SIMILARITY_THRESHOLD;
use crate::location::LocationResolver;

/// Scores the layer catalog against extracted layer and location words
pub struct LayerMatcher {
    catalog: Vec<Arc<LayerDescriptor>>,
    scorer: Arc<dyn SimilarityScorer>,
    resolver: Arc<LocationResolver>,
    region_threshold: f64,
}

impl LayerMatcher {
    pub fn new(
        catalog: Vec<LayerDescriptor>,
        scorer: Arc<dyn SimilarityScorer>,
        resolver: Arc<LocationResolver>,
    ) -> Self {
        Self {
            catalog: catalog.into_iter().map(Arc::new).collect(),
            scorer,
            resolver,
            region_threshold: DEFAULT_REGION_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_region_threshold(mut self, threshold: f64) -> Self {
        self.region_threshold = threshold;
        self
    }

    pub fn catalog(&self) -> &[Arc<LayerDescriptor>] {
        &self.catalog
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Every admissible candidate, in catalog order.
    ///
    /// Layer similarities are requested for the whole catalog at once and
    /// joined before anything is ranked. A failed call counts as no match.
    #[instrument(skip(self), fields(catalog = self.catalog.len()))]
    pub async fn candidates(&self, layer_query: &str, locations: &[String]) -> Vec<MatchCandidate> {
        let scores = join_all(
            self.catalog
                .iter()
                .map(|layer| self.scorer.similarity(layer_query, &layer.description)),
        )
        .await;

        let mut cache = ResolutionCache::new(&self.resolver);
        let mut candidates = Vec::new();

        for (layer_index, (layer, score)) in self.catalog.iter().zip(scores).enumerate() {
            let layer_similarity = match score {
                Ok(s) if s > 0.0 => s,
                Ok(_) => continue,
                Err(e) => {
                    warn!(layer = %layer.name, error = %e, "Layer similarity failed");
                    continue;
                }
            };
            debug!(layer = %layer.name, similarity = layer_similarity, "Layer scored");

            if !layer.is_regionalized() {
                candidates.push(MatchCandidate::global(
                    layer.clone(),
                    layer_index,
                    layer_similarity,
                ));
                continue;
            }

            for phrase in locations {
                let found = find_best_matching_region(
                    phrase,
                    layer,
                    &mut cache,
                    self.scorer.as_ref(),
                    self.region_threshold,
                )
                .await;
                if let Some(found) = found {
                    let candidate = MatchCandidate::regional(
                        layer.clone(),
                        layer_index,
                        found.variant_index,
                        layer_similarity,
                        found.similarity,
                        phrase.clone(),
                    );
                    debug!(candidate = %candidate.label(), "Regional candidate admitted");
                    candidates.push(candidate);
                }
            }
        }

        candidates
    }

    /// Candidates grouped by layer and ranked, best group first
    pub async fn ranked(&self, layer_query: &str, locations: &[String]) -> Vec<CandidateGroup> {
        let groups = rank_groups(self.candidates(layer_query, locations).await);
        if let Some(top) = groups.first() {
            info!(
                layer = %top.name,
                mean = top.mean,
                candidates = top.candidates.len(),
                groups = groups.len(),
                "Top layer group"
            );
        } else {
            info!(query = %layer_query, "No matching layers");
        }
        groups
    }

    /// The top-ranked group only
    pub async fn best_group(
        &self,
        layer_query: &str,
        locations: &[String],
    ) -> Option<CandidateGroup> {
        self.ranked(layer_query, locations).await.into_iter().next()
    }
}
