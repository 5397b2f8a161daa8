//! Region variant selection for regionalized layers

use map_intent_types::LayerDescriptor;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::similarity::SimilarityScorer;
use crate::location::{LocationResolver, RegionResolution};

/// Variant chosen for a location phrase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMatch {
    pub variant_index: usize,
    pub similarity: f64,
}

/// Per-utterance memo of region resolutions.
///
/// A phrase is resolved at most once however many regionalized layers ask
/// for it.
pub struct ResolutionCache<'a> {
    resolver: &'a LocationResolver,
    resolved: HashMap<String, RegionResolution>,
}

impl<'a> ResolutionCache<'a> {
    pub fn new(resolver: &'a LocationResolver) -> Self {
        Self {
            resolver,
            resolved: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, phrase: &str) -> RegionResolution {
        let key = phrase.trim().to_lowercase();
        if let Some(hit) = self.resolved.get(&key) {
            return hit.clone();
        }
        let resolution = self.resolver.resolve_region(phrase).await;
        self.resolved.insert(key, resolution.clone());
        resolution
    }
}

fn exact_variant(layer: &LayerDescriptor, name: &str) -> Option<usize> {
    let name = name.trim().to_lowercase();
    layer
        .variants()
        .iter()
        .position(|variant| variant.name.trim().to_lowercase() == name)
}

/// Pick the region variant of `layer` that best fits `phrase`.
///
/// 1. The phrase names a variant (ignoring case): similarity 1, no calls.
/// 2. Otherwise the phrase is resolved to a region. A sentinel resolution
///    yields no match. A region naming a variant exactly scores 1.
/// 3. Otherwise every variant is scored against the region; the first
///    maximum wins and must be strictly greater than `threshold`.
pub async fn find_best_matching_region(
    phrase: &str,
    layer: &LayerDescriptor,
    cache: &mut ResolutionCache<'_>,
    scorer: &dyn SimilarityScorer,
    threshold: f64,
) -> Option<RegionMatch> {
    if let Some(variant_index) = exact_variant(layer, phrase) {
        return Some(RegionMatch {
            variant_index,
            similarity: 1.0,
        });
    }

    let region = match cache.resolve(phrase).await {
        RegionResolution::Resolved { region, .. } => region,
        other => {
            debug!(phrase = %phrase, resolution = ?other, "No region for phrase");
            return None;
        }
    };

    if let Some(variant_index) = exact_variant(layer, &region) {
        return Some(RegionMatch {
            variant_index,
            similarity: 1.0,
        });
    }

    let mut best: Option<RegionMatch> = None;
    for (variant_index, variant) in layer.variants().iter().enumerate() {
        let similarity = match scorer.similarity(&region, &variant.name).await {
            Ok(score) if score.is_finite() => score,
            Ok(score) => {
                warn!(
                    region = %region,
                    variant = %variant.name,
                    score,
                    "Non-finite region similarity ignored"
                );
                continue;
            }
            Err(e) => {
                warn!(
                    region = %region,
                    variant = %variant.name,
                    error = %e,
                    "Region similarity failed"
                );
                continue;
            }
        };
        if best.map_or(true, |b| similarity > b.similarity) {
            best = Some(RegionMatch {
                variant_index,
                similarity,
            });
        }
    }

    match best {
        Some(m) if m.similarity > threshold => {
            debug!(
                layer = %layer.name,
                region = %region,
                similarity = m.similarity,
                "Region variant accepted"
            );
            Some(m)
        }
        Some(m) => {
            debug!(
                layer = %layer.name,
                region = %region,
                similarity = m.similarity,
                threshold,
                "Best region variant below threshold"
            );
            None
        }
        None => None,
    }
}
