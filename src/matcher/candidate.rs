//! Match candidates

use map_intent_types::{LayerDescriptor, RenderParams};
use std::sync::Arc;

/// A layer (or one region variant of it) proposed for activation
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub layer: Arc<LayerDescriptor>,
    /// Position of `layer` in the catalog
    pub layer_index: usize,
    /// Chosen region variant, for regionalized layers
    pub variant_index: Option<usize>,
    pub layer_similarity: f64,
    pub region_similarity: Option<f64>,
    /// Mean of layer and region similarity, or the layer similarity alone
    pub combined: f64,
    /// Location phrase that selected the variant
    pub location: Option<String>,
}

impl MatchCandidate {
    /// Candidate for a global layer
    pub fn global(layer: Arc<LayerDescriptor>, layer_index: usize, layer_similarity: f64) -> Self {
        Self {
            layer,
            layer_index,
            variant_index: None,
            layer_similarity,
            region_similarity: None,
            combined: layer_similarity,
            location: None,
        }
    }

    /// Candidate for one region variant of a regionalized layer
    pub fn regional(
        layer: Arc<LayerDescriptor>,
        layer_index: usize,
        variant_index: usize,
        layer_similarity: f64,
        region_similarity: f64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            layer,
            layer_index,
            variant_index: Some(variant_index),
            layer_similarity,
            region_similarity: Some(region_similarity),
            combined: (layer_similarity + region_similarity) / 2.0,
            location: Some(location.into()),
        }
    }

    /// Deduplication key on the active-layer registry
    pub fn title(&self) -> String {
        self.layer.title_for(self.variant_index)
    }

    /// `Highways - Maharashtra (score: 0.87)`
    pub fn label(&self) -> String {
        format!("{} (score: {:.2})", self.title(), self.combined)
    }

    /// Name of the selected region variant, if any
    pub fn region(&self) -> Option<&str> {
        self.variant_index
            .and_then(|i| self.layer.variant(i))
            .map(|variant| variant.name.as_str())
    }

    pub fn render_params(&self) -> RenderParams {
        self.layer.effective_render(self.variant_index)
    }
}
