//! Shared types for map-intent
//!
//! Value types crossing the boundary between the interpretation engine and
//! its collaborators (configuration loader, rendering surface, dialogs):
//!
//! - `LayerDescriptor` / `RegionVariant` - the normalized layer catalog
//! - `GazetteerRecord` - local place → region reference data
//! - `SpatialAction` / `PanDirection` - directional and zoom steps
//! - `LayerHandle` / `ActiveLayer` - rendered layers as seen by the surface

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// LAYER CATALOG
// ============================================================================

/// Rendering parameters for a layer.
///
/// Opaque to the engine: they are merged and passed through to the
/// rendering surface untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Service endpoint (WMS root or URL template)
    pub url: String,
    /// Service parameters (e.g. `LAYERS`, `VERSION`, `CRS`)
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    /// Optional stacking order
    #[serde(default)]
    pub z_index: Option<i32>,
}

impl RenderParams {
    /// Overlay `overrides` on top of these parameters.
    pub fn overlaid(&self, overrides: &BTreeMap<String, serde_json::Value>) -> Self {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.params.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// A per-region rendering variant of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionVariant {
    /// Region name (e.g. "Maharashtra")
    pub name: String,
    /// Parameters overriding the parent layer's parameters for this region
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

/// A configured map layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub name: String,
    /// Free text the similarity scorer compares utterances against
    pub description: String,
    pub render: RenderParams,
    /// `None` for a global layer, `Some(non-empty)` for a regionalized one
    #[serde(default)]
    pub regions: Option<Vec<RegionVariant>>,
}

impl LayerDescriptor {
    pub fn is_regionalized(&self) -> bool {
        self.regions.as_ref().is_some_and(|r| !r.is_empty())
    }

    pub fn variants(&self) -> &[RegionVariant] {
        self.regions.as_deref().unwrap_or(&[])
    }

    pub fn variant(&self, index: usize) -> Option<&RegionVariant> {
        self.variants().get(index)
    }

    /// Display title of this layer, used as the deduplication key.
    ///
    /// `name` for a global layer, `name - variant` for a region variant.
    pub fn title_for(&self, variant_index: Option<usize>) -> String {
        match variant_index.and_then(|i| self.variant(i)) {
            Some(variant) => format!("{} - {}", self.name, variant.name),
            None => self.name.clone(),
        }
    }

    /// Rendering parameters with the variant override applied
    pub fn effective_render(&self, variant_index: Option<usize>) -> RenderParams {
        match variant_index.and_then(|i| self.variant(i)) {
            Some(variant) => self.render.overlaid(&variant.params),
            None => self.render.clone(),
        }
    }
}

// ============================================================================
// GAZETTEER
// ============================================================================

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Local place reference record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerRecord {
    pub name: String,
    /// Administrative region (state) containing the place
    pub region: String,
    pub coordinate: Coordinate,
}

// ============================================================================
// SPATIAL ACTIONS
// ============================================================================

/// Pan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
}

impl PanDirection {
    /// Unit screen vector (x to the right, y up)
    pub fn unit_vector(self) -> (f64, f64) {
        match self {
            PanDirection::Left => (-1.0, 0.0),
            PanDirection::Right => (1.0, 0.0),
            PanDirection::Up => (0.0, 1.0),
            PanDirection::Down => (0.0, -1.0),
        }
    }
}

/// A zero-argument directional or zoom step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "direction", rename_all = "snake_case")]
pub enum SpatialAction {
    ZoomIn,
    ZoomOut,
    Pan(PanDirection),
}

impl SpatialAction {
    /// Parse an NER action label (`zoomIn`, `panWest`, ...), without prefix.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "zoomIn" => Some(SpatialAction::ZoomIn),
            "zoomOut" => Some(SpatialAction::ZoomOut),
            "panLeft" | "panWest" => Some(SpatialAction::Pan(PanDirection::Left)),
            "panRight" | "panEast" => Some(SpatialAction::Pan(PanDirection::Right)),
            "panUp" | "panNorth" => Some(SpatialAction::Pan(PanDirection::Up)),
            "panDown" | "panSouth" => Some(SpatialAction::Pan(PanDirection::Down)),
            _ => None,
        }
    }
}

// ============================================================================
// RENDERED LAYERS
// ============================================================================

/// Opaque handle issued by the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerHandle(pub u64);

/// A layer currently rendered by the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveLayer {
    pub handle: LayerHandle,
    pub title: String,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn highways() -> LayerDescriptor {
        LayerDescriptor {
            name: "Highways".to_string(),
            description: "national highways and roads".to_string(),
            render: RenderParams {
                url: "https://maps.example/wms".to_string(),
                params: BTreeMap::from([("VERSION".to_string(), json!("1.3.0"))]),
                z_index: None,
            },
            regions: Some(vec![RegionVariant {
                name: "Maharashtra".to_string(),
                params: BTreeMap::from([("LAYERS".to_string(), json!("roads:mh"))]),
            }]),
        }
    }

    #[test]
    fn test_title_for_variant_and_global() {
        let layer = highways();
        assert_eq!(layer.title_for(Some(0)), "Highways - Maharashtra");
        assert_eq!(layer.title_for(None), "Highways");
        assert_eq!(layer.title_for(Some(7)), "Highways");
    }

    #[test]
    fn test_effective_render_overlays_variant() {
        let render = highways().effective_render(Some(0));
        assert_eq!(render.params.get("LAYERS"), Some(&json!("roads:mh")));
        assert_eq!(render.params.get("VERSION"), Some(&json!("1.3.0")));
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(
            SpatialAction::from_label("panWest"),
            Some(SpatialAction::Pan(PanDirection::Left))
        );
        assert_eq!(SpatialAction::from_label("zoomOut"), Some(SpatialAction::ZoomOut));
        assert_eq!(SpatialAction::from_label("B-zoomOut"), None);
    }
}
