//! Layer catalog loading
//!
//! The catalog file (`{"layers": [...]}`) carries two schemas side by side:
//!
//! - legacy: `rootUrl` plus `states: [{name, layerName}]`, one WMS layer per
//!   region
//! - current: `layerFactoryParams: {urlTemplate, layerParams}` (or flat
//!   `rootUrl` + `layerParams`), optional `zIndex` and `layerType`
//!
//! Both are normalized once, here, into `LayerDescriptor`. Nothing downstream
//! looks at the raw schema.

use map_intent_types::{LayerDescriptor, RegionVariant, RenderParams};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    layers: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLegacyLayer {
    name: String,
    #[serde(default)]
    description: String,
    root_url: String,
    states: Vec<RawState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    name: String,
    layer_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurrentLayer {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    layer_type: Option<String>,
    #[serde(default)]
    layer_factory_params: Option<RawFactoryParams>,
    #[serde(default)]
    root_url: Option<String>,
    #[serde(default)]
    layer_params: Option<Map<String, Value>>,
    #[serde(default)]
    z_index: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFactoryParams {
    url_template: String,
    #[serde(default)]
    layer_params: Map<String, Value>,
}

/// Normalize one raw catalog entry into a `LayerDescriptor`
pub fn normalize_layer(raw: &Value) -> Result<LayerDescriptor, ConfigError> {
    let label = raw
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string();
    let invalid = |reason: String| ConfigError::InvalidLayer {
        layer: label.clone(),
        reason,
    };

    let is_legacy = raw.get("states").is_some_and(|s| !s.is_null());
    let descriptor = if is_legacy {
        let layer: RawLegacyLayer =
            serde_json::from_value(raw.clone()).map_err(|e| invalid(e.to_string()))?;
        normalize_legacy(layer).map_err(invalid)?
    } else {
        let layer: RawCurrentLayer =
            serde_json::from_value(raw.clone()).map_err(|e| invalid(e.to_string()))?;
        normalize_current(layer).map_err(invalid)?
    };

    if descriptor.name.trim().is_empty() {
        return Err(invalid("layer name is empty".to_string()));
    }
    Ok(descriptor)
}

fn normalize_legacy(layer: RawLegacyLayer) -> Result<LayerDescriptor, String> {
    let first = layer
        .states
        .first()
        .ok_or_else(|| "regionalized layer has an empty state list".to_string())?;

    // Shared workspace prefix of the per-state layer names
    let workspace = first
        .layer_name
        .split(':')
        .next()
        .unwrap_or_default()
        .to_string();

    let params = BTreeMap::from([
        ("LAYERS".to_string(), json!(workspace)),
        ("VERSION".to_string(), json!("1.3.0")),
        ("CRS".to_string(), json!("EPSG:4326")),
    ]);

    let regions = layer
        .states
        .into_iter()
        .map(|state| RegionVariant {
            name: state.name,
            params: BTreeMap::from([("LAYERS".to_string(), json!(state.layer_name))]),
        })
        .collect();

    Ok(LayerDescriptor {
        name: layer.name,
        description: layer.description,
        render: RenderParams {
            url: layer.root_url,
            params,
            z_index: None,
        },
        regions: Some(regions),
    })
}

fn normalize_current(layer: RawCurrentLayer) -> Result<LayerDescriptor, String> {
    let (url, raw_params) = match (layer.layer_factory_params, layer.root_url) {
        (Some(factory), _) => (factory.url_template, factory.layer_params),
        (None, Some(root_url)) => (root_url, layer.layer_params.unwrap_or_default()),
        (None, None) => return Err("missing layerFactoryParams.urlTemplate or rootUrl".to_string()),
    };

    if let Some(layer_type) = &layer.layer_type {
        debug!(layer = %layer.name, layer_type = %layer_type, "current-schema layer");
    }

    Ok(LayerDescriptor {
        name: layer.name,
        description: layer.description,
        render: RenderParams {
            url,
            params: raw_params.into_iter().collect(),
            z_index: layer.z_index,
        },
        regions: None,
    })
}

/// Parse and normalize a catalog JSON document
pub fn parse_catalog(json: &str, source: &str) -> Result<Vec<LayerDescriptor>, ConfigError> {
    let raw: RawCatalog = serde_json::from_str(json).map_err(|source_err| ConfigError::Json {
        path: source.to_string(),
        source: source_err,
    })?;
    raw.layers.iter().map(normalize_layer).collect()
}

/// Load and normalize the catalog file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<LayerDescriptor>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let layers = parse_catalog(&content, &path.display().to_string())?;
    info!(count = layers.len(), path = %path.display(), "Layer catalog loaded");
    Ok(layers)
}

/// Append a raw layer entry to the catalog file.
///
/// The entry is normalized first so an invalid layer never reaches the file.
/// A missing file is created as `{"layers": []}`.
pub fn append_layer<P: AsRef<Path>>(path: P, raw: Value) -> Result<LayerDescriptor, ConfigError> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let descriptor = normalize_layer(&raw)?;

    let mut document: Value = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: shown.clone(),
            source,
        })?
    } else {
        json!({ "layers": [] })
    };

    let layers = document
        .as_object_mut()
        .map(|obj| obj.entry("layers").or_insert_with(|| json!([])))
        .and_then(Value::as_array_mut)
        .ok_or_else(|| ConfigError::InvalidSetting {
            key: "layers".to_string(),
            reason: format!("{} has no layers array", shown),
        })?;
    layers.push(raw);

    let pretty = serde_json::to_string_pretty(&document).map_err(|source| ConfigError::Json {
        path: shown.clone(),
        source,
    })?;
    std::fs::write(path, pretty).map_err(|source| ConfigError::Io {
        path: shown.clone(),
        source,
    })?;

    info!(layer = %descriptor.name, path = %shown, "Layer appended to catalog");
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "layers": [
            {
                "name": "Highways",
                "description": "national highways road network",
                "rootUrl": "https://gis.example/geoserver/wms",
                "states": [
                    {"name": "Maharashtra", "layerName": "roads:mh_highways"},
                    {"name": "Karnataka", "layerName": "roads:ka_highways"}
                ]
            },
            {
                "name": "Airports",
                "description": "airports and airfields where planes land",
                "layerType": "imageWMS",
                "layerFactoryParams": {
                    "urlTemplate": "https://gis.example/geoserver/wms",
                    "layerParams": {"LAYERS": "aviation:airports"}
                },
                "zIndex": 4,
                "states": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_both_schemas() {
        let layers = parse_catalog(CATALOG, "inline").unwrap();
        assert_eq!(layers.len(), 2);

        let highways = &layers[0];
        assert!(highways.is_regionalized());
        assert_eq!(highways.variants().len(), 2);
        assert_eq!(highways.render.params.get("LAYERS"), Some(&json!("roads")));
        assert_eq!(
            highways.effective_render(Some(1)).params.get("LAYERS"),
            Some(&json!("roads:ka_highways"))
        );

        let airports = &layers[1];
        assert!(!airports.is_regionalized());
        assert_eq!(airports.regions, None);
        assert_eq!(airports.render.z_index, Some(4));
        assert_eq!(
            airports.render.params.get("LAYERS"),
            Some(&json!("aviation:airports"))
        );
    }

    #[test]
    fn test_empty_state_list_fails_fast() {
        let raw = json!({
            "name": "Rivers",
            "description": "rivers",
            "rootUrl": "https://gis.example/wms",
            "states": []
        });
        let err = normalize_layer(&raw).unwrap_err();
        match err {
            ConfigError::InvalidLayer { layer, reason } => {
                assert_eq!(layer, "Rivers");
                assert!(reason.contains("empty"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_url_rejected() {
        let raw = json!({"name": "Orphan", "description": "no url"});
        assert!(normalize_layer(&raw).is_err());
    }

    #[test]
    fn test_append_layer_creates_and_extends_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer_config.json");

        let first = json!({
            "name": "Railways",
            "description": "railway lines",
            "rootUrl": "https://gis.example/wms",
            "layerParams": {"LAYERS": "rail:lines"}
        });
        append_layer(&path, first).unwrap();
        let second = json!({
            "name": "Ports",
            "description": "sea ports",
            "layerFactoryParams": {"urlTemplate": "https://gis.example/wms"}
        });
        append_layer(&path, second).unwrap();

        let layers = load_catalog(&path).unwrap();
        let names: Vec<_> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Railways", "Ports"]);
    }

    #[test]
    fn test_append_invalid_layer_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer_config.json");
        assert!(append_layer(&path, json!({"name": "Broken"})).is_err());
        assert!(!path.exists());
    }
}
