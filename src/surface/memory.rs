//! In-memory map surface
//!
//! Keeps viewport and layer state in process and records every call, so the
//! CLI and the tests can drive the full pipeline without a renderer.

use async_trait::async_trait;
use map_intent_types::{ActiveLayer, Coordinate, LayerHandle, RenderParams};
use serde::Serialize;
use std::sync::Mutex;
use tracing::debug;

use super::MapSurface;
use crate::error::{CollaboratorError, CollaboratorResult};

const SERVICE: &str = "surface";
const DEFAULT_ZOOM: f64 = 5.0;

/// One recorded surface call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    AddLayer { title: String, params: RenderParams },
    RemoveLayer { handle: LayerHandle },
    SetVisible { handle: LayerHandle, visible: bool },
    NavigateTo { center: Coordinate, zoom: f64 },
    Pan { dx: f64, dy: f64 },
    SetZoom { zoom: f64 },
}

#[derive(Debug)]
struct SurfaceState {
    next_handle: u64,
    layers: Vec<ActiveLayer>,
    center: Option<Coordinate>,
    zoom: f64,
    offset: (f64, f64),
    calls: Vec<SurfaceCall>,
}

#[derive(Debug)]
pub struct InMemorySurface {
    state: Mutex<SurfaceState>,
}

impl Default for InMemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySurface {
    pub fn new() -> Self {
        Self::with_zoom(DEFAULT_ZOOM)
    }

    pub fn with_zoom(zoom: f64) -> Self {
        Self {
            state: Mutex::new(SurfaceState {
                next_handle: 1,
                layers: Vec::new(),
                center: None,
                zoom,
                offset: (0.0, 0.0),
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> CollaboratorResult<std::sync::MutexGuard<'_, SurfaceState>> {
        self.state.lock().map_err(|_| CollaboratorError::Rejected {
            service: SERVICE,
            message: "surface state poisoned".to_string(),
        })
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn layers(&self) -> Vec<ActiveLayer> {
        self.lock().map(|s| s.layers.clone()).unwrap_or_default()
    }

    pub fn center(&self) -> Option<Coordinate> {
        self.lock().ok().and_then(|s| s.center)
    }

    pub fn zoom(&self) -> f64 {
        self.lock().map(|s| s.zoom).unwrap_or(DEFAULT_ZOOM)
    }

    /// Accumulated pan offset in screen pixels
    pub fn offset(&self) -> (f64, f64) {
        self.lock().map(|s| s.offset).unwrap_or_default()
    }
}

#[async_trait]
impl MapSurface for InMemorySurface {
    async fn add_layer(
        &self,
        params: &RenderParams,
        title: &str,
    ) -> CollaboratorResult<LayerHandle> {
        let mut state = self.lock()?;
        let handle = LayerHandle(state.next_handle);
        state.next_handle += 1;
        state.layers.push(ActiveLayer {
            handle,
            title: title.to_string(),
            visible: true,
        });
        state.calls.push(SurfaceCall::AddLayer {
            title: title.to_string(),
            params: params.clone(),
        });
        debug!(title = %title, handle = handle.0, "Layer added");
        Ok(handle)
    }

    async fn remove_layer(&self, handle: LayerHandle) -> CollaboratorResult<()> {
        let mut state = self.lock()?;
        let before = state.layers.len();
        state.layers.retain(|l| l.handle != handle);
        if state.layers.len() == before {
            return Err(CollaboratorError::Rejected {
                service: SERVICE,
                message: format!("unknown layer handle {}", handle.0),
            });
        }
        state.calls.push(SurfaceCall::RemoveLayer { handle });
        Ok(())
    }

    async fn set_visible(&self, handle: LayerHandle, visible: bool) -> CollaboratorResult<()> {
        let mut state = self.lock()?;
        let layer = state
            .layers
            .iter_mut()
            .find(|l| l.handle == handle)
            .ok_or_else(|| CollaboratorError::Rejected {
                service: SERVICE,
                message: format!("unknown layer handle {}", handle.0),
            })?;
        layer.visible = visible;
        state.calls.push(SurfaceCall::SetVisible { handle, visible });
        Ok(())
    }

    async fn list_active(&self) -> CollaboratorResult<Vec<ActiveLayer>> {
        Ok(self.lock()?.layers.clone())
    }

    async fn navigate_to(&self, center: Coordinate, zoom: f64) -> CollaboratorResult<()> {
        let mut state = self.lock()?;
        state.center = Some(center);
        state.zoom = zoom;
        state.offset = (0.0, 0.0);
        state.calls.push(SurfaceCall::NavigateTo { center, zoom });
        Ok(())
    }

    async fn pan(&self, dx: f64, dy: f64) -> CollaboratorResult<()> {
        let mut state = self.lock()?;
        state.offset.0 += dx;
        state.offset.1 += dy;
        state.calls.push(SurfaceCall::Pan { dx, dy });
        Ok(())
    }

    async fn current_zoom(&self) -> CollaboratorResult<f64> {
        Ok(self.lock()?.zoom)
    }

    async fn set_zoom(&self, zoom: f64) -> CollaboratorResult<()> {
        let mut state = self.lock()?;
        state.zoom = zoom;
        state.calls.push(SurfaceCall::SetZoom { zoom });
        Ok(())
    }
}
