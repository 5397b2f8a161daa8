//! Rendering surface seam
//!
//! The engine never renders anything itself. Layer activation, navigation
//! and pan/zoom steps all go through `MapSurface`; the set of layers the
//! engine has activated is tracked in `LayerRegistry`.

pub mod dialog;
pub mod memory;
pub mod registry;

use async_trait::async_trait;
use map_intent_types::{ActiveLayer, Coordinate, LayerHandle, RenderParams};

use crate::error::CollaboratorResult;

pub use dialog::{AcceptAllDialog, ScriptedDialog, SelectionDialog};
pub use memory::{InMemorySurface, SurfaceCall};
pub use registry::{lock_registry, Detached, LayerRegistry, Reservation};

/// Map rendering surface contract
#[async_trait]
pub trait MapSurface: Send + Sync {
    /// Render a layer and return its handle
    async fn add_layer(
        &self,
        params: &RenderParams,
        title: &str,
    ) -> CollaboratorResult<LayerHandle>;

    async fn remove_layer(&self, handle: LayerHandle) -> CollaboratorResult<()>;

    async fn set_visible(&self, handle: LayerHandle, visible: bool) -> CollaboratorResult<()>;

    async fn list_active(&self) -> CollaboratorResult<Vec<ActiveLayer>>;

    /// Center the view on `center` at `zoom`
    async fn navigate_to(&self, center: Coordinate, zoom: f64) -> CollaboratorResult<()>;

    /// Move the view by a screen-space delta in pixels (x right, y up)
    async fn pan(&self, dx: f64, dy: f64) -> CollaboratorResult<()>;

    async fn current_zoom(&self) -> CollaboratorResult<f64>;

    async fn set_zoom(&self, zoom: f64) -> CollaboratorResult<()>;
}
