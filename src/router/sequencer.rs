//! Spatial action sequencing
//!
//! Pan and zoom steps from one utterance run in the order they were spoken
//! with a fixed delay between consecutive steps. The surface is not asked
//! to settle between steps.

use map_intent_types::SpatialAction;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::CollaboratorResult;
use crate::surface::MapSurface;

/// Ordered spatial steps for one utterance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionQueue {
    actions: Vec<SpatialAction>,
}

impl ActionQueue {
    pub fn new(actions: Vec<SpatialAction>) -> Self {
        Self { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> &[SpatialAction] {
        &self.actions
    }
}

/// What happened to a queue
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SequenceReport {
    pub executed: Vec<SpatialAction>,
    pub failed: Vec<SpatialAction>,
    /// A newer utterance arrived before the queue finished
    pub superseded: bool,
}

#[derive(Debug, Clone)]
pub struct ActionSequencer {
    delay: Duration,
    pan_step_px: f64,
}

impl ActionSequencer {
    pub fn new(delay: Duration, pan_step_px: f64) -> Self {
        Self { delay, pan_step_px }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.action_delay(), config.pan_step_px)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Apply one step to the surface
    pub async fn apply(
        &self,
        action: SpatialAction,
        surface: &dyn MapSurface,
    ) -> CollaboratorResult<()> {
        match action {
            SpatialAction::ZoomIn => {
                let zoom = surface.current_zoom().await?;
                surface.set_zoom(zoom + 1.0).await
            }
            SpatialAction::ZoomOut => {
                let zoom = surface.current_zoom().await?;
                surface.set_zoom((zoom - 1.0).max(0.0)).await
            }
            SpatialAction::Pan(direction) => {
                let (x, y) = direction.unit_vector();
                surface.pan(x * self.pan_step_px, y * self.pan_step_px).await
            }
        }
    }

    /// Run the queue, checking `is_current` before every step.
    ///
    /// A failed step is logged and the queue carries on.
    pub async fn run<F>(
        &self,
        queue: ActionQueue,
        surface: &dyn MapSurface,
        is_current: F,
    ) -> SequenceReport
    where
        F: Fn() -> bool + Send + Sync,
    {
        let mut report = SequenceReport::default();

        for (position, action) in queue.actions.into_iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.delay).await;
            }
            if !is_current() {
                info!(remaining = ?action, "Action queue superseded");
                report.superseded = true;
                break;
            }
            match self.apply(action, surface).await {
                Ok(()) => {
                    debug!(?action, position, "Spatial action executed");
                    report.executed.push(action);
                }
                Err(e) => {
                    warn!(?action, error = %e, "Spatial action failed");
                    report.failed.push(action);
                }
            }
        }

        report
    }
}
