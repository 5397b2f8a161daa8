//! Active layer registry
//!
//! Ordered by registration. Titles are unique: a title is reserved before
//! the surface call and committed (or released) after it, so the existence
//! check and the claim happen under one lock acquisition even though the
//! surface call itself is async. A `Reservation` releases its title when
//! dropped uncommitted, including when the activating future is cancelled.

use map_intent_types::{ActiveLayer, LayerHandle};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::removal::RemovalCommand;

#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: Vec<ActiveLayer>,
    pending: HashSet<String>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.pending.contains(title) || self.layers.iter().any(|l| l.title == title)
    }

    /// Claim `title` for an activation in flight. `false` if already taken.
    pub fn reserve(&mut self, title: &str) -> bool {
        if self.contains_title(title) {
            return false;
        }
        self.pending.insert(title.to_string());
        true
    }

    /// Record the surface handle for a reserved title
    pub fn commit(&mut self, title: &str, handle: LayerHandle) {
        self.pending.remove(title);
        self.layers.push(ActiveLayer {
            handle,
            title: title.to_string(),
            visible: true,
        });
    }

    /// Drop a reservation whose activation failed
    pub fn release(&mut self, title: &str) {
        self.pending.remove(title);
    }

    /// Register directly; `false` (and no change) on a duplicate title
    pub fn register(&mut self, handle: LayerHandle, title: &str) -> bool {
        if !self.reserve(title) {
            return false;
        }
        self.commit(title, handle);
        true
    }

    pub fn get(&self, title: &str) -> Option<&ActiveLayer> {
        self.layers.iter().find(|l| l.title == title)
    }

    /// First layer, in registration order, targeted by a removal command
    pub fn find_removal_target(&self, command: &RemovalCommand) -> Option<&ActiveLayer> {
        self.removal_position(command).map(|i| &self.layers[i])
    }

    fn removal_position(&self, command: &RemovalCommand) -> Option<usize> {
        self.layers.iter().position(|l| command.matches_title(&l.title))
    }

    /// Take a layer out of the list while keeping its title claimed
    fn detach(&mut self, position: usize) -> ActiveLayer {
        let layer = self.layers.remove(position);
        self.pending.insert(layer.title.clone());
        layer
    }

    /// Put a detached layer back where it was
    fn reattach(&mut self, position: usize, layer: ActiveLayer) {
        self.pending.remove(&layer.title);
        let position = position.min(self.layers.len());
        self.layers.insert(position, layer);
    }

    pub fn remove(&mut self, title: &str) -> Option<ActiveLayer> {
        let position = self.layers.iter().position(|l| l.title == title)?;
        Some(self.layers.remove(position))
    }

    pub fn set_visible(&mut self, title: &str, visible: bool) -> Option<LayerHandle> {
        let layer = self.layers.iter_mut().find(|l| l.title == title)?;
        layer.visible = visible;
        Some(layer.handle)
    }

    pub fn layers(&self) -> &[ActiveLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Lock a shared registry, recovering from poisoning
pub fn lock_registry(registry: &Mutex<LayerRegistry>) -> MutexGuard<'_, LayerRegistry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Claim on a title held across an async surface call
pub struct Reservation<'a> {
    registry: &'a Mutex<LayerRegistry>,
    title: String,
    committed: bool,
}

impl<'a> Reservation<'a> {
    /// `None` if the title is active or already claimed
    pub fn acquire(registry: &'a Mutex<LayerRegistry>, title: &str) -> Option<Self> {
        if !lock_registry(registry).reserve(title) {
            return None;
        }
        Some(Self {
            registry,
            title: title.to_string(),
            committed: false,
        })
    }

    pub fn commit(mut self, handle: LayerHandle) {
        lock_registry(self.registry).commit(&self.title, handle);
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            lock_registry(self.registry).release(&self.title);
        }
    }
}

/// Active layer held out of the registry while its surface removal runs.
///
/// Dropping it unconfirmed puts the layer back in its old position.
pub struct Detached<'a> {
    registry: &'a Mutex<LayerRegistry>,
    position: usize,
    layer: ActiveLayer,
    confirmed: bool,
}

impl<'a> Detached<'a> {
    /// Detach the first layer targeted by `command`
    pub fn removal_target(
        registry: &'a Mutex<LayerRegistry>,
        command: &RemovalCommand,
    ) -> Option<Self> {
        let mut guard = lock_registry(registry);
        let position = guard.removal_position(command)?;
        let layer = guard.detach(position);
        Some(Self::new(registry, position, layer))
    }

    /// Detach the layer with exactly this title
    pub fn by_title(registry: &'a Mutex<LayerRegistry>, title: &str) -> Option<Self> {
        let mut guard = lock_registry(registry);
        let position = guard.layers.iter().position(|l| l.title == title)?;
        let layer = guard.detach(position);
        Some(Self::new(registry, position, layer))
    }

    fn new(registry: &'a Mutex<LayerRegistry>, position: usize, layer: ActiveLayer) -> Self {
        Self {
            registry,
            position,
            layer,
            confirmed: false,
        }
    }

    pub fn layer(&self) -> &ActiveLayer {
        &self.layer
    }

    /// The surface dropped the layer; free its title
    pub fn confirm(mut self) -> ActiveLayer {
        lock_registry(self.registry).release(&self.layer.title);
        self.confirmed = true;
        self.layer.clone()
    }
}

impl Drop for Detached<'_> {
    fn drop(&mut self) {
        if !self.confirmed {
            lock_registry(self.registry).reattach(self.position, self.layer.clone());
        }
    }
}
