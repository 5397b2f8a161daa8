//! Command router
//!
//! Top-level orchestration of one utterance:
//!
//! ```text
//! text ─► trim/lower ─► removal grammar? ──yes──► remove first matching layer
//!                            │ no
//!                            ▼
//!                       NER classify ─► extract entities + spatial actions
//!                            │
//!          ┌─────────────────┼──────────────────┐
//!     layer words      location words only     neither
//!    LayerMatcher       direct navigation      no target
//!          │
//!   top group ─► disambiguation ─► activate (dedupe by title) ─► center on region
//!                            │
//!                            ▼
//!                  ActionSequencer (pan/zoom, fixed delay)
//! ```
//!
//! Every utterance takes a new generation. Before each registry mutation,
//! navigation and spatial step the router checks that no newer utterance
//! has started; stale work is dropped and reported as `Superseded`.

use map_intent_types::{ActiveLayer, GazetteerRecord, LayerDescriptor};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use super::report::{CommandReport, DispatchOutcome};
use super::sequencer::{ActionQueue, ActionSequencer};
use crate::config::{DisambiguationMode, EngineConfig};
use crate::error::LayerCommandError;
use crate::extraction::{collect_actions, extract_entities, ExtractedEntities};
use crate::location::{
    Gazetteer, Geocoder, LocationResolver, NavigationResolution, ResolverSettings,
};
use crate::matcher::{LayerMatcher, MatchCandidate, SimilarityScorer};
use crate::ner::NerTagger;
use crate::removal::{parse_removal_command, RemovalCommand, RemovalGrammar};
use crate::surface::{
    lock_registry, Detached, LayerRegistry, MapSurface, Reservation, SelectionDialog,
};

/// External collaborators the router drives
#[derive(Clone)]
pub struct Collaborators {
    pub ner: Arc<dyn NerTagger>,
    pub scorer: Arc<dyn SimilarityScorer>,
    pub geocoder: Arc<dyn Geocoder>,
    pub surface: Arc<dyn MapSurface>,
    pub dialog: Arc<dyn SelectionDialog>,
}

/// Result of activating a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Activated(String),
    AlreadyActive(String),
    Failed(String),
    Superseded,
}

pub struct CommandRouter {
    ner: Arc<dyn NerTagger>,
    surface: Arc<dyn MapSurface>,
    dialog: Arc<dyn SelectionDialog>,
    matcher: LayerMatcher,
    resolver: Arc<LocationResolver>,
    sequencer: ActionSequencer,
    removal: RemovalGrammar,
    disambiguation: Mutex<DisambiguationMode>,
    registry: Mutex<LayerRegistry>,
    generation: AtomicU64,
}

impl CommandRouter {
    pub fn new(
        config: &EngineConfig,
        catalog: Vec<LayerDescriptor>,
        gazetteer: Vec<GazetteerRecord>,
        collaborators: Collaborators,
    ) -> Self {
        let resolver = Arc::new(LocationResolver::with_settings(
            Arc::new(Gazetteer::new(gazetteer)),
            collaborators.geocoder,
            ResolverSettings::from(config),
        ));
        let matcher = LayerMatcher::new(catalog, collaborators.scorer, resolver.clone())
            .with_region_threshold(config.region_similarity_threshold);

        info!(
            layers = matcher.catalog().len(),
            places = resolver.gazetteer().len(),
            mode = ?config.disambiguation,
            "Command router ready"
        );

        Self {
            ner: collaborators.ner,
            surface: collaborators.surface,
            dialog: collaborators.dialog,
            matcher,
            resolver,
            sequencer: ActionSequencer::from_config(config),
            removal: config.removal.clone(),
            disambiguation: Mutex::new(config.disambiguation),
            registry: Mutex::new(LayerRegistry::new()),
            generation: AtomicU64::new(0),
        }
    }

    // ========================================================================
    // STATE
    // ========================================================================

    fn registry(&self) -> MutexGuard<'_, LayerRegistry> {
        lock_registry(&self.registry)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn disambiguation_mode(&self) -> DisambiguationMode {
        *self
            .disambiguation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_disambiguation_mode(&self, mode: DisambiguationMode) {
        *self
            .disambiguation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = mode;
        info!(?mode, "Disambiguation mode changed");
    }

    pub fn catalog(&self) -> &[Arc<LayerDescriptor>] {
        self.matcher.catalog()
    }

    /// Active layers in registration order
    pub fn list_active(&self) -> Vec<ActiveLayer> {
        self.registry().layers().to_vec()
    }

    // ========================================================================
    // UTTERANCE PIPELINE
    // ========================================================================

    /// Interpret one utterance and apply it to the surface.
    ///
    /// Never fails: every problem ends up as a `DispatchOutcome`.
    #[instrument(skip(self))]
    pub async fn interpret(&self, text: &str) -> CommandReport {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let utterance = text.trim().to_lowercase();

        if utterance.is_empty() {
            return CommandReport::new(generation, utterance, DispatchOutcome::EmptyInput);
        }

        if let Some(command) = parse_removal_command(&utterance, &self.removal) {
            info!(category = %command.category, location = ?command.location, "Removal command");
            let outcome = self.execute_removal(generation, &command).await;
            return CommandReport::new(generation, utterance, outcome);
        }

        let tokens = match self.ner.classify(&utterance).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "NER failed");
                return CommandReport::new(
                    generation,
                    utterance,
                    DispatchOutcome::NerFailed {
                        diagnostic: e.to_string(),
                    },
                );
            }
        };

        let entities = extract_entities(&tokens);
        let queue = ActionQueue::new(collect_actions(&tokens));
        debug!(
            layer = ?entities.layer,
            location = ?entities.location,
            actions = queue.len(),
            "Entities extracted"
        );

        let outcome = self.dispatch(generation, &entities).await;
        let mut report = CommandReport::new(generation, utterance, outcome);

        if report.outcome == DispatchOutcome::Superseded || queue.is_empty() {
            return report;
        }
        report.actions = self
            .sequencer
            .run(queue, self.surface.as_ref(), || self.is_current(generation))
            .await;
        report
    }

    async fn dispatch(&self, generation: u64, entities: &ExtractedEntities) -> DispatchOutcome {
        if !entities.layer.is_empty() {
            self.activate_matches(generation, entities).await
        } else if !entities.location.is_empty() {
            self.navigate_direct(generation, &entities.location_query()).await
        } else {
            debug!("No layer or location entities");
            DispatchOutcome::NoTarget
        }
    }

    // ========================================================================
    // REMOVAL
    // ========================================================================

    async fn execute_removal(&self, generation: u64, command: &RemovalCommand) -> DispatchOutcome {
        if !self.is_current(generation) {
            return DispatchOutcome::Superseded;
        }

        let Some(target) = Detached::removal_target(&self.registry, command) else {
            info!(category = %command.category, "No active layer to remove");
            return DispatchOutcome::RemovalTargetNotFound {
                category: command.category.clone(),
                location: command.location.clone(),
            };
        };

        match self.surface.remove_layer(target.layer().handle).await {
            Ok(()) => {
                let removed = target.confirm();
                info!(title = %removed.title, "Layer removed");
                DispatchOutcome::Removed {
                    title: removed.title,
                }
            }
            Err(e) => {
                warn!(title = %target.layer().title, error = %e, "Surface refused layer removal");
                DispatchOutcome::SurfaceFailed {
                    diagnostic: e.to_string(),
                }
            }
        }
    }

    // ========================================================================
    // LAYER ACTIVATION
    // ========================================================================

    async fn activate_matches(
        &self,
        generation: u64,
        entities: &ExtractedEntities,
    ) -> DispatchOutcome {
        let Some(group) = self
            .matcher
            .best_group(&entities.layer_query(), &entities.location)
            .await
        else {
            return DispatchOutcome::NoMatchingLayers;
        };

        let chosen: Vec<MatchCandidate> = match self.disambiguation_mode() {
            DisambiguationMode::Automatic => group.candidates,
            DisambiguationMode::Interactive => {
                let indices = self.dialog.present_choices(&group.candidates).await;
                let mut seen = HashSet::new();
                let picked: Vec<MatchCandidate> = indices
                    .into_iter()
                    .filter(|i| seen.insert(*i))
                    .filter_map(|i| group.candidates.get(i).cloned())
                    .collect();
                if picked.is_empty() {
                    info!(layer = %group.name, "Selection declined");
                    return DispatchOutcome::SelectionDeclined;
                }
                picked
            }
        };

        let mut activated = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();

        for candidate in &chosen {
            match self.activate_candidate(generation, candidate).await {
                Activation::Activated(title) => {
                    if let Some(region) = candidate.region() {
                        self.navigate_to_region(generation, region).await;
                    }
                    activated.push(title);
                }
                Activation::AlreadyActive(title) => skipped.push(title),
                Activation::Failed(title) => failed.push(title),
                Activation::Superseded => return DispatchOutcome::Superseded,
            }
        }

        DispatchOutcome::LayersActivated {
            activated,
            skipped,
            failed,
        }
    }

    /// Add one candidate to the surface unless its title is already active
    async fn activate_candidate(&self, generation: u64, candidate: &MatchCandidate) -> Activation {
        if !self.is_current(generation) {
            return Activation::Superseded;
        }
        self.activate(candidate.title(), candidate).await
    }

    async fn activate(&self, title: String, candidate: &MatchCandidate) -> Activation {
        let Some(reservation) = Reservation::acquire(&self.registry, &title) else {
            info!(title = %title, "Layer already active, skipping");
            return Activation::AlreadyActive(title);
        };

        match self.surface.add_layer(&candidate.render_params(), &title).await {
            Ok(handle) => {
                reservation.commit(handle);
                info!(
                    title = %title,
                    handle = handle.0,
                    score = candidate.combined,
                    "Layer activated"
                );
                Activation::Activated(title)
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Surface refused layer");
                Activation::Failed(title)
            }
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// Center on a layer's region; failures are logged only
    async fn navigate_to_region(&self, generation: u64, region: &str) {
        match self.resolver.resolve_region_center(region).await {
            NavigationResolution::Target(target) => {
                if !self.is_current(generation) {
                    return;
                }
                if let Err(e) = self.surface.navigate_to(target.center, target.zoom).await {
                    warn!(region = %region, error = %e, "Could not center on region");
                } else {
                    debug!(region = %region, zoom = target.zoom, "Centered on region");
                }
            }
            NavigationResolution::NotFound => {
                warn!(region = %region, "Region center not found");
            }
            NavigationResolution::Error { message } => {
                warn!(region = %region, error = %message, "Region center lookup failed");
            }
        }
    }

    async fn navigate_direct(&self, generation: u64, phrase: &str) -> DispatchOutcome {
        match self.resolver.resolve_place(phrase).await {
            NavigationResolution::Target(target) => {
                if !self.is_current(generation) {
                    return DispatchOutcome::Superseded;
                }
                match self.surface.navigate_to(target.center, target.zoom).await {
                    Ok(()) => {
                        info!(place = %target.label, zoom = target.zoom, "Navigated");
                        DispatchOutcome::Navigated {
                            label: target.label,
                            center: target.center,
                            zoom: target.zoom,
                        }
                    }
                    Err(e) => DispatchOutcome::SurfaceFailed {
                        diagnostic: e.to_string(),
                    },
                }
            }
            NavigationResolution::NotFound => {
                info!(phrase = %phrase, "Location not found");
                DispatchOutcome::LocationNotFound {
                    phrase: phrase.to_string(),
                }
            }
            NavigationResolution::Error { message } => {
                DispatchOutcome::NavigationFailed {
                    diagnostic: message,
                }
            }
        }
    }

    // ========================================================================
    // LAYER LIST OPERATIONS
    // ========================================================================

    /// Activate a catalog layer directly, bypassing interpretation.
    ///
    /// Regionalized layers need a variant index; global layers take none.
    pub async fn activate_layer(
        &self,
        layer_index: usize,
        variant_index: Option<usize>,
    ) -> Result<Activation, LayerCommandError> {
        let layer = self
            .matcher
            .catalog()
            .get(layer_index)
            .cloned()
            .ok_or(LayerCommandError::UnknownLayer(layer_index))?;

        match (layer.is_regionalized(), variant_index) {
            (true, None) => {
                return Err(LayerCommandError::VariantRequired {
                    layer: layer.name.clone(),
                })
            }
            (true, Some(index)) if layer.variant(index).is_none() => {
                return Err(LayerCommandError::UnknownVariant {
                    layer: layer.name.clone(),
                    index,
                })
            }
            (false, Some(index)) => {
                return Err(LayerCommandError::UnknownVariant {
                    layer: layer.name.clone(),
                    index,
                })
            }
            _ => {}
        }

        let mut candidate = MatchCandidate::global(layer, layer_index, 1.0);
        candidate.variant_index = variant_index;
        let activation = self.activate(candidate.title(), &candidate).await;
        if let (Activation::Activated(_), Some(region)) = (&activation, candidate.region()) {
            self.navigate_to_region(self.current_generation(), region).await;
        }
        Ok(activation)
    }

    /// Flip visibility of an active layer; returns the new visibility
    pub async fn toggle_visibility(&self, title: &str) -> Result<bool, LayerCommandError> {
        let (handle, visible) = {
            let registry = self.registry();
            let layer = registry
                .get(title)
                .ok_or_else(|| LayerCommandError::NotActive(title.to_string()))?;
            (layer.handle, !layer.visible)
        };

        self.surface.set_visible(handle, visible).await?;
        self.registry().set_visible(title, visible);
        debug!(title = %title, visible, "Visibility toggled");
        Ok(visible)
    }

    /// Remove an active layer by its exact title
    pub async fn remove_by_title(&self, title: &str) -> Result<(), LayerCommandError> {
        let target = Detached::by_title(&self.registry, title)
            .ok_or_else(|| LayerCommandError::NotActive(title.to_string()))?;

        self.surface.remove_layer(target.layer().handle).await?;
        target.confirm();
        info!(title = %title, "Layer removed");
        Ok(())
    }
}
