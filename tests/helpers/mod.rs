//! Shared fixtures and scripted collaborators for router tests

#![allow(dead_code)]

use async_trait::async_trait;
use map_intent::location::{Address, GeocodeHit, Geocoder};
use map_intent::surface::ScriptedDialog;
use map_intent::{
    ActiveLayer, Collaborators, CollaboratorError, CollaboratorResult, CommandRouter, Coordinate,
    EngineConfig, GazetteerRecord, InMemorySurface, LayerDescriptor, LayerHandle, MapSurface,
    NerTagger, RegionVariant, RenderParams, SimilarityScorer, TaggedToken,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// COLLABORATORS
// ============================================================================

/// NER answering from a table keyed by the exact (normalized) utterance.
///
/// One utterance may be gated: its classification waits until released.
#[derive(Default)]
pub struct ScriptedNer {
    responses: HashMap<String, Vec<TaggedToken>>,
    gated: Option<String>,
    pub entered: Notify,
    pub release: Notify,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedNer {
    pub fn with(mut self, text: &str, tokens: &[(&str, &str)]) -> Self {
        self.responses.insert(
            text.to_string(),
            tokens
                .iter()
                .map(|(tag, word)| TaggedToken::new(*tag, *word))
                .collect(),
        );
        self
    }

    pub fn gate(mut self, text: &str) -> Self {
        self.gated = Some(text.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NerTagger for ScriptedNer {
    async fn classify(&self, text: &str) -> CollaboratorResult<Vec<TaggedToken>> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.gated.as_deref() == Some(text) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.responses
            .get(text)
            .cloned()
            .ok_or_else(|| CollaboratorError::Status {
                service: "ner",
                status: 503,
            })
    }
}

/// Similarity from a table of lower-cased pairs, `default` otherwise
pub struct TableScorer {
    scores: HashMap<(String, String), f64>,
    default: f64,
}

impl TableScorer {
    pub fn new(default: f64) -> Self {
        Self {
            scores: HashMap::new(),
            default,
        }
    }

    pub fn with(mut self, a: &str, b: &str, score: f64) -> Self {
        self.scores.insert((a.to_lowercase(), b.to_lowercase()), score);
        self
    }
}

#[async_trait]
impl SimilarityScorer for TableScorer {
    async fn similarity(&self, a: &str, b: &str) -> CollaboratorResult<f64> {
        Ok(*self
            .scores
            .get(&(a.to_lowercase(), b.to_lowercase()))
            .unwrap_or(&self.default))
    }
}

/// Geocoder with canned answers that records every query
#[derive(Default)]
pub struct CountingGeocoder {
    hits: HashMap<String, Vec<GeocodeHit>>,
    unreachable: bool,
    pub queries: Mutex<Vec<String>>,
}

impl CountingGeocoder {
    /// Every query fails with a transport error
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn with_place(
        mut self,
        query: &str,
        region: &str,
        coordinate: Coordinate,
        place_rank: u32,
        place_type: &str,
    ) -> Self {
        self.hits.insert(
            query.to_lowercase(),
            vec![GeocodeHit {
                coordinate,
                place_rank,
                place_type: place_type.to_string(),
                address: Address {
                    state: Some(region.to_string()),
                    ..Address::default()
                },
                display_name: format!("{}, {}, India", query, region),
            }],
        );
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for CountingGeocoder {
    async fn geocode(&self, query: &str) -> CollaboratorResult<Vec<GeocodeHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.unreachable {
            return Err(CollaboratorError::Transport {
                service: "geocoder",
                message: "connection timed out".to_string(),
            });
        }
        Ok(self.hits.get(&query.to_lowercase()).cloned().unwrap_or_default())
    }
}

/// In-memory surface whose layer additions and removals can be held open.
///
/// A held call signals `entered` and waits for `release` before reaching
/// the inner surface.
#[derive(Default)]
pub struct GatedSurface {
    inner: Arc<InMemorySurface>,
    hold_adds: AtomicBool,
    hold_removals: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedSurface {
    pub fn hold_adds(&self, hold: bool) {
        self.hold_adds.store(hold, Ordering::SeqCst);
    }

    pub fn hold_removals(&self, hold: bool) {
        self.hold_removals.store(hold, Ordering::SeqCst);
    }

    async fn pass(&self, held: &AtomicBool) {
        if held.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl MapSurface for GatedSurface {
    async fn add_layer(
        &self,
        params: &RenderParams,
        title: &str,
    ) -> CollaboratorResult<LayerHandle> {
        self.pass(&self.hold_adds).await;
        self.inner.add_layer(params, title).await
    }

    async fn remove_layer(&self, handle: LayerHandle) -> CollaboratorResult<()> {
        self.pass(&self.hold_removals).await;
        self.inner.remove_layer(handle).await
    }

    async fn set_visible(&self, handle: LayerHandle, visible: bool) -> CollaboratorResult<()> {
        self.inner.set_visible(handle, visible).await
    }

    async fn list_active(&self) -> CollaboratorResult<Vec<ActiveLayer>> {
        self.inner.list_active().await
    }

    async fn navigate_to(&self, center: Coordinate, zoom: f64) -> CollaboratorResult<()> {
        self.inner.navigate_to(center, zoom).await
    }

    async fn pan(&self, dx: f64, dy: f64) -> CollaboratorResult<()> {
        self.inner.pan(dx, dy).await
    }

    async fn current_zoom(&self) -> CollaboratorResult<f64> {
        self.inner.current_zoom().await
    }

    async fn set_zoom(&self, zoom: f64) -> CollaboratorResult<()> {
        self.inner.set_zoom(zoom).await
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub const HIGHWAYS_DESCRIPTION: &str = "national and state highways road network";
pub const RAILWAYS_DESCRIPTION: &str = "railway lines and stations";
pub const AIRPORTS_DESCRIPTION: &str = "airports and airfields";

fn regional(name: &str, description: &str, regions: &[&str]) -> LayerDescriptor {
    LayerDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        render: RenderParams {
            url: "https://gis.example.org/wms".to_string(),
            params: BTreeMap::from([("VERSION".to_string(), serde_json::json!("1.3.0"))]),
            z_index: None,
        },
        regions: Some(
            regions
                .iter()
                .map(|region| RegionVariant {
                    name: region.to_string(),
                    params: BTreeMap::from([(
                        "LAYERS".to_string(),
                        serde_json::json!(format!(
                            "{}:{}",
                            region.to_lowercase(),
                            name.to_lowercase()
                        )),
                    )]),
                })
                .collect(),
        ),
    }
}

/// Highways (Maharashtra, Karnataka), Railways (Karnataka, Kerala), Airports (global)
pub fn catalog() -> Vec<LayerDescriptor> {
    vec![
        regional("Highways", HIGHWAYS_DESCRIPTION, &["Maharashtra", "Karnataka"]),
        regional("Railways", RAILWAYS_DESCRIPTION, &["Karnataka", "Kerala"]),
        LayerDescriptor {
            name: "Airports".to_string(),
            description: AIRPORTS_DESCRIPTION.to_string(),
            render: RenderParams {
                url: "https://tiles.example.org/airports/{z}/{x}/{y}.png".to_string(),
                params: BTreeMap::new(),
                z_index: Some(10),
            },
            regions: None,
        },
    ]
}

pub fn pune() -> GazetteerRecord {
    GazetteerRecord {
        name: "Pune".to_string(),
        region: "Maharashtra".to_string(),
        coordinate: Coordinate::new(18.52, 73.85),
    }
}

/// A router wired to scripted collaborators, with handles to inspect them
pub struct Harness {
    pub router: CommandRouter,
    pub ner: Arc<ScriptedNer>,
    pub geocoder: Arc<CountingGeocoder>,
    pub surface: Arc<InMemorySurface>,
    pub gate: Arc<GatedSurface>,
    pub dialog: Arc<ScriptedDialog>,
}

impl Harness {
    pub fn new(
        config: EngineConfig,
        ner: ScriptedNer,
        scorer: TableScorer,
        geocoder: CountingGeocoder,
        dialog: ScriptedDialog,
    ) -> Self {
        let ner = Arc::new(ner);
        let geocoder = Arc::new(geocoder);
        let surface = Arc::new(InMemorySurface::new());
        let gate = Arc::new(GatedSurface {
            inner: surface.clone(),
            ..GatedSurface::default()
        });
        let dialog = Arc::new(dialog);

        let router = CommandRouter::new(
            &config,
            catalog(),
            vec![pune()],
            Collaborators {
                ner: ner.clone(),
                scorer: Arc::new(scorer),
                geocoder: geocoder.clone(),
                surface: gate.clone(),
                dialog: dialog.clone(),
            },
        );

        Self {
            router,
            ner,
            geocoder,
            surface,
            gate,
            dialog,
        }
    }

    pub fn automatic(ner: ScriptedNer, scorer: TableScorer) -> Self {
        Self::new(
            EngineConfig::default(),
            ner,
            scorer,
            CountingGeocoder::default(),
            ScriptedDialog::default(),
        )
    }
}
