//! map-intent: natural-language map command interpretation
//!
//! Turns utterances like "show highways in pune", "zoom to bidar" or
//! "remove railway layer for karnataka" into layer activations, navigation
//! and pan/zoom steps on a rendering surface.
//!
//! ## Modules
//!
//! - `extraction` - NER tokens → layer/location phrases and spatial actions
//! - `location` - gazetteer-first place → region resolution, zoom heuristic
//! - `matcher` - layer similarity scoring, region variants, group ranking
//! - `removal` - keyword grammar for deletion commands
//! - `router` - per-utterance orchestration and the action sequencer
//! - `surface` - rendering surface and selection dialog seams
//! - `config` - engine settings, layer catalog and gazetteer loading
//!
//! ## Example
//!
//! ```ignore
//! use map_intent::{CommandRouter, Collaborators, EngineConfig};
//!
//! let router = CommandRouter::new(&config, catalog, gazetteer, collaborators);
//! let report = router.interpret("show highways in pune").await;
//! println!("{}", report.outcome.summary());
//! ```

pub mod config;
pub mod error;
pub mod extraction;
pub mod location;
pub mod matcher;
pub mod ner;
pub mod removal;
pub mod router;
pub mod surface;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{DisambiguationMode, EngineConfig, ServiceEndpoints};
pub use error::{CollaboratorError, CollaboratorResult, ConfigError, LayerCommandError};
pub use extraction::{extract_entities, ExtractedEntities, TaggedToken};
pub use location::{LocationResolver, RegionResolution, ResolutionSource};
pub use matcher::{LayerMatcher, LexicalSimilarity, MatchCandidate, SimilarityScorer};
pub use ner::{HttpNerClient, NerTagger};
pub use removal::{parse_removal_command, RemovalCommand, RemovalGrammar};
pub use router::{Activation, Collaborators, CommandReport, CommandRouter, DispatchOutcome};
pub use surface::{InMemorySurface, LayerRegistry, MapSurface, SelectionDialog};

pub use map_intent_types::{
    ActiveLayer, Coordinate, GazetteerRecord, LayerDescriptor, LayerHandle, PanDirection,
    RegionVariant, RenderParams, SpatialAction,
};
