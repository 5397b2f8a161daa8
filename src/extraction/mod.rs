//! Entity extraction from NER output
//!
//! Turns a token-classification result into:
//!
//! - `layer` words - what to show ("highways", "land use")
//! - `location` words - where ("pune", "bidar")
//! - spatial actions - `zoomIn`, `panWest`, ... in the order spoken
//!
//! The extractor trusts the tagger's boundaries; it only glues wordpieces
//! back together and buckets them.

pub mod extractor;
pub mod tags;

pub use extractor::{collect_actions, extract_entities, ExtractedEntities, ExtractedPhrase};
pub use tags::{EntityTag, Family, TaggedToken, CONTINUATION_MARKER};
