//! Removal commands
//!
//! Deletion intents short-circuit the NER pipeline: a configurable keyword
//! grammar picks out the category and optional location, and the router
//! removes the first active layer whose title matches.

pub mod grammar;
pub mod parser;

pub use grammar::{RemovalCategory, RemovalGrammar};
pub use parser::{location_after_marker, parse_removal_command, RemovalCommand};
