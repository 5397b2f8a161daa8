//! Command routing and action sequencing

pub mod report;
pub mod sequencer;
pub mod service;

pub use report::{CommandReport, DispatchOutcome};
pub use sequencer::{ActionQueue, ActionSequencer, SequenceReport};
pub use service::{Activation, Collaborators, CommandRouter};
