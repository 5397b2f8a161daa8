//! Layer similarity matching
//!
//! Scores catalog layers against the extracted layer words, picks region
//! variants for regionalized layers and ranks the result.

pub mod candidate;
pub mod ranking;
pub mod region;
pub mod service;
pub mod similarity;

pub use candidate::MatchCandidate;
pub use ranking::{rank_groups, select_top_group, CandidateGroup};
pub use region::{find_best_matching_region, RegionMatch, ResolutionCache};
pub use service::LayerMatcher;
pub use similarity::{normalize_phrase, HttpSimilarityClient, LexicalSimilarity, SimilarityScorer};
