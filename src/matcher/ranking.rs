//! Candidate grouping and ranking
//!
//! Candidates are grouped by layer name (first appearance keeps catalog
//! order), each group is scored by the mean of its combined scores and the
//! groups are stable-sorted best first. Only the top group is acted on.

use super::candidate::MatchCandidate;

/// All candidates for one layer name
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateGroup {
    pub name: String,
    pub candidates: Vec<MatchCandidate>,
    pub mean: f64,
}

/// Group by layer name and sort groups by mean combined score, best first.
///
/// Ties keep first-appearance order.
pub fn rank_groups(candidates: Vec<MatchCandidate>) -> Vec<CandidateGroup> {
    let mut groups: Vec<CandidateGroup> = Vec::new();
    for candidate in candidates {
        match groups.iter_mut().find(|g| g.name == candidate.layer.name) {
            Some(group) => group.candidates.push(candidate),
            None => groups.push(CandidateGroup {
                name: candidate.layer.name.clone(),
                candidates: vec![candidate],
                mean: 0.0,
            }),
        }
    }

    for group in &mut groups {
        let total: f64 = group.candidates.iter().map(|c| c.combined).sum();
        group.mean = total / group.candidates.len() as f64;
    }

    groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    groups
}

/// The best-ranked group, or `None` for an empty candidate set
pub fn select_top_group(candidates: Vec<MatchCandidate>) -> Option<CandidateGroup> {
    rank_groups(candidates).into_iter().next()
}
