//! Selection dialogs for interactive disambiguation

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

use crate::matcher::MatchCandidate;

/// Presents the top candidate group and returns the chosen indices.
///
/// An empty choice means the user declined.
#[async_trait]
pub trait SelectionDialog: Send + Sync {
    async fn present_choices(&self, candidates: &[MatchCandidate]) -> Vec<usize>;
}

/// Chooses everything offered
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllDialog;

#[async_trait]
impl SelectionDialog for AcceptAllDialog {
    async fn present_choices(&self, candidates: &[MatchCandidate]) -> Vec<usize> {
        (0..candidates.len()).collect()
    }
}

/// Replays queued answers; declines once the queue runs dry.
///
/// Every presentation is recorded as the list of candidate labels shown.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    answers: Mutex<VecDeque<Vec<usize>>>,
    shown: Mutex<Vec<Vec<String>>>,
}

impl ScriptedDialog {
    pub fn new(answers: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Labels of each presentation so far
    pub fn presentations(&self) -> Vec<Vec<String>> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SelectionDialog for ScriptedDialog {
    async fn present_choices(&self, candidates: &[MatchCandidate]) -> Vec<usize> {
        let labels: Vec<String> = candidates.iter().map(MatchCandidate::label).collect();
        debug!(choices = ?labels, "Presenting selection dialog");
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(labels);
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or_default()
            .into_iter()
            .filter(|&i| i < candidates.len())
            .collect()
    }
}
