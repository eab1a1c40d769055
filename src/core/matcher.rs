//! Sequence matcher
//!
//! Full-window policy: the concatenated primary labels of the *entire* match
//! window must equal a catalogue pattern. Once anything follows a completed
//! sequence it no longer matches until the window is cleared. The suffix
//! policy relaxes this to "window ends with the sequence".

use tracing::debug;

use crate::config::MatchPolicy;
use crate::core::{Catalogue, RecognizerState};

/// Searches the catalogue in definition order, first hit wins
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceMatcher {
    policy: MatchPolicy,
}

impl SequenceMatcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    /// Index of the first catalogue sequence matching the current window
    pub fn find(&self, catalogue: &Catalogue, state: &RecognizerState) -> Option<usize> {
        let window = state.match_window();
        if window.is_empty() {
            return None;
        }

        match self.policy {
            MatchPolicy::FullWindow => {
                let flattened = catalogue.flatten(window.iter());
                catalogue
                    .patterns()
                    .find(|(_, pattern)| *pattern == flattened)
                    .map(|(index, _)| index)
            }
            MatchPolicy::Suffix => catalogue
                .sequences()
                .iter()
                .enumerate()
                .find(|(index, entry)| {
                    let n = entry.symbols.len();
                    n <= window.len()
                        && catalogue.pattern(*index).is_some_and(|pattern| {
                            catalogue.flatten(window.iter().skip(window.len() - n)) == pattern
                        })
                })
                .map(|(index, _)| index),
        }
    }

    /// Run `find` and record the hit in the state; no hit leaves it untouched
    pub fn apply(&self, catalogue: &Catalogue, state: &mut RecognizerState, now: f64) -> Option<usize> {
        let index = self.find(catalogue, state)?;
        state.last_match_index = index;
        state.last_match_time = Some(now);
        debug!(index, now, "sequence matched");
        Some(index)
    }
}

// =============================================================================
// TESTS
// =============================================================================
