//! Display state machine
//!
//! SHOWING_MATCH while `now - last_match_time < match_display_duration`,
//! SHOWING_TRAIL otherwise. Pure query over the state; safe to call any time.

use crate::config::RecognizerConfig;
use crate::core::{Catalogue, RecognizerState};
use crate::types::DisplayState;

/// Resolves what the renderer should show
#[derive(Debug, Clone)]
pub struct DisplayStateMachine {
    match_display_duration: f64,
    language: usize,
    category_separator: String,
    trail_language: usize,
    trail_separator: String,
}

impl DisplayStateMachine {
    pub fn new(config: &RecognizerConfig) -> Self {
        Self {
            match_display_duration: config.match_display_duration,
            language: config.language,
            category_separator: config.category_separator.clone(),
            trail_language: config.trail_language,
            trail_separator: config.trail_separator.clone(),
        }
    }

    /// Is a match still inside its display window?
    pub fn showing_match(&self, state: &RecognizerState, now: f64) -> bool {
        state
            .last_match_time()
            .is_some_and(|matched| now - matched < self.match_display_duration)
    }

    pub fn evaluate(&self, catalogue: &Catalogue, state: &RecognizerState, now: f64) -> DisplayState {
        if self.showing_match(state, now) {
            let index = state.last_match_index();
            if let Some(entry) = catalogue.sequence(index) {
                return DisplayState::showing_match(
                    index,
                    entry.display_name(self.language, &self.category_separator),
                );
            }
        }
        DisplayState::showing_trail(catalogue.render(
            state.display_trail().iter(),
            self.trail_language,
            &self.trail_separator,
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
