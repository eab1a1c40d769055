//! Recognizer: one tick = accept → match → display
//!
//! Owns the single `RecognizerState`. All mutation goes through `&mut self`;
//! there is no internal locking.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RecognizerConfig;
use crate::core::{
    AcceptReport, Catalogue, DisplayStateMachine, HistoryTracker, RecognizerState, SequenceMatcher,
};
use crate::error::ConfigError;
use crate::types::{Detection, DisplayMode, DisplayState, ReasonCode, TickOutput};

/// Temporal sign-sequence recognizer
#[derive(Debug, Clone)]
pub struct Recognizer {
    catalogue: Arc<Catalogue>,
    config: RecognizerConfig,
    state: RecognizerState,
    tracker: HistoryTracker,
    matcher: SequenceMatcher,
    display: DisplayStateMachine,
    tick_count: u64,
    /// Latest `now` passed to a tick
    last_tick_time: Option<f64>,
}

impl Recognizer {
    /// Validate `config` against the catalogue and build an empty recognizer
    pub fn new(catalogue: Arc<Catalogue>, config: RecognizerConfig) -> Result<Self, ConfigError> {
        config.validate(catalogue.languages().len())?;

        if catalogue.longest_sequence() > config.match_window_capacity {
            warn!(
                longest = catalogue.longest_sequence(),
                window = config.match_window_capacity,
                "catalogue has sequences longer than the match window; they can never match"
            );
        }

        Ok(Self {
            state: RecognizerState::new(config.display_trail_capacity, config.match_window_capacity),
            tracker: HistoryTracker::new(config.score_threshold, config.inactivity_timeout),
            matcher: SequenceMatcher::new(config.match_policy),
            display: DisplayStateMachine::new(&config),
            catalogue,
            config,
            tick_count: 0,
            last_tick_time: None,
        })
    }

    /// Full update cycle for one batch of detections
    pub fn tick(&mut self, detections: &[Detection], now: f64) -> TickOutput {
        self.tick_with_report(detections, now).0
    }

    /// `tick`, also returning per-detection outcomes so the caller can log rejects
    pub fn tick_with_report(&mut self, detections: &[Detection], now: f64) -> (TickOutput, AcceptReport) {
        self.tick_count += 1;
        self.last_tick_time = Some(self.last_tick_time.map_or(now, |last| last.max(now)));
        let report = self.accept(detections, now);
        let matched = self.match_sequences(now);
        let display = self.display_state(now);

        let reason = if matched.is_some() {
            ReasonCode::R003_SEQUENCE_MATCHED
        } else if report.expired {
            ReasonCode::R002_HISTORY_EXPIRED
        } else if report.accepted > 0 {
            ReasonCode::R001_SIGN_ACCEPTED
        } else {
            display_reason(&display)
        };

        let output = self.output(now, display, report.accepted, report.expired, reason);
        (output, report)
    }

    /// History tracker step only
    pub fn accept(&mut self, detections: &[Detection], now: f64) -> AcceptReport {
        self.tracker.accept(&mut self.state, &self.catalogue, detections, now)
    }

    /// Sequence matcher step only
    pub fn match_sequences(&mut self, now: f64) -> Option<usize> {
        self.matcher.apply(&self.catalogue, &mut self.state, now)
    }

    /// Display query (no side effects)
    pub fn display_state(&self, now: f64) -> DisplayState {
        self.display.evaluate(&self.catalogue, &self.state, now)
    }

    /// Clear both buffers (operator command)
    pub fn reset(&mut self) {
        debug!("history reset");
        self.state.reset();
    }

    /// Output for the current state without updating it
    pub fn current_output(&self, now: f64) -> TickOutput {
        let display = self.display_state(now);
        let reason = display_reason(&display);
        self.output(now, display, 0, false, reason)
    }

    fn output(
        &self,
        now: f64,
        display: DisplayState,
        accepted: usize,
        expired: bool,
        reason: ReasonCode,
    ) -> TickOutput {
        TickOutput::new(
            now,
            display,
            self.state.display_trail().to_vec(),
            self.state.match_window().len(),
            accepted,
            expired,
            reason,
        )
    }

    pub fn state(&self) -> &RecognizerState {
        &self.state
    }

    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_tick_time(&self) -> Option<f64> {
        self.last_tick_time
    }
}

fn display_reason(display: &DisplayState) -> ReasonCode {
    match display.mode {
        DisplayMode::ShowingMatch => ReasonCode::R004_SHOWING_MATCH,
        DisplayMode::ShowingTrail => ReasonCode::R004_SHOWING_TRAIL,
    }
}

// =============================================================================
// TESTS
// =============================================================================
