//! History tracker: confidence filter, tail dedup, inactivity expiry
//!
//! Both buffers are only ever touched together, so the display trail is always
//! the tail of the match window.

use tracing::debug;

use crate::core::Catalogue;
use crate::types::{Detection, ReasonCode, SignBuffer, SymbolId};

/// Mutable recognizer state, owned by exactly one tick driver
#[derive(Debug, Clone)]
pub struct RecognizerState {
    display_trail: SignBuffer,
    match_window: SignBuffer,
    /// Time of the last accepted sign
    last_accept_time: Option<f64>,
    /// Catalogue index of the last match (0 until something matches)
    pub(crate) last_match_index: usize,
    /// `None` until the first match, i.e. infinitely in the past
    pub(crate) last_match_time: Option<f64>,
}

impl RecognizerState {
    /// Empty state; `match_window_capacity` should exceed `display_trail_capacity`
    pub fn new(display_trail_capacity: usize, match_window_capacity: usize) -> Self {
        Self {
            display_trail: SignBuffer::with_capacity(display_trail_capacity),
            match_window: SignBuffer::with_capacity(match_window_capacity),
            last_accept_time: None,
            last_match_index: 0,
            last_match_time: None,
        }
    }

    pub fn display_trail(&self) -> &SignBuffer {
        &self.display_trail
    }

    pub fn match_window(&self) -> &SignBuffer {
        &self.match_window
    }

    pub fn last_accept_time(&self) -> Option<f64> {
        self.last_accept_time
    }

    pub fn last_match_index(&self) -> usize {
        self.last_match_index
    }

    pub fn last_match_time(&self) -> Option<f64> {
        self.last_match_time
    }

    /// Manual clear: empties both buffers, keeps match bookkeeping
    pub fn reset(&mut self) {
        self.display_trail.clear();
        self.match_window.clear();
    }

    fn push(&mut self, sign: SymbolId, now: f64) {
        self.display_trail.push(sign);
        self.match_window.push(sign);
        self.last_accept_time = Some(match self.last_accept_time {
            Some(previous) => previous.max(now),
            None => now,
        });
    }

    /// Clear both buffers if nothing was accepted for longer than `timeout`.
    /// Returns true when non-empty history was dropped.
    fn expire(&mut self, now: f64, timeout: f64) -> bool {
        let stale = self
            .last_accept_time
            .is_some_and(|last| now - last > timeout);
        if stale && !self.match_window.is_empty() {
            self.reset();
            return true;
        }
        false
    }
}

/// Outcome of one `accept` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptReport {
    /// Each detection with what happened to it, in input order
    pub outcomes: Vec<(Detection, ReasonCode)>,
    pub accepted: usize,
    /// Stale history was cleared this tick
    pub expired: bool,
}

impl AcceptReport {
    /// Detections whose id was not in the catalogue
    pub fn unknown(&self) -> impl Iterator<Item = &Detection> {
        self.outcomes
            .iter()
            .filter(|(_, reason)| *reason == ReasonCode::R001_UNKNOWN_SYMBOL)
            .map(|(detection, _)| detection)
    }
}

/// Threshold + timeout filter in front of the buffers
#[derive(Debug, Clone, Copy)]
pub struct HistoryTracker {
    pub score_threshold: f64,
    pub inactivity_timeout: f64,
}

impl HistoryTracker {
    pub fn new(score_threshold: f64, inactivity_timeout: f64) -> Self {
        Self {
            score_threshold,
            inactivity_timeout,
        }
    }

    /// Feed one tick's detections into the state
    pub fn accept(
        &self,
        state: &mut RecognizerState,
        catalogue: &Catalogue,
        detections: &[Detection],
        now: f64,
    ) -> AcceptReport {
        let mut report = AcceptReport {
            outcomes: Vec::with_capacity(detections.len()),
            ..Default::default()
        };

        // History that went stale since the last tick goes before anything new lands
        report.expired = state.expire(now, self.inactivity_timeout);

        for detection in detections {
            let reason = self.classify(state, catalogue, detection);
            if reason == ReasonCode::R001_SIGN_ACCEPTED {
                if let Some(sign) = catalogue.symbol_id(detection.symbol) {
                    state.push(sign, now);
                    report.accepted += 1;
                    debug!(sign = %sign, confidence = detection.confidence, now, "sign accepted");
                }
            }
            report.outcomes.push((*detection, reason));
        }

        if state.expire(now, self.inactivity_timeout) {
            report.expired = true;
        }
        if report.expired {
            debug!(now, "history expired");
        }

        report
    }

    fn classify(
        &self,
        state: &RecognizerState,
        catalogue: &Catalogue,
        detection: &Detection,
    ) -> ReasonCode {
        // NaN never passes
        if !(detection.confidence >= self.score_threshold) {
            return ReasonCode::R001_BELOW_THRESHOLD;
        }
        let Some(sign) = catalogue.symbol_id(detection.symbol) else {
            return ReasonCode::R001_UNKNOWN_SYMBOL;
        };
        if state.display_trail.last() == Some(sign) {
            return ReasonCode::R001_DUPLICATE_SUPPRESSED;
        }
        ReasonCode::R001_SIGN_ACCEPTED
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Catalogue {
        Catalogue::builder(&["en"])
            .symbol(&["A"])
            .symbol(&["B"])
            .symbol(&["C"])
            .sequence(&[""], &["Fireball"], &[0, 1, 2])
            .build()
            .unwrap()
    }

    fn ids(buffer: &SignBuffer) -> Vec<u16> {
        buffer.iter().map(|s| s.0).collect()
    }

    fn d(symbol: u32, confidence: f64) -> Detection {
        Detection::new(symbol, confidence)
    }

    #[test]
    fn test_repeated_sign_collapses() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 10.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 0.0);
        let report = tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 1.0);

        assert_eq!(report.accepted, 0);
        assert_eq!(report.outcomes[0].1, ReasonCode::R001_DUPLICATE_SUPPRESSED);
        assert_eq!(ids(state.match_window()), vec![0]);
        // duplicate does not refresh the inactivity clock
        assert_eq!(state.last_accept_time(), Some(0.0));
    }

    #[test]
    fn test_same_tick_detections_in_order() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 10.0);
        let mut state = RecognizerState::new(18, 44);

        let batch = [d(0, 0.9), d(0, 0.9), d(1, 0.9), d(1, 0.9), d(0, 0.9)];
        let report = tracker.accept(&mut state, &catalogue, &batch, 0.0);

        assert_eq!(report.accepted, 3);
        assert_eq!(ids(state.display_trail()), vec![0, 1, 0]);
    }

    #[test]
    fn test_below_threshold_and_nan_dropped() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 10.0);
        let mut state = RecognizerState::new(18, 44);

        let report = tracker.accept(&mut state, &catalogue, &[d(0, 0.49), d(1, f64::NAN)], 0.0);

        assert_eq!(report.accepted, 0);
        assert!(report.outcomes.iter().all(|(_, r)| *r == ReasonCode::R001_BELOW_THRESHOLD));
        assert!(state.match_window().is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 10.0);
        let mut state = RecognizerState::new(18, 44);

        let report = tracker.accept(&mut state, &catalogue, &[d(2, 0.5)], 0.0);
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn test_unknown_symbol_reported_not_fatal() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 10.0);
        let mut state = RecognizerState::new(18, 44);

        let report = tracker.accept(&mut state, &catalogue, &[d(42, 0.99), d(1, 0.9)], 0.0);

        assert_eq!(report.unknown().count(), 1);
        assert_eq!(ids(state.match_window()), vec![1]);
    }

    #[test]
    fn test_timeout_clears_both_buffers() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 5.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 0.0);
        let report = tracker.accept(&mut state, &catalogue, &[], 5.0 + 1e-6);

        assert!(report.expired);
        assert!(state.display_trail().is_empty());
        assert!(state.match_window().is_empty());
    }

    #[test]
    fn test_exactly_timeout_keeps_history() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 5.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 0.0);
        let report = tracker.accept(&mut state, &catalogue, &[], 5.0);

        assert!(!report.expired);
        assert_eq!(state.match_window().len(), 1);
    }

    #[test]
    fn test_stale_history_cleared_before_next_sign() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 5.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 0.0);
        let report = tracker.accept(&mut state, &catalogue, &[d(1, 0.9)], 20.0);

        assert!(report.expired);
        assert_eq!(ids(state.match_window()), vec![1]);
    }

    #[test]
    fn test_expiry_resets_dedup_anchor() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 1.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 0.0);
        tracker.accept(&mut state, &catalogue, &[], 2.0);
        let report = tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 3.0);

        assert_eq!(report.accepted, 1);
        assert_eq!(ids(state.match_window()), vec![0]);
    }

    #[test]
    fn test_empty_tick_idempotent() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 5.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9), d(1, 0.9)], 1.0);
        let before = format!("{:?}", state);
        for _ in 0..10 {
            tracker.accept(&mut state, &catalogue, &[], 2.0);
        }
        assert_eq!(format!("{:?}", state), before);
    }

    #[test]
    fn test_accept_time_never_goes_backwards() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 100.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 10.0);
        tracker.accept(&mut state, &catalogue, &[d(1, 0.9)], 4.0);

        assert_eq!(state.last_accept_time(), Some(10.0));
    }

    #[test]
    fn test_trail_is_window_suffix() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 100.0);
        let mut state = RecognizerState::new(4, 6);

        for (t, symbol) in [0, 1, 2, 0, 1, 2, 0, 1, 2, 0].into_iter().enumerate() {
            tracker.accept(&mut state, &catalogue, &[d(symbol, 0.9)], t as f64);

            let window = ids(state.match_window());
            let trail = ids(state.display_trail());
            assert!(window.len() <= 6 && trail.len() <= 4);
            let keep = trail.len().min(window.len());
            assert_eq!(trail, window[window.len() - keep..].to_vec());
        }
    }

    #[test]
    fn test_reset_keeps_match_bookkeeping() {
        let catalogue = catalogue();
        let tracker = HistoryTracker::new(0.5, 100.0);
        let mut state = RecognizerState::new(18, 44);

        tracker.accept(&mut state, &catalogue, &[d(0, 0.9)], 0.0);
        state.last_match_index = 3;
        state.last_match_time = Some(0.0);
        state.reset();

        assert!(state.match_window().is_empty());
        assert_eq!(state.last_match_index(), 3);
        assert_eq!(state.last_match_time(), Some(0.0));
    }
}
