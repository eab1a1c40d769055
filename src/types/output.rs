//! Per-tick output for terminal, replay and API consumers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DisplayMode, DisplayState, ReasonCode, SymbolId};

/// Output structure for each recognizer tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutput {
    /// Wall-clock time the output was produced
    pub timestamp: DateTime<Utc>,
    /// Recognizer time of the tick (seconds)
    pub time: f64,
    pub mode: DisplayMode,
    /// Text to render
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_index: Option<usize>,
    /// Display trail content, oldest first
    pub trail: Vec<SymbolId>,
    /// Number of signs in the match window
    pub window_len: usize,
    /// Signs accepted this tick
    pub accepted: usize,
    /// History expired this tick
    pub expired: bool,
    /// Most significant event of the tick
    pub reason: ReasonCode,
}

impl TickOutput {
    pub fn new(
        time: f64,
        display: DisplayState,
        trail: Vec<SymbolId>,
        window_len: usize,
        accepted: usize,
        expired: bool,
        reason: ReasonCode,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            time,
            mode: display.mode,
            text: display.text,
            match_index: display.match_index,
            trail,
            window_len,
            accepted,
            expired,
            reason,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        format!(
            "{} t={:.2} | {} | {} | window={} | {}",
            self.mode.emoji(),
            self.time,
            self.mode,
            self.mode.paint(&self.text),
            self.window_len,
            self.reason.code()
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "t={:.2} | mode={} | text={} | window={} | reason={}",
            self.time,
            self.mode,
            self.text,
            self.window_len,
            self.reason.code()
        )
    }
}
