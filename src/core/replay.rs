//! Deterministic replay of recorded detection logs
//!
//! One JSON object per line: `{"t": 1.5, "detections": [...], "reset": false}`.
//! Blank lines and `#` comments are skipped.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::core::Recognizer;
use crate::error::ReplayError;
use crate::types::{Detection, ReasonCode, TickOutput};

/// One recorded tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEvent {
    /// Tick time in seconds
    pub t: f64,
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Apply a manual reset before the detections
    #[serde(default)]
    pub reset: bool,
}

/// Read a whole replay log
pub fn parse_replay(reader: impl BufRead) -> Result<Vec<ReplayEvent>, ReplayError> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: ReplayEvent = serde_json::from_str(trimmed).map_err(|source| {
            ReplayError::Parse {
                line: index + 1,
                source,
            }
        })?;
        if !event.t.is_finite() {
            return Err(ReplayError::BadTime {
                line: index + 1,
                time: event.t,
            });
        }
        events.push(event);
    }
    Ok(events)
}

/// Drive the recognizer through every event, one output per event
pub fn run_replay(recognizer: &mut Recognizer, events: &[ReplayEvent]) -> Vec<TickOutput> {
    events
        .iter()
        .map(|event| {
            if event.reset {
                recognizer.reset();
            }
            let mut output = recognizer.tick(&event.detections, event.t);
            if event.reset
                && matches!(
                    output.reason,
                    ReasonCode::R004_SHOWING_MATCH | ReasonCode::R004_SHOWING_TRAIL
                )
            {
                output.reason = ReasonCode::R002_HISTORY_RESET;
            }
            output
        })
        .collect()
}
