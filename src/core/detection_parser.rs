//! Detection-line parser for the stdin driver
//!
//! A line is one tick: whitespace-separated `sign[:confidence]` tokens where
//! `sign` is a numeric class id or any catalogue label. A missing confidence
//! means 1.0. `c`/`clear` resets, `quit`/`exit` stops.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::core::Catalogue;
use crate::types::Detection;

lazy_static! {
    static ref RE_TOKEN: Regex = Regex::new(
        r"^(?P<sign>[^\s:]+)(?::(?P<confidence>[0-9]*\.?[0-9]+))?$"
    ).unwrap();

    static ref RE_NUMERIC: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// What a stdin line asks the driver to do
#[derive(Debug, Clone, PartialEq)]
pub enum LineCommand {
    Tick(Vec<Detection>),
    Reset,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    #[error("malformed token '{0}' (expected sign[:confidence])")]
    Malformed(String),

    #[error("unknown sign label '{0}'")]
    UnknownLabel(String),

    #[error("confidence {0} outside [0, 1]")]
    Confidence(f64),
}

/// Parser bound to a catalogue for label lookup
#[derive(Debug)]
pub struct DetectionParser<'a> {
    catalogue: &'a Catalogue,
}

impl<'a> DetectionParser<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        Self { catalogue }
    }

    pub fn parse_line(&self, line: &str) -> Result<LineCommand, LineError> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("c") || line.eq_ignore_ascii_case("clear") {
            return Ok(LineCommand::Reset);
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Ok(LineCommand::Quit);
        }

        line.split_whitespace()
            .map(|token| self.parse_token(token))
            .collect::<Result<Vec<_>, _>>()
            .map(LineCommand::Tick)
    }

    fn parse_token(&self, token: &str) -> Result<Detection, LineError> {
        let caps = RE_TOKEN
            .captures(token)
            .ok_or_else(|| LineError::Malformed(token.to_string()))?;
        let sign = &caps["sign"];

        let symbol = if RE_NUMERIC.is_match(sign) {
            // out-of-range ids pass through; the tracker rejects them
            sign.parse::<u32>()
                .map_err(|_| LineError::Malformed(token.to_string()))?
        } else {
            self.catalogue
                .lookup_label(sign)
                .map(|id| id.0 as u32)
                .ok_or_else(|| LineError::UnknownLabel(sign.to_string()))?
        };

        let confidence = match caps.name("confidence") {
            Some(m) => m
                .as_str()
                .parse::<f64>()
                .map_err(|_| LineError::Malformed(token.to_string()))?,
            None => 1.0,
        };
        if confidence > 1.0 {
            return Err(LineError::Confidence(confidence));
        }

        Ok(Detection::new(symbol, confidence))
    }
}

// =============================================================================
// TESTS
// =============================================================================
