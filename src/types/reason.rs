//! Reason codes for detection outcomes and tick results

use serde::{Deserialize, Serialize};

/// Reason codes for everything a tick can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Detection filtering
    // =========================================================================
    /// Sign appended to both buffers
    R001_SIGN_ACCEPTED,
    /// Confidence under the score threshold (or NaN)
    R001_BELOW_THRESHOLD,
    /// Class id outside the symbol catalogue
    R001_UNKNOWN_SYMBOL,
    /// Same sign as the current tail
    R001_DUPLICATE_SUPPRESSED,

    // =========================================================================
    // R002: History lifecycle
    // =========================================================================
    /// Inactivity timeout cleared both buffers
    R002_HISTORY_EXPIRED,
    /// Operator cleared both buffers
    R002_HISTORY_RESET,

    // =========================================================================
    // R003: Matching
    // =========================================================================
    /// Match window equals a catalogue sequence
    R003_SEQUENCE_MATCHED,

    // =========================================================================
    // R004: Display
    // =========================================================================
    /// Matched jutsu name on screen
    R004_SHOWING_MATCH,
    /// Raw sign trail on screen
    R004_SHOWING_TRAIL,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_SIGN_ACCEPTED => "R001_SIGN_ACCEPTED",
            Self::R001_BELOW_THRESHOLD => "R001_BELOW_THRESHOLD",
            Self::R001_UNKNOWN_SYMBOL => "R001_UNKNOWN_SYMBOL",
            Self::R001_DUPLICATE_SUPPRESSED => "R001_DUPLICATE_SUPPRESSED",
            Self::R002_HISTORY_EXPIRED => "R002_HISTORY_EXPIRED",
            Self::R002_HISTORY_RESET => "R002_HISTORY_RESET",
            Self::R003_SEQUENCE_MATCHED => "R003_SEQUENCE_MATCHED",
            Self::R004_SHOWING_MATCH => "R004_SHOWING_MATCH",
            Self::R004_SHOWING_TRAIL => "R004_SHOWING_TRAIL",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_SIGN_ACCEPTED => "Sign accepted",
            Self::R001_BELOW_THRESHOLD => "Confidence below threshold",
            Self::R001_UNKNOWN_SYMBOL => "Unknown sign id",
            Self::R001_DUPLICATE_SUPPRESSED => "Repeated sign suppressed",
            Self::R002_HISTORY_EXPIRED => "History expired after inactivity",
            Self::R002_HISTORY_RESET => "History cleared",
            Self::R003_SEQUENCE_MATCHED => "Jutsu recognized",
            Self::R004_SHOWING_MATCH => "Showing jutsu name",
            Self::R004_SHOWING_TRAIL => "Showing sign trail",
        }
    }

    /// Is this a rejected detection?
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::R001_BELOW_THRESHOLD | Self::R001_UNKNOWN_SYMBOL | Self::R001_DUPLICATE_SUPPRESSED
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
