//! Kuji: temporal hand-sign sequence recognizer
//!
//! Pipeline per tick: detections → history tracker → sequence matcher → display state.
//! Drivers (stdin, replay, HTTP API) live in `core` next to the recognizer they drive.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::{MatchPolicy, RecognizerConfig};
pub use error::{CatalogueError, ConfigError, Error, ReplayError};

// =============================================================================
// RECOGNIZER DEFAULTS
// =============================================================================

/// Minimum detection confidence for a sign to enter the history
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.75;

/// Seconds without an accepted sign before both buffers are cleared
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: f64 = 2.0;

/// Seconds a matched jutsu name stays on screen
pub const DEFAULT_MATCH_DISPLAY_SECS: f64 = 5.0;

/// Capacity of the trail shown to the user
pub const DEFAULT_DISPLAY_TRAIL_CAPACITY: usize = 18;

/// Capacity of the lookback used for matching (longest catalogue jutsu)
pub const DEFAULT_MATCH_WINDOW_CAPACITY: usize = 44;

/// Joins category and name when a category is present
pub const DEFAULT_CATEGORY_SEPARATOR: &str = "・";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
