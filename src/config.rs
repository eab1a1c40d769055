//! Recognizer configuration
//!
//! Defaults come from the constants in `lib.rs`. A TOML file may override any field,
//! CLI flags override the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{
    DEFAULT_CATEGORY_SEPARATOR, DEFAULT_DISPLAY_TRAIL_CAPACITY, DEFAULT_INACTIVITY_TIMEOUT_SECS,
    DEFAULT_MATCH_DISPLAY_SECS, DEFAULT_MATCH_WINDOW_CAPACITY, DEFAULT_SCORE_THRESHOLD,
};

/// How the match window is compared against catalogue sequences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The entire window must equal the sequence
    #[default]
    FullWindow,
    /// The window must end with the sequence
    Suffix,
}

impl std::str::FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_window" | "full-window" | "full" => Ok(Self::FullWindow),
            "suffix" => Ok(Self::Suffix),
            other => Err(format!("unknown match policy '{}'", other)),
        }
    }
}

/// Tunables for one recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecognizerConfig {
    /// Detections below this confidence are discarded
    pub score_threshold: f64,
    /// Seconds of inactivity that clear both buffers
    pub inactivity_timeout: f64,
    /// Seconds a matched name is shown
    pub match_display_duration: f64,
    pub display_trail_capacity: usize,
    pub match_window_capacity: usize,
    /// Index into the catalogue's language columns
    pub language: usize,
    pub match_policy: MatchPolicy,
    pub category_separator: String,
    pub trail_separator: String,
    /// Label column for the trail; 0 shows the native matching labels
    pub trail_language: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT_SECS,
            match_display_duration: DEFAULT_MATCH_DISPLAY_SECS,
            display_trail_capacity: DEFAULT_DISPLAY_TRAIL_CAPACITY,
            match_window_capacity: DEFAULT_MATCH_WINDOW_CAPACITY,
            language: 0,
            match_policy: MatchPolicy::FullWindow,
            category_separator: DEFAULT_CATEGORY_SEPARATOR.to_string(),
            trail_separator: String::new(),
            trail_language: 0,
        }
    }
}

impl RecognizerConfig {
    /// Parse a TOML document; missing fields keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every field; `languages` is the catalogue's language count
    pub fn validate(&self, languages: usize) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(ConfigError::ScoreThreshold(self.score_threshold));
        }
        for (field, value) in [
            ("inactivity_timeout", self.inactivity_timeout),
            ("match_display_duration", self.match_display_duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Duration { field, value });
            }
        }
        if self.display_trail_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { field: "display_trail_capacity" });
        }
        if self.match_window_capacity == 0 {
            return Err(ConfigError::ZeroCapacity { field: "match_window_capacity" });
        }
        if self.display_trail_capacity >= self.match_window_capacity {
            return Err(ConfigError::TrailNotShorter {
                trail: self.display_trail_capacity,
                window: self.match_window_capacity,
            });
        }
        for index in [self.language, self.trail_language] {
            if index >= languages {
                return Err(ConfigError::Language {
                    index,
                    available: languages,
                });
            }
        }
        Ok(())
    }
}
