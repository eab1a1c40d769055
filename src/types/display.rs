//! Display state definitions

use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

/// The two presentation modes of the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayMode {
    /// A jutsu matched recently, its name is shown
    ShowingMatch,
    /// Signs currently being performed are shown
    ShowingTrail,
}

impl DisplayMode {
    /// Paint text in this mode's terminal color
    pub fn paint(&self, text: &str) -> ColoredString {
        match self {
            DisplayMode::ShowingMatch => text.bright_yellow().bold(),
            DisplayMode::ShowingTrail => text.white(),
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            DisplayMode::ShowingMatch => "🔥",
            DisplayMode::ShowingTrail => "✋",
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DisplayMode::ShowingMatch => "SHOWING_MATCH",
            DisplayMode::ShowingTrail => "SHOWING_TRAIL",
        };
        write!(f, "{}", name)
    }
}

/// What the renderer should present right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub mode: DisplayMode,
    /// Resolved string (jutsu name or concatenated trail labels)
    pub text: String,
    /// Catalogue index of the shown jutsu (SHOWING_MATCH only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_index: Option<usize>,
}

impl DisplayState {
    pub fn showing_match(index: usize, text: String) -> Self {
        Self {
            mode: DisplayMode::ShowingMatch,
            text,
            match_index: Some(index),
        }
    }

    pub fn showing_trail(text: String) -> Self {
        Self {
            mode: DisplayMode::ShowingTrail,
            text,
            match_index: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.mode == DisplayMode::ShowingMatch
    }
}
