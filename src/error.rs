//! Error taxonomy
//!
//! Only load-time failures are errors. Rejected detections and missing matches
//! are reported through `ReasonCode`, never through `Result`.

use thiserror::Error;

/// Catalogue validation failures (fatal at load, never partially loaded)
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("catalogue declares no languages")]
    NoLanguages,

    #[error("catalogue has no symbols")]
    NoSymbols,

    #[error("symbol {symbol} has {found} labels, expected {expected}")]
    SymbolLabelCount { symbol: usize, found: usize, expected: usize },

    #[error("symbol {symbol} has an empty primary label")]
    EmptySymbolLabel { symbol: usize },

    #[error("too many symbols: {0} (ids are 16-bit)")]
    TooManySymbols(usize),

    #[error("sequence {sequence} has {found} names, expected {expected}")]
    SequenceNameCount { sequence: usize, found: usize, expected: usize },

    #[error("sequence {sequence} has {found} category labels, expected {expected}")]
    SequenceCategoryCount { sequence: usize, found: usize, expected: usize },

    #[error("sequence {sequence} has no symbols")]
    EmptySequence { sequence: usize },

    #[error("sequence {sequence} references unknown symbol id {symbol}")]
    UnknownSymbol { sequence: usize, symbol: u32 },

    #[error("failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CatalogueError {
    /// Stable reason code (for logging and API bodies)
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoLanguages => "R101_CATALOGUE_NO_LANGUAGES",
            Self::NoSymbols => "R101_CATALOGUE_NO_SYMBOLS",
            Self::SymbolLabelCount { .. } => "R102_SYMBOL_LABEL_COUNT",
            Self::EmptySymbolLabel { .. } => "R102_SYMBOL_LABEL_EMPTY",
            Self::TooManySymbols(_) => "R102_SYMBOL_ID_OVERFLOW",
            Self::SequenceNameCount { .. } => "R103_SEQUENCE_NAME_COUNT",
            Self::SequenceCategoryCount { .. } => "R103_SEQUENCE_CATEGORY_COUNT",
            Self::EmptySequence { .. } => "R103_SEQUENCE_EMPTY",
            Self::UnknownSymbol { .. } => "R103_SEQUENCE_UNKNOWN_SYMBOL",
            Self::Io { .. } => "R104_CATALOGUE_IO",
            Self::Parse(_) => "R104_CATALOGUE_PARSE",
        }
    }
}

/// Invalid recognizer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("score_threshold must be within [0, 1], got {0}")]
    ScoreThreshold(f64),

    #[error("{field} must be finite and non-negative, got {value}")]
    Duration { field: &'static str, value: f64 },

    #[error("{field} must be at least 1")]
    ZeroCapacity { field: &'static str },

    #[error("display_trail_capacity ({trail}) must be smaller than match_window_capacity ({window})")]
    TrailNotShorter { trail: usize, window: usize },

    #[error("language index {index} out of range, catalogue has {available} languages")]
    Language { index: usize, available: usize },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Stable reason code (for logging and API bodies)
    pub fn code(&self) -> &'static str {
        match self {
            Self::ScoreThreshold(_) => "R201_CONFIG_SCORE_THRESHOLD",
            Self::Duration { .. } => "R201_CONFIG_DURATION",
            Self::ZeroCapacity { .. } => "R202_CONFIG_ZERO_CAPACITY",
            Self::TrailNotShorter { .. } => "R202_CONFIG_TRAIL_NOT_SHORTER",
            Self::Language { .. } => "R203_CONFIG_LANGUAGE",
            Self::Io { .. } => "R204_CONFIG_IO",
            Self::Parse(_) => "R204_CONFIG_PARSE",
        }
    }
}

/// Replay log failures
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: time {time} is not finite")]
    BadTime { line: usize, time: f64 },

    #[error("failed to read replay log: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    /// Stable reason code (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "R301_REPLAY_PARSE",
            Self::BadTime { .. } => "R301_REPLAY_BAD_TIME",
            Self::Io(_) => "R302_REPLAY_IO",
        }
    }
}

/// Umbrella error for drivers
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Catalogue(e) => e.code(),
            Self::Config(e) => e.code(),
            Self::Replay(e) => e.code(),
            Self::Io(_) => "R900_IO",
        }
    }
}
