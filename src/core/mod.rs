//! Core modules for Kuji

pub mod api;
pub mod catalogue;
pub mod detection_parser;
pub mod display;
pub mod history;
pub mod matcher;
pub mod recognizer;
pub mod replay;

pub use api::{create_router, run_server};
pub use catalogue::{Catalogue, CatalogueBuilder};
pub use detection_parser::{DetectionParser, LineCommand, LineError};
pub use display::DisplayStateMachine;
pub use history::{AcceptReport, HistoryTracker, RecognizerState};
pub use matcher::SequenceMatcher;
pub use recognizer::Recognizer;
pub use replay::{parse_replay, run_replay, ReplayEvent};
