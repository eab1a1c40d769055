//! Core types for Kuji

mod buffer;
mod display;
mod output;
mod reason;
mod sequence;
mod symbol;

pub use buffer::SignBuffer;
pub use display::{DisplayMode, DisplayState};
pub use output::TickOutput;
pub use reason::ReasonCode;
pub use sequence::SequenceEntry;
pub use symbol::{Detection, Symbol, SymbolId};
