//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File I/O with consistent error handling
//! - `text` - Line/offset helpers for reporting matches

pub mod io;
pub mod text;
