// Public modules
pub mod batch;
pub mod config;
pub mod error;
pub mod mode;
pub mod process;
pub mod rewrite;
pub mod rulesets;
pub mod targets;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
