//! Pattern-based source rewriting.
//!
//! A `RuleSet` is an ordered list of `RewriteRule`s. `apply` runs them over a
//! text in order and reports per-rule counts plus findings for rules flagged
//! for manual review; `detect_conflicts` checks how the rules interact.

mod conflicts;
mod engine;
mod rule;

pub use conflicts::{detect_conflicts, ConflictKind, RuleConflict};
pub use engine::{apply, Finding, RewriteResult, RuleCount};
pub use rule::{MatchGuard, RewriteRule, RuleInfo, RuleKind, RuleOutcome, RuleSet};
