//! Decide whether a run previews, applies, or stops.
//!
//! Kept free of stdin: the caller asks the question only when
//! `needs_confirmation` says so and passes the answer in.

use serde::Serialize;

use crate::process::ApplyMode;

pub const CONFIRM_PROMPT: &str = "Continue? (yes/no): ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub dry_run: bool,
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    DryRun,
    Apply,
    Aborted,
}

impl RunMode {
    /// The mode to hand to the batch, or `None` when the run was aborted.
    pub fn apply_mode(self) -> Option<ApplyMode> {
        match self {
            RunMode::DryRun => Some(ApplyMode::DryRun),
            RunMode::Apply => Some(ApplyMode::Apply),
            RunMode::Aborted => None,
        }
    }
}

/// A live run without `--yes` must be confirmed.
pub fn needs_confirmation(flags: ModeFlags) -> bool {
    !flags.dry_run && !flags.yes
}

/// `--dry-run` wins over `--yes`. Otherwise only an exact, case-insensitive
/// "yes" answer applies.
pub fn resolve_mode(flags: ModeFlags, answer: Option<&str>) -> RunMode {
    if flags.dry_run {
        return RunMode::DryRun;
    }
    if flags.yes {
        return RunMode::Apply;
    }

    match answer {
        Some(answer) if answer.trim().eq_ignore_ascii_case("yes") => RunMode::Apply,
        _ => RunMode::Aborted,
    }
}
