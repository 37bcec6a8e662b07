//! Single-file rewrite: read, transform, back up, write.
//!
//! Two modes:
//! - Dry run: computes the rewrite and reports it, never touches disk
//! - Apply: writes `<path><suffix>` with the original content, verifies it,
//!   then replaces the original

use serde::Serialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::rewrite::{self, Finding, RewriteResult, RuleCount, RuleSet};
use crate::utils::io;

/// Whether a run persists its rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    DryRun,
    Apply,
}

impl ApplyMode {
    pub fn is_dry_run(self) -> bool {
        self == ApplyMode::DryRun
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// No rewrite rule matched.
    Unchanged,
    /// Dry run found replacements.
    WouldChange,
    /// Backup and rewritten file were written.
    Changed,
}

/// What happened to one file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    pub replacements: usize,
    pub detections: usize,
    pub rule_counts: Vec<RuleCount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    /// Rewritten content, kept so callers can diff a dry run against a live run.
    #[serde(skip)]
    pub content: String,
}

/// Rewrite one file with `rule_set`. `label` is the path shown in reports.
pub fn process_file(
    path: &Path,
    label: &str,
    rule_set: &RuleSet,
    mode: ApplyMode,
) -> Result<FileReport> {
    let original = io::read_file(path, &format!("read {}", label))?;
    let result = rewrite::apply(&original, &rule_set.rules);

    // Rules can cancel each other out; only a byte change counts as a change.
    if !result.is_changed() {
        return Ok(report(label, FileStatus::Unchanged, result, None));
    }

    if mode.is_dry_run() {
        return Ok(report(label, FileStatus::WouldChange, result, None));
    }

    let backup_path = rule_set.backup_path(path);
    write_backup(path, &backup_path, &result.original)?;
    crate::log_status!("fix", "Backup written to {}", backup_path.display());

    io::write_file_atomic(path, &result.content, &format!("write {}", label))?;

    let backup = format!("{}{}", label, rule_set.backup_suffix);
    Ok(report(label, FileStatus::Changed, result, Some(backup)))
}

/// Write and verify the backup. The original is never touched here.
fn write_backup(path: &Path, backup_path: &Path, original: &str) -> Result<()> {
    let fail = |error: String| {
        Error::backup_failed(
            path.display().to_string(),
            backup_path.display().to_string(),
            error,
        )
    };

    io::write_file_atomic(backup_path, original, "write backup").map_err(|e| fail(e.summary()))?;

    if !io::file_matches(backup_path, original, "verify backup").map_err(|e| fail(e.summary()))? {
        return Err(fail("backup content does not match original".to_string()));
    }

    Ok(())
}

fn report(
    label: &str,
    status: FileStatus,
    result: RewriteResult,
    backup: Option<String>,
) -> FileReport {
    FileReport {
        file: label.to_string(),
        status,
        replacements: result.total_replacements(),
        detections: result.total_detections(),
        rule_counts: result.rule_counts,
        findings: result.findings,
        backup,
        content: result.content,
    }
}
