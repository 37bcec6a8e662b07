//! Run a rule set over an ordered list of targets.
//!
//! Every file is independent: a missing path is skipped, a failing file is
//! recorded, and the batch always runs to the end.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::process::{process_file, ApplyMode, FileReport, FileStatus};
use crate::rewrite::RuleSet;
use crate::targets::Target;

/// Progress notification emitted as each target is handled.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started { label: &'a str },
    Skipped { label: &'a str, reason: &'a str },
    Processed(&'a FileReport),
    Failed { label: &'a str, error: &'a crate::Error },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Aggregate of a whole run. Built incrementally, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub rule_set: String,
    pub dry_run: bool,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub total_replacements: usize,
    pub total_detections: usize,
    /// Files with replacements (would-change in a dry run).
    pub changed_files: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedFile>,
    /// Totals per rule id, across all files.
    pub rule_totals: BTreeMap<String, usize>,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    fn new(rule_set: &RuleSet, mode: ApplyMode) -> Self {
        Self {
            rule_set: rule_set.name.clone(),
            dry_run: mode.is_dry_run(),
            files_scanned: 0,
            files_changed: 0,
            total_replacements: 0,
            total_detections: 0,
            changed_files: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            rule_totals: rule_set
                .rules
                .iter()
                .map(|r| (r.id().to_string(), 0))
                .collect(),
            files: Vec::new(),
        }
    }

    fn record(&mut self, report: FileReport) {
        self.total_replacements += report.replacements;
        self.total_detections += report.detections;

        if report.status != FileStatus::Unchanged {
            self.files_changed += 1;
            self.changed_files.push(report.file.clone());
        }

        for count in &report.rule_counts {
            *self.rule_totals.entry(count.rule_id.clone()).or_insert(0) += count.count;
        }

        self.files.push(report);
    }

    /// Number of findings that need a human to look at them.
    pub fn review_items(&self) -> usize {
        self.files.iter().map(|f| f.findings.len()).sum()
    }
}

/// Process `targets` in order with `rule_set`.
pub fn run_batch<F>(
    targets: &[Target],
    rule_set: &RuleSet,
    mode: ApplyMode,
    mut on_event: F,
) -> RunSummary
where
    F: FnMut(BatchEvent<'_>),
{
    let mut summary = RunSummary::new(rule_set, mode);

    for target in targets {
        match target {
            Target::Missing { label, reason, .. } => {
                on_event(BatchEvent::Skipped { label, reason });
                summary.skipped.push(SkippedFile {
                    file: label.clone(),
                    reason: reason.clone(),
                });
            }
            Target::File { path, label } => {
                on_event(BatchEvent::Started { label });
                summary.files_scanned += 1;

                match process_file(path, label, rule_set, mode) {
                    Ok(report) => {
                        on_event(BatchEvent::Processed(&report));
                        summary.record(report);
                    }
                    Err(error) => {
                        on_event(BatchEvent::Failed {
                            label,
                            error: &error,
                        });
                        summary.failed.push(FailedFile {
                            file: label.clone(),
                            error: error.summary(),
                        });
                    }
                }
            }
        }
    }

    crate::log_status!(
        "batch",
        "{} scanned, {} changed, {} skipped, {} failed",
        summary.files_scanned,
        summary.files_changed,
        summary.skipped.len(),
        summary.failed.len()
    );

    summary
}
