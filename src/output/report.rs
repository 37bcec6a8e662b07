//! Human-readable progress log for `fix`.
//!
//! Lines are built as strings so the format can be tested; the caller
//! decides where they go.

use wpfix::batch::{BatchEvent, RunSummary};
use wpfix::process::{ApplyMode, FileReport, FileStatus};
use wpfix::rewrite::{RuleKind, RuleSet};
use wpfix::utils::text;

const MAX_LISTED_FILES: usize = 20;

pub fn mode_banner(rule_set: &RuleSet, mode: ApplyMode) -> String {
    let mut out = String::new();
    if !rule_set.description.is_empty() {
        out.push_str(&format!("{}\n", rule_set.description));
    }
    match mode {
        ApplyMode::DryRun => out.push_str("🔍 DRY RUN MODE - No files will be modified\n"),
        ApplyMode::Apply if rule_set.has_rewrites() => {
            out.push_str("⚠️  LIVE MODE - Files will be modified (backups created)\n")
        }
        ApplyMode::Apply => {
            out.push_str("⚠️  This rule set only identifies locations; fixes are manual\n")
        }
    }
    out
}

pub fn event_lines(event: &BatchEvent<'_>, rule_set: &RuleSet) -> Vec<String> {
    match event {
        BatchEvent::Skipped { label, reason } => {
            vec![format!("⏭️  Skipping {} ({})", label, reason)]
        }
        BatchEvent::Started { label } => vec![format!("📄 Processing {}...", label)],
        BatchEvent::Processed(report) => file_lines(report, rule_set),
        BatchEvent::Failed { label, error } => vec![
            format!("  ❌ Error processing {}: {}", label, error.summary()),
            String::new(),
        ],
    }
}

fn file_lines(report: &FileReport, rule_set: &RuleSet) -> Vec<String> {
    let mut lines = Vec::new();

    for count in report.rule_counts.iter().filter(|c| c.count > 0) {
        let description = rule_set
            .rule(&count.rule_id)
            .map(|r| r.description())
            .filter(|d| !d.is_empty())
            .unwrap_or(count.rule_id.as_str());

        match count.kind {
            RuleKind::Rewrite => lines.push(format!("  ✓ Fixed {} {}", count.count, description)),
            RuleKind::Detect => lines.push(format!("  🔍 Found {} {}", count.count, description)),
        }
    }

    if !report.findings.is_empty() {
        lines.push("  ⚠️  Needs manual review:".to_string());
        for finding in &report.findings {
            lines.push(format!(
                "     Line {}: [{}] {}",
                finding.line,
                finding.rule_id,
                truncate(&text::one_line(&finding.matched), 100)
            ));
        }
    }

    match report.status {
        FileStatus::Unchanged if report.detections == 0 => {
            lines.push("  ℹ️  No matches found".to_string())
        }
        FileStatus::Unchanged if report.replacements > 0 => {
            lines.push("  ℹ️  Rewrites cancel out; file left unchanged".to_string())
        }
        FileStatus::Unchanged => {}
        FileStatus::WouldChange => lines.push(format!(
            "  🔍 Would replace {} instances",
            report.replacements
        )),
        FileStatus::Changed => {
            if let Some(backup) = &report.backup {
                lines.push(format!("  💾 Backup created: {}", backup));
            }
            lines.push(format!("  ✅ Applied {} replacements", report.replacements));
        }
    }

    lines.push(String::new());
    lines
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

pub fn summary(summary: &RunSummary, backup_suffix: &str) -> String {
    let mut lines = Vec::new();

    lines.push(if summary.dry_run {
        "📊 Summary:".to_string()
    } else {
        "✅ Complete!".to_string()
    });
    lines.push(format!("Files processed: {}", summary.files_scanned));
    lines.push(format!("Files changed: {}", summary.files_changed));
    lines.push(format!("Total replacements: {}", summary.total_replacements));
    if summary.total_detections > 0 {
        lines.push(format!("Total matches found: {}", summary.total_detections));
    }
    if !summary.skipped.is_empty() {
        lines.push(format!("Files skipped: {}", summary.skipped.len()));
    }

    if !summary.failed.is_empty() {
        lines.push(String::new());
        lines.push("❌ Failed:".to_string());
        for failed in &summary.failed {
            lines.push(format!("   - {}: {}", failed.file, failed.error));
        }
    }

    if summary.dry_run && summary.total_replacements > 0 {
        lines.push(String::new());
        lines.push("Run without --dry-run to apply changes".to_string());
    }

    if !summary.dry_run && !summary.changed_files.is_empty() {
        lines.push(String::new());
        lines.push(format!("   Backups created with extension: {}", backup_suffix));
        lines.push(String::new());
        lines.push("📋 Files modified:".to_string());
        for file in summary.changed_files.iter().take(MAX_LISTED_FILES) {
            lines.push(format!("   - {}", file));
        }
        if summary.changed_files.len() > MAX_LISTED_FILES {
            lines.push(format!(
                "   ... and {} more",
                summary.changed_files.len() - MAX_LISTED_FILES
            ));
        }
    }

    let review: Vec<&FileReport> = summary
        .files
        .iter()
        .filter(|f| !f.findings.is_empty())
        .collect();
    if !review.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "⚠️  Manual review required ({} items):",
            summary.review_items()
        ));
        for file in review {
            lines.push(format!("   • {}: {}", file.file, file.findings.len()));
        }
    }

    if !summary.dry_run && summary.total_replacements > 0 {
        lines.push(String::new());
        lines.push("📋 Next steps:".to_string());
        lines.push("1. Review changes: git diff".to_string());
        lines.push("2. Test functionality".to_string());
        lines.push("3. Run Plugin Check to verify fixes".to_string());
        lines.push("4. Handle any remaining manual cases".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpfix::rewrite::{Finding, RewriteRule, RuleCount, RuleOutcome};

    fn set() -> RuleSet {
        RuleSet::new(
            "demo",
            ".bak",
            vec![
                RewriteRule::new("month", r"date\('Y-m'\)", "wp_date('Y-m')")
                    .unwrap()
                    .describe("date('Y-m') → wp_date('Y-m')"),
                RewriteRule::detect("like", "LIKE 'image/%'").unwrap(),
            ],
        )
    }

    fn report(status: FileStatus) -> FileReport {
        FileReport {
            file: "inc/a.php".to_string(),
            status,
            replacements: 2,
            detections: 1,
            rule_counts: vec![
                RuleCount {
                    rule_id: "month".to_string(),
                    kind: RuleKind::Rewrite,
                    outcome: RuleOutcome::Applied,
                    count: 2,
                },
                RuleCount {
                    rule_id: "like".to_string(),
                    kind: RuleKind::Detect,
                    outcome: RuleOutcome::FlaggedForManualReview,
                    count: 1,
                },
            ],
            findings: vec![Finding {
                rule_id: "like".to_string(),
                line: 7,
                matched: "LIKE 'image/%'".to_string(),
            }],
            backup: Some("inc/a.php.bak".to_string()),
            content: String::new(),
        }
    }

    #[test]
    fn processed_file_lists_counts_findings_and_backup() {
        let report = report(FileStatus::Changed);
        let lines = event_lines(&BatchEvent::Processed(&report), &set());

        assert_eq!(lines[0], "  ✓ Fixed 2 date('Y-m') → wp_date('Y-m')");
        assert_eq!(lines[1], "  🔍 Found 1 like");
        assert_eq!(lines[3], "     Line 7: [like] LIKE 'image/%'");
        assert!(lines.contains(&"  💾 Backup created: inc/a.php.bak".to_string()));
        assert!(lines.contains(&"  ✅ Applied 2 replacements".to_string()));
    }

    #[test]
    fn dry_run_file_reports_would_replace() {
        let report = report(FileStatus::WouldChange);
        let lines = event_lines(&BatchEvent::Processed(&report), &set());
        assert!(lines.contains(&"  🔍 Would replace 2 instances".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Backup")));
    }

    #[test]
    fn skipped_file_shows_reason() {
        let lines = event_lines(
            &BatchEvent::Skipped {
                label: "gone.php",
                reason: "not found",
            },
            &set(),
        );
        assert_eq!(lines, vec!["⏭️  Skipping gone.php (not found)".to_string()]);
    }

    #[test]
    fn banner_reflects_mode() {
        assert!(mode_banner(&set(), ApplyMode::DryRun).contains("DRY RUN MODE"));
        assert!(mode_banner(&set(), ApplyMode::Apply).contains("LIVE MODE"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé...");
        assert_eq!(truncate("abc", 5), "abc");
    }
}
