use clap::Args;
use serde::Serialize;

use wpfix::rewrite::{RuleInfo, RuleKind, RuleOutcome};
use wpfix::rulesets;
use wpfix::targets::TargetSpec;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct RulesArgs {
    /// Show the ordered rules of one rule set
    pub rule_set: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum RulesOutput {
    #[serde(rename = "rules.list", rename_all = "camelCase")]
    List { rule_sets: Vec<RuleSetSummary> },
    #[serde(rename = "rules.show", rename_all = "camelCase")]
    Show { rule_set: RuleSetDetail },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetSummary {
    pub name: String,
    pub description: String,
    pub backup_suffix: String,
    pub builtin: bool,
    pub rules: usize,
    pub detect_only: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetDetail {
    pub name: String,
    pub description: String,
    pub backup_suffix: String,
    pub builtin: bool,
    pub targets: TargetSpec,
    pub rules: Vec<RuleInfo>,
}

pub fn run(args: RulesArgs, global: &GlobalArgs) -> CmdResult<RulesOutput> {
    let config = global.load_config()?;

    if let Some(name) = args.rule_set {
        let resolved = config.resolve(&name)?;
        let set = resolved.rule_set;
        return Ok((
            RulesOutput::Show {
                rule_set: RuleSetDetail {
                    builtin: rulesets::BUILTIN_NAMES.contains(&set.name.as_str()),
                    rules: set.rules.iter().map(|r| r.info()).collect(),
                    name: set.name,
                    description: set.description,
                    backup_suffix: set.backup_suffix,
                    targets: resolved.targets,
                },
            },
            0,
        ));
    }

    let mut rule_sets = Vec::new();
    for name in config.rule_set_names() {
        let set = config.resolve(&name)?.rule_set;
        rule_sets.push(RuleSetSummary {
            builtin: rulesets::BUILTIN_NAMES.contains(&name.as_str()),
            rules: set.rules.len(),
            detect_only: !set.has_rewrites(),
            name,
            description: set.description,
            backup_suffix: set.backup_suffix,
        });
    }

    Ok((RulesOutput::List { rule_sets }, 0))
}

pub fn render(output: &RulesOutput) -> String {
    let mut out = String::new();

    match output {
        RulesOutput::List { rule_sets } => {
            out.push_str("Available rule sets:\n");
            let width = rule_sets.iter().map(|s| s.name.len()).max().unwrap_or(0);
            for set in rule_sets {
                let kind = if set.detect_only { ", detect only" } else { "" };
                out.push_str(&format!(
                    "  {:<width$}  {} ({} rules{}, backup {})\n",
                    set.name,
                    set.description,
                    set.rules,
                    kind,
                    set.backup_suffix,
                    width = width
                ));
            }
        }
        RulesOutput::Show { rule_set } => {
            out.push_str(&format!("{}: {}\n", rule_set.name, rule_set.description));
            out.push_str(&format!("Backup suffix: {}\n", rule_set.backup_suffix));
            if !rule_set.targets.files.is_empty() {
                out.push_str(&format!("Files: {}\n", rule_set.targets.files.join(", ")));
            }
            if !rule_set.targets.dirs.is_empty() {
                out.push_str(&format!("Dirs: {}\n", rule_set.targets.dirs.join(", ")));
            }
            if !rule_set.targets.exclude.is_empty() {
                out.push_str(&format!("Exclude: {}\n", rule_set.targets.exclude.join(", ")));
            }

            out.push_str("\nRules (applied in order):\n");
            for (i, rule) in rule_set.rules.iter().enumerate() {
                out.push_str(&format!("{:>3}. {} [{}]\n", i + 1, rule.id, tag(rule)));
                if !rule.description.is_empty() {
                    out.push_str(&format!("     {}\n", rule.description));
                }
                out.push_str(&format!("     pattern: {}\n", rule.pattern));
                if let Some(replacement) = &rule.replacement {
                    out.push_str(&format!("     replace: {}\n", replacement));
                }
            }
        }
    }

    out
}

fn tag(rule: &RuleInfo) -> &'static str {
    match (rule.kind, rule.outcome) {
        (RuleKind::Detect, _) => "detect, review",
        (RuleKind::Rewrite, RuleOutcome::FlaggedForManualReview) => "rewrite, review",
        (RuleKind::Rewrite, RuleOutcome::Applied) => "rewrite",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_renders_one_line_per_set() {
        let output = RulesOutput::List {
            rule_sets: vec![RuleSetSummary {
                name: "sql-like".to_string(),
                description: "Find unprepared queries".to_string(),
                backup_suffix: ".pre-sql-like-fix".to_string(),
                builtin: true,
                rules: 1,
                detect_only: true,
            }],
        };

        assert_eq!(
            render(&output),
            "Available rule sets:\n  sql-like  Find unprepared queries (1 rules, detect only, backup .pre-sql-like-fix)\n"
        );
    }

    #[test]
    fn show_lists_rules_in_order_with_tags() {
        let set = rulesets::escaping().unwrap();
        let output = RulesOutput::Show {
            rule_set: RuleSetDetail {
                name: set.name.clone(),
                description: set.description.clone(),
                backup_suffix: set.backup_suffix.clone(),
                builtin: true,
                targets: TargetSpec::default(),
                rules: set.rules.iter().map(|r| r.info()).collect(),
            },
        };

        let text = render(&output);
        let first = text.find("php-tag-translate-echo [rewrite]").unwrap();
        let third = text.find("echo-translate [rewrite, review]").unwrap();
        assert!(first < third);
    }
}
