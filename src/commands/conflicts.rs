use clap::Args;
use serde::Serialize;

use wpfix::rewrite::{detect_conflicts, ConflictKind, RuleConflict};

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ConflictsArgs {
    /// Check one rule set (default: all)
    pub rule_set: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum ConflictsOutput {
    #[serde(rename = "conflicts.check", rename_all = "camelCase")]
    Check {
        rule_sets: Vec<RuleSetConflicts>,
        total_conflicts: usize,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetConflicts {
    pub name: String,
    pub conflicts: Vec<RuleConflict>,
}

/// Exits 1 when any checked rule set has a conflict.
pub fn run(args: ConflictsArgs, global: &GlobalArgs) -> CmdResult<ConflictsOutput> {
    let config = global.load_config()?;
    let names = match args.rule_set {
        Some(name) => vec![name],
        None => config.rule_set_names(),
    };

    let mut rule_sets = Vec::new();
    for name in names {
        let set = config.resolve(&name)?.rule_set;
        rule_sets.push(RuleSetConflicts {
            conflicts: detect_conflicts(&set.rules),
            name,
        });
    }

    let total_conflicts: usize = rule_sets.iter().map(|s| s.conflicts.len()).sum();
    let exit_code = if total_conflicts == 0 { 0 } else { 1 };

    Ok((
        ConflictsOutput::Check {
            rule_sets,
            total_conflicts,
        },
        exit_code,
    ))
}

pub fn render(output: &ConflictsOutput) -> String {
    let ConflictsOutput::Check {
        rule_sets,
        total_conflicts,
    } = output;

    let mut out = String::new();
    for set in rule_sets {
        if set.conflicts.is_empty() {
            out.push_str(&format!("✅ {}: no conflicts\n", set.name));
            continue;
        }

        out.push_str(&format!("❌ {}: {} conflict(s)\n", set.name, set.conflicts.len()));
        for conflict in &set.conflicts {
            out.push_str(&format!(
                "   - [{}] {}\n     example: {}\n",
                kind_label(conflict.kind),
                conflict.message,
                conflict.example
            ));
        }
    }

    if *total_conflicts > 0 {
        out.push_str(&format!("\n{} conflict(s) found\n", total_conflicts));
    }
    out
}

fn kind_label(kind: ConflictKind) -> &'static str {
    match kind {
        ConflictKind::SelfRetrigger => "self-retrigger",
        ConflictKind::Cascade => "cascade",
        ConflictKind::Shadowed => "shadowed",
        ConflictKind::UnmatchedExample => "unmatched example",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpfix::rewrite::RewriteRule;

    #[test]
    fn render_reports_clean_and_conflicting_sets() {
        let rules = vec![
            RewriteRule::new("a", r"\bfoo\b", "bar").unwrap().example("foo"),
            RewriteRule::new("b", r"\bbar\b", "baz").unwrap().example("bar"),
        ];
        let output = ConflictsOutput::Check {
            total_conflicts: 1,
            rule_sets: vec![
                RuleSetConflicts {
                    name: "clean".to_string(),
                    conflicts: Vec::new(),
                },
                RuleSetConflicts {
                    name: "chained".to_string(),
                    conflicts: detect_conflicts(&rules),
                },
            ],
        };

        let text = render(&output);
        assert!(text.starts_with("✅ clean: no conflicts\n"));
        assert!(text.contains("❌ chained:"));
        assert!(text.contains("[cascade]"));
    }
}
