//! Static checks for rule interactions, driven by each rule's examples.
//!
//! Rules apply in a fixed order with no precedence beyond that order, so a
//! rule set can quietly double-rewrite (one rule's output feeds another) or
//! never fire (an earlier rule consumes the trigger). These checks run every
//! rule over its own examples and report such interactions.

use serde::Serialize;

use super::engine::{apply, count_matches};
use super::rule::{RewriteRule, RuleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The rule matches its own output; running twice rewrites again.
    SelfRetrigger,
    /// A later rule rewrites text this rule produced.
    Cascade,
    /// An earlier rule consumes this rule's trigger.
    Shadowed,
    /// An example does not trigger its rule.
    UnmatchedExample,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConflict {
    pub kind: ConflictKind,
    pub rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_rule_id: Option<String>,
    pub example: String,
    pub message: String,
}

/// Check every rule's examples against the rest of the ordered rule list.
pub fn detect_conflicts(rules: &[RewriteRule]) -> Vec<RuleConflict> {
    let mut conflicts: Vec<RuleConflict> = Vec::new();

    for (i, rule) in rules.iter().enumerate() {
        for example in rule.examples() {
            if count_matches(rule, example) == 0 {
                conflicts.push(RuleConflict {
                    kind: ConflictKind::UnmatchedExample,
                    rule_id: rule.id().to_string(),
                    other_rule_id: None,
                    example: example.clone(),
                    message: format!("Example does not trigger rule '{}'", rule.id()),
                });
                continue;
            }

            if rule.kind() == RuleKind::Rewrite {
                check_output(rules, i, example, &mut conflicts);
            }
            check_shadowing(rules, i, example, &mut conflicts);
        }
    }

    conflicts.dedup_by(|a, b| {
        a.kind == b.kind && a.rule_id == b.rule_id && a.other_rule_id == b.other_rule_id
    });
    conflicts
}

fn check_output(
    rules: &[RewriteRule],
    i: usize,
    example: &str,
    out: &mut Vec<RuleConflict>,
) {
    let rule = &rules[i];
    let rewritten = apply(example, std::slice::from_ref(rule)).content;

    if count_matches(rule, &rewritten) > 0 {
        out.push(RuleConflict {
            kind: ConflictKind::SelfRetrigger,
            rule_id: rule.id().to_string(),
            other_rule_id: None,
            example: example.to_string(),
            message: format!(
                "Rule '{}' matches its own output '{}'",
                rule.id(),
                rewritten
            ),
        });
    }

    for later in rules.iter().skip(i + 1) {
        if later.kind() != RuleKind::Rewrite {
            continue;
        }
        if count_matches(later, &rewritten) > count_matches(later, example) {
            out.push(RuleConflict {
                kind: ConflictKind::Cascade,
                rule_id: rule.id().to_string(),
                other_rule_id: Some(later.id().to_string()),
                example: example.to_string(),
                message: format!(
                    "Rule '{}' rewrites output of rule '{}' ('{}')",
                    later.id(),
                    rule.id(),
                    rewritten
                ),
            });
        }
    }
}

fn check_shadowing(
    rules: &[RewriteRule],
    i: usize,
    example: &str,
    out: &mut Vec<RuleConflict>,
) {
    let rule = &rules[i];
    let mut text = example.to_string();

    for earlier in &rules[..i] {
        let before = count_matches(rule, &text);
        text = apply(&text, std::slice::from_ref(earlier)).content;

        if count_matches(rule, &text) < before {
            out.push(RuleConflict {
                kind: ConflictKind::Shadowed,
                rule_id: rule.id().to_string(),
                other_rule_id: Some(earlier.id().to_string()),
                example: example.to_string(),
                message: format!(
                    "Rule '{}' consumes the trigger of later rule '{}'",
                    earlier.id(),
                    rule.id()
                ),
            });
            return;
        }
    }
}
