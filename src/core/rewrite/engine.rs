//! Ordered regex substitution over a single text.
//!
//! Each rule runs against the output of the previous one, so rule order is
//! part of a rule set's contract. The engine is purely textual: it never
//! parses PHP and will happily emit unbalanced output for rules that are
//! flagged for manual review.

use serde::Serialize;

use super::rule::{RewriteRule, RuleKind, RuleOutcome};
use crate::utils::text;

/// Matches replaced (rewrite rules) or found (detect rules) by one rule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCount {
    pub rule_id: String,
    pub kind: RuleKind,
    pub outcome: RuleOutcome,
    pub count: usize,
}

/// A match of a flagged rule that a human needs to look at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub rule_id: String,
    /// 1-indexed line in the text the rule ran against.
    pub line: usize,
    pub matched: String,
}

/// Outcome of running a rule list over one text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    #[serde(skip)]
    pub original: String,
    #[serde(skip)]
    pub content: String,
    /// One entry per rule, in application order.
    pub rule_counts: Vec<RuleCount>,
    pub findings: Vec<Finding>,
}

impl RewriteResult {
    /// Substitutions that changed text. Detect-rule matches are not included.
    pub fn total_replacements(&self) -> usize {
        self.rule_counts
            .iter()
            .filter(|c| c.kind == RuleKind::Rewrite)
            .map(|c| c.count)
            .sum()
    }

    /// Matches of detect-only rules.
    pub fn total_detections(&self) -> usize {
        self.rule_counts
            .iter()
            .filter(|c| c.kind == RuleKind::Detect)
            .map(|c| c.count)
            .sum()
    }

    pub fn is_changed(&self) -> bool {
        self.content != self.original
    }

    pub fn count_for(&self, rule_id: &str) -> usize {
        self.rule_counts
            .iter()
            .find(|c| c.rule_id == rule_id)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Apply `rules` to `content` in order.
pub fn apply(content: &str, rules: &[RewriteRule]) -> RewriteResult {
    let mut current = content.to_string();
    let mut rule_counts = Vec::with_capacity(rules.len());
    let mut findings = Vec::new();

    for rule in rules {
        let pass = apply_rule(&current, rule);

        rule_counts.push(RuleCount {
            rule_id: rule.id().to_string(),
            kind: rule.kind(),
            outcome: rule.outcome(),
            count: pass.count,
        });
        findings.extend(pass.findings);

        if let Some(next) = pass.content {
            current = next;
        }
    }

    RewriteResult {
        original: content.to_string(),
        content: current,
        rule_counts,
        findings,
    }
}

struct RulePass {
    count: usize,
    findings: Vec<Finding>,
    /// `None` when the text is unchanged.
    content: Option<String>,
}

fn apply_rule(text: &str, rule: &RewriteRule) -> RulePass {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    let mut findings = Vec::new();

    for caps in rule.pattern().captures_iter(text) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if !rule.allows(text, &m) {
            continue;
        }

        if let Some(template) = rule.replacement() {
            let mut expanded = String::new();
            caps.expand(template, &mut expanded);
            // An identity substitution is not a replacement.
            if expanded == m.as_str() {
                continue;
            }
            out.push_str(&text[last..m.start()]);
            out.push_str(&expanded);
            last = m.end();
        }

        count += 1;
        if rule.is_flagged() {
            findings.push(Finding {
                rule_id: rule.id().to_string(),
                line: text::line_at(text, m.start()),
                matched: text::one_line(m.as_str()),
            });
        }
    }

    if rule.replacement().is_none() || count == 0 {
        return RulePass {
            count,
            findings,
            content: None,
        };
    }

    out.push_str(&text[last..]);
    RulePass {
        count,
        findings,
        content: Some(out),
    }
}

/// Matches of `rule` in `text` that pass its guards.
pub(crate) fn count_matches(rule: &RewriteRule, text: &str) -> usize {
    rule.pattern()
        .find_iter(text)
        .filter(|m| rule.allows(text, m))
        .count()
}
