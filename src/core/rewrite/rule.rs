//! Rule and rule-set definitions.

use regex::{Match, Regex};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::text;

/// Whether a rule's output can be trusted without a human looking at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    Applied,
    FlaggedForManualReview,
}

/// Rewrite rules substitute text; detect rules only count and report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Rewrite,
    Detect,
}

/// Extra match filtering the regex crate cannot express (no look-around).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchGuard {
    /// Reject the match when `text` occurs in the `window` characters before it.
    NotPrecededBy { text: String, window: usize },
    /// Reject the match when the matched text contains any of `needles`.
    MatchExcludes { needles: Vec<String> },
}

impl MatchGuard {
    /// Negative lookbehind: `needle` must not end exactly where the match starts.
    pub fn lookbehind(needle: &str) -> Self {
        MatchGuard::NotPrecededBy {
            text: needle.to_string(),
            window: needle.chars().count(),
        }
    }

    pub fn allows(&self, haystack: &str, m: &Match<'_>) -> bool {
        match self {
            MatchGuard::NotPrecededBy { text, window } => {
                !text::preceding(haystack, m.start(), *window).contains(text.as_str())
            }
            MatchGuard::MatchExcludes { needles } => {
                !needles.iter().any(|n| m.as_str().contains(n.as_str()))
            }
        }
    }
}

/// A single pattern → replacement transformation with a stable identifier.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    id: String,
    description: String,
    pattern: Regex,
    replacement: Option<String>,
    outcome: RuleOutcome,
    guards: Vec<MatchGuard>,
    examples: Vec<String>,
}

impl RewriteRule {
    /// A rewrite rule. `replacement` uses regex expansion syntax (`$1`, `${name}`, `$$`).
    pub fn new(id: &str, pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            description: String::new(),
            pattern: compile(id, pattern)?,
            replacement: Some(replacement.to_string()),
            outcome: RuleOutcome::Applied,
            guards: Vec::new(),
            examples: Vec::new(),
        })
    }

    /// A detect-only rule. Always flagged for manual review.
    pub fn detect(id: &str, pattern: &str) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            description: String::new(),
            pattern: compile(id, pattern)?,
            replacement: None,
            outcome: RuleOutcome::FlaggedForManualReview,
            guards: Vec::new(),
            examples: Vec::new(),
        })
    }

    /// Mark the rule's output as needing human review.
    pub fn flagged(mut self) -> Self {
        self.outcome = RuleOutcome::FlaggedForManualReview;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn guard(mut self, guard: MatchGuard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Sample input that triggers the rule. Used by conflict detection.
    pub fn example(mut self, example: &str) -> Self {
        self.examples.push(example.to_string());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    pub fn outcome(&self) -> RuleOutcome {
        self.outcome
    }

    pub fn kind(&self) -> RuleKind {
        if self.replacement.is_some() {
            RuleKind::Rewrite
        } else {
            RuleKind::Detect
        }
    }

    pub fn guards(&self) -> &[MatchGuard] {
        &self.guards
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn is_flagged(&self) -> bool {
        self.outcome == RuleOutcome::FlaggedForManualReview
    }

    pub(crate) fn allows(&self, haystack: &str, m: &Match<'_>) -> bool {
        self.guards.iter().all(|g| g.allows(haystack, m))
    }

    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id.clone(),
            description: self.description.clone(),
            pattern: self.pattern.as_str().to_string(),
            replacement: self.replacement.clone(),
            kind: self.kind(),
            outcome: self.outcome,
            guards: self.guards.clone(),
        }
    }
}

fn compile(id: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::rule_invalid_pattern(id, pattern, e))
}

/// Serializable view of a rule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInfo {
    pub id: String,
    pub description: String,
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    pub kind: RuleKind,
    pub outcome: RuleOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<MatchGuard>,
}

/// An ordered list of rules plus the backup suffix its runs write.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub name: String,
    pub description: String,
    pub backup_suffix: String,
    pub rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn new(name: &str, backup_suffix: &str, rules: Vec<RewriteRule>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            backup_suffix: backup_suffix.to_string(),
            rules,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// `<path><backup_suffix>`, a sibling of the original.
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut raw = path.as_os_str().to_owned();
        raw.push(&self.backup_suffix);
        PathBuf::from(raw)
    }

    /// False for advisory rule sets made only of detect rules.
    pub fn has_rewrites(&self) -> bool {
        self.rules.iter().any(|r| r.kind() == RuleKind::Rewrite)
    }

    pub fn flagged_rules(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter().filter(|r| r.is_flagged())
    }

    pub fn rule(&self, id: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    /// Rejects an empty suffix (backup would overwrite the original) and duplicate ids.
    pub fn validate(&self) -> Result<()> {
        if self.backup_suffix.is_empty() {
            return Err(Error::config_invalid_value(
                format!("ruleSets.{}.backupSuffix", self.name),
                None,
                "Backup suffix must not be empty",
            ));
        }

        if self.rules.is_empty() {
            return Err(Error::config_invalid_value(
                format!("ruleSets.{}.rules", self.name),
                None,
                "Rule set has no rules",
            ));
        }

        for (i, rule) in self.rules.iter().enumerate() {
            if self.rules[..i].iter().any(|r| r.id() == rule.id()) {
                return Err(Error::config_invalid_value(
                    format!("ruleSets.{}.rules", self.name),
                    Some(rule.id().to_string()),
                    "Duplicate rule id",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_rules_are_always_flagged() {
        let rule = RewriteRule::detect("like", "LIKE").unwrap();
        assert_eq!(rule.kind(), RuleKind::Detect);
        assert_eq!(rule.outcome(), RuleOutcome::FlaggedForManualReview);
        assert!(rule.replacement().is_none());
    }

    #[test]
    fn invalid_pattern_reports_rule_id() {
        let err = RewriteRule::new("broken", "date(", "x").unwrap_err();
        assert_eq!(err.code.as_str(), "rule.invalid_pattern");
        assert_eq!(err.details["ruleId"], "broken");
    }

    #[test]
    fn lookbehind_guard_rejects_adjacent_prefix() {
        let re = Regex::new(r"_e\(").unwrap();
        let guard = MatchGuard::lookbehind("esc_html");
        let text = "esc_html_e( 'x' ); _e( 'y' );";
        let allowed: Vec<usize> = re
            .find_iter(text)
            .filter(|m| guard.allows(text, m))
            .map(|m| m.start())
            .collect();
        assert_eq!(allowed, vec![19]);
    }

    #[test]
    fn match_excludes_guard_checks_matched_text() {
        let re = Regex::new(r#""[^"]*""#).unwrap();
        let guard = MatchGuard::MatchExcludes {
            needles: vec!["%%".to_string()],
        };
        let text = r#""LIKE 'a%%'" "LIKE 'a%'""#;
        let allowed: Vec<&str> = re
            .find_iter(text)
            .filter(|m| guard.allows(text, m))
            .map(|m| m.as_str())
            .collect();
        assert_eq!(allowed, vec![r#""LIKE 'a%'""#]);
    }

    #[test]
    fn backup_path_appends_suffix() {
        let set = RuleSet::new("dates", ".pre-date-fix", Vec::new());
        assert_eq!(
            set.backup_path(Path::new("includes/class-a.php")),
            PathBuf::from("includes/class-a.php.pre-date-fix")
        );
    }

    #[test]
    fn validate_rejects_empty_suffix_and_duplicates() {
        let rule = RewriteRule::new("a", "x", "y").unwrap();

        let empty = RuleSet::new("s", "", vec![rule.clone()]);
        assert_eq!(empty.validate().unwrap_err().code.as_str(), "config.invalid_value");

        let dupes = RuleSet::new("s", ".bak", vec![rule.clone(), rule]);
        let err = dupes.validate().unwrap_err();
        assert_eq!(err.details["value"], "a");
    }
}
