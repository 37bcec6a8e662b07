//! `wpfix.json` configuration.
//!
//! Entries under `ruleSets` either tweak a built-in rule set (targets,
//! backup suffix, or a replacement rule list) or define a new one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::rewrite::{RewriteRule, RuleSet};
use crate::rulesets;
use crate::targets::TargetSpec;
use crate::utils::io;

pub const CONFIG_FILE: &str = "wpfix.json";

/// Root configuration structure for wpfix.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixConfig {
    pub rule_sets: BTreeMap<String, RuleSetConfig>,
}

/// Per-rule-set settings. Every field is optional; unset fields fall back
/// to the built-in definition when one exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub id: String,
    pub pattern: String,
    /// Omit for a detect-only rule.
    #[serde(default)]
    pub replacement: Option<String>,
    /// Flag matches for manual review.
    #[serde(default)]
    pub review: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl RuleConfig {
    pub fn build(&self) -> Result<RewriteRule> {
        let mut rule = match &self.replacement {
            Some(replacement) => {
                let rule = RewriteRule::new(&self.id, &self.pattern, replacement)?;
                if self.review {
                    rule.flagged()
                } else {
                    rule
                }
            }
            None => RewriteRule::detect(&self.id, &self.pattern)?,
        };

        rule = rule.describe(&self.description);
        for example in &self.examples {
            rule = rule.example(example);
        }
        Ok(rule)
    }
}

/// A rule set ready to run, with the targets it runs against.
#[derive(Debug, Clone)]
pub struct ResolvedRuleSet {
    pub rule_set: RuleSet,
    pub targets: TargetSpec,
}

/// Load `explicit`, or `<root>/wpfix.json` when present, or defaults.
pub fn load(root: &Path, explicit: Option<&Path>) -> Result<FixConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = root.join(CONFIG_FILE);
            if !default.is_file() {
                return Ok(FixConfig::default());
            }
            default
        }
    };

    let raw = io::read_file(&path, "read config")?;
    crate::log_status!("config", "Loaded {}", path.display());
    parse(&raw, &path.display().to_string())
}

pub fn parse(raw: &str, source: &str) -> Result<FixConfig> {
    serde_json::from_str(raw).map_err(|e| Error::config_invalid_json(source, e))
}

impl FixConfig {
    /// Built-in names first, then config-only names (sorted).
    pub fn rule_set_names(&self) -> Vec<String> {
        let mut names: Vec<String> = rulesets::BUILTIN_NAMES
            .iter()
            .map(|n| n.to_string())
            .collect();
        for name in self.rule_sets.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Merge the built-in definition of `name` (if any) with its config entry.
    pub fn resolve(&self, name: &str) -> Result<ResolvedRuleSet> {
        let builtin = rulesets::builtin(name)?;
        let entry = self.rule_sets.get(name);

        if builtin.is_none() && entry.is_none() {
            return Err(Error::rule_set_not_found(name, self.rule_set_names()));
        }
        let entry = entry.cloned().unwrap_or_default();

        let rules = match &entry.rules {
            Some(rules) => rules.iter().map(RuleConfig::build).collect::<Result<Vec<_>>>()?,
            None => match &builtin {
                Some(set) => set.rules.clone(),
                None => {
                    return Err(Error::config_invalid_value(
                        format!("ruleSets.{}.rules", name),
                        None,
                        "Custom rule sets must define rules",
                    ))
                }
            },
        };

        let backup_suffix = entry
            .backup_suffix
            .clone()
            .or_else(|| builtin.as_ref().map(|s| s.backup_suffix.clone()))
            .unwrap_or_else(|| format!(".pre-{}-fix", name));

        let description = entry
            .description
            .clone()
            .or_else(|| builtin.as_ref().map(|s| s.description.clone()))
            .unwrap_or_default();

        let rule_set = RuleSet::new(name, &backup_suffix, rules).describe(&description);
        rule_set.validate()?;

        let mut targets = rulesets::builtin_targets(name).unwrap_or_default();
        if let Some(files) = entry.files {
            targets.files = files;
        }
        if let Some(dirs) = entry.dirs {
            targets.dirs = dirs;
        }
        if let Some(extensions) = entry.extensions {
            targets.extensions = extensions;
        }
        if let Some(exclude) = entry.exclude {
            targets.exclude = exclude;
        }

        Ok(ResolvedRuleSet { rule_set, targets })
    }
}
