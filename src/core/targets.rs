//! Resolve configured file lists and directory scans into concrete targets.

use glob_match::glob_match;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const DEFAULT_EXTENSION: &str = "php";

/// Which files a rule set runs against. Paths are relative to the run root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetSpec {
    /// Individual files, processed in this order.
    pub files: Vec<String>,
    /// Directories scanned recursively for `extensions`.
    pub dirs: Vec<String>,
    /// Extensions for directory scans (default: php).
    pub extensions: Vec<String>,
    /// Substrings, or glob patterns when they contain `*?[`, matched against
    /// the relative path.
    pub exclude: Vec<String>,
}

impl TargetSpec {
    pub fn files(files: Vec<String>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    fn extensions(&self) -> Vec<&str> {
        if self.extensions.is_empty() {
            vec![DEFAULT_EXTENSION]
        } else {
            self.extensions
                .iter()
                .map(|e| e.trim_start_matches('.'))
                .collect()
        }
    }

    pub fn is_excluded(&self, label: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            if pattern.contains(['*', '?', '[']) {
                glob_match(pattern, label)
            } else {
                label.contains(pattern.as_str())
            }
        })
    }
}

/// A resolved target: a file to process, or a configured path that is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File {
        path: PathBuf,
        label: String,
    },
    Missing {
        path: PathBuf,
        label: String,
        reason: String,
    },
}

impl Target {
    pub fn file(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Target::File {
            path: path.into(),
            label: label.into(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Target::File { path, .. } | Target::Missing { path, .. } => path,
        }
    }

    /// Root-relative path used in reports.
    pub fn label(&self) -> &str {
        match self {
            Target::File { label, .. } | Target::Missing { label, .. } => label,
        }
    }
}

/// Expand `spec` against `root`, in configured order, without duplicates.
pub fn resolve_targets(root: &Path, spec: &TargetSpec) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();

    for file in &spec.files {
        let path = root.join(file);
        let label = relative_label(root, &path);
        if spec.is_excluded(&label) || !seen.insert(path.clone()) {
            continue;
        }

        let target = if path.is_file() {
            Target::File { path, label }
        } else if path.exists() {
            Target::Missing {
                path,
                label,
                reason: "not a regular file".to_string(),
            }
        } else {
            Target::Missing {
                path,
                label,
                reason: "not found".to_string(),
            }
        };
        targets.push(target);
    }

    for dir in &spec.dirs {
        let dir_path = root.join(dir);
        if !dir_path.is_dir() {
            targets.push(Target::Missing {
                label: relative_label(root, &dir_path),
                path: dir_path,
                reason: "directory not found".to_string(),
            });
            continue;
        }

        for path in scan_dir(&dir_path, &spec.extensions())? {
            let label = relative_label(root, &path);
            if spec.is_excluded(&label) || !seen.insert(path.clone()) {
                continue;
            }
            targets.push(Target::File { path, label });
        }
    }

    crate::log_status!("targets", "Resolved {} target(s)", targets.len());
    Ok(targets)
}

fn scan_dir(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut found = Vec::new();

    for ext in extensions {
        let pattern = format!("{}/**/*.{}", base, ext);
        let entries = glob::glob(&pattern).map_err(|e| {
            Error::config_invalid_value("extensions", Some(ext.to_string()), e.to_string())
        })?;

        found.extend(entries.flatten().filter(|p| p.is_file()));
    }

    found.sort();
    found.dedup();
    Ok(found)
}

fn relative_label(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<?php\n").unwrap();
    }

    #[test]
    fn files_keep_configured_order_and_report_missing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.php");
        touch(dir.path(), "a.php");

        let spec = TargetSpec::files(vec![
            "b.php".to_string(),
            "gone.php".to_string(),
            "a.php".to_string(),
        ]);
        let targets = resolve_targets(dir.path(), &spec).unwrap();

        let labels: Vec<&str> = targets.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["b.php", "gone.php", "a.php"]);
        assert!(matches!(targets[0], Target::File { .. }));
        assert!(matches!(
            &targets[1],
            Target::Missing { reason, .. } if reason == "not found"
        ));
    }

    #[test]
    fn directory_scan_is_recursive_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "plugin/includes/class-b.php");
        touch(dir.path(), "plugin/includes/class-a.php");
        touch(dir.path(), "plugin/includes/sub/class-c.php");
        touch(dir.path(), "plugin/includes/test-helpers.php");
        touch(dir.path(), "plugin/includes/tests/class-test.php");
        touch(dir.path(), "plugin/includes/readme.txt");

        let spec = TargetSpec {
            dirs: vec!["plugin/includes".to_string()],
            exclude: vec!["test-".to_string(), "tests/".to_string()],
            ..TargetSpec::default()
        };
        let targets = resolve_targets(dir.path(), &spec).unwrap();

        let labels: Vec<&str> = targets.iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec![
                "plugin/includes/class-a.php",
                "plugin/includes/class-b.php",
                "plugin/includes/sub/class-c.php",
            ]
        );
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let spec = TargetSpec {
            dirs: vec!["admin".to_string()],
            ..TargetSpec::default()
        };
        let targets = resolve_targets(dir.path(), &spec).unwrap();
        assert_eq!(targets.len(), 1);
        assert!(matches!(
            &targets[0],
            Target::Missing { reason, .. } if reason == "directory not found"
        ));
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "inc/a.php");

        let spec = TargetSpec {
            files: vec!["inc/a.php".to_string()],
            dirs: vec!["inc".to_string()],
            ..TargetSpec::default()
        };
        let targets = resolve_targets(dir.path(), &spec).unwrap();
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn custom_extensions_accept_leading_dot() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/a.inc");
        touch(dir.path(), "src/b.php");

        let spec = TargetSpec {
            dirs: vec!["src".to_string()],
            extensions: vec![".inc".to_string()],
            ..TargetSpec::default()
        };
        let targets = resolve_targets(dir.path(), &spec).unwrap();
        let labels: Vec<&str> = targets.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["src/a.inc"]);
    }

    #[test]
    fn exclude_supports_globs_and_substrings() {
        let spec = TargetSpec {
            exclude: vec!["vendor/**".to_string(), "-legacy".to_string()],
            ..TargetSpec::default()
        };
        assert!(spec.is_excluded("vendor/lib/a.php"));
        assert!(spec.is_excluded("includes/class-legacy.php"));
        assert!(!spec.is_excluded("includes/class-a.php"));
    }
}
