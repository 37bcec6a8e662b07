//! Built-in rule sets for WordPress.org plugin review fixes.
//!
//! Rule order inside each set is part of its contract: rules run against the
//! output of the rules before them.

use crate::error::Result;
use crate::rewrite::{MatchGuard, RewriteRule, RuleSet};
use crate::targets::TargetSpec;

pub const DATE_CALLS: &str = "date-calls";
pub const ESCAPING: &str = "escaping";
pub const LIKE_WILDCARDS: &str = "like-wildcards";
pub const SQL_LIKE: &str = "sql-like";

pub const BUILTIN_NAMES: &[&str] = &[DATE_CALLS, ESCAPING, LIKE_WILDCARDS, SQL_LIKE];

const PLUGIN_DIR: &str = "msh-image-optimizer";

/// Build a built-in rule set by name.
pub fn builtin(name: &str) -> Result<Option<RuleSet>> {
    let set = match name {
        DATE_CALLS => date_calls()?,
        ESCAPING => escaping()?,
        LIKE_WILDCARDS => like_wildcards()?,
        SQL_LIKE => sql_like()?,
        _ => return Ok(None),
    };
    Ok(Some(set))
}

/// Default targets of a built-in rule set, relative to the run root.
pub fn builtin_targets(name: &str) -> Option<TargetSpec> {
    let files = |names: &[&str]| -> Vec<String> {
        names
            .iter()
            .map(|n| format!("{}/{}", PLUGIN_DIR, n))
            .collect()
    };

    let spec = match name {
        DATE_CALLS => TargetSpec::files(files(&[
            "admin/image-optimizer-admin.php",
            "includes/class-msh-ai-ajax-handlers.php",
            "includes/class-msh-ai-service.php",
            "includes/class-msh-backup-verification-system.php",
            "includes/class-msh-targeted-replacement-engine.php",
            "includes/class-msh-debug-logger.php",
            "includes/class-msh-image-optimizer.php",
        ])),
        ESCAPING => TargetSpec {
            dirs: files(&["admin", "includes"]),
            exclude: vec!["test-".to_string(), "tests/".to_string()],
            ..TargetSpec::default()
        },
        LIKE_WILDCARDS => TargetSpec::files(files(&[
            "includes/class-msh-ai-ajax-handlers.php",
            "includes/class-msh-image-usage-index.php",
            "includes/class-msh-media-cleanup.php",
            "includes/class-msh-usage-index-background.php",
            "includes/class-msh-content-usage-lookup.php",
        ])),
        SQL_LIKE => TargetSpec::files(files(&[
            "includes/class-msh-media-cleanup.php",
            "includes/class-msh-image-usage-index.php",
            "includes/class-msh-usage-index-background.php",
            "includes/class-msh-content-usage-lookup.php",
            "includes/class-msh-image-optimizer.php",
        ])),
        _ => return None,
    };

    Some(spec)
}

/// `date()` → timezone-safe `wp_date()` / `gmdate()` / `current_time()`.
pub fn date_calls() -> Result<RuleSet> {
    let rules = vec![
        // User-facing month keys respect the site timezone.
        RewriteRule::new("date-month", r#"\bdate\(\s*['"]Y-m['"]\s*\)"#, "wp_date('Y-m')")?
            .describe("date('Y-m') → wp_date('Y-m')")
            .example("$month = date('Y-m');"),
        // Must run before date-mysql: relative dates stay UTC for queries.
        RewriteRule::new(
            "date-mysql-relative",
            r#"\bdate\(\s*['"]Y-m-d H:i:s['"]\s*,\s*strtotime\("#,
            "gmdate('Y-m-d H:i:s', strtotime(",
        )?
        .describe("date('Y-m-d H:i:s', strtotime(...)) → gmdate('Y-m-d H:i:s', strtotime(...))")
        .example("$cutoff = date('Y-m-d H:i:s', strtotime('-30 days'));"),
        RewriteRule::new(
            "date-mysql",
            r#"\bdate\(\s*['"]Y-m-d H:i:s['"]\s*(?:,\s*\$timestamp)?\s*\)"#,
            "current_time('mysql')",
        )?
        .describe("date('Y-m-d H:i:s') → current_time('mysql')")
        .example("$now = date('Y-m-d H:i:s');")
        .example("$at = date( \"Y-m-d H:i:s\", $timestamp );"),
        RewriteRule::new("date-day", r#"\bdate\(\s*['"]Y-m-d['"]\s*\)"#, "gmdate('Y-m-d')")?
            .describe("date('Y-m-d') → gmdate('Y-m-d')")
            .example("$file = 'log-' . date('Y-m-d') . '.txt';"),
        RewriteRule::new(
            "date-log-time",
            r#"\bdate\(\s*['"]H:i:s\.\s*['"]\s*\)"#,
            "gmdate('H:i:s.')",
        )?
        .describe("date('H:i:s.') → gmdate('H:i:s.')")
        .example("$stamp = date('H:i:s.');"),
    ];

    Ok(RuleSet::new(DATE_CALLS, ".pre-date-fix", rules)
        .describe("Replace date() with timezone-safe WordPress date functions"))
}

/// Escape translated strings and echoed variables.
pub fn escaping() -> Result<RuleSet> {
    let ident = r"\$([a-zA-Z_][a-zA-Z0-9_]*)";

    let rules = vec![
        RewriteRule::new("php-tag-translate-echo", r"<\?php\s+_e\(", "<?php esc_html_e(")?
            .describe("<?php _e( → <?php esc_html_e(")
            .example("<?php _e( 'Settings', 'msh-image-optimizer' ); ?>"),
        RewriteRule::new("translate-echo", r"\b_e\(", "esc_html_e(")?
            .describe("_e( → esc_html_e(")
            .guard(MatchGuard::lookbehind("esc_html"))
            .guard(MatchGuard::lookbehind("esc_attr"))
            .guard(MatchGuard::lookbehind("esc_js"))
            .guard(MatchGuard::lookbehind("esc_textarea"))
            .example("    _e( 'Optimize', 'msh-image-optimizer' );"),
        // Opens esc_html( without emitting the matching close paren.
        RewriteRule::new("echo-translate", r"\becho\s+__\(", "echo esc_html( __(")?
            .flagged()
            .describe("echo __( → echo esc_html( __( (add the closing paren by hand)")
            .example("echo __( 'Saved', 'msh-image-optimizer' );"),
        RewriteRule::new("print-translate", r"\bprint\s+__\(", "print esc_html( __(")?
            .flagged()
            .describe("print __( → print esc_html( __( (add the closing paren by hand)")
            .example("print __( 'Saved', 'msh-image-optimizer' );"),
        RewriteRule::new(
            "short-echo-var",
            &format!(r"<\?=\s*{}\s*\?>", ident),
            "<?= esc_html( $$${1} ) ?>",
        )?
        .describe("<?= $var ?> → <?= esc_html( $var ) ?>")
        .example("<td><?= $filename ?></td>"),
        RewriteRule::new(
            "echo-var",
            &format!(r"\becho\s+{}\s*;", ident),
            "echo esc_html( $$${1} );",
        )?
        .describe("echo $var; → echo esc_html( $var );")
        .example("echo $status_label;"),
        RewriteRule::new(
            "print-var",
            &format!(r"\bprint\s+{}\s*;", ident),
            "print esc_html( $$${1} );",
        )?
        .describe("print $var; → print esc_html( $var );")
        .example("print $status_label;"),
    ];

    Ok(RuleSet::new(ESCAPING, ".pre-escaping-fix", rules)
        .describe("Escape output of translated strings and plain variables"))
}

/// Report hardcoded LIKE wildcards. Fixing them needs `$wpdb->prepare()`.
pub fn like_wildcards() -> Result<RuleSet> {
    let rules = vec![
        RewriteRule::detect("like-image-prefix", r#"(?i)LIKE\s+['"]image/%['"]"#)?
            .describe("LIKE 'image/%' → $wpdb->esc_like( 'image/' ) . '%' inside $wpdb->prepare()")
            .example("WHERE post_mime_type LIKE 'image/%'"),
        RewriteRule::detect("like-contains", r#"(?i)LIKE\s+['"]%[^'"]+%['"]"#)?
            .describe("LIKE '%term%' → '%' . $wpdb->esc_like( $term ) . '%' inside $wpdb->prepare()")
            .example("WHERE meta_value like '%logo%'"),
        RewriteRule::detect("like-concat", r"(?i)LIKE\s+CONCAT\(")?
            .describe("LIKE CONCAT(...) → build the pattern in PHP with $wpdb->esc_like()")
            .example("WHERE guid LIKE CONCAT('%', p.post_name, '%')"),
    ];

    Ok(RuleSet::new(LIKE_WILDCARDS, ".pre-like-fix", rules)
        .describe("Find hardcoded SQL LIKE wildcards that need manual fixes"))
}

/// Report `$wpdb` queries with `LIKE 'image/%'` that are not prepared.
pub fn sql_like() -> Result<RuleSet> {
    let rules = vec![RewriteRule::detect(
        "unprepared-like-query",
        r#"\$wpdb->(get_var|get_col|get_results|get_row|query)\s*\(\s*"([^"]*LIKE\s+['"]image/%['"][^"]*)""#,
    )?
    .guard(MatchGuard::MatchExcludes {
        needles: vec!["image/%%".to_string(), r"image/\%\%".to_string()],
    })
    .guard(MatchGuard::NotPrecededBy {
        text: "$wpdb->prepare(".to_string(),
        window: 100,
    })
    .describe(
        "Add $image_mime_like = $wpdb->esc_like( 'image/' ) . '%'; replace LIKE 'image/%' with \
         LIKE %s and wrap the query in $wpdb->prepare( ..., $image_mime_like )",
    )
    .example(
        "$count = $wpdb->get_var(\"SELECT COUNT(*) FROM {$wpdb->posts} WHERE post_mime_type LIKE 'image/%'\");",
    )];

    Ok(RuleSet::new(SQL_LIKE, ".pre-sql-like-fix", rules)
        .describe("Find unprepared $wpdb queries using LIKE 'image/%'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{apply, detect_conflicts, RuleOutcome};

    fn all_builtins() -> Vec<RuleSet> {
        BUILTIN_NAMES
            .iter()
            .map(|name| builtin(name).unwrap().unwrap())
            .collect()
    }

    #[test]
    fn every_builtin_has_targets_and_validates() {
        for set in all_builtins() {
            set.validate().unwrap();
            assert!(builtin_targets(&set.name).is_some(), "{}", set.name);
        }
    }

    #[test]
    fn unknown_builtin_is_none() {
        assert!(builtin("nope").unwrap().is_none());
        assert!(builtin_targets("nope").is_none());
    }

    #[test]
    fn builtins_are_conflict_free() {
        for set in all_builtins() {
            let conflicts = detect_conflicts(&set.rules);
            assert!(conflicts.is_empty(), "{}: {:?}", set.name, conflicts);
        }
    }

    #[test]
    fn date_rule_order_is_pinned() {
        let set = date_calls().unwrap();
        let ids: Vec<&str> = set.rules.iter().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec![
                "date-month",
                "date-mysql-relative",
                "date-mysql",
                "date-day",
                "date-log-time"
            ]
        );
    }

    #[test]
    fn escaping_rule_order_is_pinned() {
        let set = escaping().unwrap();
        let ids: Vec<&str> = set.rules.iter().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec![
                "php-tag-translate-echo",
                "translate-echo",
                "echo-translate",
                "print-translate",
                "short-echo-var",
                "echo-var",
                "print-var"
            ]
        );
    }

    #[test]
    fn mysql_timestamp_becomes_current_time() {
        let set = date_calls().unwrap();
        let result = apply("date('Y-m-d H:i:s')", &set.rules);
        assert_eq!(result.content, "current_time('mysql')");
        assert_eq!(result.count_for("date-mysql"), 1);
        assert_eq!(result.count_for("date-mysql-relative"), 0);
    }

    #[test]
    fn relative_timestamp_becomes_gmdate() {
        let set = date_calls().unwrap();
        let result = apply("date( 'Y-m-d H:i:s', strtotime( '-7 days' ) )", &set.rules);
        assert_eq!(result.content, "gmdate('Y-m-d H:i:s', strtotime( '-7 days' ) )");
    }

    #[test]
    fn date_calls_cover_every_format() {
        let set = date_calls().unwrap();
        let input = "\
$m = date('Y-m');
$t = date(\"Y-m-d H:i:s\", $timestamp);
$d = date('Y-m-d');
$l = date('H:i:s.');
$u = update_date('Y-m');
";
        let result = apply(input, &set.rules);
        assert_eq!(
            result.content,
            "\
$m = wp_date('Y-m');
$t = current_time('mysql');
$d = gmdate('Y-m-d');
$l = gmdate('H:i:s.');
$u = update_date('Y-m');
"
        );
        assert_eq!(result.total_replacements(), 4);
    }

    #[test]
    fn escaping_wraps_output() {
        let set = escaping().unwrap();
        let input = "\
<?php _e( 'Title', 'msh' ); ?>
<?php esc_attr_e( 'Alt', 'msh' ); ?>
<td><?= $name ?></td>
<?php echo $label; print $other; ?>
";
        let result = apply(input, &set.rules);
        assert_eq!(
            result.content,
            "\
<?php esc_html_e( 'Title', 'msh' ); ?>
<?php esc_attr_e( 'Alt', 'msh' ); ?>
<td><?= esc_html( $name ) ?></td>
<?php echo esc_html( $label ); print esc_html( $other ); ?>
"
        );
        assert!(result.findings.is_empty());
    }

    #[test]
    fn echo_translate_is_flagged_for_review() {
        let set = escaping().unwrap();
        let result = apply("<?php\necho __( 'Done', 'msh' );\n", &set.rules);

        assert_eq!(result.content, "<?php\necho esc_html( __( 'Done', 'msh' );\n");
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].rule_id, "echo-translate");
        assert_eq!(result.findings[0].line, 2);

        let flagged: Vec<&str> = set.flagged_rules().map(|r| r.id()).collect();
        assert_eq!(flagged, vec!["echo-translate", "print-translate"]);
        assert_eq!(
            set.rule("echo-var").unwrap().outcome(),
            RuleOutcome::Applied
        );
    }

    #[test]
    fn like_wildcards_only_report() {
        let set = like_wildcards().unwrap();
        assert!(!set.has_rewrites());

        let input = "\
$a = \"SELECT ID FROM t WHERE post_mime_type LIKE 'image/%'\";
$b = \"SELECT ID FROM t WHERE meta_value like '%logo%'\";
$c = \"SELECT ID FROM t WHERE guid LIKE CONCAT('%', name)\";
";
        let result = apply(input, &set.rules);
        assert_eq!(result.content, input);
        assert_eq!(result.total_detections(), 3);
        let lines: Vec<usize> = result.findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn sql_like_skips_prepared_queries() {
        let set = sql_like().unwrap();
        let input = "\
$a = $wpdb->get_col(\"SELECT ID FROM {$wpdb->posts} WHERE post_mime_type LIKE 'image/%'\");
$b = $wpdb->get_var($wpdb->prepare(\"SELECT 1\"), $wpdb->get_var(\"SELECT 2 WHERE x LIKE 'image/%'\"));
$c = $wpdb->get_results(\"SELECT ID FROM t WHERE post_mime_type LIKE 'image/%%'\");
$d = $wpdb->query(
    \"DELETE FROM t
      WHERE post_mime_type LIKE 'image/%'\"
);
";
        let result = apply(input, &set.rules);
        let lines: Vec<usize> = result.findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![1, 4]);
        assert!(result.findings[1].matched.starts_with("$wpdb->query( \"DELETE FROM t WHERE"));
        assert_eq!(result.content, input);
    }

    #[test]
    fn sql_like_prepare_window_counts_characters() {
        let set = sql_like().unwrap();
        // 60 two-byte chars put prepare( past 100 bytes but within 100 chars
        let input = format!(
            "$wpdb->prepare( /* {} */ $wpdb->get_results( \"SELECT ID FROM p WHERE post_mime_type LIKE 'image/%'\" );",
            "é".repeat(60)
        );
        let result = apply(&input, &set.rules);
        assert!(result.findings.is_empty());
    }
}
