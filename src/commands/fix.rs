use clap::Args;
use serde::Serialize;

use wpfix::batch::{self, RunSummary};
use wpfix::mode::{self, ModeFlags, RunMode, CONFIRM_PROMPT};
use wpfix::process::ApplyMode;
use wpfix::targets;

use crate::commands::{CmdResult, GlobalArgs};
use crate::output::report;
use crate::tty;

#[derive(Args)]
pub struct FixArgs {
    /// Rule set to run (see `wpfix rules`)
    pub rule_set: String,
    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
    /// Apply changes without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum FixOutput {
    #[serde(rename = "fix.run", rename_all = "camelCase")]
    Run {
        mode: RunMode,
        backup_suffix: String,
        summary: RunSummary,
    },
    #[serde(rename = "fix.aborted", rename_all = "camelCase")]
    Aborted { rule_set: String, mode: RunMode },
}

pub fn run(args: FixArgs, global: &GlobalArgs) -> CmdResult<FixOutput> {
    let resolved = global.resolve(&args.rule_set)?;
    let rule_set = resolved.rule_set;
    let targets = targets::resolve_targets(&global.root, &resolved.targets)?;

    let flags = ModeFlags {
        dry_run: args.dry_run,
        yes: args.yes,
    };
    let requested = if flags.dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Apply
    };

    if !global.json {
        print!("{}", report::mode_banner(&rule_set, requested));
    }

    let answer = if mode::needs_confirmation(flags) {
        tty::prompt(CONFIRM_PROMPT)?
    } else {
        None
    };

    let run_mode = mode::resolve_mode(flags, answer.as_deref());
    let Some(apply_mode) = run_mode.apply_mode() else {
        return Ok((
            FixOutput::Aborted {
                rule_set: rule_set.name,
                mode: run_mode,
            },
            0,
        ));
    };

    if flags.yes && !flags.dry_run {
        tty::status("Confirmation skipped (--yes)");
    }
    if !global.json {
        println!();
    }

    let json = global.json;
    let summary = batch::run_batch(&targets, &rule_set, apply_mode, |event| {
        if !json {
            for line in report::event_lines(&event, &rule_set) {
                println!("{}", line);
            }
        }
    });

    Ok((
        FixOutput::Run {
            mode: run_mode,
            backup_suffix: rule_set.backup_suffix.clone(),
            summary,
        },
        0,
    ))
}

pub fn render(output: &FixOutput) -> String {
    match output {
        FixOutput::Run {
            backup_suffix,
            summary,
            ..
        } => report::summary(summary, backup_suffix),
        FixOutput::Aborted { .. } => "Aborted.\n".to_string(),
    }
}
