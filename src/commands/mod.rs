use std::path::PathBuf;

use wpfix::config::{self, FixConfig, ResolvedRuleSet};

use crate::output;
use crate::Commands;

pub type CmdResult<T> = wpfix::Result<(T, i32)>;

/// Options shared by every subcommand.
pub(crate) struct GlobalArgs {
    /// Plugin root, already tilde-expanded.
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    /// Emit a JSON envelope instead of the progress log.
    pub json: bool,
}

impl GlobalArgs {
    pub fn new(root: &str, config: Option<&str>, json: bool) -> Self {
        Self {
            root: expand(root),
            config: config.map(expand),
            json,
        }
    }

    pub fn load_config(&self) -> wpfix::Result<FixConfig> {
        if !self.root.is_dir() {
            return Err(wpfix::Error::validation_invalid_argument(
                "root",
                "Root directory does not exist",
                Some(self.root.display().to_string()),
                None,
            ));
        }
        config::load(&self.root, self.config.as_deref())
    }

    pub fn resolve(&self, name: &str) -> wpfix::Result<ResolvedRuleSet> {
        self.load_config()?.resolve(name)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

pub(crate) fn run_json(
    command: Commands,
    global: &GlobalArgs,
) -> (wpfix::Result<serde_json::Value>, i32) {
    match command {
        Commands::Fix(args) => output::map_cmd_result_to_json(fix::run(args, global)),
        Commands::Rules(args) => output::map_cmd_result_to_json(rules::run(args, global)),
        Commands::Conflicts(args) => output::map_cmd_result_to_json(conflicts::run(args, global)),
    }
}

/// Run `command` and render its output as text.
pub(crate) fn run_text(command: Commands, global: &GlobalArgs) -> (wpfix::Result<String>, i32) {
    match command {
        Commands::Fix(args) => render(fix::run(args, global), fix::render),
        Commands::Rules(args) => render(rules::run(args, global), rules::render),
        Commands::Conflicts(args) => render(conflicts::run(args, global), conflicts::render),
    }
}

fn render<T>(result: CmdResult<T>, to_text: fn(&T) -> String) -> (wpfix::Result<String>, i32) {
    match result {
        Ok((data, exit_code)) => (Ok(to_text(&data)), exit_code),
        Err(err) => {
            let exit_code = output::exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub mod conflicts;
pub mod fix;
pub mod rules;
