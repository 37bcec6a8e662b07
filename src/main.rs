use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{conflicts, fix, rules};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "wpfix")]
#[command(version = VERSION)]
#[command(about = "Rewrite WordPress plugin PHP toward coding-standard compliance")]
struct Cli {
    /// Plugin root directory that rule set paths are relative to
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    root: String,

    /// Configuration file (default: <root>/wpfix.json when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// Print a JSON envelope instead of the progress log
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a rule set over its target files
    Fix(fix::FixArgs),
    /// List rule sets, or the ordered rules of one
    Rules(rules::RulesArgs),
    /// Check rule sets for rules that interfere with each other
    Conflicts(conflicts::ConflictsArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs::new(&cli.root, cli.config.as_deref(), cli.json);

    if global.json {
        let (json_result, exit_code) = commands::run_json(cli.command, &global);
        let _ = output::print_json_result(json_result);
        return std::process::ExitCode::from(exit_code_to_u8(exit_code));
    }

    let (text_result, exit_code) = commands::run_text(cli.command, &global);
    match text_result {
        Ok(content) => print!("{}", content),
        Err(err) => {
            eprintln!("❌ {}", err.summary());
            if let Some(available) = err.details.get("available").and_then(|v| v.as_array()) {
                let names: Vec<&str> = available.iter().filter_map(|v| v.as_str()).collect();
                eprintln!("   Available: {}", names.join(", "));
            }
            for hint in &err.hints {
                eprintln!("   {}", hint.message);
            }
        }
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
