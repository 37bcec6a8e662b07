//! Terminal I/O utilities for CLI.
//!
//! Provides user prompting and TTY-gated status lines.

use std::io::{self, BufRead, IsTerminal, Write};

/// Ask on stderr and read one line from stdin. `None` when stdin is closed.
pub fn prompt(message: &str) -> wpfix::Result<Option<String>> {
    eprint!("{}", message);
    io::stderr().flush().ok();

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| wpfix::Error::internal_io(e.to_string(), Some("read answer".to_string())))?;

    if read == 0 {
        eprintln!();
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in lib.rs (#[macro_export]) and available crate-wide.
