// src/relay.rs

//! Output relay: forwards lines from the primary and secondary commands to
//! the terminal.
//!
//! The relay is a trait so the dispatcher can be tested with a capturing
//! sink instead of the real terminal. Stdout lines pass through verbatim;
//! stderr lines are coloured red unless `--noColor` is set.

use colored::Colorize;

/// Destination for relayed lines.
///
/// Writes are synchronous from the relay's perspective; ordering within one
/// stream is preserved by the per-pipe reader task that feeds the dispatcher.
pub trait RelaySink: Send {
    fn stdout_line(&mut self, line: &str);
    fn stderr_line(&mut self, line: &str);
}

/// Production relay writing to the process's own stdout/stderr.
pub struct ConsoleRelay {
    no_color: bool,
}

impl ConsoleRelay {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }
}

impl RelaySink for ConsoleRelay {
    fn stdout_line(&mut self, line: &str) {
        println!("{line}");
    }

    fn stderr_line(&mut self, line: &str) {
        if self.no_color {
            eprintln!("{line}");
        } else {
            eprintln!("{}", line.red());
        }
    }
}
