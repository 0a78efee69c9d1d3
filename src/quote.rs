// src/quote.rs

//! Shell quoting for the matched line.
//!
//! The matched line is handed to the execute command through the
//! `OUTWATCH_LINE` environment variable, wrapped in single quotes so the
//! shell treats it as one opaque literal. Single quotes inside the line are
//! escaped with the `'\''` idiom (close quote, escaped quote, reopen quote).

/// Name of the environment variable holding the matched line.
pub const LINE_VAR: &str = "OUTWATCH_LINE";

/// Escape every single quote so the string survives single-quoted shell
/// context: `don't` becomes `don'\''t`.
pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Build the full secondary command line: a `OUTWATCH_LINE='...'` prefix
/// assignment followed by the user's execute command.
pub fn secondary_command(line: &str, execute: &str) -> String {
    format!("{LINE_VAR}='{}' {execute}", escape_single_quotes(line))
}
