// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The long flag spellings (`--stopOnMatch`, `--exitOnMatch`, ...) are kept
//! camel-cased to stay compatible with existing invocations of the tool.
//! `--shellPath` also answers to the more conventional `--shell-path`.

use clap::{CommandFactory, Parser, ValueEnum};

const AFTER_HELP: &str = "\
Command Reference:

  <command> is a shell command to run. Its output will be watched for matches.
  <matchexpr> is a regular expression of the form /pattern/flags that will match
    against each line of output from <command>.
  <execute> is a shell command to run once the <matchexpr> has found a match.
    You can use the variable $OUTWATCH_LINE in your <execute> command to get the
    content of the line that matched <matchexpr>. Note that you will need to
    escape the $ in the <execute> command like this \\$ so that it doesn't get
    evaluated immediately.

Examples:

  tail a file and append lines that contain \"complete\" to a file \"completed.files\"
  $ outwatch \"tail -f /my/log/file.log\" \"/complete/gi\" \"echo \\$OUTWATCH_LINE >> completed.files\"
";

/// Command-line arguments for `outwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "outwatch",
    version,
    about = "Watch a command's output and run another command on matching lines.",
    after_help = AFTER_HELP,
    long_about = None
)]
pub struct CliArgs {
    /// Shell command whose output is watched for matches.
    pub command: String,

    /// Match expression of the form /pattern/flags.
    pub matchexpr: String,

    /// Shell command to run for each matching line.
    pub execute: String,

    /// Stop matching once a match has been found.
    #[arg(short = 's', long = "stopOnMatch")]
    pub stop_on_match: bool,

    /// Exit the process when a match is found (after its execute command finishes).
    #[arg(short = 'e', long = "exitOnMatch")]
    pub exit_on_match: bool,

    /// Don't use ansi colors to make stderr red.
    #[arg(short = 'n', long = "noColor")]
    pub no_color: bool,

    /// Path to the shell you want to use.
    #[arg(
        long = "shellPath",
        visible_alias = "shell-path",
        value_name = "PATH",
        default_value = "/bin/bash"
    )]
    pub shell_path: String,

    /// Log data about in-progress matches and passed commands
    /// (helps debug shell escaping issues).
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `OUTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments without exiting on failure, so `main` can
/// control the exit code (invalid syntax must exit 1, not clap's default 2).
pub fn try_parse() -> Result<CliArgs, clap::Error> {
    CliArgs::try_parse()
}

/// Print the full usage help to stdout. Used on invalid-syntax paths.
pub fn print_help() {
    // Rendering help cannot meaningfully fail for a static command definition.
    let _ = CliArgs::command().print_help();
}
