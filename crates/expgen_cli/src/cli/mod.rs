//! CLI module for expgen
//!
//! Provides command-line interface for:
//! - compile: workbook -> HTML page
//! - check: validate a workbook and print diagnostics
//! - export-results: jsPsych JSON data -> results CSV

mod args;
mod commands;
mod errors;

pub use args::Cli;
pub use commands::run_command;
pub use errors::CliResult;

/// Parses arguments and runs the command. Returns the exit code.
pub fn run() -> CliResult<i32> {
    let cli = Cli::parse_args();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(cli, &mut out)
}
