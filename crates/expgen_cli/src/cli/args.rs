//! CLI argument definitions using clap
//!
//! Commands:
//! - expgen compile <SOURCE> <TARGET>
//! - expgen check <SOURCE>
//! - expgen export-results <DATA_JSON> <OUT_CSV>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// expgen - compile experiment workbooks into jsPsych pages
#[derive(Parser, Debug)]
#[command(name = "expgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./expgen.toml when present)
    #[arg(long, global = true, env = "EXPGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error|off
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write rolling log files to this directory instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a workbook into a single HTML page
    Compile {
        /// Experiment workbook (.xlsx, .xls, .ods or .json)
        source: PathBuf,

        /// HTML file to write
        target: PathBuf,

        /// Load jsPsych from a local directory instead of the CDN
        #[arg(long)]
        local_imports: bool,

        /// Directory used with --local-imports
        #[arg(long, value_name = "DIR")]
        local_imports_dir: Option<String>,
    },

    /// Validate a workbook and print its diagnostics
    Check {
        /// Experiment workbook (.xlsx, .xls, .ods or .json)
        source: PathBuf,

        /// Print the diagnostics and the parsed experiment as JSON
        #[arg(long)]
        dump_json: bool,
    },

    /// Convert a jsPsych JSON data dump into the results CSV
    ExportResults {
        /// JSON array of trial records
        data: PathBuf,

        /// CSV file to write
        output: PathBuf,

        /// Milliseconds subtracted from every reaction time
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        time0: f64,

        /// Export every trial, not only experiment trials
        #[arg(long)]
        all: bool,

        /// Keep a field that is dropped by default (repeatable)
        #[arg(long = "keep", value_name = "FIELD")]
        keep: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
