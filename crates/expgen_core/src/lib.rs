//! Core logic for expgen.
//! Turns experiment workbooks into single-file jsPsych pages and exports
//! the results those pages collect.

pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod generator;
pub mod logging;
pub mod model;
pub mod parser;
pub mod reader;
pub mod results;
pub mod workbook;

pub use compile::{check, compile, compile_workbook, CompileError, CompileOptions, CompileReport, CompileStatus};
pub use config::{ConfigError, ExpgenConfig, LogSettings};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Location, Severity};
pub use generator::{ExpGenerator, GeneratorOptions, ImportMode};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::Experiment;
pub use parser::{ParseConfig, ParseOutcome, Parser};
pub use results::{export_csv, export_csv_string, load_records, ExportError, ExportOptions, TrialRecord};
pub use workbook::{Cell, Sheet, Workbook, WorkbookError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
