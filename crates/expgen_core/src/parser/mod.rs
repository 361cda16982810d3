//! Worksheets -> experiment model.
//!
//! # Responsibility
//! - Validate every worksheet and build an [`Experiment`].
//! - Record every problem as a diagnostic and keep going.
//!
//! # Invariants
//! - Parsing never aborts on a bad row or value; the offending item is
//!   skipped or replaced by its default.
//! - Stages run in dependency order: general, layout, response,
//!   instructions, trial_type, trials. A stage whose worksheet is absent
//!   is skipped.

mod general;
mod instructions;
mod layout;
mod responses;
mod trial_types;
mod trials;
pub mod values;

use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::Experiment;
use crate::reader::{read_sheets, ExperimentSheets};
use crate::workbook::{Sheet, Workbook};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Prefix of per-control CSS columns (`format:color`).
pub(crate) const CSS_PREFIX: &str = "format:";

/// Parser behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Warn when the experiment has no instruction pages.
    pub instructions_mandatory: bool,
}

/// Result of parsing a whole workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// `None` when the workbook structure was invalid.
    pub experiment: Option<Experiment>,
    pub diagnostics: Diagnostics,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        self.experiment.is_none() || self.diagnostics.has_errors()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParseConfig,
}

impl Parser {
    pub fn new(config: ParseConfig) -> Self {
        Self { config }
    }

    /// Validates the workbook structure, then parses all worksheets.
    pub fn parse_workbook(&self, workbook: &Workbook) -> ParseOutcome {
        let mut diagnostics = Diagnostics::new();
        let experiment = read_sheets(workbook, &mut diagnostics)
            .map(|sheets| self.parse(&sheets, &mut diagnostics));
        ParseOutcome {
            experiment,
            diagnostics,
        }
    }

    /// Parses already-selected worksheets.
    pub fn parse(&self, sheets: &ExperimentSheets, diagnostics: &mut Diagnostics) -> Experiment {
        let started_at = Instant::now();
        let mut exp = Experiment::default();

        if let Some(sheet) = &sheets.general {
            general::parse(sheet, &mut exp, diagnostics);
        }
        if let Some(sheet) = &sheets.layout {
            layout::parse(sheet, &mut exp, diagnostics);
        }
        if let Some(sheet) = &sheets.response {
            responses::parse(sheet, &mut exp, diagnostics);
        }
        instructions::parse(
            sheets.instructions.as_ref(),
            self.config.instructions_mandatory,
            &mut exp,
            diagnostics,
        );
        if let Some(sheet) = &sheets.trial_type {
            trial_types::parse(sheet, &mut exp, diagnostics);
        }
        if let Some(sheet) = &sheets.trials {
            trials::parse(sheet, &mut exp, diagnostics);
        }

        info!(
            "event=parse module=parser status={} controls={} responses={} trial_types={} trials={} diagnostics={} duration_ms={}",
            if diagnostics.has_errors() { "error" } else { "ok" },
            exp.layout.len(),
            exp.responses.len(),
            exp.trial_types.len(),
            exp.trials.len(),
            diagnostics.len(),
            started_at.elapsed().as_millis()
        );
        exp
    }
}

/// Reports missing mandatory columns. Returns `false` when any is missing.
pub(crate) fn require_columns(
    sheet: &Sheet,
    sheet_name: &str,
    columns: &[&str],
    consequence: &str,
    diagnostics: &mut Diagnostics,
) -> bool {
    let mut ok = true;
    for column in columns {
        if !sheet.has_column(column) {
            diagnostics.error(
                DiagnosticCode::MissingCol,
                Some(Location::sheet(sheet_name)),
                format!("column \"{column}\" is missing. {consequence}"),
            );
            ok = false;
        }
    }
    ok
}

/// Warns once per column whose title is not accepted by `is_known`.
pub(crate) fn report_excessive_columns(
    sheet: &Sheet,
    sheet_name: &str,
    is_known: impl Fn(&str) -> bool,
    diagnostics: &mut Diagnostics,
) {
    for (index, column) in sheet.columns().iter().enumerate() {
        if column.is_empty() || is_known(&column.to_lowercase()) {
            continue;
        }
        diagnostics.warning(
            DiagnosticCode::ExcessiveColumn,
            Some(Location::column(sheet_name, sheet.column_letter(index))),
            format!("the column name \"{column}\" is invalid and was ignored"),
        );
    }
}
