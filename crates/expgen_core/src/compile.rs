//! Workbook -> page pipeline.
//!
//! # Responsibility
//! - Open, validate, parse and generate; write the page only when the
//!   workbook produced no error diagnostic.
//!
//! # Invariants
//! - A failed compile never creates or truncates the target file.
//! - Exit codes are stable: 0 success, 53 warnings, 2 failed.

use crate::diagnostics::Diagnostics;
use crate::generator::{ExpGenerator, GeneratorOptions};
use crate::model::Experiment;
use crate::parser::{ParseConfig, Parser};
use crate::workbook::{Workbook, WorkbookError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStatus {
    Success,
    /// Page written, but warnings were reported.
    Warnings,
    /// Errors were reported; nothing written.
    Failed,
}

impl CompileStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Warnings => 53,
            Self::Failed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warnings => "warnings",
            Self::Failed => "failed",
        }
    }

    fn from_diagnostics(diagnostics: &Diagnostics) -> Self {
        if diagnostics.has_errors() {
            Self::Failed
        } else if diagnostics.has_warnings() {
            Self::Warnings
        } else {
            Self::Success
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOptions {
    pub parse: ParseConfig,
    pub generator: GeneratorOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileReport {
    pub status: CompileStatus,
    pub diagnostics: Diagnostics,
    /// `None` when the workbook structure was invalid.
    pub experiment: Option<Experiment>,
    /// Generated page; `None` when the compile failed or only checked.
    pub page: Option<String>,
}

#[derive(Debug)]
pub enum CompileError {
    Workbook(WorkbookError),
    Io { path: PathBuf, source: std::io::Error },
}

impl CompileError {
    /// Unreadable sources fail the compile like error diagnostics do.
    pub fn status(&self) -> CompileStatus {
        CompileStatus::Failed
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workbook(err) => write!(f, "cannot open workbook: {err}"),
            Self::Io { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Workbook(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<WorkbookError> for CompileError {
    fn from(value: WorkbookError) -> Self {
        Self::Workbook(value)
    }
}

/// Parses `workbook` and, unless errors were found, generates the page.
pub fn compile_workbook(workbook: &Workbook, options: &CompileOptions) -> CompileReport {
    let mut report = parse_only(workbook, options);
    if report.status != CompileStatus::Failed {
        if let Some(exp) = &report.experiment {
            report.page = Some(ExpGenerator::new(options.generator.clone()).generate(exp));
        }
    }
    report
}

/// Opens `source`, compiles it and writes the page to `target`.
pub fn compile(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    options: &CompileOptions,
) -> Result<CompileReport, CompileError> {
    let started_at = Instant::now();
    let source = source.as_ref();
    let target = target.as_ref();

    let workbook = Workbook::open(source).map_err(|err| {
        error!(
            "event=compile module=compile status=error source={} error={}",
            source.display(),
            err
        );
        CompileError::from(err)
    })?;
    let report = compile_workbook(&workbook, options);

    if let Some(page) = &report.page {
        std::fs::write(target, page).map_err(|err| CompileError::Io {
            path: target.to_path_buf(),
            source: err,
        })?;
    }

    info!(
        "event=compile module=compile status={} source={} target={} written={} diagnostics={} duration_ms={}",
        report.status.as_str(),
        source.display(),
        target.display(),
        report.page.is_some(),
        report.diagnostics.len(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

/// Opens and validates `source` without generating anything.
pub fn check(source: impl AsRef<Path>, options: &CompileOptions) -> Result<CompileReport, CompileError> {
    let started_at = Instant::now();
    let workbook = Workbook::open(source.as_ref())?;
    let report = parse_only(&workbook, options);
    info!(
        "event=check module=compile status={} source={} diagnostics={} duration_ms={}",
        report.status.as_str(),
        source.as_ref().display(),
        report.diagnostics.len(),
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

fn parse_only(workbook: &Workbook, options: &CompileOptions) -> CompileReport {
    let outcome = Parser::new(options.parse).parse_workbook(workbook);
    let status = if outcome.experiment.is_none() {
        CompileStatus::Failed
    } else {
        CompileStatus::from_diagnostics(&outcome.diagnostics)
    };
    CompileReport {
        status,
        diagnostics: outcome.diagnostics,
        experiment: outcome.experiment,
        page: None,
    }
}
