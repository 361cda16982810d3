//! Validation diagnostics collected while reading and parsing a workbook.
//!
//! # Responsibility
//! - Give every user-facing problem a severity, a stable code and a
//!   location inside the workbook.
//! - Mirror every diagnostic into the log stream.
//!
//! # Invariants
//! - Codes are stable strings (`INVALID_COORD`); tests and tools match on
//!   them, never on message text.
//! - Recording a diagnostic never fails and never aborts parsing.

use crate::logging::sanitize_message;
use log::info;
use serde::Serialize;
use std::fmt::{Display, Formatter};

const MAX_LOGGED_MESSAGE_CHARS: usize = 240;

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Note",
        }
    }
}

macro_rules! diagnostic_codes {
    ($($variant:ident => $code:literal,)+) => {
        /// Stable identifier of a diagnostic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DiagnosticCode {
            $($variant,)+
        }

        impl DiagnosticCode {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }
    };
}

diagnostic_codes! {
    // workbook structure
    MissingWorksheetInConfig => "MISSING_WORKSHEET_IN_CONFIG",
    DuplicateColNames => "DUPLICATE_COL_NAMES",
    MissingCol => "MISSING_COL",
    // general
    MultipleParamValues => "MULTIPLE_PARAM_VALUES",
    UnknownParam => "UNKNOWN_PARAM",
    InvalidBoolParam => "INVALID_BOOL_PARAM",
    InvalidFilenamePrefix => "INVALID_FILENAME_PREFIX",
    InvalidColor => "INVALID_COLOR",
    NonNumericValue => "NON_NUMERIC_VALUE",
    InvalidNumericValue => "INVALID_NUMERIC_VALUE",
    // layout
    NoControls => "NO_CONTROLS",
    InvalidControlName => "INVALID_CONTROL_NAME",
    InvalidControlType => "INVALID_CONTROL_TYPE",
    DuplicateControlName => "DUPLICATE_CONTROL_NAME",
    InvalidPosition => "INVALID_POSITION",
    ExcessiveColumn => "EXCESSIVE_COLUMN",
    EmptyCoord => "EMPTY_COORD",
    InvalidCoord => "INVALID_COORD",
    PositionMismatchesTopOrLeft => "POSITION_MISMATCHES_TOP_OR_LEFT",
    // response
    MissingResponseId => "MISSING_RESPONSE_ID",
    MissingResponseValue => "MISSING_RESPONSE_VALUE",
    InvalidResponseType => "INVALID_RESPONSE_TYPE",
    MissingKbResponseKeyCol => "MISSING_KB_RESPONSE_KEY_COL",
    MissingKbResponseKey => "MISSING_KB_RESPONSE_KEY",
    DuplicateResponseKey => "DUPLICATE_RESPONSE_KEY",
    MissingButtonResponseTextCol => "MISSING_BUTTON_RESPONSE_TEXT_COL",
    DuplicateResponseId => "DUPLICATE_RESPONSE_ID",
    // instructions
    NoInstructions => "NO_INSTRUCTIONS",
    InstructionsMissingTextCol => "INSTRUCTIONS_MISSING_TEXT_COL",
    InstructionsMissingResponseCol => "INSTRUCTIONS_MISSING_RESPONSE_COL",
    InstructionTextMissing => "INSTRUCTION_TEXT_MISSING",
    InstructionsMustDefineResponse => "INSTRUCTIONS_MUST_DEFINE_RESPONSE",
    InstructionInvalidResponseNames => "INSTRUCTION_INVALID_RESPONSE_NAMES",
    InstructionDuplicateResponses => "INSTRUCTION_DUPLICATE_RESPONSES",
    InstructionsWithMultipleResponseTypes => "INSTRUCTIONS_WITH_MULTIPLE_RESPONSE_TYPES",
    // trial_type
    NoTrialTypes => "NO_TRIAL_TYPES",
    TrialTypeMissing => "TRIAL_TYPE_MISSING",
    TrialTypeInvalidTypeName => "TRIAL_TYPE_INVALID_TYPE_NAME",
    TrialTypeNoFields => "TRIAL_TYPE_NO_FIELDS",
    TrialTypeDuplicateControls => "TRIAL_TYPE_DUPLICATE_CONTROLS",
    TrialTypeInvalidControlNames => "TRIAL_TYPE_INVALID_CONTROL_NAMES",
    TrialTypeDuplicateResponses => "TRIAL_TYPE_DUPLICATE_RESPONSES",
    TrialTypeInvalidResponseNames => "TRIAL_TYPE_INVALID_RESPONSE_NAMES",
    TrialTypeMultipleResponseTypes => "TRIAL_TYPE_MULTIPLE_RESPONSE_TYPES",
    MustDefineResponseOrDuration => "MUST_DEFINE_RESPONSE_OR_DURATION",
    // trials
    TrialsIgnored => "TRIALS_IGNORED",
    NoTrials => "NO_TRIALS",
    NoTypeInTrialsWs => "NO_TYPE_IN_TRIALS_WS",
    TrialsInvalidSaveCol => "TRIALS_INVALID_SAVE_COL",
    TrialsUnknownControl => "TRIALS_UNKNOWN_CONTROL",
    TrialsInvalidColName => "TRIALS_INVALID_COL_NAME",
    TrialsNoTrialType => "TRIALS_NO_TRIAL_TYPE",
    TrialsInvalidTrialType => "TRIALS_INVALID_TRIAL_TYPE",
    TrialsCssTrialtypeMismatch => "TRIALS_CSS_TRIALTYPE_MISMATCH",
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Where inside a worksheet a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "lowercase")]
pub enum Position {
    Sheet,
    Cell(String),
    Column(String),
    Line(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub sheet: String,
    pub position: Position,
}

impl Location {
    pub fn sheet(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            position: Position::Sheet,
        }
    }

    /// A single cell, e.g. `B3`.
    pub fn cell(sheet: &str, cell_ref: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            position: Position::Cell(cell_ref.into()),
        }
    }

    /// A whole column, by spreadsheet letter.
    pub fn column(sheet: &str, letter: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            position: Position::Column(letter.into()),
        }
    }

    pub fn line(sheet: &str, line: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            position: Position::Line(line),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "worksheet \"{}\"", self.sheet)?;
        match &self.position {
            Position::Sheet => Ok(()),
            Position::Cell(cell) => write!(f, ", cell {cell}"),
            Position::Column(column) => write!(f, ", column {column}"),
            Position::Line(line) => write!(f, ", line {line}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub location: Option<Location>,
    pub message: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} in {}: ", self.severity.label(), location)?,
            None => write!(f, "{}: ", self.severity.label())?,
        }
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// Ordered collection of diagnostics for one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(
        &mut self,
        code: DiagnosticCode,
        location: Option<Location>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Error, code, location, message.into());
    }

    pub fn warning(
        &mut self,
        code: DiagnosticCode,
        location: Option<Location>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Warning, code, location, message.into());
    }

    pub fn info(
        &mut self,
        code: DiagnosticCode,
        location: Option<Location>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Info, code, location, message.into());
    }

    fn push(
        &mut self,
        severity: Severity,
        code: DiagnosticCode,
        location: Option<Location>,
        message: String,
    ) {
        let diagnostic = Diagnostic {
            severity,
            code,
            location,
            message,
        };
        info!(
            "event=diagnostic module=parser severity={} code={} detail={}",
            severity.as_str(),
            code,
            sanitize_message(&diagnostic.to_string(), MAX_LOGGED_MESSAGE_CHARS)
        );
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Warning) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    /// Returns whether at least one diagnostic carries `code`.
    pub fn contains(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    /// Codes in recording order, duplicates kept.
    pub fn codes(&self) -> Vec<&'static str> {
        self.items.iter().map(|d| d.code.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticCode, Diagnostics, Location, Severity};

    #[test]
    fn display_names_sheet_and_cell() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(
            DiagnosticCode::InvalidCoord,
            Some(Location::cell("layout", "C3")),
            "the value \"abc\" is invalid",
        );
        diagnostics.warning(DiagnosticCode::InvalidColor, None, "odd color");

        let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered[0],
            "Error in worksheet \"layout\", cell C3: the value \"abc\" is invalid (INVALID_COORD)"
        );
        assert_eq!(rendered[1], "Warning: odd color (INVALID_COLOR)");
    }

    #[test]
    fn severity_queries_are_independent() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_errors());
        diagnostics.info(DiagnosticCode::TrialsIgnored, None, "ignored");
        assert!(!diagnostics.has_errors());
        assert!(!diagnostics.has_warnings());

        diagnostics.warning(
            DiagnosticCode::ExcessiveColumn,
            Some(Location::column("layout", "F")),
            "extra",
        );
        assert!(diagnostics.has_warnings());
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.count(Severity::Info), 1);
        assert!(diagnostics.contains(DiagnosticCode::ExcessiveColumn));
        assert_eq!(diagnostics.codes(), vec!["TRIALS_IGNORED", "EXCESSIVE_COLUMN"]);
    }

    #[test]
    fn diagnostics_serialize_with_string_codes() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(
            DiagnosticCode::NoTrials,
            Some(Location::line("trials", 4)),
            "no trials",
        );
        let json = serde_json::to_value(&diagnostics).expect("serializable");
        assert_eq!(json[0]["code"], "NO_TRIALS");
        assert_eq!(json[0]["severity"], "error");
        assert_eq!(json[0]["location"]["position"]["kind"], "line");
        assert_eq!(json[0]["location"]["position"]["at"], 4);
    }
}
