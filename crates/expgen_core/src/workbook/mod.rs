//! Workbook loading.
//!
//! # Responsibility
//! - Load every worksheet of an experiment definition into memory.
//! - Hide the source format (spreadsheet file or JSON document) from the
//!   parser.
//!
//! # Invariants
//! - Sheet lookup by name is case-insensitive.
//! - The first non-empty row of a worksheet is its header.

pub mod cell;
pub mod sheet;

pub use cell::Cell;
pub use sheet::{column_letter, Sheet, SheetRow};

use calamine::{open_workbook_auto, Data, Reader};
use log::{error, info};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Error raised when a workbook cannot be loaded at all.
#[derive(Debug)]
pub enum WorkbookError {
    NotFound(PathBuf),
    Io(std::io::Error),
    Spreadsheet(calamine::Error),
    Json(serde_json::Error),
    /// The JSON document does not have the `{sheet: [rows...]}` shape.
    InvalidJson(String),
}

impl Display for WorkbookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "experiment file does not exist ({})", path.display())
            }
            Self::Io(err) => write!(f, "failed to read experiment file: {err}"),
            Self::Spreadsheet(err) => write!(f, "failed to read spreadsheet: {err}"),
            Self::Json(err) => write!(f, "failed to parse JSON workbook: {err}"),
            Self::InvalidJson(details) => write!(f, "invalid JSON workbook: {details}"),
        }
    }
}

impl Error for WorkbookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Spreadsheet(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotFound(_) | Self::InvalidJson(_) => None,
        }
    }
}

impl From<std::io::Error> for WorkbookError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<calamine::Error> for WorkbookError {
    fn from(value: calamine::Error) -> Self {
        Self::Spreadsheet(value)
    }
}

impl From<serde_json::Error> for WorkbookError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// All worksheets of one experiment definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Opens a workbook, choosing the loader by file extension.
    ///
    /// `.json` files use the JSON layout; everything else goes through the
    /// spreadsheet reader (`.xlsx`, `.xlsm`, `.xls`, `.ods`).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        let started_at = Instant::now();
        info!(
            "event=workbook_open module=workbook status=start path={}",
            path.display()
        );

        if !path.exists() {
            error!(
                "event=workbook_open module=workbook status=error error_code=not_found path={}",
                path.display()
            );
            return Err(WorkbookError::NotFound(path.to_path_buf()));
        }

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let result = if is_json {
            std::fs::read_to_string(path)
                .map_err(WorkbookError::from)
                .and_then(|text| Self::from_json_str(&text))
        } else {
            Self::from_spreadsheet(path)
        };

        match &result {
            Ok(workbook) => info!(
                "event=workbook_open module=workbook status=ok sheets={} duration_ms={}",
                workbook.sheets.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=workbook_open module=workbook status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Loads every worksheet of a spreadsheet file.
    pub fn from_spreadsheet(path: &Path) -> Result<Self, WorkbookError> {
        let mut workbook = open_workbook_auto(path)?;
        let mut sheets = Vec::new();

        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let mut rows = range
                .rows()
                .map(|row| row.iter().map(cell_from_data).collect::<Vec<Cell>>());

            let header = rows
                .next()
                .map(|cells| cells.iter().map(|c| c.as_text().unwrap_or_default()).collect())
                .unwrap_or_default();
            let data: Vec<Vec<Cell>> = rows.collect();

            sheets.push(Sheet::with_origin(name, header, data, start_row + 1, start_col));
        }

        Ok(Self { sheets })
    }

    /// Parses the JSON workbook layout:
    /// `{"sheet name": [{"column": value, ...}, ...], ...}`.
    ///
    /// Columns are the union of row keys in first-seen order.
    pub fn from_json_str(text: &str) -> Result<Self, WorkbookError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self, WorkbookError> {
        let object = value.as_object().ok_or_else(|| {
            WorkbookError::InvalidJson("top level must be an object of worksheets".to_string())
        })?;

        let mut sheets = Vec::with_capacity(object.len());
        for (name, rows) in object {
            let rows = rows.as_array().ok_or_else(|| {
                WorkbookError::InvalidJson(format!("worksheet `{name}` must be an array of rows"))
            })?;

            let mut columns: Vec<String> = Vec::new();
            for (index, row) in rows.iter().enumerate() {
                let row = row.as_object().ok_or_else(|| {
                    WorkbookError::InvalidJson(format!(
                        "worksheet `{name}`, row {}: expected an object",
                        index + 1
                    ))
                })?;
                for key in row.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }

            let data = rows
                .iter()
                .filter_map(Value::as_object)
                .map(|row| {
                    columns
                        .iter()
                        .map(|column| row.get(column).map(cell_from_json).unwrap_or_default())
                        .collect()
                })
                .collect();

            sheets.push(Sheet::new(name.clone(), columns, data));
        }

        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Finds a worksheet by name (case-insensitive).
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|sheet| sheet.name().trim().eq_ignore_ascii_case(name))
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(value) => Cell::number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(value) => Cell::Bool(*value),
        other => Cell::Text(other.to_string()),
    }
}

fn cell_from_json(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(flag) => Cell::Bool(*flag),
        Value::Number(number) => number.as_f64().map(Cell::number).unwrap_or_default(),
        Value::String(text) => Cell::Text(text.clone()),
        other => Cell::Text(other.to_string()),
    }
}
