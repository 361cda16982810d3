//! Results CSV export.
//!
//! # Responsibility
//! - Turn jsPsych trial records into the results file the generated page
//!   saves: experiment trials only, reaction times shifted by `time0`,
//!   jsPsych bookkeeping fields dropped.
//!
//! # Invariants
//! - Input records are never mutated; exporting the same records twice
//!   yields byte-identical output.
//! - Output follows jsPsych's CSV dialect: every field quoted, `"` doubled,
//!   CRLF line ends, columns in first-seen key order.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::info;
use serde_json::{Map, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use std::time::Instant;

/// One trial as recorded by jsPsych.
pub type TrialRecord = Map<String, Value>;

/// Fields jsPsych records for its own bookkeeping; never exported.
pub const DEFAULT_DROPPED_FIELDS: &[&str] = &["internal_node_id", "trial_type", "stimulus", "response"];

/// Field the generated page sets on every step that collects a response.
pub const EXPERIMENT_TRIAL_FIELD: &str = "expgen_trial";

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    /// The data file is not a JSON array.
    NotAnArray,
    /// Element `index` of the data array is not an object.
    InvalidRecord { index: usize },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Json(err) => write!(f, "invalid trial data: {err}"),
            Self::Csv(err) => write!(f, "failed to write csv: {err}"),
            Self::NotAnArray => write!(f, "trial data must be a JSON array of trial objects"),
            Self::InvalidRecord { index } => {
                write!(f, "trial data element {index} is not an object")
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::NotAnArray | Self::InvalidRecord { .. } => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Subtracted from every numeric `rt`.
    pub time0: f64,
    pub dropped_fields: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            time0: 0.0,
            dropped_fields: DEFAULT_DROPPED_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl ExportOptions {
    /// Keeps `field` in the output even if it is dropped by default.
    pub fn keep_field(mut self, field: &str) -> Self {
        self.dropped_fields.retain(|dropped| dropped != field);
        self
    }
}

/// The predicate the generated page filters with.
pub fn is_experiment_trial(record: &TrialRecord) -> bool {
    record.get(EXPERIMENT_TRIAL_FIELD) == Some(&Value::Bool(true))
}

/// Reads a jsPsych JSON data dump (`jsPsych.data.get().json()`).
pub fn load_records(reader: impl Read) -> Result<Vec<TrialRecord>, ExportError> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(ExportError::NotAnArray);
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(ExportError::InvalidRecord { index }),
        })
        .collect()
}

/// Applies filter, `rt` shift and field drop, returning new records.
pub fn prepare_records(
    records: &[TrialRecord],
    filter: impl Fn(&TrialRecord) -> bool,
    options: &ExportOptions,
) -> Vec<TrialRecord> {
    records
        .iter()
        .filter(|record| filter(record))
        .map(|record| {
            record
                .iter()
                .filter(|(key, _)| !options.dropped_fields.iter().any(|f| f == *key))
                .map(|(key, value)| {
                    let value = if key == "rt" {
                        shift_rt(value, options.time0)
                    } else {
                        value.clone()
                    };
                    (key.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn shift_rt(value: &Value, time0: f64) -> Value {
    match value.as_f64() {
        Some(rt) => Number::from_f64(rt - time0)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        None => value.clone(),
    }
}

/// Writes the results CSV. Returns the number of exported trials.
pub fn export_csv(
    records: &[TrialRecord],
    filter: impl Fn(&TrialRecord) -> bool,
    options: &ExportOptions,
    mut writer: impl Write,
) -> Result<usize, ExportError> {
    let started_at = Instant::now();
    let rows = prepare_records(records, filter, options);

    let mut columns: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    if columns.is_empty() {
        // jsPsych still emits the (empty) header line and one line per row.
        for _ in 0..=rows.len() {
            writer.write_all(b"\r\n")?;
        }
        writer.flush()?;
    } else {
        let mut csv_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::CRLF)
            .from_writer(writer);
        csv_writer.write_record(&columns)?;
        for row in &rows {
            csv_writer.write_record(columns.iter().map(|column| field_text(row.get(*column))))?;
        }
        csv_writer.flush()?;
    }

    info!(
        "event=results_export module=results status=ok input={} exported={} columns={} duration_ms={}",
        records.len(),
        rows.len(),
        columns.len(),
        started_at.elapsed().as_millis()
    );
    Ok(rows.len())
}

/// Same as [`export_csv`] but returns the CSV text.
pub fn export_csv_string(
    records: &[TrialRecord],
    filter: impl Fn(&TrialRecord) -> bool,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    export_csv(records, filter, options, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

/// Renders one field the way JavaScript string-concatenates it.
fn field_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => js_number(number),
        Some(other) => other.to_string(),
    }
}

/// Formats a number like JavaScript's `Number.prototype.toString`.
pub fn js_number(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    let Some(value) = number.as_f64() else {
        return number.to_string();
    };
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        if value.fract() == 0.0 {
            format!("{value:.0}")
        } else {
            format!("{value}")
        }
    } else {
        let exp = format!("{value:e}");
        match exp.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{field_text, js_number};
    use serde_json::{json, Number};

    #[test]
    fn numbers_print_like_javascript() {
        assert_eq!(js_number(&Number::from(42)), "42");
        assert_eq!(js_number(&Number::from_f64(412.0).expect("finite")), "412");
        assert_eq!(js_number(&Number::from_f64(0.5).expect("finite")), "0.5");
        assert_eq!(js_number(&Number::from_f64(-12.25).expect("finite")), "-12.25");
        assert_eq!(js_number(&Number::from_f64(1e-7).expect("finite")), "1e-7");
        assert_eq!(js_number(&Number::from_f64(1e21).expect("finite")), "1e+21");
        assert_eq!(js_number(&Number::from_f64(-0.0).expect("finite")), "0");
    }

    #[test]
    fn fields_concatenate_like_javascript() {
        assert_eq!(field_text(None), "");
        assert_eq!(field_text(Some(&json!(null))), "null");
        assert_eq!(field_text(Some(&json!(true))), "true");
        assert_eq!(field_text(Some(&json!("a\"b"))), "a\"b");
        assert_eq!(field_text(Some(&json!({"a": 1}))), "{\"a\":1}");
        assert_eq!(field_text(Some(&json!([1, "x"]))), "[1,\"x\"]");
    }
}
