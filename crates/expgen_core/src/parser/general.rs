//! `general` worksheet: one `param`/`value` pair per row.

use super::require_columns;
use super::values::{is_valid_color, parse_bool};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::Experiment;
use crate::reader::WS_GENERAL;
use crate::workbook::{Cell, Sheet, SheetRow};
use once_cell::sync::Lazy;
use regex::Regex;

static FILENAME_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_&$#-]+$").expect("valid filename prefix regex"));

const DEFAULT_PREFIX: &str = "results";

const KNOWN_PARAMS: &[&str] = &[
    "title",
    "get_subj_id",
    "get_session_id",
    "save_results",
    "full_screen",
    "results_filename_prefix",
    "background_color",
    "rt_offset",
];

pub(super) fn parse(sheet: &Sheet, exp: &mut Experiment, diagnostics: &mut Diagnostics) {
    if !require_columns(
        sheet,
        WS_GENERAL,
        &["param", "value"],
        "Default settings were used.",
        diagnostics,
    ) {
        return;
    }

    let params = collect_params(sheet, diagnostics);
    let find = |name: &str| {
        params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, row)| *row)
    };

    exp.title = find("title")
        .and_then(|row| row.get("value").as_text())
        .unwrap_or_default();
    exp.get_subj_id = bool_param(find("get_subj_id"), "get_subj_id", diagnostics);
    exp.get_session_id = bool_param(find("get_session_id"), "get_session_id", diagnostics);
    exp.save_results = bool_param(find("save_results"), "save_results", diagnostics);
    exp.full_screen = bool_param(find("full_screen"), "full_screen", diagnostics);

    let prefix = filename_prefix(find("results_filename_prefix"), diagnostics);
    exp.results_filename = results_filename(&prefix, exp.get_subj_id, exp.get_session_id);

    if let Some(row) = find("background_color") {
        if let Some(color) = row.get("value").as_trimmed_text() {
            if !is_valid_color(&color) {
                diagnostics.warning(
                    DiagnosticCode::InvalidColor,
                    Some(Location::cell(WS_GENERAL, row.cell_ref("value"))),
                    format!(
                        "the color \"{color}\" of parameter \"background_color\" seems invalid and may fail; use a CSS color name or a #rrggbb code"
                    ),
                );
            }
            exp.background_color = Some(color);
        }
    }

    if let Some(row) = find("rt_offset") {
        exp.rt_offset = rt_offset(row, diagnostics);
    }
}

/// First row of every parameter, in sheet order. Repeats and unknown names
/// are reported here.
fn collect_params<'a>(
    sheet: &'a Sheet,
    diagnostics: &mut Diagnostics,
) -> Vec<(String, SheetRow<'a>)> {
    let mut params: Vec<(String, SheetRow<'a>)> = Vec::new();
    for row in sheet.rows() {
        let Some(name) = row.get("param").as_trimmed_text() else {
            continue;
        };
        let name = name.to_lowercase();
        let location = Some(Location::cell(WS_GENERAL, row.cell_ref("param")));

        if !KNOWN_PARAMS.contains(&name.as_str()) {
            diagnostics.warning(
                DiagnosticCode::UnknownParam,
                location,
                format!("the parameter \"{name}\" is unknown and was ignored"),
            );
            continue;
        }
        if params.iter().any(|(param, _)| *param == name) {
            diagnostics.error(
                DiagnosticCode::MultipleParamValues,
                location,
                format!(
                    "the parameter \"{name}\" can only appear once but it appears 2 or more times"
                ),
            );
            continue;
        }
        params.push((name, row));
    }
    params
}

fn bool_param(row: Option<SheetRow<'_>>, name: &str, diagnostics: &mut Diagnostics) -> bool {
    let Some(row) = row else {
        return false;
    };
    let cell = row.get("value");
    if cell.is_empty() {
        return false;
    }

    let text = cell.as_text().unwrap_or_default();
    match parse_bool(&text) {
        Some(value) => value,
        None => {
            diagnostics.error(
                DiagnosticCode::InvalidBoolParam,
                Some(Location::cell(WS_GENERAL, row.cell_ref("value"))),
                format!(
                    "the value of parameter \"{name}\" is \"{text}\"; this is invalid and was ignored. Please specify either \"Y\" or \"N\""
                ),
            );
            false
        }
    }
}

fn filename_prefix(row: Option<SheetRow<'_>>, diagnostics: &mut Diagnostics) -> String {
    let Some(row) = row else {
        return DEFAULT_PREFIX.to_string();
    };
    let Some(prefix) = row.get("value").as_trimmed_text() else {
        return DEFAULT_PREFIX.to_string();
    };

    if FILENAME_PREFIX_RE.is_match(&prefix) {
        return prefix;
    }
    diagnostics.error(
        DiagnosticCode::InvalidFilenamePrefix,
        Some(Location::cell(WS_GENERAL, row.cell_ref("value"))),
        format!(
            "invalid \"results_filename_prefix\" ({prefix}): it can contain only letters, digits, or the characters -,_,&,#,$"
        ),
    );
    DEFAULT_PREFIX.to_string()
}

/// Builds the results file name template.
pub(crate) fn results_filename(prefix: &str, with_subj_id: bool, with_session_id: bool) -> String {
    let mut name = prefix.to_string();
    if with_subj_id {
        name.push_str("_${subj_id}");
    }
    if with_session_id {
        name.push_str("_${session_id}");
    }
    name.push_str("_${date}.csv");
    name
}

fn rt_offset(row: SheetRow<'_>, diagnostics: &mut Diagnostics) -> f64 {
    let cell: &Cell = row.get("value");
    if cell.is_blank() {
        return 0.0;
    }
    let location = Some(Location::cell(WS_GENERAL, row.cell_ref("value")));
    match cell.as_number() {
        Some(value) if value >= 0.0 => value,
        Some(value) => {
            diagnostics.error(
                DiagnosticCode::InvalidNumericValue,
                location,
                format!("\"rt_offset\" must be 0 or more, got {value}"),
            );
            0.0
        }
        None => {
            diagnostics.error(
                DiagnosticCode::NonNumericValue,
                location,
                format!("\"rt_offset\" must be a number of milliseconds, got \"{cell}\""),
            );
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::results_filename;

    #[test]
    fn results_filename_appends_requested_ids() {
        assert_eq!(results_filename("results", false, false), "results_${date}.csv");
        assert_eq!(
            results_filename("exp1", true, true),
            "exp1_${subj_id}_${session_id}_${date}.csv"
        );
        assert_eq!(
            results_filename("exp1", false, true),
            "exp1_${session_id}_${date}.csv"
        );
    }
}
