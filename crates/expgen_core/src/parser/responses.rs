//! `response` worksheet: keyboard and button responses.

use super::require_columns;
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::{Experiment, Response};
use crate::reader::WS_RESPONSE;
use crate::workbook::{Sheet, SheetRow};

const MISSING_VALUE_PLACEHOLDER: &str = "(value not specified)";
const MISSING_TEXT_PLACEHOLDER: &str = "N/A";

pub(super) fn parse(sheet: &Sheet, exp: &mut Experiment, diagnostics: &mut Diagnostics) {
    if !require_columns(
        sheet,
        WS_RESPONSE,
        &["response_name", "type", "value"],
        "All responses were ignored.",
        diagnostics,
    ) {
        return;
    }

    let mut used_keys: Vec<String> = Vec::new();
    for row in sheet.rows() {
        if let Some(response) = parse_response(sheet, row, exp, &mut used_keys, diagnostics) {
            exp.responses.push(response);
        }
    }
}

fn parse_response(
    sheet: &Sheet,
    row: SheetRow<'_>,
    exp: &Experiment,
    used_keys: &mut Vec<String>,
    diagnostics: &mut Diagnostics,
) -> Option<Response> {
    let name_location = Some(Location::cell(WS_RESPONSE, row.cell_ref("response_name")));
    let name = row
        .get("response_name")
        .as_trimmed_text()
        .map(|name| name.to_lowercase());
    if name.is_none() {
        diagnostics.error(
            DiagnosticCode::MissingResponseId,
            name_location.clone(),
            "response name was not specified, please specify it",
        );
    }

    let value = match row.get("value").as_trimmed_text() {
        Some(value) => value,
        None => {
            diagnostics.error(
                DiagnosticCode::MissingResponseValue,
                Some(Location::cell(WS_RESPONSE, row.cell_ref("value"))),
                "value is empty, please specify it",
            );
            MISSING_VALUE_PLACEHOLDER.to_string()
        }
    };

    let response_type = row
        .get("type")
        .as_trimmed_text()
        .unwrap_or_default()
        .to_lowercase();
    if response_type != "key" && response_type != "button" {
        diagnostics.error(
            DiagnosticCode::InvalidResponseType,
            Some(Location::cell(WS_RESPONSE, row.cell_ref("type"))),
            format!("type=\"{response_type}\" is unknown, only \"key\" and \"button\" are supported"),
        );
        return None;
    }

    let name = name?;
    if exp.response(&name).is_some() {
        diagnostics.error(
            DiagnosticCode::DuplicateResponseId,
            name_location,
            format!("response name=\"{name}\" was defined twice, this is invalid"),
        );
        return None;
    }

    if response_type == "key" {
        let key = parse_key(sheet, row, used_keys, diagnostics);
        Some(Response::Key { name, value, key })
    } else {
        let text = parse_button_text(sheet, row, diagnostics);
        Some(Response::Button { name, value, text })
    }
}

fn parse_key(
    sheet: &Sheet,
    row: SheetRow<'_>,
    used_keys: &mut Vec<String>,
    diagnostics: &mut Diagnostics,
) -> String {
    if !sheet.has_column("key") {
        if !diagnostics.contains(DiagnosticCode::MissingKbResponseKeyCol) {
            diagnostics.error(
                DiagnosticCode::MissingKbResponseKeyCol,
                Some(Location::sheet(WS_RESPONSE)),
                "column \"key\" was not specified, but it must exist for keyboard responses",
            );
        }
        return String::new();
    }

    let location = Some(Location::cell(WS_RESPONSE, row.cell_ref("key")));
    let Some(key) = row.get("key").as_text().filter(|key| !key.is_empty()) else {
        diagnostics.error(
            DiagnosticCode::MissingKbResponseKey,
            location,
            "key was not specified, please specify it",
        );
        return String::new();
    };
    let key = normalize_key(&key);

    let lowered = key.to_lowercase();
    if used_keys.contains(&lowered) {
        diagnostics.error(
            DiagnosticCode::DuplicateResponseKey,
            location,
            format!("key=\"{}\" was used in more than one response", display_key(&key)),
        );
    } else {
        used_keys.push(lowered);
    }
    key
}

/// Maps the worksheet spelling of a key to what jsPsych expects.
///
/// A literal space cell is kept as is; `space` names the space bar.
fn normalize_key(key: &str) -> String {
    if key.trim().is_empty() {
        return " ".to_string();
    }
    let key = key.trim();
    if key.eq_ignore_ascii_case("space") {
        " ".to_string()
    } else {
        key.to_string()
    }
}

fn display_key(key: &str) -> &str {
    if key == " " {
        "space"
    } else {
        key
    }
}

fn parse_button_text(sheet: &Sheet, row: SheetRow<'_>, diagnostics: &mut Diagnostics) -> String {
    if !sheet.has_column("text") {
        if !diagnostics.contains(DiagnosticCode::MissingButtonResponseTextCol) {
            diagnostics.error(
                DiagnosticCode::MissingButtonResponseTextCol,
                Some(Location::sheet(WS_RESPONSE)),
                "column \"text\" was not specified, but it must exist for button responses",
            );
        }
        return MISSING_TEXT_PLACEHOLDER.to_string();
    }
    row.get("text").as_text().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{display_key, normalize_key};

    #[test]
    fn space_is_spelled_out_in_the_sheet() {
        assert_eq!(normalize_key("space"), " ");
        assert_eq!(normalize_key("SPACE"), " ");
        assert_eq!(normalize_key(" "), " ");
        assert_eq!(normalize_key(" f "), "f");
        assert_eq!(display_key(" "), "space");
    }
}
