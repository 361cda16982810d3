//! Picks the experiment worksheets out of a workbook.
//!
//! # Responsibility
//! - Locate the known worksheets by name.
//! - Reject workbooks that miss a mandatory worksheet or that repeat a
//!   column title inside a known worksheet.

use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::workbook::{Sheet, Workbook};

pub const WS_GENERAL: &str = "general";
pub const WS_LAYOUT: &str = "layout";
pub const WS_RESPONSE: &str = "response";
pub const WS_INSTRUCTIONS: &str = "instructions";
pub const WS_TRIAL_TYPE: &str = "trial_type";
pub const WS_TRIALS: &str = "trials";

const KNOWN_WORKSHEETS: &[&str] = &[
    WS_GENERAL,
    WS_LAYOUT,
    WS_RESPONSE,
    WS_INSTRUCTIONS,
    WS_TRIAL_TYPE,
    WS_TRIALS,
];
const MANDATORY_WORKSHEETS: &[&str] = &[WS_GENERAL, WS_LAYOUT, WS_TRIALS];

/// The worksheets of one experiment; absent optional sheets are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentSheets {
    pub general: Option<Sheet>,
    pub layout: Option<Sheet>,
    pub response: Option<Sheet>,
    pub instructions: Option<Sheet>,
    pub trial_type: Option<Sheet>,
    pub trials: Option<Sheet>,
}

/// Validates the workbook structure and extracts the known worksheets.
///
/// Returns `None` when the structure is invalid; the reasons are recorded
/// in `diagnostics`.
pub fn read_sheets(workbook: &Workbook, diagnostics: &mut Diagnostics) -> Option<ExperimentSheets> {
    let mut ok = true;

    for name in MANDATORY_WORKSHEETS {
        if workbook.sheet(name).is_none() {
            diagnostics.error(
                DiagnosticCode::MissingWorksheetInConfig,
                None,
                format!("Invalid experiment file: worksheet \"{name}\" is missing"),
            );
            ok = false;
        }
    }

    for name in KNOWN_WORKSHEETS {
        let Some(sheet) = workbook.sheet(name) else {
            continue;
        };
        let duplicates = sheet.duplicate_columns();
        if !duplicates.is_empty() {
            diagnostics.error(
                DiagnosticCode::DuplicateColNames,
                Some(Location::sheet(name)),
                format!("some columns appear twice ({})", duplicates.join(",")),
            );
            ok = false;
        }
    }

    if !ok {
        return None;
    }

    let take = |name: &str| workbook.sheet(name).cloned();
    Some(ExperimentSheets {
        general: take(WS_GENERAL),
        layout: take(WS_LAYOUT),
        response: take(WS_RESPONSE),
        instructions: take(WS_INSTRUCTIONS),
        trial_type: take(WS_TRIAL_TYPE),
        trials: take(WS_TRIALS),
    })
}

#[cfg(test)]
mod tests {
    use super::read_sheets;
    use crate::diagnostics::{DiagnosticCode, Diagnostics};
    use crate::workbook::Workbook;
    use serde_json::json;

    #[test]
    fn missing_mandatory_sheets_are_all_reported() {
        let workbook = Workbook::from_json_value(&json!({"layout": []})).expect("workbook");
        let mut diagnostics = Diagnostics::new();

        assert!(read_sheets(&workbook, &mut diagnostics).is_none());
        assert_eq!(
            diagnostics.codes(),
            vec!["MISSING_WORKSHEET_IN_CONFIG", "MISSING_WORKSHEET_IN_CONFIG"]
        );
    }

    #[test]
    fn duplicate_titles_in_known_sheet_fail() {
        let workbook = Workbook::from_json_value(&json!({
            "general": [],
            "layout": [],
            "trials": [],
            "trial_type": []
        }))
        .expect("workbook");
        let dup = crate::workbook::Sheet::new(
            "trial_type",
            vec!["type".into(), "TYPE".into()],
            vec![],
        );
        let mut sheets: Vec<_> = workbook
            .sheets()
            .iter()
            .filter(|s| s.name() != "trial_type")
            .cloned()
            .collect();
        sheets.push(dup);
        let workbook = Workbook::from_sheets(sheets);

        let mut diagnostics = Diagnostics::new();
        assert!(read_sheets(&workbook, &mut diagnostics).is_none());
        assert!(diagnostics.contains(DiagnosticCode::DuplicateColNames));
    }

    #[test]
    fn unknown_sheets_are_ignored_and_names_are_case_insensitive() {
        let workbook = Workbook::from_json_value(&json!({
            "General": [],
            "LAYOUT": [],
            "trials": [],
            "notes": []
        }))
        .expect("workbook");
        let mut diagnostics = Diagnostics::new();

        let sheets = read_sheets(&workbook, &mut diagnostics).expect("valid structure");
        assert!(diagnostics.is_empty());
        assert!(sheets.general.is_some());
        assert!(sheets.layout.is_some());
        assert!(sheets.response.is_none());
    }
}
