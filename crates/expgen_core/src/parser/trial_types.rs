//! `trial_type` worksheet: each row is one step of a trial type.

use super::values::{check_non_negative, dedup_names, is_valid_name, split_names, NumberCheck};
use super::{report_excessive_columns, require_columns};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::{Experiment, TrialStep, TrialType};
use crate::reader::{WS_LAYOUT, WS_RESPONSE, WS_TRIAL_TYPE};
use crate::workbook::{Sheet, SheetRow};

const KNOWN_COLUMNS: &[&str] = &[
    "type",
    "layout items",
    "responses",
    "duration",
    "delay-before",
    "delay-after",
];

pub(super) fn parse(sheet: &Sheet, exp: &mut Experiment, diagnostics: &mut Diagnostics) {
    if sheet.is_empty() {
        diagnostics.error(
            DiagnosticCode::NoTrialTypes,
            Some(Location::sheet(WS_TRIAL_TYPE)),
            "no trial types were specified",
        );
        return;
    }
    if !require_columns(
        sheet,
        WS_TRIAL_TYPE,
        &["layout items"],
        "All trial types were ignored.",
        diagnostics,
    ) {
        return;
    }

    report_excessive_columns(
        sheet,
        WS_TRIAL_TYPE,
        |column| KNOWN_COLUMNS.contains(&column),
        diagnostics,
    );

    let mut last_type_name: Option<String> = None;
    for row in sheet.rows() {
        let Some(type_name) = step_type_name(sheet, row, last_type_name.as_deref(), diagnostics)
        else {
            continue;
        };
        let num = exp
            .trial_type(&type_name)
            .map(TrialType::next_step_num)
            .unwrap_or(1);

        let Some(step) = parse_step(sheet, row, num, exp, diagnostics) else {
            continue;
        };

        match exp.trial_type_mut(&type_name) {
            Some(trial_type) => trial_type.steps.push(step),
            None => {
                let mut trial_type = TrialType::new(type_name.clone());
                trial_type.steps.push(step);
                exp.trial_types.push(trial_type);
            }
        }
        last_type_name = Some(type_name);
    }
}

fn step_type_name(
    sheet: &Sheet,
    row: SheetRow<'_>,
    last_type_name: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    if !sheet.has_column("type") {
        return Some(TrialType::DEFAULT_NAME.to_string());
    }

    let location = Some(Location::cell(WS_TRIAL_TYPE, row.cell_ref("type")));
    let type_name = match (row.get("type").as_trimmed_text(), last_type_name) {
        (Some(name), _) => name,
        (None, Some(previous)) => {
            diagnostics.warning(
                DiagnosticCode::TrialTypeMissing,
                location.clone(),
                format!(
                    "\"type\" was not specified. Assuming this step belongs to the last specified trial type ({previous})."
                ),
            );
            previous.to_string()
        }
        (None, None) => {
            diagnostics.error(
                DiagnosticCode::TrialTypeMissing,
                location.clone(),
                format!(
                    "\"type\" was not specified. Type=\"{}\" will be used, but this is invalid.",
                    TrialType::DEFAULT_NAME
                ),
            );
            TrialType::DEFAULT_NAME.to_string()
        }
    };

    if type_name.eq_ignore_ascii_case("type") || !is_valid_name(&type_name) {
        diagnostics.error(
            DiagnosticCode::TrialTypeInvalidTypeName,
            location,
            format!(
                "a trial type named \"{type_name}\" is invalid - only letters, digits, and _ are allowed. This step was ignored."
            ),
        );
        return None;
    }
    Some(type_name)
}

fn parse_step(
    sheet: &Sheet,
    row: SheetRow<'_>,
    num: u32,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Option<TrialStep> {
    let control_names = step_controls(row, exp, diagnostics);
    let response_names = step_responses(sheet, row, exp, diagnostics);

    let duration = millis(sheet, row, "duration", false, diagnostics);
    let delay_before = millis(sheet, row, "delay-before", true, diagnostics).unwrap_or(0.0);
    let delay_after = millis(sheet, row, "delay-after", true, diagnostics).unwrap_or(0.0);

    if response_names.is_empty() && duration.is_none() {
        diagnostics.error(
            DiagnosticCode::MustDefineResponseOrDuration,
            Some(Location::line(WS_TRIAL_TYPE, row.line())),
            "an unlimited-time step without response is invalid. Either \"duration\" or \"responses\" must be defined.",
        );
    }

    Some(TrialStep {
        num,
        control_names: control_names?,
        response_names,
        duration,
        delay_before,
        delay_after,
    })
}

/// Layout items of one step, canonicalized to their layout spelling.
/// `None` when no usable item remains.
fn step_controls(
    row: SheetRow<'_>,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<String>> {
    let location = Some(Location::cell(WS_TRIAL_TYPE, row.cell_ref("layout items")));
    let names = row
        .get("layout items")
        .as_text()
        .map(|list| split_names(&list))
        .unwrap_or_default();
    if names.is_empty() {
        diagnostics.error(
            DiagnosticCode::TrialTypeNoFields,
            location,
            "no value was specified in the \"layout items\" column. This step was ignored.",
        );
        return None;
    }

    let (names, had_duplicates) = dedup_names(names);
    if had_duplicates {
        diagnostics.warning(
            DiagnosticCode::TrialTypeDuplicateControls,
            location.clone(),
            "some layout items were specified more than once. The duplicates were ignored.",
        );
    }

    let mut controls: Vec<String> = Vec::new();
    let mut unknown: Vec<String> = Vec::new();
    for name in names {
        match exp.control(&name) {
            Some(control) if !controls.contains(&control.name) => {
                controls.push(control.name.clone())
            }
            Some(_) => {}
            None => unknown.push(name),
        }
    }
    if !unknown.is_empty() {
        diagnostics.error(
            DiagnosticCode::TrialTypeInvalidControlNames,
            location,
            format!(
                "the layout item/s \"{}\" were not specified in the \"{WS_LAYOUT}\" worksheet. They were ignored.",
                unknown.join(",")
            ),
        );
    }

    (!controls.is_empty()).then_some(controls)
}

fn step_responses(
    sheet: &Sheet,
    row: SheetRow<'_>,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    if !sheet.has_column("responses") {
        return Vec::new();
    }
    let location = Some(Location::cell(WS_TRIAL_TYPE, row.cell_ref("responses")));
    let names = row
        .get("responses")
        .as_text()
        .map(|list| split_names(&list.to_lowercase()))
        .unwrap_or_default();
    if names.is_empty() {
        return names;
    }

    let (names, had_duplicates) = dedup_names(names);
    if had_duplicates {
        diagnostics.warning(
            DiagnosticCode::TrialTypeDuplicateResponses,
            location.clone(),
            "some responses were specified more than once (the duplicates were ignored)",
        );
    }

    let (known, unknown): (Vec<String>, Vec<String>) =
        names.into_iter().partition(|name| exp.response(name).is_some());
    if !unknown.is_empty() {
        diagnostics.error(
            DiagnosticCode::TrialTypeInvalidResponseNames,
            location.clone(),
            format!(
                "the response/s \"{}\" were not specified in the \"{WS_RESPONSE}\" worksheet. They were ignored.",
                unknown.join(",")
            ),
        );
    }

    if exp.response_kinds(&known).len() > 1 {
        diagnostics.warning(
            DiagnosticCode::TrialTypeMultipleResponseTypes,
            location,
            format!(
                "the response/s \"{}\" are of several types. Normally, all responses in a single step are of the same type.",
                known.join(",")
            ),
        );
    }
    known
}

/// Reads an optional millisecond column; invalid values fall back to `None`.
fn millis(
    sheet: &Sheet,
    row: SheetRow<'_>,
    column: &str,
    zero_allowed: bool,
    diagnostics: &mut Diagnostics,
) -> Option<f64> {
    if !sheet.has_column(column) {
        return None;
    }
    let location = Some(Location::cell(WS_TRIAL_TYPE, row.cell_ref(column)));
    let expected = if zero_allowed { "non-negative" } else { "positive" };
    match check_non_negative(row.get(column), zero_allowed) {
        NumberCheck::Missing => None,
        NumberCheck::Value(value) => Some(value),
        NumberCheck::NonNumeric(text) => {
            diagnostics.error(
                DiagnosticCode::NonNumericValue,
                location,
                format!(
                    "column \"{column}\": the value \"{text}\" is invalid (expecting a {expected} number)"
                ),
            );
            None
        }
        NumberCheck::OutOfRange(value) => {
            diagnostics.error(
                DiagnosticCode::InvalidNumericValue,
                location,
                format!(
                    "column \"{column}\": the value \"{value}\" is invalid (expecting a {expected} number)"
                ),
            );
            None
        }
    }
}
