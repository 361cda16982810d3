//! `trials` worksheet: one trial per row.
//!
//! Column kinds: `type`, a layout item name (its text in this trial),
//! `save:<name>` (copied to the results file) and
//! `format:<item>.<css-property>` (trial-specific CSS).

use super::CSS_PREFIX;
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::{Experiment, Trial, TrialType};
use crate::reader::{WS_TRIALS, WS_TRIAL_TYPE};
use crate::workbook::{Sheet, SheetRow};
use once_cell::sync::Lazy;
use regex::Regex;

const SAVE_PREFIX: &str = "save:";

static FORMAT_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^format:([^.]+)\.(.+)$").expect("valid format column regex"));

/// Meaning of one `trials` column, resolved once per sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TrialColumn {
    TrialType,
    Control(String),
    Save(String),
    Format { control: String, property: String },
    Ignored,
}

pub(super) fn parse(sheet: &Sheet, exp: &mut Experiment, diagnostics: &mut Diagnostics) {
    if exp.trial_types.is_empty() {
        diagnostics.info(
            DiagnosticCode::TrialsIgnored,
            None,
            "all trials were ignored because no trial types are defined",
        );
        return;
    }
    if sheet.is_empty() {
        diagnostics.error(
            DiagnosticCode::NoTrials,
            Some(Location::sheet(WS_TRIALS)),
            "no trials were specified",
        );
        return;
    }
    if !sheet.has_column("type") && exp.trial_types.len() > 1 {
        diagnostics.error(
            DiagnosticCode::NoTypeInTrialsWs,
            Some(Location::sheet(WS_TRIALS)),
            "when there is more than one trial type, you must specify the \"type\" column in this worksheet to indicate the type of each trial",
        );
        return;
    }

    let columns = classify_columns(sheet, exp, diagnostics);
    for row in sheet.rows() {
        if let Some(trial) = parse_trial(sheet, row, &columns, exp, diagnostics) {
            exp.trials.push(trial);
        }
    }
}

fn classify_columns(
    sheet: &Sheet,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Vec<TrialColumn> {
    sheet
        .columns()
        .iter()
        .enumerate()
        .map(|(index, title)| classify_column(sheet, index, title, exp, diagnostics))
        .collect()
}

fn classify_column(
    sheet: &Sheet,
    index: usize,
    title: &str,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> TrialColumn {
    if title.is_empty() {
        return TrialColumn::Ignored;
    }
    if title.eq_ignore_ascii_case("type") {
        return TrialColumn::TrialType;
    }
    let location = Some(Location::column(WS_TRIALS, sheet.column_letter(index)));

    if let Some(saved_name) = strip_prefix_ignore_case(title, SAVE_PREFIX) {
        let saved_name = saved_name.trim();
        if saved_name.is_empty() {
            diagnostics.error(
                DiagnosticCode::TrialsInvalidSaveCol,
                location,
                "a column named \"save:\" is invalid, you must write something after the \"save:\" (e.g., \"save:xyz\" if you want column \"xyz\" to appear in the output file)",
            );
            return TrialColumn::Ignored;
        }
        return TrialColumn::Save(saved_name.to_string());
    }

    if let Some(captures) = FORMAT_COLUMN_RE.captures(title) {
        let control_name = captures[1].trim();
        let property = captures[2].trim().to_lowercase();
        return match exp.control(control_name) {
            Some(control) => TrialColumn::Format {
                control: control.name.clone(),
                property,
            },
            None => {
                diagnostics.error(
                    DiagnosticCode::TrialsUnknownControl,
                    location,
                    format!("there is no layout item named \"{control_name}\""),
                );
                TrialColumn::Ignored
            }
        };
    }

    if let Some(control) = exp.control(title) {
        return TrialColumn::Control(control.name.clone());
    }

    let message = if strip_prefix_ignore_case(title, CSS_PREFIX).is_some() {
        format!(
            "column name \"{title}\" is invalid. To specify the formatting of a layout item, the column name should be {CSS_PREFIX}LLL.CCC, where LLL is the layout item name and CCC is the formatting (CSS) property"
        )
    } else {
        format!(
            "column name \"{title}\" is invalid and was ignored. Use a layout item name, {CSS_PREFIX}LLL.CCC for trial-specific formatting, or {SAVE_PREFIX}CCC to save a value to the results file"
        )
    };
    diagnostics.warning(DiagnosticCode::TrialsInvalidColName, location, message);
    TrialColumn::Ignored
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

fn parse_trial(
    sheet: &Sheet,
    row: SheetRow<'_>,
    columns: &[TrialColumn],
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Option<Trial> {
    let trial_type = resolve_trial_type(sheet, row, exp, diagnostics)?;
    let mut trial = Trial::new(trial_type.name.clone());

    for (index, column) in columns.iter().enumerate() {
        let cell = row.at(index);
        match column {
            TrialColumn::TrialType | TrialColumn::Ignored => {}
            TrialColumn::Control(control) => {
                if cell.is_blank() || !trial_type.uses_control(control) {
                    continue;
                }
                if let Some(text) = cell.as_text() {
                    trial.control_values.insert(control.clone(), text);
                }
            }
            TrialColumn::Save(name) => {
                if !cell.is_blank() {
                    trial.save_values.insert(name.clone(), cell.to_json());
                }
            }
            TrialColumn::Format { control, property } => {
                let Some(value) = cell.as_trimmed_text() else {
                    continue;
                };
                if trial_type.uses_control(control) {
                    trial.add_css(control, property, value);
                } else {
                    diagnostics.error(
                        DiagnosticCode::TrialsCssTrialtypeMismatch,
                        Some(Location::cell(WS_TRIALS, row.cell_ref_at(index))),
                        format!(
                            "layout item \"{control}\" is inactive for trials of type \"{}\"",
                            trial_type.name
                        ),
                    );
                }
            }
        }
    }

    Some(trial)
}

fn resolve_trial_type<'e>(
    sheet: &Sheet,
    row: SheetRow<'_>,
    exp: &'e Experiment,
    diagnostics: &mut Diagnostics,
) -> Option<&'e TrialType> {
    if !sheet.has_column("type") {
        return exp.trial_types.first();
    }

    let Some(type_name) = row.get("type").as_trimmed_text() else {
        diagnostics.error(
            DiagnosticCode::TrialsNoTrialType,
            Some(Location::cell(WS_TRIALS, row.cell_ref("type"))),
            "trial type was not specified. This trial was ignored.",
        );
        return None;
    };

    let trial_type = exp.trial_type(&type_name);
    if trial_type.is_none() {
        diagnostics.error(
            DiagnosticCode::TrialsInvalidTrialType,
            Some(Location::line(WS_TRIALS, row.line())),
            format!(
                "trial type \"{type_name}\" was not defined in worksheet \"{WS_TRIAL_TYPE}\". This trial was ignored."
            ),
        );
    }
    trial_type
}

#[cfg(test)]
mod tests {
    use super::FORMAT_COLUMN_RE;

    #[test]
    fn format_columns_split_item_and_property() {
        let captures = FORMAT_COLUMN_RE
            .captures("Format:target.font-size")
            .expect("format column");
        assert_eq!(&captures[1], "target");
        assert_eq!(&captures[2], "font-size");
        assert!(FORMAT_COLUMN_RE.captures("format:color").is_none());
    }
}
