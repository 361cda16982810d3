//! `layout` worksheet: one on-screen control per row.

use super::values::{is_valid_name, parse_coord, CoordError};
use super::{report_excessive_columns, require_columns, CSS_PREFIX};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::{Experiment, Position, TextControl};
use crate::reader::WS_LAYOUT;
use crate::workbook::{Sheet, SheetRow};

const FIXED_COLUMNS: &[&str] = &[
    "layout_name",
    "type",
    "text",
    "left",
    "top",
    "width",
    "height",
    "position",
];

pub(super) fn parse(sheet: &Sheet, exp: &mut Experiment, diagnostics: &mut Diagnostics) {
    if sheet.is_empty() {
        diagnostics.error(
            DiagnosticCode::NoControls,
            Some(Location::sheet(WS_LAYOUT)),
            "the worksheet is empty",
        );
        return;
    }
    if !require_columns(
        sheet,
        WS_LAYOUT,
        &["layout_name", "type"],
        "All layout items were ignored.",
        diagnostics,
    ) {
        return;
    }

    report_excessive_columns(sheet, WS_LAYOUT, is_layout_column, diagnostics);

    for row in sheet.rows() {
        if let Some(control) = parse_control(sheet, row, exp, diagnostics) {
            exp.layout.push(control);
        }
    }
}

fn is_layout_column(lowered: &str) -> bool {
    FIXED_COLUMNS.contains(&lowered) || css_property(lowered).is_some()
}

/// CSS property named by a `format:<property>` column.
fn css_property(column: &str) -> Option<String> {
    let lowered = column.to_lowercase();
    let property = lowered.strip_prefix(CSS_PREFIX)?.trim();
    (!property.is_empty()).then(|| property.to_string())
}

fn parse_control(
    sheet: &Sheet,
    row: SheetRow<'_>,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Option<TextControl> {
    let name_location = Some(Location::cell(WS_LAYOUT, row.cell_ref("layout_name")));
    let name = row.get("layout_name").as_trimmed_text().unwrap_or_default();
    if !is_valid_name(&name) {
        diagnostics.error(
            DiagnosticCode::InvalidControlName,
            name_location,
            format!(
                "layout item name \"{name}\" is invalid - only letters, digits, and _ are allowed in the name. This line was ignored."
            ),
        );
        return None;
    }

    let control_type = row
        .get("type")
        .as_trimmed_text()
        .unwrap_or_default()
        .to_lowercase();
    if control_type != "text" {
        diagnostics.error(
            DiagnosticCode::InvalidControlType,
            Some(Location::cell(WS_LAYOUT, row.cell_ref("type"))),
            format!("type=\"{control_type}\" is unknown, only \"text\" is supported"),
        );
        return None;
    }

    if exp.control(&name).is_some() {
        diagnostics.error(
            DiagnosticCode::DuplicateControlName,
            name_location,
            format!(
                "a layout item named \"{name}\" was already defined in a previous line. This line was ignored."
            ),
        );
        return None;
    }

    Some(parse_text_control(sheet, row, name, diagnostics))
}

fn parse_text_control(
    sheet: &Sheet,
    row: SheetRow<'_>,
    name: String,
    diagnostics: &mut Diagnostics,
) -> TextControl {
    let mut control = TextControl::new(name);

    if let Some(text) = row.get("text").as_text() {
        control.text = text;
    }

    if let Some(left) = coord(sheet, row, "left", false, diagnostics) {
        control.frame.left = left;
    }
    if let Some(top) = coord(sheet, row, "top", false, diagnostics) {
        control.frame.top = top;
    }
    if let Some(width) = coord(sheet, row, "width", false, diagnostics) {
        control.frame.width = width;
    }
    control.frame.height = coord(sheet, row, "height", true, diagnostics);

    if let Some(value) = row.get("position").as_trimmed_text() {
        match Position::parse(&value) {
            Some(position) => control.frame.position = position,
            None => diagnostics.error(
                DiagnosticCode::InvalidPosition,
                Some(Location::cell(WS_LAYOUT, row.cell_ref("position"))),
                format!(
                    "position=\"{value}\" is invalid; expecting \"absolute\", \"relative\" or \"fixed\""
                ),
            ),
        }
    }

    for (index, column) in sheet.columns().iter().enumerate() {
        let Some(property) = css_property(column) else {
            continue;
        };
        if let Some(value) = row.at(index).as_trimmed_text() {
            control.css.insert(property, value);
        }
    }

    if control.frame.position == Position::Relative
        && (control.frame.top.ends_with('%') || control.frame.left.ends_with('%'))
    {
        diagnostics.warning(
            DiagnosticCode::PositionMismatchesTopOrLeft,
            Some(Location::line(WS_LAYOUT, row.line())),
            format!(
                "layout item \"{}\" has a relative position but its top/left are percentages; the item may be misplaced",
                control.name
            ),
        );
    }

    control
}

/// Reads one coordinate column. `None` means "keep the default".
fn coord(
    sheet: &Sheet,
    row: SheetRow<'_>,
    column: &str,
    optional: bool,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    if !sheet.has_column(column) {
        return None;
    }
    let location = Some(Location::cell(WS_LAYOUT, row.cell_ref(column)));
    match parse_coord(row.get(column)) {
        Ok(value) => Some(value),
        Err(CoordError::Empty) if optional => None,
        Err(CoordError::Empty) => {
            diagnostics.error(
                DiagnosticCode::EmptyCoord,
                location,
                format!(
                    "column \"{column}\": empty value is invalid, expecting a coordinate (a number with either \"%\" or \"px\" after it)"
                ),
            );
            None
        }
        Err(CoordError::Invalid(value)) => {
            diagnostics.error(
                DiagnosticCode::InvalidCoord,
                location,
                format!(
                    "column \"{column}\": the value \"{value}\" is invalid, expecting a coordinate (a number with either \"%\" or \"px\" after it)"
                ),
            );
            None
        }
    }
}
