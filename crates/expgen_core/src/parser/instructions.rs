//! `instructions` worksheet: one instruction page per row.

use super::values::{dedup_names, split_names};
use crate::diagnostics::{DiagnosticCode, Diagnostics, Location};
use crate::model::{Experiment, Instruction};
use crate::reader::WS_INSTRUCTIONS;
use crate::workbook::{Sheet, SheetRow};

pub(super) fn parse(
    sheet: Option<&Sheet>,
    mandatory: bool,
    exp: &mut Experiment,
    diagnostics: &mut Diagnostics,
) {
    let Some(sheet) = sheet.filter(|sheet| !sheet.is_empty()) else {
        if mandatory {
            diagnostics.warning(
                DiagnosticCode::NoInstructions,
                None,
                "no instructions were defined for this experiment",
            );
        }
        return;
    };

    let mut columns_ok = true;
    if !sheet.has_column("text") {
        diagnostics.error(
            DiagnosticCode::InstructionsMissingTextCol,
            Some(Location::sheet(WS_INSTRUCTIONS)),
            "column \"text\" is missing. All instructions were ignored.",
        );
        columns_ok = false;
    }
    if !sheet.has_column("responses") {
        diagnostics.error(
            DiagnosticCode::InstructionsMissingResponseCol,
            Some(Location::sheet(WS_INSTRUCTIONS)),
            "column \"responses\" is missing. All instructions were ignored.",
        );
        columns_ok = false;
    }
    if !columns_ok {
        return;
    }

    for row in sheet.rows() {
        if let Some(instruction) = parse_instruction(row, exp, diagnostics) {
            exp.instructions.push(instruction);
        }
    }
}

fn parse_instruction(
    row: SheetRow<'_>,
    exp: &Experiment,
    diagnostics: &mut Diagnostics,
) -> Option<Instruction> {
    let text = row.get("text").as_text().filter(|text| !text.trim().is_empty());
    if text.is_none() {
        diagnostics.error(
            DiagnosticCode::InstructionTextMissing,
            Some(Location::cell(WS_INSTRUCTIONS, row.cell_ref("text"))),
            "the instruction text is empty",
        );
    }

    let location = Some(Location::cell(WS_INSTRUCTIONS, row.cell_ref("responses")));
    let names: Vec<String> = row
        .get("responses")
        .as_text()
        .map(|list| split_names(&list.to_lowercase()))
        .unwrap_or_default();
    if names.is_empty() {
        diagnostics.error(
            DiagnosticCode::InstructionsMustDefineResponse,
            location,
            "an instruction page must define at least one response",
        );
        return None;
    }

    let (names, had_duplicates) = dedup_names(names);
    if had_duplicates {
        diagnostics.warning(
            DiagnosticCode::InstructionDuplicateResponses,
            location.clone(),
            "some responses were specified more than once (the duplicates were ignored)",
        );
    }

    let (known, unknown): (Vec<String>, Vec<String>) =
        names.into_iter().partition(|name| exp.response(name).is_some());
    if !unknown.is_empty() {
        diagnostics.error(
            DiagnosticCode::InstructionInvalidResponseNames,
            location.clone(),
            format!(
                "the response/s \"{}\" were not defined in the \"response\" worksheet",
                unknown.join(",")
            ),
        );
    }
    if known.is_empty() {
        return None;
    }

    if exp.response_kinds(&known).len() > 1 {
        diagnostics.error(
            DiagnosticCode::InstructionsWithMultipleResponseTypes,
            location,
            format!(
                "the response/s \"{}\" mix keyboard and button responses, which is not supported on instruction pages",
                known.join(",")
            ),
        );
        return None;
    }

    Some(Instruction {
        text: text?,
        response_names: known,
    })
}
