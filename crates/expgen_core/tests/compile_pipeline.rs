mod common;

use common::{stroop_workbook, workbook};
use expgen_core::{
    check, compile, compile_workbook, CompileError, CompileOptions, CompileStatus, WorkbookError,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_source(dir: &TempDir, value: &Value) -> PathBuf {
    let path = dir.path().join("experiment.json");
    fs::write(&path, value.to_string()).unwrap();
    path
}

#[test]
fn clean_workbook_compiles_to_a_page() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, &stroop_workbook());
    let target = dir.path().join("stroop.html");

    let report = compile(&source, &target, &CompileOptions::default()).unwrap();

    assert_eq!(report.status, CompileStatus::Success);
    assert_eq!(report.status.exit_code(), 0);
    let page = fs::read_to_string(&target).unwrap();
    assert_eq!(Some(&page), report.page.as_ref());
    assert!(page.contains("<title>Stroop</title>"));
}

#[test]
fn warnings_still_write_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut value = stroop_workbook();
    value["general"]
        .as_array_mut()
        .unwrap()
        .push(json!({"param": "theme", "value": "dark"}));
    let source = write_source(&dir, &value);
    let target = dir.path().join("stroop.html");

    let report = compile(&source, &target, &CompileOptions::default()).unwrap();

    assert_eq!(report.status, CompileStatus::Warnings);
    assert_eq!(report.status.exit_code(), 53);
    assert!(target.exists());
}

#[test]
fn errors_leave_the_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut value = stroop_workbook();
    value["trials"] = json!([]);
    let source = write_source(&dir, &value);
    let target = dir.path().join("stroop.html");
    fs::write(&target, "previous build").unwrap();

    let report = compile(&source, &target, &CompileOptions::default()).unwrap();

    assert_eq!(report.status, CompileStatus::Failed);
    assert_eq!(report.status.exit_code(), 2);
    assert!(report.page.is_none());
    assert_eq!(report.diagnostics.codes(), vec!["NO_TRIALS"]);
    assert_eq!(fs::read_to_string(&target).unwrap(), "previous build");
}

#[test]
fn invalid_structure_fails_without_an_experiment() {
    let mut value = stroop_workbook();
    value.as_object_mut().unwrap().remove("general");

    let report = compile_workbook(&workbook(&value), &CompileOptions::default());

    assert_eq!(report.status, CompileStatus::Failed);
    assert!(report.experiment.is_none());
    assert!(report.page.is_none());
}

#[test]
fn missing_source_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("absent.xlsx");
    let target = dir.path().join("out.html");

    let err = compile(&source, &target, &CompileOptions::default()).unwrap_err();

    assert!(matches!(err, CompileError::Workbook(WorkbookError::NotFound(_))));
    assert_eq!(err.status(), CompileStatus::Failed);
    assert!(!target.exists());
}

#[test]
fn check_parses_without_generating() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_source(&dir, &stroop_workbook());

    let report = check(&source, &CompileOptions::default()).unwrap();

    assert_eq!(report.status, CompileStatus::Success);
    assert!(report.page.is_none());
    assert_eq!(report.experiment.unwrap().trials.len(), 2);
}
