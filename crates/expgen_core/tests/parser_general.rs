mod common;

use common::{codes, parse, stroop_workbook};
use expgen_core::diagnostics::Position;
use expgen_core::Severity;
use serde_json::json;

#[test]
fn stroop_workbook_parses_without_diagnostics() {
    let outcome = parse(&stroop_workbook());

    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
    let exp = outcome.experiment.unwrap();
    assert_eq!(exp.title, "Stroop");
    assert!(exp.get_subj_id);
    assert!(!exp.get_session_id);
    assert!(exp.save_results);
    assert!(!exp.full_screen);
    assert_eq!(exp.results_filename, "stroop_${subj_id}_${date}.csv");
    assert_eq!(exp.rt_offset, 0.0);
    assert!(exp.background_color.is_none());
}

#[test]
fn first_value_of_a_repeated_param_wins() {
    let mut value = stroop_workbook();
    value["general"] = json!([
        {"param": "title", "value": "First"},
        {"param": "Title", "value": "Second"},
        {"param": "colour", "value": "red"}
    ]);

    let outcome = parse(&value);

    assert_eq!(codes(&outcome), vec!["MULTIPLE_PARAM_VALUES", "UNKNOWN_PARAM"]);
    assert_eq!(outcome.diagnostics.count(Severity::Error), 1);
    assert_eq!(outcome.experiment.unwrap().title, "First");
}

#[test]
fn invalid_bool_param_points_at_its_cell() {
    let mut value = stroop_workbook();
    value["general"] = json!([
        {"param": "get_session_id", "value": "maybe"},
        {"param": "full_screen", "value": true}
    ]);

    let outcome = parse(&value);

    assert_eq!(codes(&outcome), vec!["INVALID_BOOL_PARAM"]);
    let diagnostic = outcome.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.location.as_ref().unwrap().position, Position::Cell("B2".to_string()));
    assert!(diagnostic
        .to_string()
        .starts_with("Error in worksheet \"general\", cell B2: the value of parameter \"get_session_id\""));

    let exp = outcome.experiment.unwrap();
    assert!(!exp.get_session_id);
    assert!(exp.full_screen);
}

#[test]
fn empty_bool_value_means_no() {
    let mut value = stroop_workbook();
    value["general"] = json!([
        {"param": "save_results", "value": null},
        {"param": "title", "value": "T"}
    ]);

    let outcome = parse(&value);

    assert!(outcome.diagnostics.is_empty());
    assert!(!outcome.experiment.unwrap().save_results);
}

#[test]
fn invalid_filename_prefix_falls_back_to_results() {
    let mut value = stroop_workbook();
    value["general"] = json!([
        {"param": "results_filename_prefix", "value": "my results"},
        {"param": "get_session_id", "value": "yes"}
    ]);

    let outcome = parse(&value);

    assert_eq!(codes(&outcome), vec!["INVALID_FILENAME_PREFIX"]);
    assert_eq!(
        outcome.experiment.unwrap().results_filename,
        "results_${session_id}_${date}.csv"
    );
}

#[test]
fn unusual_background_color_is_only_a_warning() {
    let mut value = stroop_workbook();
    value["general"] = json!([{"param": "background_color", "value": "blackish"}]);

    let outcome = parse(&value);

    assert_eq!(codes(&outcome), vec!["INVALID_COLOR"]);
    assert!(!outcome.has_errors());
    assert_eq!(
        outcome.experiment.unwrap().background_color.as_deref(),
        Some("blackish")
    );

    let mut value = stroop_workbook();
    value["general"] = json!([{"param": "background_color", "value": "#1a2B3c"}]);
    assert!(parse(&value).diagnostics.is_empty());
}

#[test]
fn rt_offset_must_be_a_non_negative_number() {
    let mut value = stroop_workbook();
    value["general"] = json!([{"param": "rt_offset", "value": 250}]);
    let outcome = parse(&value);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.experiment.unwrap().rt_offset, 250.0);

    value["general"] = json!([{"param": "rt_offset", "value": "soon"}]);
    assert_eq!(codes(&parse(&value)), vec!["NON_NUMERIC_VALUE"]);

    value["general"] = json!([{"param": "rt_offset", "value": -5}]);
    let outcome = parse(&value);
    assert_eq!(codes(&outcome), vec!["INVALID_NUMERIC_VALUE"]);
    assert_eq!(outcome.experiment.unwrap().rt_offset, 0.0);
}

#[test]
fn missing_value_column_keeps_defaults() {
    let mut value = stroop_workbook();
    value["general"] = json!([{"param": "title"}]);

    let outcome = parse(&value);

    assert_eq!(codes(&outcome), vec!["MISSING_COL"]);
    let exp = outcome.experiment.unwrap();
    assert_eq!(exp.title, "");
    assert_eq!(exp.results_filename, "results_${date}.csv");
}
