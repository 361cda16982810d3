use expgen_core::results::{is_experiment_trial, prepare_records, DEFAULT_DROPPED_FIELDS};
use expgen_core::{export_csv_string, load_records, ExportError, ExportOptions, TrialRecord};
use serde_json::json;

fn records() -> Vec<TrialRecord> {
    load_records(
        json!([
            {"trial_type": "html-keyboard-response", "stimulus": "<p>Welcome</p>", "response": " ", "rt": 900, "internal_node_id": "0.0-0.0"},
            {"trial_type": "html-keyboard-response", "stimulus": "<div>RED</div>", "response": "f", "rt": 1250.5, "expgen_trial": true, "trial_type_name": "stroop", "step": 2, "congruent": "Y", "response_value": "left", "internal_node_id": "0.0-1.0"},
            {"trial_type": "html-keyboard-response", "stimulus": "<div>BLUE</div>", "response": null, "rt": null, "expgen_trial": true, "trial_type_name": "stroop", "step": 2, "congruent": "say \"N\"", "response_value": null, "internal_node_id": "0.0-2.0", "extra": {"a": [1, 2]}}
        ])
        .to_string()
        .as_bytes(),
    )
    .unwrap()
}

#[test]
fn experiment_trials_are_exported_with_shifted_rt() {
    let options = ExportOptions {
        time0: 250.0,
        ..ExportOptions::default()
    };

    let csv = export_csv_string(&records(), is_experiment_trial, &options).unwrap();

    assert_eq!(
        csv,
        concat!(
            "\"rt\",\"expgen_trial\",\"trial_type_name\",\"step\",\"congruent\",\"response_value\",\"extra\"\r\n",
            "\"1000.5\",\"true\",\"stroop\",\"2\",\"Y\",\"left\",\"\"\r\n",
            "\"null\",\"true\",\"stroop\",\"2\",\"say \"\"N\"\"\",\"null\",\"{\"\"a\"\":[1,2]}\"\r\n"
        )
    );
}

#[test]
fn bookkeeping_fields_never_appear() {
    let csv = export_csv_string(&records(), |_| true, &ExportOptions::default()).unwrap();
    let header = csv.lines().next().unwrap();

    for field in DEFAULT_DROPPED_FIELDS {
        assert!(!header.contains(&format!("\"{field}\"")), "{field} exported");
    }
    assert_eq!(csv.matches("\r\n").count(), 4);
}

#[test]
fn exporting_twice_is_byte_identical_and_leaves_input_untouched() {
    let input = records();
    let before = input.clone();
    let options = ExportOptions {
        time0: 100.0,
        ..ExportOptions::default()
    };

    let first = export_csv_string(&input, is_experiment_trial, &options).unwrap();
    let second = export_csv_string(&input, is_experiment_trial, &options).unwrap();

    assert_eq!(first, second);
    assert_eq!(input, before);
    assert_eq!(input[1].get("rt"), Some(&json!(1250.5)));
}

#[test]
fn kept_fields_are_exported() {
    let options = ExportOptions::default().keep_field("response");
    let prepared = prepare_records(&records(), is_experiment_trial, &options);

    assert_eq!(prepared.len(), 2);
    assert_eq!(prepared[0].get("response"), Some(&json!("f")));
    assert!(prepared[0].get("stimulus").is_none());
}

#[test]
fn no_matching_trials_still_writes_a_header_line() {
    let csv = export_csv_string(&records()[..1], is_experiment_trial, &ExportOptions::default())
        .unwrap();
    assert_eq!(csv, "\r\n");
}

#[test]
fn malformed_data_is_rejected() {
    assert!(matches!(
        load_records("{\"rt\": 1}".as_bytes()),
        Err(ExportError::NotAnArray)
    ));
    assert!(matches!(
        load_records("[{\"rt\": 1}, 5]".as_bytes()),
        Err(ExportError::InvalidRecord { index: 1 })
    ));
    assert!(matches!(load_records("[".as_bytes()), Err(ExportError::Json(_))));
}
