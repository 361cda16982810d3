use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn expgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_expgen"))
        .args(args)
        .current_dir(dir)
        .env_remove("EXPGEN_CONFIG")
        .env("EXPGEN_LOG__LEVEL", "off")
        .output()
        .unwrap()
}

fn write_experiment(dir: &Path, with_trials: bool) {
    let trials = if with_trials {
        json!([{"word": "RED"}])
    } else {
        json!([])
    };
    let experiment = json!({
        "general": [{"param": "title", "value": "Demo"}],
        "layout": [{"layout_name": "word", "type": "text", "left": "0px", "top": "50%", "width": "100%"}],
        "response": [{"response_name": "yes", "type": "key", "value": "yes", "key": "y"}],
        "trial_type": [{"type": "demo", "layout items": "word", "responses": "yes"}],
        "trials": trials
    });
    fs::write(dir.join("demo.json"), experiment.to_string()).unwrap();
}

#[test]
fn compile_writes_the_page_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_experiment(dir.path(), true);

    let output = expgen(dir.path(), &["compile", "demo.json", "demo.html"]);

    assert_eq!(output.status.code(), Some(0));
    let page = fs::read_to_string(dir.path().join("demo.html")).unwrap();
    assert!(page.contains("<title>Demo</title>"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 error(s), 0 warning(s)"));
}

#[test]
fn local_imports_flag_switches_the_script_sources() {
    let dir = tempfile::tempdir().unwrap();
    write_experiment(dir.path(), true);

    let output = expgen(
        dir.path(),
        &["compile", "demo.json", "demo.html", "--local-imports"],
    );

    assert_eq!(output.status.code(), Some(0));
    let page = fs::read_to_string(dir.path().join("demo.html")).unwrap();
    assert!(page.contains("jspsych/jspsych.js"));
}

#[test]
fn errors_exit_two_and_print_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    write_experiment(dir.path(), false);

    let output = expgen(dir.path(), &["compile", "demo.json", "demo.html"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("demo.html").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(NO_TRIALS)"));
    assert!(stdout.contains("was not written"));
}

#[test]
fn check_can_dump_json() {
    let dir = tempfile::tempdir().unwrap();
    write_experiment(dir.path(), true);

    let output = expgen(dir.path(), &["check", "demo.json", "--dump-json"]);

    assert_eq!(output.status.code(), Some(0));
    let dump: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dump["status"], "success");
    assert_eq!(dump["experiment"]["title"], "Demo");
    assert_eq!(dump["diagnostics"], json!([]));
}

#[test]
fn missing_workbook_fails_the_compile() {
    let dir = tempfile::tempdir().unwrap();

    let output = expgen(dir.path(), &["compile", "absent.xlsx", "out.html"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("EXPGEN_CLI_WORKBOOK_ERROR"));
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    write_experiment(dir.path(), true);

    let output = expgen(
        dir.path(),
        &["check", "demo.json", "--config", "nope.toml"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("EXPGEN_CLI_CONFIG_ERROR"));
}

#[test]
fn export_results_converts_a_data_dump() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("data.json"),
        json!([
            {"trial_type": "html-keyboard-response", "rt": 700, "expgen_trial": true, "response_value": "yes"},
            {"trial_type": "html-keyboard-response", "rt": 300}
        ])
        .to_string(),
    )
    .unwrap();

    let output = expgen(
        dir.path(),
        &["export-results", "data.json", "results.csv", "--time0", "200"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(dir.path().join("results.csv")).unwrap(),
        "\"rt\",\"expgen_trial\",\"response_value\"\r\n\"500\",\"true\",\"yes\"\r\n"
    );
}
