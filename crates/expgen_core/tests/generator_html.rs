mod common;

use common::{parse, stroop_workbook};
use expgen_core::generator::template::remaining_slots;
use expgen_core::{ExpGenerator, Experiment, GeneratorOptions, ImportMode};

fn stroop() -> Experiment {
    parse(&stroop_workbook()).experiment.unwrap()
}

fn generate(exp: &Experiment) -> String {
    ExpGenerator::default().generate(exp)
}

#[test]
fn every_slot_is_filled() {
    let page = generate(&stroop());

    assert!(remaining_slots(&page).is_empty());
    assert!(page.contains("<title>Stroop</title>"));
    assert!(page.starts_with("<!DOCTYPE html>"));
}

#[test]
fn generation_is_deterministic() {
    let exp = stroop();
    assert_eq!(generate(&exp), generate(&exp));
}

#[test]
fn cdn_imports_are_pinned() {
    let page = generate(&stroop());

    assert!(page.contains("<script src=\"https://unpkg.com/jspsych@7.1.2\"></script>"));
    assert!(page.contains("https://unpkg.com/@jspsych/plugin-html-keyboard-response@1.1.0"));
    assert!(page.contains("https://unpkg.com/@jspsych/plugin-html-button-response@1.1.0"));
    assert!(page.contains("https://unpkg.com/jspsych@7.1.2/css/jspsych.css"));
    assert!(!page.contains("plugin-fullscreen"));
}

#[test]
fn local_imports_use_the_configured_directory() {
    let generator = ExpGenerator::new(GeneratorOptions {
        import_mode: ImportMode::Local,
        local_imports_dir: "vendor/jspsych/".to_string(),
    });
    let mut exp = stroop();
    exp.full_screen = true;

    let page = generator.generate(&exp);

    assert!(page.contains("<script src=\"vendor/jspsych/jspsych.js\"></script>"));
    assert!(page.contains("vendor/jspsych/plugin-fullscreen.js"));
    assert!(page.contains("href=\"vendor/jspsych/jspsych.css\""));
    assert!(!page.contains("unpkg.com"));
}

#[test]
fn export_function_filters_shifts_and_drops_fields() {
    let page = generate(&stroop());

    assert!(page.contains("return trial.expgen_trial === true;"));
    assert!(page.contains("}).readOnly();"));
    assert!(page.contains("trial.rt = trial.rt - time0;"));
    assert!(page.contains("const time0 = 0;"));
    assert!(page.contains(
        ".ignore('internal_node_id').ignore('trial_type').ignore('stimulus').ignore('response').localSave('csv', results_filename);"
    ));
    assert!(page.contains(
        "const results_filename = \"stroop_\" + subj_id + \"_\" + date + \".csv\";"
    ));
}

#[test]
fn finish_handler_adds_a_redownload_link() {
    let page = generate(&stroop());

    assert!(page.contains("on_finish: on_jspsych_finish"));
    assert!(page.contains("Click here to re-download the results."));
    assert!(page.contains("document.getElementById(\"jspsych-content\")"));
    assert!(page.contains("jspsychContent.appendChild(downloadLink);"));
    assert!(page.contains("document.body.prepend(downloadLink);"));

    let mut exp = stroop();
    exp.save_results = false;
    assert!(generate(&exp).contains("let jsPsych = initJsPsych({});"));
}

#[test]
fn url_parameters_follow_the_general_sheet() {
    let page = generate(&stroop());
    assert!(page.contains("const subj_id = urlParams.get(\"subj_id\") || \"\";"));
    assert!(!page.contains("const session_id"));
    assert!(page.contains("jsPsych.data.addProperties({subj_id: subj_id});"));

    let mut exp = stroop();
    exp.get_subj_id = false;
    exp.rt_offset = 120.5;
    let page = generate(&exp);
    assert!(!page.contains("URLSearchParams"));
    assert!(page.contains("const time0 = 120.5;"));
}

#[test]
fn layout_becomes_css_rules() {
    let page = generate(&stroop());

    assert!(page.contains(".expgen-fixation {"));
    assert!(page.contains(".expgen-word {"));
    assert!(page.contains("top: 40%;"));
    assert!(page.contains("color: gray;"));
}

#[test]
fn trials_and_steps_are_emitted() {
    let page = generate(&stroop());

    assert!(page.contains("const expgenTrials = ["));
    assert!(page.contains(
        "{\"type\":\"stroop\",\"texts\":{\"word\":\"RED\"},\"css\":{\"word\":{\"color\":\"red\"}},\"save\":{\"congruent\":\"Y\"}},"
    ));
    assert!(page.contains("\"stroop\": function(trial) {"));
    assert!(page.contains("trial_duration: 500,"));
    assert!(page.contains("choices: [\"f\", \"j\"],"));
    assert!(page.contains("post_trial_gap: 200,"));
    assert!(page.contains("expgen_trial: true"));
    assert!(page.contains("data.response_value = expgenKeyValue({\"f\":\"left\",\"j\":\"right\"}, data.response);"));
}

#[test]
fn instruction_pages_open_the_timeline() {
    let mut exp = stroop();
    exp.full_screen = true;
    let page = generate(&exp);

    let fullscreen = page.find("type: jsPsychFullscreen").unwrap();
    let instruction = page.find("stimulus: \"Press F for red words").unwrap();
    let trials = page.find("const expgenTrials").unwrap();
    assert!(fullscreen < instruction);
    assert!(instruction < trials);
}

#[test]
fn worksheet_text_cannot_break_the_page() {
    let mut exp = stroop();
    exp.title = "A </title> & B".to_string();
    exp.instructions[0].text = "</script><script>alert(1)</script>".to_string();

    let page = generate(&exp);

    assert!(page.contains("<title>A &lt;/title&gt; &amp; B</title>"));
    assert!(page.contains("\"<\\/script><script>alert(1)<\\/script>\""));
    assert_eq!(page.matches("</script>").count(), 4);
}
