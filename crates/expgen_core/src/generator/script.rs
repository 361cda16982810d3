//! JavaScript fragments for the script slots of the page.
//!
//! # Invariants
//! - Worksheet text only reaches the page as JSON string literals, with
//!   `</` escaped so it cannot close the script element.
//! - Every fragment is a self-contained statement list or expression.

use super::{GeneratorOptions, ImportMode};
use crate::model::{Experiment, Response, ResponseKind, TrialStep, TrialType};
use crate::workbook::cell::format_number;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

const INDENT: &str = "        ";

const JSPSYCH_VERSION: &str = "7.1.2";
const PLUGIN_VERSION: &str = "1.1.0";

const KEYBOARD_PLUGIN: &str = "jsPsychHtmlKeyboardResponse";
const BUTTON_PLUGIN: &str = "jsPsychHtmlButtonResponse";

static FILENAME_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{(subj_id|session_id|date)\}").expect("valid token regex"));

/// JSON-encodes `text` as a JavaScript string literal.
pub fn js_string(text: &str) -> String {
    script_safe(&Value::String(text.to_string()).to_string())
}

fn js_value(value: &Value) -> String {
    script_safe(&value.to_string())
}

fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn js_string_array<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let items: Vec<String> = items.into_iter().map(js_string).collect();
    format!("[{}]", items.join(", "))
}

fn indent(lines: &[String], depth: usize) -> String {
    let prefix = INDENT.to_string() + &"    ".repeat(depth);
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn imports(options: &GeneratorOptions, full_screen: bool) -> String {
    let mut scripts: Vec<String> = Vec::new();
    let stylesheet;

    match options.import_mode {
        ImportMode::Cdn => {
            scripts.push(format!("https://unpkg.com/jspsych@{JSPSYCH_VERSION}"));
            scripts.push(format!(
                "https://unpkg.com/@jspsych/plugin-html-keyboard-response@{PLUGIN_VERSION}"
            ));
            scripts.push(format!(
                "https://unpkg.com/@jspsych/plugin-html-button-response@{PLUGIN_VERSION}"
            ));
            if full_screen {
                scripts.push(format!(
                    "https://unpkg.com/@jspsych/plugin-fullscreen@{PLUGIN_VERSION}"
                ));
            }
            stylesheet = format!("https://unpkg.com/jspsych@{JSPSYCH_VERSION}/css/jspsych.css");
        }
        ImportMode::Local => {
            let dir = options.local_imports_dir.trim_end_matches('/');
            scripts.push(format!("{dir}/jspsych.js"));
            scripts.push(format!("{dir}/plugin-html-keyboard-response.js"));
            scripts.push(format!("{dir}/plugin-html-button-response.js"));
            if full_screen {
                scripts.push(format!("{dir}/plugin-fullscreen.js"));
            }
            stylesheet = format!("{dir}/jspsych.css");
        }
    }

    let mut lines: Vec<String> = scripts
        .iter()
        .map(|src| format!("    <script src=\"{}\"></script>", html_attr(src)))
        .collect();
    lines.push(format!(
        "    <link href=\"{}\" rel=\"stylesheet\" type=\"text/css\" />",
        html_attr(&stylesheet)
    ));
    lines.join("\n")
}

fn html_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn url_parameters(exp: &Experiment) -> String {
    let mut lines: Vec<String> = Vec::new();
    if exp.get_subj_id || exp.get_session_id {
        lines.push("const urlParams = new URLSearchParams(window.location.search);".to_string());
    }
    if exp.get_subj_id {
        lines.push("const subj_id = urlParams.get(\"subj_id\") || \"\";".to_string());
    }
    if exp.get_session_id {
        lines.push("const session_id = urlParams.get(\"session_id\") || \"\";".to_string());
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }

    lines.push("const today = new Date();".to_string());
    lines.push(
        "const date = today.getFullYear() + \"-\" + String(today.getMonth() + 1).padStart(2, \"0\") + \"-\" + String(today.getDate()).padStart(2, \"0\");"
            .to_string(),
    );
    lines.push(String::new());
    lines.push("// Reaction times in the results file are measured from this offset (ms)".to_string());
    lines.push(format!("const time0 = {};", format_number(exp.rt_offset)));

    indent(&lines, 0)
}

/// Body of the predicate that keeps only experiment trials in the results.
pub fn filter_trials_func() -> String {
    format!("{INDENT}        return trial.expgen_trial === true")
}

/// Turns the results file name template into a JavaScript expression.
pub fn results_filename(template: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut last = 0;
    for captures in FILENAME_TOKEN_RE.captures_iter(template) {
        let Some(token) = captures.get(0) else {
            continue;
        };
        if token.start() > last {
            parts.push(js_string(&template[last..token.start()]));
        }
        parts.push(captures[1].to_string());
        last = token.end();
    }
    if last < template.len() || parts.is_empty() {
        parts.push(js_string(&template[last..]));
    }
    parts.join(" + ")
}

pub fn init_jspsych_params(exp: &Experiment) -> String {
    if exp.save_results {
        format!("{{\n{INDENT}    on_finish: on_jspsych_finish\n{INDENT}}}")
    } else {
        "{}".to_string()
    }
}

/// Session setup and instruction pages; these open the timeline.
pub fn instructions(exp: &Experiment) -> String {
    let mut blocks: Vec<String> = Vec::new();

    let mut properties: Vec<&str> = Vec::new();
    if exp.get_subj_id {
        properties.push("subj_id: subj_id");
    }
    if exp.get_session_id {
        properties.push("session_id: session_id");
    }
    if !properties.is_empty() {
        blocks.push(indent(
            &[format!("jsPsych.data.addProperties({{{}}});", properties.join(", "))],
            0,
        ));
    }

    if exp.full_screen {
        blocks.push(indent(
            &[
                "timeline.push({".to_string(),
                "    type: jsPsychFullscreen,".to_string(),
                "    fullscreen_mode: true".to_string(),
                "});".to_string(),
            ],
            0,
        ));
    }

    for instruction in &exp.instructions {
        let responses: Vec<&Response> = instruction
            .response_names
            .iter()
            .filter_map(|name| exp.response(name))
            .collect();
        let kind = responses
            .first()
            .map(|response| response.kind())
            .unwrap_or(ResponseKind::Key);
        let choices = js_string_array(responses.iter().map(|response| response.choice()));

        blocks.push(indent(
            &[
                "timeline.push({".to_string(),
                format!("    type: {},", plugin_for(kind)),
                format!("    stimulus: {},", js_string(&instruction.text)),
                format!("    choices: {choices}"),
                "});".to_string(),
            ],
            0,
        ));
    }

    blocks.join("\n\n")
}

/// The trial table: one object per trial with its type, texts, CSS and
/// saved values.
pub fn trials(exp: &Experiment) -> String {
    let mut lines = vec!["const expgenTrials = [".to_string()];
    let count = exp.trials.len();
    for (index, trial) in exp.trials.iter().enumerate() {
        let object = json!({
            "type": trial.trial_type,
            "texts": trial.control_values,
            "css": trial.css,
            "save": Value::Object(trial.save_values.clone()),
        });
        let separator = if index + 1 < count { "," } else { "" };
        lines.push(format!("    {}{separator}", js_value(&object)));
    }
    lines.push("];".to_string());
    indent(&lines, 0)
}

/// Helper functions plus one step builder per trial type.
pub fn trial_flow(exp: &Experiment) -> String {
    let default_texts: Map<String, Value> = exp
        .layout
        .iter()
        .map(|control| (control.name.clone(), Value::String(control.text.clone())))
        .collect();

    let mut lines: Vec<String> = vec![
        format!(
            "const expgenDefaultTexts = {};",
            js_value(&Value::Object(default_texts))
        ),
        String::new(),
        "function expgenEscapeAttr(value) {".to_string(),
        "    return String(value).replace(/&/g, \"&amp;\").replace(/\"/g, \"&quot;\");".to_string(),
        "}".to_string(),
        String::new(),
        "function expgenStimulus(trial, controlNames) {".to_string(),
        "    const items = controlNames.map(function(name) {".to_string(),
        "        const text = Object.prototype.hasOwnProperty.call(trial.texts, name) ? trial.texts[name] : expgenDefaultTexts[name];".to_string(),
        "        const css = trial.css[name] || {};".to_string(),
        "        const style = Object.keys(css).map(function(property) {".to_string(),
        "            return property + \": \" + css[property] + \";\";".to_string(),
        "        }).join(\" \");".to_string(),
        "        return '<div class=\"expgen-' + name + '\" style=\"' + expgenEscapeAttr(style) + '\">' + text + '<\\/div>';".to_string(),
        "    });".to_string(),
        "    return '<div class=\"expgen-stage\">' + items.join(\"\") + '<\\/div>';".to_string(),
        "}".to_string(),
        String::new(),
        "function expgenKeyValue(values, key) {".to_string(),
        "    if (key === null || key === undefined) {".to_string(),
        "        return null;".to_string(),
        "    }".to_string(),
        "    const value = values[String(key).toLowerCase()];".to_string(),
        "    return value === undefined ? null : value;".to_string(),
        "}".to_string(),
        String::new(),
        "function expgenButtonValue(values, index) {".to_string(),
        "    if (index === null || index === undefined) {".to_string(),
        "        return null;".to_string(),
        "    }".to_string(),
        "    const value = values[Number(index)];".to_string(),
        "    return value === undefined ? null : value;".to_string(),
        "}".to_string(),
        String::new(),
        "const expgenTrialTypes = {".to_string(),
    ];

    let type_count = exp.trial_types.len();
    for (index, trial_type) in exp.trial_types.iter().enumerate() {
        lines.extend(trial_type_builder(exp, trial_type, index + 1 < type_count));
    }

    lines.extend([
        "};".to_string(),
        String::new(),
        "expgenTrials.forEach(function(trial) {".to_string(),
        "    expgenTrialTypes[trial.type](trial).forEach(function(step) {".to_string(),
        "        timeline.push(step);".to_string(),
        "    });".to_string(),
        "});".to_string(),
    ]);

    indent(&lines, 0)
}

fn trial_type_builder(exp: &Experiment, trial_type: &TrialType, trailing_comma: bool) -> Vec<String> {
    let mut lines = vec![format!("    {}: function(trial) {{", js_string(&trial_type.name))];
    lines.push("        const steps = [];".to_string());
    for step in &trial_type.steps {
        lines.extend(step_lines(exp, trial_type, step));
    }
    lines.push("        return steps;".to_string());
    lines.push(format!("    }}{}", if trailing_comma { "," } else { "" }));
    lines
}

fn step_lines(exp: &Experiment, trial_type: &TrialType, step: &TrialStep) -> Vec<String> {
    let pad = "        ";
    let mut lines = vec![format!("{pad}// step {}", step.num)];

    if step.delay_before > 0.0 {
        lines.push(format!("{pad}steps.push({{"));
        lines.push(format!("{pad}    type: {KEYBOARD_PLUGIN},"));
        lines.push(format!("{pad}    stimulus: \"\","));
        lines.push(format!("{pad}    choices: \"NO_KEYS\","));
        lines.push(format!(
            "{pad}    trial_duration: {}",
            format_number(step.delay_before)
        ));
        lines.push(format!("{pad}}});"));
    }

    let responses = step_responses(exp, step);
    let kind = responses
        .first()
        .map(|response| response.kind())
        .unwrap_or(ResponseKind::Key);

    let control_names = js_string_array(step.control_names.iter().map(String::as_str));
    let choices = if responses.is_empty() {
        "\"NO_KEYS\"".to_string()
    } else {
        js_string_array(responses.iter().map(|response| response.choice()))
    };
    let duration = step
        .duration
        .map(format_number)
        .unwrap_or_else(|| "null".to_string());

    lines.push(format!("{pad}steps.push({{"));
    lines.push(format!("{pad}    type: {},", plugin_for(kind)));
    lines.push(format!(
        "{pad}    stimulus: expgenStimulus(trial, {control_names}),"
    ));
    lines.push(format!("{pad}    choices: {choices},"));
    lines.push(format!("{pad}    trial_duration: {duration},"));

    if responses.is_empty() {
        lines.push(format!(
            "{pad}    post_trial_gap: {}",
            format_number(step.delay_after)
        ));
    } else {
        lines.push(format!(
            "{pad}    post_trial_gap: {},",
            format_number(step.delay_after)
        ));
        lines.push(format!(
            "{pad}    data: Object.assign({{expgen_trial: true, trial_type_name: {}, step: {}}}, trial.save),",
            js_string(&trial_type.name),
            step.num
        ));
        lines.push(format!("{pad}    on_finish: function(data) {{"));
        lines.push(format!(
            "{pad}        data.response_value = {};",
            response_value_expression(kind, &responses)
        ));
        lines.push(format!("{pad}    }}"));
    }
    lines.push(format!("{pad}}});"));
    lines
}

/// Responses of a step that share the kind of the first one. A step with
/// mixed kinds was already reported; the minority kind cannot be shown by
/// a single jsPsych plugin.
fn step_responses<'e>(exp: &'e Experiment, step: &TrialStep) -> Vec<&'e Response> {
    let all: Vec<&Response> = step
        .response_names
        .iter()
        .filter_map(|name| exp.response(name))
        .collect();
    let Some(kind) = all.first().map(|response| response.kind()) else {
        return all;
    };
    all.into_iter()
        .filter(|response| response.kind() == kind)
        .collect()
}

fn response_value_expression(kind: ResponseKind, responses: &[&Response]) -> String {
    match kind {
        ResponseKind::Key => {
            let values: Map<String, Value> = responses
                .iter()
                .map(|response| {
                    (
                        response.choice().to_lowercase(),
                        Value::String(response.value().to_string()),
                    )
                })
                .collect();
            format!(
                "expgenKeyValue({}, data.response)",
                js_value(&Value::Object(values))
            )
        }
        ResponseKind::Button => {
            let values = js_string_array(responses.iter().map(|response| response.value()));
            format!("expgenButtonValue({values}, data.response)")
        }
    }
}

fn plugin_for(kind: ResponseKind) -> &'static str {
    match kind {
        ResponseKind::Key => KEYBOARD_PLUGIN,
        ResponseKind::Button => BUTTON_PLUGIN,
    }
}
