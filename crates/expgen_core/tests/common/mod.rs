#![allow(dead_code)]

use expgen_core::{ParseConfig, ParseOutcome, Parser, Workbook};
use serde_json::{json, Value};

/// A small but complete experiment: two layout items, two keyboard
/// responses and one button, one instruction page, a two-step trial type
/// and two trials.
pub fn stroop_workbook() -> Value {
    json!({
        "general": [
            {"param": "title", "value": "Stroop"},
            {"param": "get_subj_id", "value": "Y"},
            {"param": "save_results", "value": "Y"},
            {"param": "results_filename_prefix", "value": "stroop"}
        ],
        "layout": [
            {"layout_name": "fixation", "type": "text", "text": "+", "left": "0px", "top": "40%", "width": "100%", "format:color": "gray"},
            {"layout_name": "word", "type": "text", "text": "", "left": 0, "top": "50%", "width": "100%", "format:color": "black"}
        ],
        "response": [
            {"response_name": "left", "type": "key", "value": "left", "key": "f", "text": null},
            {"response_name": "right", "type": "key", "value": "right", "key": "j", "text": null},
            {"response_name": "go", "type": "button", "value": "go", "key": null, "text": "Go"}
        ],
        "instructions": [
            {"text": "Press F for red words and J for blue words.", "responses": "left,right"}
        ],
        "trial_type": [
            {"type": "stroop", "layout items": "fixation", "responses": null, "duration": 500, "delay-after": null},
            {"type": "stroop", "layout items": "word", "responses": "left,right", "duration": null, "delay-after": 200}
        ],
        "trials": [
            {"type": "stroop", "word": "RED", "format:word.color": "red", "save:congruent": "Y"},
            {"type": "stroop", "word": "BLUE", "format:word.color": "red", "save:congruent": "N"}
        ]
    })
}

pub fn workbook(value: &Value) -> Workbook {
    Workbook::from_json_value(value).unwrap()
}

pub fn parse(value: &Value) -> ParseOutcome {
    parse_with(value, ParseConfig::default())
}

pub fn parse_with(value: &Value, config: ParseConfig) -> ParseOutcome {
    Parser::new(config).parse_workbook(&workbook(value))
}

/// Codes of every diagnostic, in recording order.
pub fn codes(outcome: &ParseOutcome) -> Vec<&'static str> {
    outcome.diagnostics.codes()
}
