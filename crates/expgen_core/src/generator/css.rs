//! `layout_css` slot: one rule per layout item.

use crate::model::{Experiment, TextControl};

const INDENT: &str = "        ";

/// Class of the container that holds a step's layout items.
pub const STAGE_CLASS: &str = "expgen-stage";

pub fn layout_css(exp: &Experiment) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(".{STAGE_CLASS} {{"));
    lines.push("    position: relative;".to_string());
    lines.push("    width: 100vw;".to_string());
    lines.push("    height: 100vh;".to_string());
    lines.push("}".to_string());

    for control in &exp.layout {
        lines.extend(control_rule(control));
    }

    if let Some(color) = &exp.background_color {
        lines.push("body {".to_string());
        lines.push(format!("    background-color: {};", css_value(color)));
        lines.push("}".to_string());
    }

    lines
        .iter()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn control_rule(control: &TextControl) -> Vec<String> {
    let frame = &control.frame;
    let mut rule = vec![format!(".{} {{", control.css_class())];
    rule.push(format!("    position: {};", frame.position.as_css()));
    rule.push(format!("    top: {};", frame.top));
    rule.push(format!("    left: {};", frame.left));
    rule.push(format!("    width: {};", frame.width));
    if let Some(height) = &frame.height {
        rule.push(format!("    height: {height};"));
    }
    for (property, value) in &control.css {
        rule.push(format!("    {}: {};", css_value(property), css_value(value)));
    }
    rule.push("}".to_string());
    rule
}

/// Keeps a worksheet value from closing the rule or the style element.
fn css_value(value: &str) -> String {
    value
        .replace("</", "<\\/")
        .replace(['{', '}', ';'], "")
        .trim()
        .to_string()
}
