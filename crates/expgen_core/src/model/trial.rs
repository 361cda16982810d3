//! Trial types, their steps, and concrete trials.
//!
//! # Invariants
//! - Step numbers start at 1 within each trial type and have no gaps.
//! - A trial's `control_values` only names controls used by its type.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One row of the `trial_type` worksheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialStep {
    pub num: u32,
    pub control_names: Vec<String>,
    /// Lowercase response names; empty means no response is collected.
    pub response_names: Vec<String>,
    /// Milliseconds; `None` waits for a response.
    pub duration: Option<f64>,
    pub delay_before: f64,
    pub delay_after: f64,
}

impl TrialStep {
    pub fn collects_response(&self) -> bool {
        !self.response_names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialType {
    pub name: String,
    pub steps: Vec<TrialStep>,
}

impl TrialType {
    /// Type name used when the `trial_type` worksheet has no `type` column.
    pub const DEFAULT_NAME: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Union of the controls used by any step, in first-use order.
    pub fn control_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for step in &self.steps {
            for name in &step.control_names {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn uses_control(&self, name: &str) -> bool {
        self.steps
            .iter()
            .any(|step| step.control_names.iter().any(|c| c == name))
    }

    pub fn next_step_num(&self) -> u32 {
        self.steps.len() as u32 + 1
    }
}

/// One row of the `trials` worksheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    pub trial_type: String,
    /// Control name -> text shown in this trial.
    pub control_values: BTreeMap<String, String>,
    /// Results column -> value, in worksheet column order.
    pub save_values: Map<String, Value>,
    /// Control name -> CSS property -> value.
    pub css: BTreeMap<String, BTreeMap<String, String>>,
}

impl Trial {
    pub fn new(trial_type: impl Into<String>) -> Self {
        Self {
            trial_type: trial_type.into(),
            control_values: BTreeMap::new(),
            save_values: Map::new(),
            css: BTreeMap::new(),
        }
    }

    pub fn add_css(&mut self, control: &str, property: &str, value: impl Into<String>) {
        self.css
            .entry(control.to_string())
            .or_default()
            .insert(property.to_string(), value.into());
    }
}
