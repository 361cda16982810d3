//! Experiment model -> single-file jsPsych page.
//!
//! # Responsibility
//! - Produce one fragment per template slot and fill the document shell.
//!
//! # Invariants
//! - Generation is deterministic: the same experiment and options always
//!   yield the same page.
//! - No slot token survives generation.

pub mod css;
pub mod script;
pub mod template;

use crate::model::Experiment;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Where the page loads jsPsych from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// unpkg CDN, pinned to jsPsych 7.1.2.
    #[default]
    Cdn,
    /// A directory of vendored jsPsych files next to the page.
    Local,
}

pub const DEFAULT_LOCAL_IMPORTS_DIR: &str = "jspsych";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub import_mode: ImportMode,
    /// Directory (relative to the page) used by [`ImportMode::Local`].
    pub local_imports_dir: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            import_mode: ImportMode::Cdn,
            local_imports_dir: DEFAULT_LOCAL_IMPORTS_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpGenerator {
    options: GeneratorOptions,
}

impl ExpGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Renders the complete HTML page.
    pub fn generate(&self, exp: &Experiment) -> String {
        let started_at = Instant::now();
        let fragments = self.fragments(exp);
        let page = template::fill(template::DOCUMENT_TEMPLATE, &fragments);
        info!(
            "event=generate module=generator status=ok import_mode={:?} bytes={} duration_ms={}",
            self.options.import_mode,
            page.len(),
            started_at.elapsed().as_millis()
        );
        page
    }

    /// Slot name -> fragment, for every slot of the shell.
    pub fn fragments(&self, exp: &Experiment) -> BTreeMap<&'static str, String> {
        let mut fragments = BTreeMap::new();
        fragments.insert("title", html_escape(&exp.title));
        fragments.insert("imports", script::imports(&self.options, exp.full_screen));
        fragments.insert("layout_css", css::layout_css(exp));
        fragments.insert("url_parameters", script::url_parameters(exp));
        fragments.insert("filter_trials_func", script::filter_trials_func());
        fragments.insert(
            "results_filename",
            script::results_filename(&exp.results_filename),
        );
        fragments.insert("init_jspsych_params", script::init_jspsych_params(exp));
        fragments.insert("instructions", script::instructions(exp));
        fragments.insert("trials", script::trials(exp));
        fragments.insert("trial_flow", script::trial_flow(exp));
        fragments
    }
}

fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
