//! The parsed experiment.
//!
//! # Responsibility
//! - Hold every setting and item the generator needs, in worksheet order.
//! - Offer name lookups with the same case rules the parser validates with.
//!
//! # Invariants
//! - Control names are unique case-insensitively; lookups ignore case.
//! - Response names are stored lowercase; lookups lowercase the query.
//! - Trial type names are matched exactly.

use super::layout::TextControl;
use super::response::{Response, ResponseKind};
use super::trial::{Trial, TrialType};
use serde::Serialize;

/// Results file name used when no prefix or id is configured.
pub const DEFAULT_RESULTS_FILENAME: &str = "results_${date}.csv";

/// One instruction page shown before the trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub text: String,
    pub response_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    pub title: String,
    pub get_subj_id: bool,
    pub get_session_id: bool,
    pub save_results: bool,
    /// File name template; may contain `${subj_id}`, `${session_id}` and
    /// `${date}` tokens.
    pub results_filename: String,
    pub background_color: Option<String>,
    pub full_screen: bool,
    /// Milliseconds subtracted from every reaction time on export.
    pub rt_offset: f64,
    pub instructions: Vec<Instruction>,
    pub layout: Vec<TextControl>,
    pub responses: Vec<Response>,
    pub trial_types: Vec<TrialType>,
    pub trials: Vec<Trial>,
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            title: String::new(),
            get_subj_id: false,
            get_session_id: false,
            save_results: false,
            results_filename: DEFAULT_RESULTS_FILENAME.to_string(),
            background_color: None,
            full_screen: false,
            rt_offset: 0.0,
            instructions: Vec::new(),
            layout: Vec::new(),
            responses: Vec::new(),
            trial_types: Vec::new(),
            trials: Vec::new(),
        }
    }
}

impl Experiment {
    pub fn control(&self, name: &str) -> Option<&TextControl> {
        let name = name.trim();
        self.layout
            .iter()
            .find(|control| control.name.eq_ignore_ascii_case(name))
    }

    pub fn response(&self, name: &str) -> Option<&Response> {
        let name = name.trim().to_lowercase();
        self.responses.iter().find(|response| response.name() == name)
    }

    pub fn trial_type(&self, name: &str) -> Option<&TrialType> {
        self.trial_types.iter().find(|trial_type| trial_type.name == name)
    }

    pub fn trial_type_mut(&mut self, name: &str) -> Option<&mut TrialType> {
        self.trial_types
            .iter_mut()
            .find(|trial_type| trial_type.name == name)
    }

    /// Kinds used by the named responses; unknown names are skipped.
    pub fn response_kinds<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Vec<ResponseKind> {
        let mut kinds = Vec::new();
        for name in names {
            if let Some(kind) = self.response(name).map(Response::kind) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::{Experiment, DEFAULT_RESULTS_FILENAME};
    use crate::model::{Response, ResponseKind, TextControl, TrialType};

    #[test]
    fn defaults_match_an_empty_general_sheet() {
        let exp = Experiment::default();
        assert_eq!(exp.results_filename, DEFAULT_RESULTS_FILENAME);
        assert!(!exp.save_results);
        assert_eq!(exp.rt_offset, 0.0);
    }

    #[test]
    fn lookups_follow_case_rules() {
        let mut exp = Experiment::default();
        exp.layout.push(TextControl::new("Target"));
        exp.responses.push(Response::Key {
            name: "left".into(),
            value: "L".into(),
            key: "f".into(),
        });
        exp.responses.push(Response::Button {
            name: "ok".into(),
            value: "1".into(),
            text: "OK".into(),
        });
        exp.trial_types.push(TrialType::new("Main"));

        assert!(exp.control("target").is_some());
        assert!(exp.response("LEFT").is_some());
        assert!(exp.trial_type("Main").is_some());
        assert!(exp.trial_type("main").is_none());

        let names = vec!["left".to_string(), "ok".to_string(), "zzz".to_string()];
        assert_eq!(
            exp.response_kinds(&names),
            vec![ResponseKind::Key, ResponseKind::Button]
        );
    }
}
