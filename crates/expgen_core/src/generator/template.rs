//! The HTML document shell and its `${slot}` substitution.
//!
//! # Invariants
//! - Substitution is a single pass: text inserted into a slot is never
//!   scanned for further slots.
//! - Tokens that are not slot names are left untouched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// The jsPsych 7.1.2 page shell.
pub const DOCUMENT_TEMPLATE: &str = include_str!("../../templates/experiment.html");

/// Every slot the shell defines, in document order.
pub const SLOTS: &[&str] = &[
    "title",
    "imports",
    "layout_css",
    "url_parameters",
    "filter_trials_func",
    "results_filename",
    "init_jspsych_params",
    "instructions",
    "trials",
    "trial_flow",
];

static SLOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([a-z_]+)\}").expect("valid slot regex"));

/// Replaces every known slot token with its fragment.
///
/// Slots missing from `fragments` are replaced by an empty string so the
/// page never leaks a raw token.
pub fn fill(template: &str, fragments: &BTreeMap<&str, String>) -> String {
    SLOT_RE
        .replace_all(template, |captures: &Captures<'_>| {
            let name = &captures[1];
            if SLOTS.contains(&name) {
                fragments.get(name).cloned().unwrap_or_default()
            } else {
                captures[0].to_string()
            }
        })
        .into_owned()
}

/// Slot tokens still present in `page`.
pub fn remaining_slots(page: &str) -> Vec<String> {
    SLOT_RE
        .captures_iter(page)
        .map(|captures| captures[1].to_string())
        .filter(|name| SLOTS.contains(&name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{fill, remaining_slots, DOCUMENT_TEMPLATE, SLOTS};
    use std::collections::BTreeMap;

    #[test]
    fn template_defines_every_slot() {
        let found = remaining_slots(DOCUMENT_TEMPLATE);
        for slot in SLOTS {
            assert!(found.iter().any(|name| name == slot), "missing slot {slot}");
        }
    }

    #[test]
    fn fill_is_single_pass_and_keeps_unknown_tokens() {
        let mut fragments = BTreeMap::new();
        fragments.insert("title", "${trials}".to_string());
        let page = fill("<t>${title}</t> ${other} ${trials}", &fragments);
        assert_eq!(page, "<t>${trials}</t> ${other} ");
    }
}
