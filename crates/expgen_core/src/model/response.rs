//! Response modes a participant can use to answer.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Key,
    Button,
}

/// One named response.
///
/// `value` is what lands in the results file when the participant picks
/// this response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    Key { name: String, value: String, key: String },
    Button { name: String, value: String, text: String },
}

impl Response {
    /// Lowercase response name.
    pub fn name(&self) -> &str {
        match self {
            Self::Key { name, .. } | Self::Button { name, .. } => name,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Key { value, .. } | Self::Button { value, .. } => value,
        }
    }

    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Key { .. } => ResponseKind::Key,
            Self::Button { .. } => ResponseKind::Button,
        }
    }

    /// What jsPsych expects in `choices`: the key, or the button label.
    pub fn choice(&self) -> &str {
        match self {
            Self::Key { key, .. } => key,
            Self::Button { text, .. } => text,
        }
    }
}
