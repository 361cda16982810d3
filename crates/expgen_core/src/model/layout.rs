//! Layout items (on-screen controls).
//!
//! # Invariants
//! - Coordinates are already normalized CSS lengths (`0px`, `50%`, `120px`).
//! - Control names are unique case-insensitively within one experiment.

use serde::Serialize;
use std::collections::BTreeMap;

/// CSS `position` of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Absolute,
    Relative,
    Fixed,
}

impl Position {
    /// Parses a worksheet value (case-insensitive, trimmed).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "absolute" => Some(Self::Absolute),
            "relative" => Some(Self::Relative),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
            Self::Fixed => "fixed",
        }
    }
}

/// Placement of a control on the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub left: String,
    pub top: String,
    pub width: String,
    pub height: Option<String>,
    pub position: Position,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            left: "0px".to_string(),
            top: "0px".to_string(),
            width: "100%".to_string(),
            height: None,
            position: Position::Absolute,
        }
    }
}

/// A text item shown during trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextControl {
    pub name: String,
    /// Default text; a trial may override it.
    pub text: String,
    pub frame: Frame,
    /// Extra CSS declarations from `format:<property>` columns.
    pub css: BTreeMap<String, String>,
}

impl TextControl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            frame: Frame::default(),
            css: BTreeMap::new(),
        }
    }

    /// CSS class used for this control in the generated page.
    pub fn css_class(&self) -> String {
        format!("expgen-{}", self.name)
    }
}
