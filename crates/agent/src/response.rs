//! The response shape handed to the presentation layer.

use serde::{Deserialize, Serialize};
use tensive_core::{Assets, MaterialManifest};
use tensive_tools::InputHint;

/// One assistant turn, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizedResponse {
    /// Free text, optionally with clickable options and linked assets.
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<ChoiceOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assets: Option<Assets>,
    },

    /// A material manifest computed by the calculation engine.
    CalculationResult {
        text: String,
        data: MaterialManifest,
    },

    /// A guided-estimator question.
    Question {
        text: String,
        options: Vec<ChoiceOption>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<InputHint>,
    },
}

/// A clickable answer. `value` is what the UI sends back; when absent the
/// label itself is the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ChoiceOption {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
        }
    }
}

impl NormalizedResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            options: vec![],
            assets: None,
        }
    }

    /// The display text of any variant.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text { text, .. }
            | Self::CalculationResult { text, .. }
            | Self::Question { text, .. } => text,
        }
    }
}
