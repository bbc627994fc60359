//! Guided estimator: a progressively filled calculator input and the
//! question that comes next.
//!
//! Fields fill in a fixed order (repair type, then dimensions, then count)
//! and are never cleared individually. Only [`CalculatorInput::reset`]
//! empties the record.

use crate::calculator::{CalculationError, Dimensions, RepairType};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `L x W`, `L by W` or `L * W`, with optional decimals.
static DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:x|by|\*)\s*(\d+(?:\.\d+)?)")
        .expect("dimensions pattern is valid")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("number pattern is valid"));

/// A calculator record filled one field at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatorInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair_type: Option<RepairType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// One structured field update, as sent by a UI control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CalculatorField {
    RepairType(RepairType),
    Dimensions(Dimensions),
    Count(u32),
}

impl CalculatorInput {
    pub fn is_empty(&self) -> bool {
        self.repair_type.is_none() && self.dimensions.is_none() && self.count.is_none()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply a structured update.
    ///
    /// Rejects a field that is already set, one whose predecessor is still
    /// missing, and dimensions or counts for non-spot repairs. A rejected
    /// update leaves the record untouched.
    pub fn apply(&mut self, field: CalculatorField) -> Result<(), CalculationError> {
        match field {
            CalculatorField::RepairType(repair_type) => {
                if self.repair_type.is_some() {
                    return Err(CalculationError::AlreadySet("repair_type"));
                }
                self.repair_type = Some(repair_type);
            }
            CalculatorField::Dimensions(dimensions) => {
                self.require_spot_repair("dimensions")?;
                if self.dimensions.is_some() {
                    return Err(CalculationError::AlreadySet("dimensions"));
                }
                self.dimensions = Some(dimensions);
            }
            CalculatorField::Count(count) => {
                self.require_spot_repair("count")?;
                if self.dimensions.is_none() {
                    return Err(CalculationError::OutOfOrder {
                        field: "count",
                        missing: "dimensions",
                    });
                }
                if self.count.is_some() {
                    return Err(CalculationError::AlreadySet("count"));
                }
                if count == 0 {
                    return Err(CalculationError::ZeroCount);
                }
                self.count = Some(count);
            }
        }
        Ok(())
    }

    fn require_spot_repair(&self, field: &'static str) -> Result<(), CalculationError> {
        match self.repair_type {
            None => Err(CalculationError::OutOfOrder {
                field,
                missing: "repair_type",
            }),
            Some(RepairType::SpotRepair) => Ok(()),
            Some(_) => Err(CalculationError::NotApplicable(field)),
        }
    }

    /// Fill the next missing field from free text.
    ///
    /// Returns the field that was filled, or `None` when the text did not
    /// contain a usable answer for the pending question.
    pub fn absorb(&mut self, text: &str) -> Option<CalculatorField> {
        let lower = text.to_lowercase();

        let parsed = match self.repair_type {
            None => parse_repair_type(&lower).map(CalculatorField::RepairType),
            Some(RepairType::SpotRepair) if self.dimensions.is_none() => {
                parse_dimensions(&lower).map(CalculatorField::Dimensions)
            }
            Some(RepairType::SpotRepair) if self.count.is_none() => {
                parse_count(&lower).map(CalculatorField::Count)
            }
            Some(_) => None,
        };

        let field = parsed?;
        self.apply(field).ok().map(|()| field)
    }
}

fn parse_repair_type(lower: &str) -> Option<RepairType> {
    if lower.contains("spot") || lower.contains("patch") {
        Some(RepairType::SpotRepair)
    } else if lower.contains("full") || lower.contains("roof") {
        Some(RepairType::FullRoof)
    } else if lower.contains("linear") || lower.contains("flash") {
        Some(RepairType::LinearFlashing)
    } else {
        RepairType::from_value(lower.trim())
    }
}

fn parse_dimensions(lower: &str) -> Option<Dimensions> {
    let caps = DIMENSIONS.captures(lower)?;
    let length = caps.get(1)?.as_str().parse().ok()?;
    let width = caps.get(2)?.as_str().parse().ok()?;
    Dimensions::new(length, width).ok()
}

fn parse_count(lower: &str) -> Option<u32> {
    NUMBER.captures(lower)?.get(1)?.as_str().parse().ok()
}

/// A clickable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOption {
    pub label: String,
    pub value: String,
}

/// The kind of free input the UI should offer for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputHint {
    /// Length and width fields
    Dimensions,
    /// A single number field
    Number,
}

/// What the guided estimator needs next.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Question {
        prompt: String,
        options: Vec<StepOption>,
        input: Option<InputHint>,
    },
    Complete,
}

/// Walk the fill order and report the first missing field.
///
/// Only spot repairs collect dimensions and a count. Any other repair type
/// is complete as soon as it is chosen.
pub fn get_next_step(state: &CalculatorInput) -> NextStep {
    let Some(repair_type) = state.repair_type else {
        return NextStep::Question {
            prompt: "What type of repair are you planning?".into(),
            options: RepairType::ALL
                .into_iter()
                .map(|t| StepOption {
                    label: t.label().into(),
                    value: t.value().into(),
                })
                .collect(),
            input: None,
        };
    };

    if repair_type == RepairType::SpotRepair {
        if state.dimensions.is_none() {
            return NextStep::Question {
                prompt: "What are the dimensions of the damaged area?".into(),
                options: vec![],
                input: Some(InputHint::Dimensions),
            };
        }
        if state.count.is_none() {
            return NextStep::Question {
                prompt: "How many of these patches do you need to do?".into(),
                options: vec![],
                input: Some(InputHint::Number),
            };
        }
    }

    NextStep::Complete
}
