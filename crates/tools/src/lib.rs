//! Deterministic tools for Tensive.
//!
//! The calculation engine and guided estimator are plain functions. The two
//! capabilities declared to the model wrap them behind the [`Tool`] trait:
//!
//! - `calculate_spot_repair` computes a material manifest
//! - `suggest_next_steps` turns a clarifying question into clickable options
//!
//! [`Tool`]: tensive_core::tool::Tool

pub mod calculator;
pub mod flow;
pub mod next_steps;
pub mod spot_repair;

use tensive_core::tool::ToolRegistry;

pub use calculator::{CalculationError, Dimensions, RepairType, calculate_spot_repair};
pub use flow::{CalculatorField, CalculatorInput, InputHint, NextStep, StepOption, get_next_step};

/// Create the registry declared to the model, in a fixed order.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(spot_repair::CalculateSpotRepairTool));
    registry.register(Box::new(next_steps::SuggestNextStepsTool));
    registry
}
