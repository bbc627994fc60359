//! `calculate_spot_repair`: the model-facing front of the calculation engine.

use crate::calculator::calculate_spot_repair;
use async_trait::async_trait;
use serde::Deserialize;
use tensive_core::error::ToolError;
use tensive_core::tool::{Tool, ToolOutput};
use tracing::debug;

pub const NAME: &str = "calculate_spot_repair";

pub struct CalculateSpotRepairTool;

#[derive(Debug, Deserialize)]
struct SpotRepairArgs {
    length: f64,
    width: f64,
    #[serde(default)]
    count: Option<f64>,
}

impl SpotRepairArgs {
    /// Counts arrive as JSON numbers; whole values like `2.0` are accepted.
    fn count(&self) -> Result<u32, ToolError> {
        match self.count {
            None => Ok(1),
            Some(c) if c.is_finite() && c.fract() == 0.0 && c >= 1.0 && c <= f64::from(u32::MAX) => {
                Ok(c as u32)
            }
            Some(c) => Err(ToolError::invalid(
                NAME,
                format!("count must be a whole number of at least 1, got {c}"),
            )),
        }
    }
}

#[async_trait]
impl Tool for CalculateSpotRepairTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Calculate the materials needed for a spot repair (patch). Call this whenever the user \
         gives the length and width of a damaged area. Never estimate quantities yourself."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "length": {
                    "type": "number",
                    "description": "Length of one patch in feet"
                },
                "width": {
                    "type": "number",
                    "description": "Width of one patch in feet"
                },
                "count": {
                    "type": "number",
                    "description": "Number of identical patches (default 1)",
                    "default": 1
                }
            },
            "required": ["length", "width"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: SpotRepairArgs =
            serde_json::from_value(arguments).map_err(|e| ToolError::invalid(NAME, e.to_string()))?;
        let count = args.count()?;

        let manifest = calculate_spot_repair(args.length, args.width, count)
            .map_err(|e| ToolError::invalid(NAME, e.to_string()))?;

        debug!(
            length = args.length,
            width = args.width,
            count,
            total_area = manifest.total_area,
            "Spot repair calculated"
        );

        Ok(ToolOutput::SpotRepair {
            length: args.length,
            width: args.width,
            count,
            manifest,
        })
    }
}
