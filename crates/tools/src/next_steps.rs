//! `suggest_next_steps`: lets the model ask a clarifying question with a
//! fixed set of clickable answers.

use async_trait::async_trait;
use serde::Deserialize;
use tensive_core::error::ToolError;
use tensive_core::tool::{Tool, ToolOutput};

pub const NAME: &str = "suggest_next_steps";

pub struct SuggestNextStepsTool;

#[derive(Debug, Deserialize)]
struct NextStepsArgs {
    message: String,
    options: Vec<String>,
}

#[async_trait]
impl Tool for SuggestNextStepsTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Ask the user a clarifying question with a short list of answers they can click. \
         Use it when the answer is one of a few known choices."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The question or prompt to show the user"
                },
                "options": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Answer choices, e.g. [\"EPDM\", \"Felt\", \"Metal\"]"
                }
            },
            "required": ["message", "options"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let args: NextStepsArgs =
            serde_json::from_value(arguments).map_err(|e| ToolError::invalid(NAME, e.to_string()))?;

        let options: Vec<String> = args
            .options
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if options.is_empty() {
            return Err(ToolError::invalid(NAME, "at least one non-blank option is required"));
        }

        Ok(ToolOutput::NextSteps {
            message: args.message,
            options,
        })
    }
}
