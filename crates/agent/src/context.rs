//! Renders a retrieval into the block appended to the system prompt.

use std::fmt::Write;
use tensive_knowledge::Retrieval;

/// Build the injected context block.
///
/// Always lists the see-also titles. When the top entry cleared the content
/// threshold, its full text, steps and asset links follow. Asset links reach
/// the model from the content threshold on; the caller only gets them from
/// the asset threshold (see [`Retrieval::released_assets`]).
pub fn render(retrieval: &Retrieval<'_>) -> String {
    let mut block = String::from("\n\nRELEVANT TOPICS FOUND:\n");
    for title in &retrieval.see_also {
        let _ = writeln!(block, "- {title}");
    }
    block.push_str(
        "If the user's query matches one of these but you don't have the full content, \
         ask if they want details.",
    );

    if let Some(grounding) = &retrieval.grounding {
        let entry = grounding.entry;
        let steps = if entry.steps.is_empty() {
            "N/A".to_string()
        } else {
            entry.steps.join(", ")
        };
        let assets = entry
            .assets
            .as_ref()
            .and_then(|a| serde_json::to_string(a).ok())
            .unwrap_or_else(|| "null".into());

        let _ = write!(
            block,
            "\n\n*** FULL KNOWLEDGE BASE ENTRY LOADED ***:\nTitle: {}\nContent: {}\nSteps: {}\nAssets Available: {}",
            entry.title, entry.content, steps, assets
        );
    }

    block
}
