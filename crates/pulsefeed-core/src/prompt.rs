//! Prompt assembly for the chat pipeline.
//!
//! One prompt string per exchange: a fixed conversational preamble, the
//! prior turns serialized as `role: content` lines, the retrieved summary
//! bodies, and the raw query.

use pulsefeed_types::chat::ChatMessage;
use pulsefeed_types::summary::Summary;

/// Instruction preamble directing conversational, context-grounded answers.
const PREAMBLE: &str = "You are an AI assistant analyzing real-time data from various sources.\n\
Provide concise, informative responses based on the available context.\n\
If asked about recent events or trends, focus on the provided source data.";

/// Build the full prompt for one exchange.
pub fn build_prompt(history: &[ChatMessage], summaries: &[Summary], query: &str) -> String {
    let turns = history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let sources = summaries
        .iter()
        .map(|s| s.body.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{PREAMBLE}\n\n\
         Previous conversation:\n{turns}\n\n\
         Current sources:\n{sources}\n\n\
         User query: {query}\n\n\
         Response (be natural and conversational):"
    )
}
