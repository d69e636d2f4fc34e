//! Chat exchange types: message history, stream events, citations.
//!
//! [`ChatEvent`] is the tagged union of everything a streaming exchange can
//! emit. Its `Serialize` impl is written by hand so the wire shapes match
//! the SSE protocol exactly: fragments carry `done:false`, terminal events
//! carry `done:true`, and nothing else leaks into the payload.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

use crate::summary::Summary;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message in a session transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Citation for one retrieved summary, attached to every fragment of an
/// exchange so clients can render sources before the answer completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl From<&Summary> for SourceCitation {
    fn from(summary: &Summary) -> Self {
        Self {
            title: summary.title.clone(),
            url: summary.url.clone(),
            content: summary.body.clone(),
        }
    }
}

/// One event on a streaming exchange.
///
/// Wire forms (hand-written `Serialize`):
/// - `Fragment` -> `{"text": ..., "sources": [...], "done": false}`
/// - `Completed` -> `{"done": true}`
/// - `Failed` -> `{"error": ..., "done": true}`
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// An incremental piece of generated text, with the full citation list.
    Fragment {
        text: String,
        sources: Vec<SourceCitation>,
    },
    /// The exchange finished and the history was updated.
    Completed,
    /// The generator failed after output had already started.
    Failed { message: String },
}

impl Serialize for ChatEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChatEvent::Fragment { text, sources } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("text", text)?;
                map.serialize_entry("sources", sources)?;
                map.serialize_entry("done", &false)?;
                map.end()
            }
            ChatEvent::Completed => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("done", &true)?;
                map.end()
            }
            ChatEvent::Failed { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", message)?;
                map.serialize_entry("done", &true)?;
                map.end()
            }
        }
    }
}

/// Response body of a non-streaming exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
}
