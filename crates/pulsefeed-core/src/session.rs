//! In-memory per-conversation message history.
//!
//! Sessions are created lazily on first append and retained for the
//! process lifetime (no eviction; acceptable for the current deployment
//! shape, revisit if session cardinality grows unbounded). The map is a
//! `DashMap`, so unrelated sessions never contend on one lock, and the
//! paired append holds a single entry guard for both writes: a concurrent
//! reader sees either neither message of an exchange or both.

use chrono::Utc;
use dashmap::DashMap;

use pulsefeed_types::chat::{ChatMessage, MessageRole};

/// Process-wide store of session transcripts.
///
/// Constructed once at startup and injected into the components that need
/// it; never accessed as a global.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Vec<ChatMessage>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single message, creating the session if needed.
    pub fn append(&self, session_id: &str, message: ChatMessage) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .push(message);
    }

    /// Append a completed (user, assistant) exchange as one atomic unit.
    ///
    /// Both messages are pushed under the same entry guard, so no reader
    /// can observe the user message without its paired answer.
    pub fn append_exchange(&self, session_id: &str, query: &str, answer: &str) {
        let now = Utc::now();
        let mut entry = self.sessions.entry(session_id.to_string()).or_default();
        entry.push(ChatMessage {
            role: MessageRole::User,
            content: query.to_string(),
            timestamp: now,
        });
        entry.push(ChatMessage {
            role: MessageRole::Assistant,
            content: answer.to_string(),
            timestamp: now,
        });
    }

    /// The last `window` messages of a session, oldest first.
    ///
    /// Unknown sessions and `window == 0` both yield an empty vec, never
    /// an error.
    pub fn recent_context(&self, session_id: &str, window: usize) -> Vec<ChatMessage> {
        if window == 0 {
            return Vec::new();
        }
        match self.sessions.get(session_id) {
            Some(messages) => {
                let start = messages.len().saturating_sub(window);
                messages[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Full transcript of a session, oldest first.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .get(session_id)
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Number of sessions currently held.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn message(role: MessageRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn append_creates_session_lazily() {
        let store = SessionStore::new();
        assert_eq!(store.session_count(), 0);

        store.append("s1", message(MessageRole::User, "hello"));
        assert_eq!(store.session_count(), 1);
        assert_eq!(store.history("s1").len(), 1);
    }

    #[test]
    fn recent_context_returns_last_n_oldest_first() {
        let store = SessionStore::new();
        for i in 0..7 {
            store.append("s1", message(MessageRole::User, &format!("m{i}")));
        }

        let recent = store.recent_context("s1", 3);
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m4", "m5", "m6"]);
    }

    #[test]
    fn recent_context_window_zero_is_empty() {
        let store = SessionStore::new();
        store.append("s1", message(MessageRole::User, "hello"));
        assert!(store.recent_context("s1", 0).is_empty());
    }

    #[test]
    fn recent_context_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.recent_context("missing", 5).is_empty());
    }

    #[test]
    fn exchange_lands_as_last_two_entries_in_order() {
        let store = SessionStore::new();
        store.append("s1", message(MessageRole::User, "earlier"));
        store.append_exchange("s1", "what changed?", "Quite a lot.");

        let history = store.history("s1");
        assert_eq!(history.len(), 3);
        let pair = &history[history.len() - 2..];
        assert_eq!(pair[0].role, MessageRole::User);
        assert_eq!(pair[0].content, "what changed?");
        assert_eq!(pair[1].role, MessageRole::Assistant);
        assert_eq!(pair[1].content, "Quite a lot.");
    }

    #[tokio::test]
    async fn concurrent_exchanges_never_interleave_pairs() {
        let store = Arc::new(SessionStore::new());

        let mut handles = Vec::new();
        for task in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    store.append_exchange("shared", &format!("q{task}-{i}"), &format!("a{task}-{i}"));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = store.history("shared");
        assert_eq!(history.len(), 8 * 25 * 2);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
            // The answer must belong to the same exchange as the question.
            assert_eq!(
                pair[0].content.trim_start_matches('q'),
                pair[1].content.trim_start_matches('a')
            );
        }
    }
}
