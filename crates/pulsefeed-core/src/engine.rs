//! The chat exchange engine: retrieval, prompt assembly, generation, and
//! history persistence for one query/answer round-trip.
//!
//! An exchange moves through: context gathering -> generation -> one of
//! three terminal outcomes. Completed exchanges update the session history
//! atomically; failed ones never do. A generation failure before the first
//! fragment is returned as an error so the caller can reject the request
//! outright; after output has started it becomes an in-band terminal
//! [`ChatEvent::Failed`] so the client always sees an explicit `done`.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use pulsefeed_types::chat::{ChatAnswer, ChatEvent, SourceCitation};
use pulsefeed_types::error::ExchangeError;

use crate::generation::Generator;
use crate::prompt::build_prompt;
use crate::retriever::ContextRetriever;
use crate::session::SessionStore;
use crate::store::SummaryStore;

/// How many summaries are retrieved as context per exchange.
const RETRIEVAL_LIMIT: usize = 3;

/// How many prior messages are replayed into the prompt.
const HISTORY_WINDOW: usize = 5;

/// Drives chat exchanges against a summary store and a generation backend.
pub struct ChatEngine<S, G> {
    retriever: ContextRetriever<S>,
    sessions: Arc<SessionStore>,
    generator: Arc<G>,
}

impl<S: SummaryStore, G: Generator> ChatEngine<S, G> {
    pub fn new(store: Arc<S>, sessions: Arc<SessionStore>, generator: Arc<G>) -> Self {
        Self {
            retriever: ContextRetriever::new(store),
            sessions,
            generator,
        }
    }

    /// Validate the query, then gather retrieved context and recent
    /// history and assemble the prompt and citation list.
    async fn prepare(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<(String, Vec<SourceCitation>), ExchangeError> {
        if query.trim().is_empty() {
            return Err(ExchangeError::InvalidInput);
        }

        let summaries = self.retriever.retrieve(query, RETRIEVAL_LIMIT).await?;
        let history = self.sessions.recent_context(session_id, HISTORY_WINDOW);
        debug!(
            session_id,
            context = summaries.len(),
            history = history.len(),
            "exchange context gathered"
        );

        let sources: Vec<SourceCitation> = summaries.iter().map(SourceCitation::from).collect();
        let prompt = build_prompt(&history, &summaries, query);
        Ok((prompt, sources))
    }

    /// Run a streaming exchange.
    ///
    /// The first fragment is awaited before the stream is handed back, so
    /// a backend that fails before producing output surfaces as an
    /// [`ExchangeError`] and the delivery channel is never opened. The
    /// returned stream emits fragments in generation order, each carrying
    /// the full (unchanging) citation list, and always ends with a
    /// terminal event: `Completed` after the history is updated, or
    /// `Failed` if the backend died mid-answer (in which case the partial
    /// exchange is not persisted).
    pub async fn run_stream(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<impl Stream<Item = ChatEvent> + Send + 'static, ExchangeError> {
        let (prompt, sources) = self.prepare(session_id, query).await?;

        let mut upstream = self.generator.stream(&prompt);
        debug!(session_id, backend = self.generator.name(), "generation started");
        let first = match upstream.next().await {
            Some(Err(err)) => return Err(ExchangeError::Generation(err)),
            other => other,
        };

        let sessions = Arc::clone(&self.sessions);
        let session_id = session_id.to_string();
        let query = query.to_string();

        Ok(async_stream::stream! {
            let mut answer = String::new();
            let mut next = first;
            loop {
                match next {
                    Some(Ok(text)) => {
                        answer.push_str(&text);
                        yield ChatEvent::Fragment {
                            text,
                            sources: sources.clone(),
                        };
                    }
                    Some(Err(err)) => {
                        warn!(session_id, error = %err, "generation failed mid-stream");
                        yield ChatEvent::Failed {
                            message: err.to_string(),
                        };
                        return;
                    }
                    None => break,
                }
                next = upstream.next().await;
            }

            sessions.append_exchange(&session_id, &query, &answer);
            debug!(session_id, answer_len = answer.len(), "exchange completed");
            yield ChatEvent::Completed;
        })
    }

    /// Run a non-streaming exchange: one blocking generation call, then
    /// the paired history append.
    pub async fn run_complete(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<ChatAnswer, ExchangeError> {
        let (prompt, sources) = self.prepare(session_id, query).await?;

        let answer = self.generator.complete(&prompt).await?;
        self.sessions.append_exchange(session_id, query, &answer);
        debug!(session_id, answer_len = answer.len(), "exchange completed");

        Ok(ChatAnswer { answer, sources })
    }
}
