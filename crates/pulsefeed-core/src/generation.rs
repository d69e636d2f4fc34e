//! Generator trait definition.
//!
//! The capability interface over the generative-model backend: one-shot
//! completion and incremental streaming. `complete` uses RPITIT; `stream`
//! returns a boxed stream so the trait stays usable behind wrappers
//! (streams in return position are not object-safe otherwise).

use std::pin::Pin;

use futures_util::Stream;

use pulsefeed_types::error::GenerationError;

/// A stream of incremental text fragments from the generation backend.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<String, GenerationError>> + Send + 'static>>;

/// Generative-model backend.
///
/// Implementations live in pulsefeed-infra (e.g. `GeminiGenerator`).
pub trait Generator: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and receive the complete answer in one response.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;

    /// Send a prompt and receive the answer as a lazy sequence of text
    /// fragments, in generation order.
    fn stream(&self, prompt: &str) -> FragmentStream;
}
