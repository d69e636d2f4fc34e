//! GeminiGenerator -- concrete [`Generator`] implementation for the Gemini
//! REST API.
//!
//! `complete` calls `:generateContent`; `stream` calls
//! `:streamGenerateContent?alt=sse` and adapts the SSE event stream to
//! text fragments. The API key is wrapped in [`secrecy::SecretString`] and
//! only exposed when building request headers; it never appears in Debug
//! output or logs.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use pulsefeed_core::generation::{FragmentStream, Generator};
use pulsefeed_types::error::GenerationError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini generation backend.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiGenerator {
    /// Create a new generator for the given model.
    pub fn new(api_key: SecretString, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300)) // long generations
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            model,
        }
    }

    /// Read the API key from `GEMINI_API_KEY`.
    pub fn from_env(model: String) -> Result<Self, GenerationError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| GenerationError::Backend {
            message: "GEMINI_API_KEY is not set".to_string(),
        })?;
        Ok(Self::new(api_key.into(), model))
    }

    /// Override the base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/{}:{operation}", self.base_url, self.model)
    }
}

// GeminiGenerator intentionally does not derive Debug; the SecretString
// field already refuses to print the key, and omitting Debug entirely
// keeps the whole request state out of logs.

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.url("generateContent"))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GeminiRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| GenerationError::Backend {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Backend {
                message: format!("HTTP {status}"),
            });
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        let text = payload.text();
        if text.is_empty() {
            return Err(GenerationError::Malformed(
                "response contained no candidate text".to_string(),
            ));
        }
        Ok(text)
    }

    fn stream(&self, prompt: &str) -> FragmentStream {
        let request = self
            .client
            .post(format!("{}?alt=sse", self.url("streamGenerateContent")))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GeminiRequest::from_prompt(prompt));

        Box::pin(async_stream::stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    yield Err(GenerationError::Backend {
                        message: err.to_string(),
                    });
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                yield Err(GenerationError::Backend {
                    message: format!("HTTP {status}"),
                });
                return;
            }

            let mut events = response.bytes_stream().eventsource();
            while let Some(event) = events.next().await {
                match event {
                    Ok(event) => {
                        let payload: GeminiResponse = match serde_json::from_str(&event.data) {
                            Ok(payload) => payload,
                            Err(err) => {
                                yield Err(GenerationError::Malformed(err.to_string()));
                                return;
                            }
                        };
                        let text = payload.text();
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                    Err(err) => {
                        yield Err(GenerationError::Stream(err.to_string()));
                        return;
                    }
                }
            }
        })
    }
}
