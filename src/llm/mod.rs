//! LLM completion clients.
//!
//! The pipeline talks to the model through [`CompletionClient`]: one filled
//! prompt in, one free-form text completion out. No streaming, no retries;
//! all structure is recovered from the text by the caller.

mod yandex;

pub use yandex::YandexGptClient;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("completion response contained no alternatives")]
    Empty,
}

/// One-shot prompt-completion capability.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
