//! Retrieval backend — the capability the screener delegates embedding, retrieval
//! and generation to.
//!
//! Three operations: build an index from text chunks, answer a question against an
//! index (retrieval-augmented), and answer a free-text prompt directly. `HostedBackend`
//! implements them over the LLM client; tests substitute an in-memory fake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::llm_client::{ChatMessage, GenerationParams, LlmError};

pub mod chunking;
pub mod hosted;
pub mod index;
pub mod normalize;

#[cfg(test)]
pub mod fake;

pub use index::RetrievalIndex;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),
}

/// The shapes a backend reply can take. Callers collapse these with
/// [`normalize::normalize_reply`] before reading them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BackendReply {
    Text(String),
    /// Keyed reply, e.g. `{"query": ..., "result": ...}` from a QA chain.
    Structured(Map<String, Value>),
    /// Chat message carrying a `content` attribute.
    Message(ChatMessage),
    Batch(Vec<BackendReply>),
}

impl From<&str> for BackendReply {
    fn from(text: &str) -> Self {
        BackendReply::Text(text.to_string())
    }
}

impl From<String> for BackendReply {
    fn from(text: String) -> Self {
        BackendReply::Text(text)
    }
}

/// Embedding, retrieval and generation capability.
///
/// Carried by each session as `Arc<dyn RetrievalBackend>`.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    /// Builds a searchable index over the given chunks.
    async fn build_index(&self, chunks: Vec<String>) -> Result<RetrievalIndex, BackendError>;

    /// Answers `question` using the `top_k` nearest chunks of `index`
    /// (backend default depth when `None`).
    async fn query(
        &self,
        index: &RetrievalIndex,
        question: &str,
        top_k: Option<usize>,
        params: GenerationParams,
    ) -> Result<BackendReply, BackendError>;

    /// Answers a prompt with no retrieval.
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<BackendReply, BackendError>;

    /// Returns the same backend authenticated with a different credential.
    fn with_api_key(&self, api_key: &str) -> Arc<dyn RetrievalBackend>;
}
