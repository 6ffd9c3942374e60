use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::llm_client::prompts::{grounded_qa_prompt, GROUNDED_QA_SYSTEM};
use crate::llm_client::{GenerationParams, LlmClient};
use crate::retrieval::{BackendError, BackendReply, RetrievalBackend, RetrievalIndex};

/// Retrieval depth used when the caller does not ask for a specific `k`.
pub const DEFAULT_TOP_K: usize = 4;

/// Retrieval backend over the hosted embedding and chat endpoints.
#[derive(Clone)]
pub struct HostedBackend {
    llm: LlmClient,
}

impl HostedBackend {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RetrievalBackend for HostedBackend {
    async fn build_index(&self, chunks: Vec<String>) -> Result<RetrievalIndex, BackendError> {
        // The embeddings endpoint rejects empty input strings.
        let chunks: Vec<String> = chunks
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();
        let embeddings = self.llm.embed(&chunks).await?;
        debug!("Embedded {} chunks", chunks.len());
        RetrievalIndex::new(chunks, embeddings)
    }

    async fn query(
        &self,
        index: &RetrievalIndex,
        question: &str,
        top_k: Option<usize>,
        params: GenerationParams,
    ) -> Result<BackendReply, BackendError> {
        let k = top_k.unwrap_or(DEFAULT_TOP_K);

        let passages = if index.is_empty() {
            Vec::new()
        } else {
            let query_embedding = self
                .llm
                .embed(&[question.to_string()])
                .await?
                .into_iter()
                .next()
                .unwrap_or_default();
            index.nearest(&query_embedding, k)
        };

        let prompt = grounded_qa_prompt(&passages, question);
        let message = self
            .llm
            .chat(&prompt, Some(GROUNDED_QA_SYSTEM), params)
            .await?;

        let mut reply = Map::new();
        reply.insert("query".to_string(), Value::String(question.to_string()));
        reply.insert(
            "result".to_string(),
            Value::String(message.content.unwrap_or_default()),
        );
        Ok(BackendReply::Structured(reply))
    }

    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<BackendReply, BackendError> {
        let message = self.llm.chat(prompt, None, params).await?;
        Ok(BackendReply::Message(message))
    }

    fn with_api_key(&self, api_key: &str) -> Arc<dyn RetrievalBackend> {
        Arc::new(HostedBackend::new(self.llm.with_api_key(api_key)))
    }
}
