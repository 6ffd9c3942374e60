//! Scripted in-memory backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::GenerationParams;
use crate::retrieval::{BackendError, BackendReply, RetrievalBackend, RetrievalIndex};

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Reply(BackendReply),
    Fail(String),
    /// Never answers within any sane timeout.
    Stall,
}

impl FakeResponse {
    pub fn text(text: &str) -> Self {
        FakeResponse::Reply(BackendReply::from(text))
    }
}

#[derive(Debug, Default)]
struct FakeState {
    rules: Vec<(String, FakeResponse)>,
    default: Option<FakeResponse>,
    fail_index: bool,
    latency: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    index_builds: AtomicUsize,
    indexed_chunks: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    api_keys: Mutex<Vec<String>>,
}

/// Answers every query or prompt with the first rule whose needle it contains,
/// else with the default response.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<FakeState>,
}

impl FakeBackend {
    pub fn replying(text: &str) -> FakeBackendBuilder {
        FakeBackendBuilder {
            state: FakeState {
                default: Some(FakeResponse::text(text)),
                ..FakeState::default()
            },
        }
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn index_builds(&self) -> usize {
        self.state.index_builds.load(Ordering::SeqCst)
    }

    /// Chunks received across every index build.
    pub fn indexed_chunks(&self) -> usize {
        self.state.indexed_chunks.load(Ordering::SeqCst)
    }

    /// Highest number of queries that were awaiting a reply at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.state.prompts.lock().unwrap().clone()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.state.api_keys.lock().unwrap().clone()
    }

    async fn respond(&self, input: &str) -> Result<BackendReply, BackendError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.prompts.lock().unwrap().push(input.to_string());

        let now_in_flight = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .peak_in_flight
            .fetch_max(now_in_flight, Ordering::SeqCst);
        if let Some(latency) = self.state.latency {
            tokio::time::sleep(latency).await;
        }
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self
            .state
            .rules
            .iter()
            .find(|(needle, _)| input.contains(needle.as_str()))
            .map(|(_, r)| r.clone())
            .or_else(|| self.state.default.clone())
            .unwrap_or_else(|| FakeResponse::text(""));

        match response {
            FakeResponse::Reply(reply) => Ok(reply),
            FakeResponse::Fail(msg) => Err(BackendError::Unavailable(msg)),
            FakeResponse::Stall => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(BackendError::Unavailable("stalled".to_string()))
            }
        }
    }
}

pub struct FakeBackendBuilder {
    state: FakeState,
}

impl FakeBackendBuilder {
    pub fn on(mut self, needle: &str, response: FakeResponse) -> Self {
        self.state.rules.push((needle.to_string(), response));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.state.latency = Some(latency);
        self
    }

    pub fn failing_index(mut self) -> Self {
        self.state.fail_index = true;
        self
    }

    pub fn build(self) -> FakeBackend {
        FakeBackend {
            state: Arc::new(self.state),
        }
    }
}

#[async_trait]
impl RetrievalBackend for FakeBackend {
    async fn build_index(&self, chunks: Vec<String>) -> Result<RetrievalIndex, BackendError> {
        self.state.index_builds.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_index {
            return Err(BackendError::Unavailable("embedding service down".to_string()));
        }
        // Hosted embedding endpoints refuse empty input strings.
        if chunks.iter().any(|chunk| chunk.trim().is_empty()) {
            return Err(BackendError::Unavailable(
                "input cannot be an empty string".to_string(),
            ));
        }
        self.state
            .indexed_chunks
            .fetch_add(chunks.len(), Ordering::SeqCst);
        let embeddings = vec![Vec::new(); chunks.len()];
        RetrievalIndex::new(chunks, embeddings)
    }

    async fn query(
        &self,
        _index: &RetrievalIndex,
        question: &str,
        _top_k: Option<usize>,
        _params: GenerationParams,
    ) -> Result<BackendReply, BackendError> {
        self.respond(question).await
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: GenerationParams,
    ) -> Result<BackendReply, BackendError> {
        self.respond(prompt).await
    }

    fn with_api_key(&self, api_key: &str) -> Arc<dyn RetrievalBackend> {
        self.state.api_keys.lock().unwrap().push(api_key.to_string());
        Arc::new(self.clone())
    }
}
