use std::sync::Arc;

use crate::config::Config;
use crate::retrieval::RetrievalBackend;
use crate::screening::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Backend template; each session receives a copy re-keyed with its own credential.
    pub backend: Arc<dyn RetrievalBackend>,
    pub sessions: SessionStore,
}
