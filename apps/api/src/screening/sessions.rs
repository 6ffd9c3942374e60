use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::agent::ResumeAnalysisAgent;

/// A session's agent. The mutex serializes every operation on one session, so
/// two `analyze` calls can never interleave their state updates.
pub type SharedAgent = Arc<Mutex<ResumeAnalysisAgent>>;

/// Live sessions keyed by id. Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedAgent>>>,
}

impl SessionStore {
    pub async fn insert(&self, agent: ResumeAnalysisAgent) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(agent)));
        info!("Session {id} created");
        id
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedAgent, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    /// Removes a session and deletes its temporary files.
    pub async fn close(&self, id: Uuid) -> Result<(), AppError> {
        let agent = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

        let removed = agent.lock().await.cleanup();
        info!("Session {id} closed ({removed} temp files removed)");
        Ok(())
    }

    /// Closes every session. Run on shutdown.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<(Uuid, SharedAgent)> = self.sessions.write().await.drain().collect();
        let count = drained.len();
        for (_, agent) in drained {
            agent.lock().await.cleanup();
        }
        count
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
