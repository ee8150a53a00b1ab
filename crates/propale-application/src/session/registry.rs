//! Process-wide session store.
//!
//! Sessions live in memory only; nothing survives a restart. The registry
//! never expires entries on its own — an external reaper decides when to
//! call [`SessionRegistry::remove`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::orchestrator::SectionOrchestrator;

/// In-memory map of session id → orchestrator.
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<SectionOrchestrator>>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session under its own id.
    pub async fn insert(&self, orchestrator: Arc<SectionOrchestrator>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(orchestrator.session_id().to_string(), orchestrator);
    }

    /// Looks up a session by id.
    pub async fn get(&self, session_id: &str) -> Option<Arc<SectionOrchestrator>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Removes a session; returns whether it existed.
    ///
    /// Dropping the orchestrator also drops its event channel, releasing any
    /// accumulated events.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    /// Lists the ids of all live sessions.
    pub async fn session_ids(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        sessions.keys().cloned().collect()
    }
}
