//! Session registry: one exclusively-owned context manager per session id.

use dashmap::DashMap;
use recap_core::config::ContextConfig;
use recap_core::types::ContextStats;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::manager::ContextManager;

/// Shared handle to a session's manager. Locking it serializes access, so
/// one request is in flight per session.
pub type SessionHandle = Arc<Mutex<ContextManager>>;

/// Maps opaque session ids to exclusively-owned context managers.
///
/// Creation on first use is atomic per key, so a session id resolves to
/// exactly one manager instance for its lifetime even under concurrent
/// callers.
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    defaults: ContextConfig,
}

impl SessionRegistry {
    /// Create a registry; new sessions get `defaults` as their budget
    /// configuration.
    pub fn new(defaults: ContextConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            defaults,
        }
    }

    /// Fetch the session's manager, creating it on first use.
    pub fn get_or_create(&self, session_id: &str) -> SessionHandle {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "creating context manager");
                Arc::new(Mutex::new(ContextManager::new(self.defaults.clone())))
            })
            .clone()
    }

    /// Drop a session's context entirely. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            debug!(session_id, "cleared session");
        }
        removed
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Stats snapshot per live session.
    pub async fn list_sessions(&self) -> HashMap<String, ContextStats> {
        // Collect handles first so no shard lock is held across an await
        let handles: Vec<(String, SessionHandle)> = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut stats = HashMap::with_capacity(handles.len());
        for (id, handle) in handles {
            let manager = handle.lock().await;
            stats.insert(id, manager.stats());
        }
        stats
    }

    /// Default budget configuration handed to new sessions.
    pub fn defaults(&self) -> &ContextConfig {
        &self.defaults
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}
