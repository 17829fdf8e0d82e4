// # Memory State Store
//
// In-memory implementation of StateStore. Nothing survives a restart: the
// first tick after a restart treats every address as new and re-verifies
// all domains against the provider, which is safe but not free. Meant for
// tests and embedded use.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateStore, SyncState};

/// In-memory state store
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<SyncState>>,
}

impl MemoryStateStore {
    /// Create a new store holding the empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `state`
    pub fn with_state(state: SyncState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> SyncState {
        self.inner.read().await.clone()
    }

    async fn save(&self, state: &SyncState) -> Result<(), Error> {
        *self.inner.write().await = state.clone();
        Ok(())
    }
}
