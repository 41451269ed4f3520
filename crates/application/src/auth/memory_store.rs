//! In-memory session credential store.
//!
//! Keeps sessions for the lifetime of the process. Used by tests and by
//! callers that do not want cookies written to disk.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use dnac_domain::{ControllerAddress, StoredSession};

use crate::ports::{CredentialStoreError, SessionCredentialStore};

/// Thread-safe in-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    sessions: Arc<RwLock<HashMap<ControllerAddress, StoredSession>>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionCredentialStore for InMemoryCredentialStore {
    async fn save(&self, session: &StoredSession) -> Result<(), CredentialStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.address.clone(), session.clone());
        Ok(())
    }

    async fn load(
        &self,
        address: &ControllerAddress,
    ) -> Result<StoredSession, CredentialStoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(address)
            .cloned()
            .ok_or_else(|| CredentialStoreError::NotFound(address.clone()))
    }

    async fn clear(&self, address: &ControllerAddress) -> Result<(), CredentialStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(address);
        Ok(())
    }

    async fn addresses(&self) -> Result<Vec<ControllerAddress>, CredentialStoreError> {
        let sessions = self.sessions.read().await;
        let mut addresses: Vec<_> = sessions.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }
}
