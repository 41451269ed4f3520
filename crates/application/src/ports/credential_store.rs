//! Session credential store port
//!
//! Defines the interface for persisting session cookies per controller.

use async_trait::async_trait;
use thiserror::Error;

use dnac_domain::{ControllerAddress, StoredSession};

/// Errors that can occur during credential store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialStoreError {
    /// Nothing is stored for the address.
    #[error("no session stored for {0}")]
    NotFound(ControllerAddress),

    /// The stored entry could not be decoded.
    #[error("stored session for {address} is corrupt: {reason}")]
    Corrupt {
        /// Address whose entry is unreadable.
        address: ControllerAddress,
        /// Decoder message.
        reason: String,
    },

    /// The backing storage failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl CredentialStoreError {
    /// Returns true if the error means "not authenticated" rather than a
    /// storage fault.
    #[must_use]
    pub const fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Corrupt { .. })
    }
}

/// Durable key-value persistence of session cookies, keyed by controller address.
#[async_trait]
pub trait SessionCredentialStore: Send + Sync {
    /// Stores `session` under its address, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Storage`] if the entry cannot be written.
    async fn save(&self, session: &StoredSession) -> Result<(), CredentialStoreError>;

    /// Loads the session stored for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NotFound`] if nothing is stored and
    /// [`CredentialStoreError::Corrupt`] if the entry cannot be decoded.
    async fn load(&self, address: &ControllerAddress)
    -> Result<StoredSession, CredentialStoreError>;

    /// Removes the entry for `address`. Removing a missing entry succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Storage`] if the backing storage fails.
    async fn clear(&self, address: &ControllerAddress) -> Result<(), CredentialStoreError>;

    /// Lists every address with a stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::Storage`] if the backing storage fails.
    async fn addresses(&self) -> Result<Vec<ControllerAddress>, CredentialStoreError>;
}
