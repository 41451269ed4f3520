//! DNAC Session Application - Session manager and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for HTTP, storage, time)
//! - The authentication session manager
//! - Application-level error handling

pub mod auth;
pub mod error;
pub mod ports;

pub use auth::{
    AuthenticationSessionManager, InMemoryCredentialStore, LoginAttemptId, LoginHandle,
    NoopObserver, SessionEvent, SessionObserver,
};
pub use error::{SessionError, SessionResult};
pub use ports::{
    Clock, CredentialStoreError, FileSystem, FileSystemError, HttpClient, HttpClientError,
    SessionCredentialStore,
};
