//! Controller authentication.
//!
//! This module provides:
//! - The session manager driving the login exchange
//! - Session events and observers
//! - An in-memory credential store

mod events;
pub mod login;
mod memory_store;
mod session_manager;

pub use events::{LoginAttemptId, NoopObserver, SessionEvent, SessionObserver};
pub use memory_store::InMemoryCredentialStore;
pub use session_manager::{AuthenticationSessionManager, LoginHandle};
