//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod credential_store;
mod file_system;
mod http_client;

pub use clock::Clock;
pub use credential_store::{CredentialStoreError, SessionCredentialStore};
pub use file_system::{FileSystem, FileSystemError};
pub use http_client::{HttpClient, HttpClientError};
