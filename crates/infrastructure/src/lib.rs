//! DNAC Session Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the ports defined in the application layer:
//! a reqwest HTTP client with per-request server trust evaluation, a
//! file-backed session store, and layered settings loading.

pub mod adapters;
pub mod persistence;
pub mod serialization;
pub mod settings;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use persistence::{FileCredentialStore, TokioFileSystem};
pub use serialization::{
    SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes,
};
pub use settings::{SettingsError, SettingsLoader, resolve_store_dir};
