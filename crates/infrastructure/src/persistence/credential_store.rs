//! File-based session credential store.
//!
//! All sessions live in one `sessions.json` document inside the store
//! directory. Entries are decoded one at a time, so a damaged entry only
//! affects its own controller. Writes go to a uniquely named temporary file
//! that is then renamed over the document, so writers in other processes never
//! share a temporary file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use dnac_application::ports::{
    CredentialStoreError, FileSystem, FileSystemError, SessionCredentialStore,
};
use dnac_domain::{ControllerAddress, StoredSession};

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const SESSIONS_FILE: &str = "sessions.json";
const SCHEMA_VERSION: u32 = 1;

/// On-disk layout:
/// ```json
/// {
///   "schema_version": 1,
///   "sessions": {
///     "10.0.0.1": {
///       "address": "10.0.0.1",
///       "cookies": [{ "name": "X-JWT-ACCESS-TOKEN", "value": "...", "domain": "10.0.0.1", "path": "/" }],
///       "saved_at": "2024-05-01T12:00:00Z"
///     }
///   }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
struct SessionsDocument {
    schema_version: u32,
    #[serde(default)]
    sessions: BTreeMap<String, serde_json::Value>,
}

impl Default for SessionsDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: BTreeMap::new(),
        }
    }
}

/// Result of reading the document from disk.
enum Document {
    Missing,
    Unreadable(String),
    Loaded(SessionsDocument),
}

/// File-based session credential store.
#[derive(Debug)]
pub struct FileCredentialStore<F> {
    fs: F,
    dir: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl<F: FileSystem> FileCredentialStore<F> {
    /// Creates a store rooted at `dir`.
    pub fn new(fs: F, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Platform data directory for the store, e.g. `~/.local/share/dnac-session`.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("dnac-session"))
    }

    /// Path of the sessions document.
    #[must_use]
    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join(SESSIONS_FILE)
    }

    /// Fresh temporary path next to the document.
    fn temp_path(&self) -> PathBuf {
        self.dir
            .join(format!("{SESSIONS_FILE}.{}.tmp", uuid::Uuid::now_v7().simple()))
    }

    fn storage_error(path: &Path, e: &FileSystemError) -> CredentialStoreError {
        CredentialStoreError::Storage(format!("{}: {e}", path.display()))
    }

    async fn read_document(&self) -> Result<Document, CredentialStoreError> {
        let path = self.sessions_path();

        let content = match self.fs.read_file(&path).await {
            Ok(content) => content,
            Err(FileSystemError::NotFound(_)) => return Ok(Document::Missing),
            Err(e) => return Err(Self::storage_error(&path, &e)),
        };

        Ok(match from_json_bytes::<SessionsDocument>(&content) {
            Ok(document) => Document::Loaded(document),
            Err(e) => Document::Unreadable(e.to_string()),
        })
    }

    async fn write_document(&self, document: &SessionsDocument) -> Result<(), CredentialStoreError> {
        let path = self.sessions_path();
        let tmp = self.temp_path();

        self.fs
            .create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::storage_error(&self.dir, &e))?;

        let content = to_json_stable_bytes(document)
            .map_err(|e| CredentialStoreError::Storage(e.to_string()))?;

        self.fs
            .write_file(&tmp, &content)
            .await
            .map_err(|e| Self::storage_error(&tmp, &e))?;
        self.fs
            .rename(&tmp, &path)
            .await
            .map_err(|e| Self::storage_error(&path, &e))
    }
}

#[async_trait]
impl<F: FileSystem> SessionCredentialStore for FileCredentialStore<F> {
    async fn save(&self, session: &StoredSession) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;

        let mut document = match self.read_document().await? {
            Document::Loaded(document) => document,
            Document::Missing => SessionsDocument::default(),
            Document::Unreadable(reason) => {
                tracing::warn!(path = %self.sessions_path().display(), %reason, "replacing unreadable session file");
                SessionsDocument::default()
            }
        };

        let entry = serde_json::to_value(session)
            .map_err(|e| CredentialStoreError::Storage(e.to_string()))?;
        document
            .sessions
            .insert(session.address.as_str().to_string(), entry);
        document.schema_version = SCHEMA_VERSION;

        self.write_document(&document).await
    }

    async fn load(
        &self,
        address: &ControllerAddress,
    ) -> Result<StoredSession, CredentialStoreError> {
        let _guard = self.lock.lock().await;

        let document = match self.read_document().await? {
            Document::Loaded(document) => document,
            Document::Missing => return Err(CredentialStoreError::NotFound(address.clone())),
            Document::Unreadable(reason) => {
                return Err(CredentialStoreError::Corrupt {
                    address: address.clone(),
                    reason,
                });
            }
        };

        let entry = document
            .sessions
            .get(address.as_str())
            .ok_or_else(|| CredentialStoreError::NotFound(address.clone()))?;

        let session: StoredSession =
            serde_json::from_value(entry.clone()).map_err(|e| CredentialStoreError::Corrupt {
                address: address.clone(),
                reason: e.to_string(),
            })?;

        if &session.address != address {
            return Err(CredentialStoreError::Corrupt {
                address: address.clone(),
                reason: format!("entry belongs to {}", session.address),
            });
        }

        Ok(session)
    }

    async fn clear(&self, address: &ControllerAddress) -> Result<(), CredentialStoreError> {
        let _guard = self.lock.lock().await;

        // An unreadable document has nothing loadable to clear.
        let Document::Loaded(mut document) = self.read_document().await? else {
            return Ok(());
        };

        if document.sessions.remove(address.as_str()).is_none() {
            return Ok(());
        }
        self.write_document(&document).await
    }

    async fn addresses(&self) -> Result<Vec<ControllerAddress>, CredentialStoreError> {
        let _guard = self.lock.lock().await;

        match self.read_document().await? {
            Document::Loaded(document) => Ok(document
                .sessions
                .keys()
                .map(|k| ControllerAddress::new(k.as_str()))
                .collect()),
            Document::Missing | Document::Unreadable(_) => Ok(Vec::new()),
        }
    }
}
