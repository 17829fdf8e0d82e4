// # File State Store
//
// File-based implementation of StateStore.
//
// ## Behavior
//
// - Reads the state file on every load; the tick owns the in-memory copy
// - Atomic writes: new state is written to a temporary file, then renamed
// - Tolerant reads: a missing, unreadable or corrupt file yields the empty
//   state instead of an error
//
// ## File Format
//
// ```json
// {
//   "ipv4": { "last_ip": "1.2.3.4", "last_update_domains": ["example.com"] },
//   "ipv6": { "last_ip": "", "last_update_domains": [] }
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::Error;
use crate::traits::state_store::{StateStore, SyncState};

/// File-based state store
///
/// The default location is a well-known path under the system temp
/// directory; `save` creates intermediate directories as needed.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default state file location under the system temp directory
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join("ipsync").join("state.json")
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

impl Default for FileStateStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> SyncState {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet, starting empty");
                return SyncState::default();
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "failed to read state file, starting empty: {e}"
                );
                return SyncState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "failed to parse state file, starting empty: {e}"
                );
                SyncState::default()
            }
        }
    }

    async fn save(&self, state: &SyncState) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::state_store(format!(
                        "failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| Error::state_store(format!("failed to serialize state: {e}")))?;

        // Write-then-rename so a crash mid-write never leaves a truncated
        // state file behind.
        let temp_path = self.temp_path();
        fs::write(&temp_path, json.as_bytes()).await.map_err(|e| {
            Error::state_store(format!(
                "failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}
