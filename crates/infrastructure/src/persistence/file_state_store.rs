//! File-backed session store.
//!
//! Each namespace is persisted as one JSON file in the state directory:
//! - `state_dir` from the client configuration, if set
//! - otherwise the platform data directory, e.g. `~/.local/share/peach`
//!
//! Writes go to a temporary file that is renamed over the previous one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use peach_application::ClientConfig;
use peach_application::ports::{StateStore, StoreError};
use peach_domain::{SessionPatch, SessionState};
use tokio::fs;
use tokio::sync::Mutex;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// Session store persisted to `<dir>/<namespace>.json`.
///
/// The lock is held across apply and write, so files on disk always
/// reflect patches in the order they were applied. A patch that cannot be
/// written is not applied.
#[derive(Debug)]
pub struct FileStateStore {
    namespace: String,
    path: PathBuf,
    state: Mutex<SessionState>,
}

impl FileStateStore {
    /// Default state directory under the platform data directory.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("peach"))
    }

    /// Opens the store for a client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoDataDir`] if no state directory is configured
    /// and the platform has none, or an error if an existing file is
    /// unreadable.
    pub async fn for_config(config: &ClientConfig) -> Result<Self, StoreError> {
        let dir = match &config.state_dir {
            Some(dir) => dir.clone(),
            None => Self::default_dir().ok_or(StoreError::NoDataDir)?,
        };
        Self::open(&dir, &config.namespace).await
    }

    /// Opens (or starts) the session for `namespace` under `dir`.
    ///
    /// A missing file yields an empty session.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub async fn open(dir: &Path, namespace: &str) -> Result<Self, StoreError> {
        let path = dir.join(format!("{namespace}.json"));

        let state = if fs::try_exists(&path).await? {
            let content = fs::read(&path).await?;
            from_json_bytes(&content)?
        } else {
            SessionState::default()
        };

        tracing::debug!(namespace, path = %path.display(), "session store opened");

        Ok(Self {
            namespace: namespace.to_string(),
            path,
            state: Mutex::new(state),
        })
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &SessionState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self) -> Result<SessionState, StoreError> {
        Ok(self.state.lock().await.clone())
    }

    async fn set(&self, patch: SessionPatch) -> Result<SessionState, StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.apply(patch);
        self.persist(&next).await?;
        *state = next.clone();
        Ok(next)
    }
}
