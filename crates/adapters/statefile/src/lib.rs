//! # homehub-adapter-statefile
//!
//! [`StateStore`] backed by a single JSON file.
//!
//! ## File format
//!
//! ```json
//! {
//!   "devices": {
//!     "hallwayLight": {
//!       "probably_turned_on": true,
//!       "last_color": { "red": 255, "green": 255, "blue": 255 }
//!     }
//!   }
//! }
//! ```
//!
//! ## Crash safety
//!
//! A snapshot is written to `<path>.tmp`, synced to disk and renamed over
//! the previous file, so a reader sees either the old or the new snapshot.
//! A missing file reads as an empty snapshot.
//!
//! ## Dependency rule
//!
//! Depends on `homehub-app` (port traits) and `homehub-domain` only.

mod error;

pub use error::StateFileError;

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use homehub_app::ports::StateStore;
use homehub_domain::device::Statefile;
use homehub_domain::error::HubError;

/// JSON snapshot file at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonStateFile {
    path: PathBuf,
}

impl JsonStateFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    async fn read(&self) -> Result<Statefile, StateFileError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no state file yet");
                return Ok(Statefile::default());
            }
            Err(source) => {
                return Err(StateFileError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&content).map_err(|source| StateFileError::Json {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, statefile: &Statefile) -> Result<(), StateFileError> {
        let json = serde_json::to_vec_pretty(statefile).map_err(|source| StateFileError::Json {
            path: self.path.clone(),
            source,
        })?;

        let temp_path = self.temp_path();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StateFileError::Io { path, source }
        };
        {
            let mut file = fs::File::create(&temp_path)
                .await
                .map_err(io_err(&temp_path))?;
            file.write_all(&json).await.map_err(io_err(&temp_path))?;
            file.sync_all().await.map_err(io_err(&temp_path))?;
        }
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(io_err(&self.path))?;

        tracing::trace!(path = %self.path.display(), devices = statefile.devices.len(), "state file written");
        Ok(())
    }
}

impl StateStore for JsonStateFile {
    async fn load(&self) -> Result<Statefile, HubError> {
        Ok(self.read().await?)
    }

    async fn save(&self, statefile: Statefile) -> Result<(), HubError> {
        Ok(self.write(&statefile).await?)
    }
}
