//! State-file error types.

use std::path::PathBuf;

use homehub_domain::error::HubError;

/// Errors specific to the JSON state file.
#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    /// Reading, writing or renaming the file failed.
    #[error("state file {path} is not accessible")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid snapshot.
    #[error("state file {path} is malformed")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StateFileError> for HubError {
    fn from(err: StateFileError) -> Self {
        HubError::Persistence(Box::new(err))
    }
}
