//! Error types shared by the control and its collaborators

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised from inside a lifecycle call or command.
///
/// The host sees this the same way a platform sees a control throwing from
/// `updateView`: the call is abandoned and the host runs its recovery path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// Deliberate fault raised by the `error` probe
    #[error("{0}")]
    Injected(String),
}

/// Failure reading or writing the persisted mode file.
#[derive(Debug, Error)]
pub enum ModeStoreError {
    #[error("mode file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mode file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
