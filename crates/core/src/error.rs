//! Error types shared across the workspace

use thiserror::Error;

/// Assistant error type
///
/// None of these abort a running session: recognition and synthesis failures
/// degrade the speech path, storage failures degrade persistence to
/// in-memory, and parse failures leave a form field unset.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Recognition error: {0}")]
    Recognition(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Language detection error: {0}")]
    Detection(String),

    #[error("Session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
