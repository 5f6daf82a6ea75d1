use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Measurement failed: {0}")]
    Measurement(String),

    #[error("Corrupt store {}: line {line}: {reason}", .path.display())]
    CorruptStore { path: PathBuf, line: usize, reason: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn measurement<S: Into<String>>(msg: S) -> Self {
        Error::Measurement(msg.into())
    }

    pub(crate) fn corrupt_store<S: Into<String>>(path: impl Into<PathBuf>, line: usize, reason: S) -> Self {
        Error::CorruptStore { path: path.into(), line, reason: reason.into() }
    }

    pub(crate) fn invalid_record<S: Into<String>>(msg: S) -> Self {
        Error::InvalidRecord(msg.into())
    }

    pub(crate) fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// True for failures that only cost the current tick.
    pub fn is_measurement(&self) -> bool {
        matches!(self, Error::Measurement(_))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
