use thiserror::Error;

/// Message shown for every pass-2 validation failure. Which check tripped is
/// never reported.
pub const INTEGRITY_MESSAGE: &str =
    "reversal impossible; parts may be corrupt, missing, or misordered";

#[derive(Error, Debug)]
pub enum AontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("{}", INTEGRITY_MESSAGE)]
    Integrity,

    #[error("Seek past total length: {offset} >= {total}")]
    Range { offset: u64, total: u64 },

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl AontError {
    /// Convert into an `io::Error` for use inside `Read`/`Seek` impls.
    pub(crate) fn into_io(self) -> std::io::Error {
        match self {
            AontError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::InvalidInput, other),
        }
    }

    /// Recover a typed error that travelled through an `io::Error`.
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<AontError>()) {
            return AontError::Io(err);
        }
        let kind = err.kind();
        match err.into_inner().map(|inner| inner.downcast::<AontError>()) {
            Some(Ok(aont)) => *aont,
            Some(Err(inner)) => AontError::Io(std::io::Error::new(kind, inner)),
            None => AontError::Io(std::io::Error::from(kind)),
        }
    }
}

pub type Result<T> = std::result::Result<T, AontError>;
