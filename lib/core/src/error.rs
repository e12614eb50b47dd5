use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema fetch failed: {0}")]
    SchemaFetch(String),

    #[error("Embedding mismatch: {0}")]
    EmbeddingMismatch(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Judge unavailable: {0}")]
    JudgeUnavailable(String),

    #[error("Malformed verdict: {0}")]
    MalformedVerdict(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors from the judgment step. The request still succeeds with the
    /// apology response.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Error::JudgeUnavailable(_) | Error::MalformedVerdict(_))
    }

    /// Errors that leave nothing to rank for the current request.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            Error::SchemaFetch(_)
                | Error::EmbeddingMismatch(_)
                | Error::DimensionMismatch { .. }
                | Error::Cache(_)
                | Error::Io(_)
        )
    }
}

// io::Error is not Clone; single-flight waiters all need their own copy.
impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::SchemaFetch(s) => Error::SchemaFetch(s.clone()),
            Error::EmbeddingMismatch(s) => Error::EmbeddingMismatch(s.clone()),
            Error::DimensionMismatch { expected, actual } => Error::DimensionMismatch {
                expected: *expected,
                actual: *actual,
            },
            Error::JudgeUnavailable(s) => Error::JudgeUnavailable(s.clone()),
            Error::MalformedVerdict(s) => Error::MalformedVerdict(s.clone()),
            Error::Cache(s) => Error::Cache(s.clone()),
            Error::InvalidRequest(s) => Error::InvalidRequest(s.clone()),
            Error::InvalidConfig(s) => Error::InvalidConfig(s.clone()),
            Error::Io(e) => Error::Cache(e.to_string()),
        }
    }
}
