//! Error types for portal requests

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A decoded document that does not match its declared shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// Location of the offending value, e.g. `$.sessionInfo[0].state`
    pub path: String,
    /// The violated constraint, as reported by the validator
    pub constraint: String,
    /// What was found instead
    pub actual: String,
}

impl std::fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (got {})", self.path, self.constraint, self.actual)
    }
}

impl std::error::Error for ShapeMismatch {}

#[derive(Error, Debug)]
pub enum Error {
    /// The request never completed
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body is not JSON
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response shape mismatch at {0}")]
    ShapeMismatch(#[from] ShapeMismatch),

    /// A registered response schema did not compile
    #[error("invalid response schema: {0}")]
    Schema(String),

    /// The request body could not be serialized
    #[error("request body could not be encoded as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    /// Field path of a shape mismatch, if this is one
    pub fn mismatch_path(&self) -> Option<&str> {
        match self {
            Error::ShapeMismatch(m) => Some(&m.path),
            _ => None,
        }
    }
}
