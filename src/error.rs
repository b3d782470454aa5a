//! Error types

use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no image selected")]
    NoImage,

    #[error("API key not set. Set GEMINI_API_KEY or add api_key to the config file")]
    MissingApiKey,

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias
pub type Result<T> = std::result::Result<T, Error>;
