use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Reasons a video upload ends without a video id.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Video file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to authenticate with YouTube: {0}")]
    Auth(String),

    #[error("A non-retriable HTTP error {status} occurred: {body}")]
    Http { status: u16, body: String },

    #[error("Maximum retries ({retries}) exceeded. Upload failed. Last error: {last_error}")]
    RetriesExhausted { retries: u32, last_error: String },

    #[error("Upload failed with unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Upload rejected: {0}")]
    Rejected(String),
}

/// Outcome of a single failed upload attempt, as seen by the retry loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("HTTP error {code}: {body}")]
    Status { code: u16, body: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Rejected(String),
}

impl From<std::io::Error> for ChunkError {
    fn from(err: std::io::Error) -> Self {
        ChunkError::Transport(err.to_string())
    }
}
