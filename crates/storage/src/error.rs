//! Storage error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The request could not be sent or the response not read
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    /// The pinning service answered with a non-success status
    #[error("Upload rejected: {status} {message}")]
    Rejected { status: u16, message: String },

    /// The response did not carry a content identifier
    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),

    /// Nothing to upload
    #[error("File {0} is empty")]
    EmptyFile(String),
}
