//! Error types for classroom operations

use std::fmt;
use thiserror::Error;

/// Result type for classroom operations
pub type ClassroomResult<T> = Result<T, ClassroomError>;

/// Main error type for classroom operations
#[derive(Error, Debug)]
pub enum ClassroomError {
    /// Missing wallet or key, rejected signature, wrong network
    #[error("Wallet error: {message}")]
    Wallet { message: String },

    /// A contract call or transaction failed
    #[error("Failed to {operation}: {message}")]
    Reverted { operation: String, message: String },

    /// RPC or network failure
    #[error("Network error: {message}")]
    Network { message: String },

    /// Storage gateway failure
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// External data (QR payload, generated quiz, chain response) had the wrong shape
    #[error("Malformed {source_name} data: {message}")]
    MalformedData { source_name: String, message: String },

    /// Resource not found
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// Invalid input parameters
    #[error("Invalid {parameter}: {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Wrapper for other error types
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClassroomError {
    pub fn wallet(message: impl Into<String>) -> Self {
        Self::Wallet {
            message: message.into(),
        }
    }

    /// A failed operation, with the raw provider message made readable
    pub fn reverted(operation: impl Into<String>, raw_message: impl AsRef<str>) -> Self {
        Self::Reverted {
            operation: operation.into(),
            message: friendly_revert_message(raw_message.as_ref()),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedData {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn is_wallet_error(&self) -> bool {
        matches!(self, Self::Wallet { .. })
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Storage { .. })
    }

    /// The single status line shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            Self::Reverted { message, .. } => format!("Error: {}", message),
            Self::Wallet { message } => format!("Wallet error: {}", message),
            other => format!("Error: {}", other),
        }
    }
}

/// Map the provider's revert text onto the messages users understand
///
/// Unknown messages pass through verbatim.
pub fn friendly_revert_message(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.contains("user rejected") || lower.contains("user denied") {
        "Transaction was rejected".to_string()
    } else if lower.contains("insufficient funds") {
        "Insufficient funds for transaction".to_string()
    } else if lower.contains("already marked") {
        "Attendance already marked for this lecture".to_string()
    } else {
        raw.to_string()
    }
}
