//! Error types for the Ethereum classroom binding

use alloy::providers::PendingTransactionError;
use alloy::transports::TransportError;
use pheroclass_classroom::ClassroomError;
use thiserror::Error;

/// Result type alias for Ethereum classroom operations
pub type Result<T> = std::result::Result<T, EthereumClassroomError>;

/// Errors that can occur in the Ethereum classroom binding
#[derive(Debug, Error)]
pub enum EthereumClassroomError {
    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Contract call (read operation) failed
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// Transaction (write operation) failed before or while being mined
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Transaction was mined but reverted
    #[error("Transaction {tx_hash} reverted")]
    Reverted {
        /// Hash of the reverted transaction
        tx_hash: String,
    },

    /// RPC connection or network error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The RPC endpoint reports a different chain
    #[error("Wrong network: expected chain id {expected}, connected to {actual}")]
    WrongNetwork {
        /// Chain id from configuration
        expected: u64,
        /// Chain id reported by the endpoint
        actual: u64,
    },

    /// Invalid Ethereum address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Ether amount could not be parsed
    #[error("Invalid amount '{amount}': {message}")]
    InvalidAmount {
        /// Amount as entered
        amount: String,
        /// Parser message
        message: String,
    },

    /// No private key configured for write operations
    #[error("No private key configured - write operations require private_key in config")]
    NoPrivateKey,

    /// Wallet/signer error
    #[error("Wallet error: {0}")]
    WalletError(String),

    /// Provider creation or connection error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error from anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The endpoint could not be reached or gave no answer, as opposed to a
/// JSON-RPC error response such as a revert
fn is_unreachable(e: &TransportError) -> bool {
    e.is_transport_error() || e.is_null_resp()
}

impl EthereumClassroomError {
    /// Classify a failed contract read
    pub fn from_call(e: alloy::contract::Error) -> Self {
        match &e {
            alloy::contract::Error::TransportError(t) if is_unreachable(t) => Self::Rpc(e.to_string()),
            alloy::contract::Error::PendingTransactionError(PendingTransactionError::TransportError(t))
                if is_unreachable(t) =>
            {
                Self::Rpc(e.to_string())
            }
            _ => Self::ContractCall(e.to_string()),
        }
    }

    /// Classify a failed contract write
    pub fn from_send(e: alloy::contract::Error) -> Self {
        match Self::from_call(e) {
            Self::ContractCall(message) => Self::Transaction(message),
            other => other,
        }
    }

    /// Classify a failure while waiting for a receipt
    pub fn from_pending(e: PendingTransactionError) -> Self {
        match &e {
            PendingTransactionError::TransportError(t) if is_unreachable(t) => Self::Rpc(e.to_string()),
            _ => Self::Transaction(e.to_string()),
        }
    }

    /// Check if this error indicates a configuration problem
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::NoPrivateKey | Self::InvalidAddress(_) | Self::Toml(_)
        )
    }

    /// Check if this error indicates a network problem
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::ProviderError(_) | Self::Io(_))
    }

    /// Check if this error belongs to the wallet (key, signer, chain)
    pub fn is_wallet_error(&self) -> bool {
        matches!(
            self,
            Self::NoPrivateKey | Self::WalletError(_) | Self::WrongNetwork { .. }
        )
    }

    /// Convert into the chain-agnostic error, naming the failed operation
    pub fn into_classroom_error(self, operation: &str) -> ClassroomError {
        match self {
            Self::NoPrivateKey | Self::WalletError(_) | Self::WrongNetwork { .. } => {
                ClassroomError::wallet(self.to_string())
            }
            Self::Rpc(message) | Self::ProviderError(message) => {
                ClassroomError::network(format!("{}: {}", operation, message))
            }
            Self::ContractCall(message) | Self::Transaction(message) => {
                ClassroomError::reverted(operation, message)
            }
            Self::Reverted { .. } => ClassroomError::reverted(operation, self.to_string()),
            Self::InvalidAddress(message) => ClassroomError::invalid_parameter("address", message),
            Self::InvalidAmount { amount, message } => {
                ClassroomError::invalid_parameter("price", format!("'{}': {}", amount, message))
            }
            Self::Other(e) => ClassroomError::Other(e),
            other => ClassroomError::Other(anyhow::anyhow!(other)),
        }
    }
}

impl From<EthereumClassroomError> for ClassroomError {
    fn from(err: EthereumClassroomError) -> Self {
        err.into_classroom_error("complete contract operation")
    }
}

/// Extension for tagging binding results with the operation they belong to
pub(crate) trait OperationContext<T> {
    fn during(self, operation: &str) -> pheroclass_classroom::ClassroomResult<T>;
}

impl<T> OperationContext<T> for Result<T> {
    fn during(self, operation: &str) -> pheroclass_classroom::ClassroomResult<T> {
        self.map_err(|e| e.into_classroom_error(operation))
    }
}
