//! Storage gateway client
//!
//! Note documents are uploaded to an IPFS pinning service and referenced
//! on-chain by their content identifier. Reading goes through a public
//! gateway.

pub mod config;
pub mod error;
pub mod ipfs;

pub use config::{DEFAULT_GATEWAY, StorageConfig};
pub use error::{Result, StorageError};
pub use ipfs::*;
