//! Storage gateway configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Pinning endpoint used when none is configured
pub const DEFAULT_UPLOAD_URL: &str = "https://api.pinata.cloud/pinning/pinFileToIPFS";

/// Public gateway host the notes are opened through
pub const DEFAULT_GATEWAY: &str = "ipfs.io";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Multipart upload endpoint of the pinning service
    pub upload_url: String,
    /// Gateway host, without scheme
    pub gateway: String,
    /// Bearer token for the pinning service
    pub jwt: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            gateway: DEFAULT_GATEWAY.to_string(),
            jwt: None,
        }
    }
}

impl StorageConfig {
    /// Defaults overridden by `IPFS_UPLOAD_URL`, `IPFS_GATEWAY` and `IPFS_JWT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_url: env::var("IPFS_UPLOAD_URL").unwrap_or(defaults.upload_url),
            gateway: env::var("IPFS_GATEWAY").unwrap_or(defaults.gateway),
            jwt: env::var("IPFS_JWT").ok().filter(|jwt| !jwt.is_empty()),
        }
    }
}
