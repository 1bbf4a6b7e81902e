//! Configuration for the Ethereum classroom binding

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::networks::PHAROS_DEVNET;

/// Class factory deployed on the Pharos devnet
pub const DEFAULT_CLASS_FACTORY: &str = "0x27F610994df605E960790F8DD179168a52b14cDC";

/// Quiz contract factory deployed on the Pharos devnet
pub const DEFAULT_QUIZ_FACTORY: &str = "0xC1dc992aFF37C58e3f49478F25Ab0A89a17F00c4";

/// Notes factory deployed on the Pharos devnet
pub const DEFAULT_NOTES_FACTORY: &str = "0x5A632EAA2E19543120c6852240cbc8de243226d9";

/// Configuration for the Ethereum classroom binding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumClassroomConfig {
    /// RPC URL for the node
    /// Example: "https://devnet.dplabs-internal.com"
    pub rpc_url: String,

    /// Chain the factories are deployed on; the endpoint must report the same id
    pub chain_id: u64,

    /// ClassFactory address (0x-prefixed, 42 characters)
    pub class_factory_address: String,

    /// QuizContractFactory address
    pub quiz_factory_address: String,

    /// NotesFactory address
    pub notes_factory_address: String,

    /// Private key for signing transactions (optional for read-only use)
    /// Format: 0x-prefixed hex string (64 hex chars + 0x prefix = 66 chars)
    pub private_key: Option<String>,

    /// Number of confirmations to wait for (default 1)
    pub confirmation_blocks: u64,

    /// Maximum concurrent per-entity detail reads (quizzes, questions, notes)
    pub fetch_concurrency: usize,
}

impl Default for EthereumClassroomConfig {
    fn default() -> Self {
        Self {
            rpc_url: PHAROS_DEVNET.rpc_url.to_string(),
            chain_id: PHAROS_DEVNET.chain_id,
            class_factory_address: DEFAULT_CLASS_FACTORY.to_string(),
            quiz_factory_address: DEFAULT_QUIZ_FACTORY.to_string(),
            notes_factory_address: DEFAULT_NOTES_FACTORY.to_string(),
            private_key: None,
            confirmation_blocks: 1,
            fetch_concurrency: 4,
        }
    }
}

fn validate_address(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }

    if !value.starts_with("0x") {
        return Err(format!("{} must start with 0x", field));
    }

    if value.len() != 42 {
        return Err(format!(
            "{} must be 42 characters (0x + 40 hex), got {}",
            field,
            value.len()
        ));
    }

    if !value[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{} must contain only hex characters after 0x", field));
    }

    Ok(())
}

impl EthereumClassroomConfig {
    /// Load configuration from TOML file
    ///
    /// Missing fields fall back to the devnet defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from TOML string
    pub fn from_toml_str(toml: &str) -> Result<Self, anyhow::Error> {
        let config: Self = toml::from_str(toml)?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// Returns `Ok(())` if valid, otherwise returns error message
    pub fn validate(&self) -> Result<(), String> {
        if self.rpc_url.is_empty() {
            return Err("rpc_url cannot be empty".to_string());
        }

        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err("rpc_url must start with http:// or https://".to_string());
        }

        if self.chain_id == 0 {
            return Err("chain_id must be > 0".to_string());
        }

        validate_address("class_factory_address", &self.class_factory_address)?;
        validate_address("quiz_factory_address", &self.quiz_factory_address)?;
        validate_address("notes_factory_address", &self.notes_factory_address)?;

        if let Some(ref pk) = self.private_key {
            if !pk.is_empty() {
                if !pk.starts_with("0x") {
                    return Err("private_key must start with 0x".to_string());
                }

                if pk.len() != 66 {
                    return Err(format!(
                        "private_key must be 66 characters (0x + 64 hex), got {}",
                        pk.len()
                    ));
                }

                if !pk[2..].chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err("private_key must contain only hex characters after 0x".to_string());
                }
            }
        }

        if self.confirmation_blocks == 0 {
            return Err("confirmation_blocks must be > 0".to_string());
        }

        if self.confirmation_blocks > 100 {
            return Err("confirmation_blocks too large (max 100)".to_string());
        }

        if self.fetch_concurrency == 0 {
            return Err("fetch_concurrency must be > 0".to_string());
        }

        if self.fetch_concurrency > 64 {
            return Err("fetch_concurrency too large (max 64)".to_string());
        }

        Ok(())
    }

    /// Check if configuration supports write operations (has private key)
    pub fn can_write(&self) -> bool {
        self.private_key.as_deref().is_some_and(|pk| !pk.is_empty())
    }
}
