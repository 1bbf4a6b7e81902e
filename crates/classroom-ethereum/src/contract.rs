//! Contract client holding connection details for a PheroClass deployment
//!
//! Providers are not cached: a new one is built for each call, read-only
//! unless the call needs to sign.

use crate::config::EthereumClassroomConfig;
use crate::error::{EthereumClassroomError, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;

/// Contract client that manages factory addresses and providers
pub struct ContractClient {
    pub class_factory: Address,
    pub quiz_factory: Address,
    pub notes_factory: Address,
    /// RPC URL
    pub rpc_url: String,
    signer: Option<PrivateKeySigner>,
    /// Configuration
    pub config: EthereumClassroomConfig,
}

fn parse_address(field: &str, value: &str) -> Result<Address> {
    Address::from_str(value).map_err(|e| {
        EthereumClassroomError::Configuration(format!("Invalid {} '{}': {}", field, value, e))
    })
}

impl ContractClient {
    /// Creates a new contract client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A factory address is invalid
    /// - Private key is invalid (if provided)
    pub fn new(config: EthereumClassroomConfig) -> Result<Self> {
        let class_factory = parse_address("class factory address", &config.class_factory_address)?;
        let quiz_factory = parse_address("quiz factory address", &config.quiz_factory_address)?;
        let notes_factory = parse_address("notes factory address", &config.notes_factory_address)?;

        let signer = match config.private_key.as_deref() {
            Some(pk) if !pk.is_empty() => Some(pk.parse::<PrivateKeySigner>().map_err(|e| {
                EthereumClassroomError::Configuration(format!("Invalid private key: {}", e))
            })?),
            _ => None,
        };

        Ok(Self {
            class_factory,
            quiz_factory,
            notes_factory,
            rpc_url: config.rpc_url.clone(),
            signer,
            config,
        })
    }

    /// Returns the chain ID from configuration
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Checks if the client has a wallet for signing transactions
    pub fn has_wallet(&self) -> bool {
        self.signer.is_some()
    }

    /// Address of the configured signer
    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }

    /// The configured signer, or `NoPrivateKey`
    pub fn signer(&self) -> Result<&PrivateKeySigner> {
        self.signer.as_ref().ok_or(EthereumClassroomError::NoPrivateKey)
    }

    /// Returns the RPC URL
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Create a read-only provider for contract calls
    pub fn create_provider(&self) -> Result<impl Provider> {
        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| EthereumClassroomError::ProviderError(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().connect_http(rpc_url))
    }

    /// Create a provider with wallet for sending transactions
    ///
    /// # Errors
    ///
    /// Returns an error if no private key is configured or the RPC URL is invalid
    pub fn create_provider_with_signer(&self) -> Result<impl Provider> {
        let wallet = EthereumWallet::from(self.signer()?.clone());

        let rpc_url = self
            .rpc_url
            .parse()
            .map_err(|e| EthereumClassroomError::ProviderError(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().wallet(wallet).connect_http(rpc_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn test_config() -> EthereumClassroomConfig {
        EthereumClassroomConfig {
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: 31337,
            ..Default::default()
        }
    }

    #[test]
    fn test_contract_client_creation() {
        let client = ContractClient::new(test_config()).unwrap();
        assert_eq!(client.chain_id(), 31337);
        assert!(!client.has_wallet());
        assert!(client.signer_address().is_none());
        assert!(matches!(client.signer(), Err(EthereumClassroomError::NoPrivateKey)));
        assert_eq!(client.rpc_url(), "http://localhost:8545");
    }

    #[test]
    fn test_invalid_factory_address() {
        let mut config = test_config();
        config.quiz_factory_address = "invalid".to_string();
        assert!(ContractClient::new(config).is_err());
    }

    #[test]
    fn test_signer_address_from_key() {
        let mut config = test_config();
        config.private_key = Some(TEST_KEY.to_string());
        let client = ContractClient::new(config).unwrap();
        assert!(client.has_wallet());
        assert_eq!(
            client.signer_address().unwrap(),
            Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        );
    }

    #[test]
    fn test_read_only_client_cannot_sign() {
        let client = ContractClient::new(test_config()).unwrap();
        assert!(client.create_provider().is_ok());
        assert!(client.create_provider_with_signer().is_err());
    }
}
