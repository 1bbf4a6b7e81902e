//! Network definitions and wallet-level chain checks

use alloy::primitives::Address;
use alloy::providers::Provider;
use serde::Serialize;
use tracing::debug;

use crate::conversions::wei_to_ether_string;
use crate::error::{EthereumClassroomError, Result};

/// Native currency of a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// A network the wallet can be asked to add or switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassroomNetwork {
    pub name: &'static str,
    pub chain_id: u64,
    pub rpc_url: &'static str,
    pub explorer: &'static str,
    pub native_currency: NativeCurrency,
}

impl ClassroomNetwork {
    /// Chain id in the hex form wallets expect (`0xc352`)
    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }
}

/// The network the PheroClass contracts are deployed on
pub const PHAROS_DEVNET: ClassroomNetwork = ClassroomNetwork {
    name: "Pharos Devnet",
    chain_id: 0xC352,
    rpc_url: "https://devnet.dplabs-internal.com",
    explorer: "https://pharosscan.xyz/",
    native_currency: NativeCurrency {
        name: "Pharos Test Token",
        symbol: "PTT",
        decimals: 18,
    },
};

/// Fail with a wallet error when the endpoint serves another chain
pub async fn verify_network<P: Provider>(provider: &P, expected_chain_id: u64) -> Result<()> {
    let actual = provider
        .get_chain_id()
        .await
        .map_err(|e| EthereumClassroomError::Rpc(format!("Failed to read chain id: {}", e)))?;

    debug!("Endpoint reports chain id {}", actual);
    if actual != expected_chain_id {
        return Err(EthereumClassroomError::WrongNetwork {
            expected: expected_chain_id,
            actual,
        });
    }
    Ok(())
}

/// Native balance of an account as an ether string
pub async fn balance_ether<P: Provider>(provider: &P, account: Address) -> Result<String> {
    let balance = provider
        .get_balance(account)
        .await
        .map_err(|e| EthereumClassroomError::Rpc(format!("Failed to fetch balance: {}", e)))?;
    Ok(wei_to_ether_string(balance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pharos_devnet() {
        assert_eq!(PHAROS_DEVNET.chain_id, 50002);
        assert_eq!(PHAROS_DEVNET.chain_id_hex(), "0xc352");
        assert_eq!(PHAROS_DEVNET.native_currency.symbol, "PTT");
        assert_eq!(PHAROS_DEVNET.native_currency.decimals, 18);
    }
}
