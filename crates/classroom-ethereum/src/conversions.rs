//! Conversions between Solidity values and classroom read models
//!
//! Everything the contracts return passes through here before it reaches a
//! dashboard: integers become `u64`, addresses become `ContractAddress`, and
//! wei amounts become ether strings.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address, U256};
use pheroclass_classroom::ContractAddress;
use std::str::FromStr;

use crate::error::{EthereumClassroomError, Result};

/// Convert a Solidity uint256 to u64, capping at u64::MAX
pub fn u256_to_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.to::<u64>()
    }
}

/// Convert a list of Solidity ids
pub fn u256_vec_to_u64(values: Vec<U256>) -> Vec<u64> {
    values.into_iter().map(u256_to_u64).collect()
}

pub fn to_contract_address(addr: Address) -> ContractAddress {
    // Alloy's lower-hex form is always 0x + 40 digits
    ContractAddress::parse(&format!("0x{:x}", addr)).unwrap_or_else(|_| ContractAddress::zero())
}

pub fn to_alloy_address(addr: &ContractAddress) -> Result<Address> {
    Address::from_str(addr.as_str())
        .map_err(|e| EthereumClassroomError::InvalidAddress(format!("'{}': {}", addr, e)))
}

/// `None` for the zero address
pub fn optional_address(addr: Address) -> Option<ContractAddress> {
    if addr.is_zero() {
        None
    } else {
        Some(to_contract_address(addr))
    }
}

/// Wei to the canonical ether string
///
/// Trailing zeros are trimmed but one fractional digit is kept, so
/// `10^16` wei is `"0.01"` and `10^18` wei is `"1.0"`.
pub fn wei_to_ether_string(wei: U256) -> String {
    canonical_ether(&format_ether(wei))
}

fn canonical_ether(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", formatted),
    }
}

/// Ether string to wei
pub fn ether_to_wei(amount: &str) -> Result<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(EthereumClassroomError::InvalidAmount {
            amount: amount.to_string(),
            message: "amount cannot be empty".to_string(),
        });
    }
    parse_ether(trimmed).map_err(|e| EthereumClassroomError::InvalidAmount {
        amount: amount.to_string(),
        message: e.to_string(),
    })
}

/// Transaction hash in the 0x-prefixed lowercase form
pub fn format_tx_hash(hash: alloy::primitives::TxHash) -> String {
    format!("0x{:x}", hash)
}
