//! Attendance signatures

use alloy::primitives::{Address, B256, U256, keccak256};
use alloy::signers::Signer;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolValue;

use crate::error::{EthereumClassroomError, Result};

/// `keccak256(abi.encodePacked(student, lectureId, timestampMs))`
pub fn attendance_digest(student: Address, lecture_id: u64, timestamp_ms: u64) -> B256 {
    let packed = (student, U256::from(lecture_id), U256::from(timestamp_ms)).abi_encode_packed();
    keccak256(packed)
}

/// Sign the attendance digest as a personal message
///
/// Returns the 65-byte signature as 0x-prefixed hex.
pub async fn sign_attendance(
    signer: &PrivateKeySigner,
    lecture_id: u64,
    timestamp_ms: u64,
) -> Result<String> {
    let digest = attendance_digest(signer.address(), lecture_id, timestamp_ms);
    let signature = signer
        .sign_message(digest.as_slice())
        .await
        .map_err(|e| EthereumClassroomError::WalletError(format!("Failed to sign attendance: {}", e)))?;
    Ok(format!("0x{}", hex::encode(signature.as_bytes())))
}
