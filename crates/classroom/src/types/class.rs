//! Class, lecture and attendance types

use serde::{Deserialize, Serialize};

use super::ContractAddress;

/// A class registered in the class factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Address of the class contract
    pub address: ContractAddress,
    pub name: String,
    pub symbol: String,
}

/// A dated topic inside a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    /// Contract-assigned, monotonic per class
    pub id: u64,
    pub topic: String,
    /// Creation time in seconds since the epoch
    pub date: u64,
}

/// One student present in a lecture's roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub address: ContractAddress,
    pub name: String,
}

/// A student enrolled in a class (holder of the class token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub token_id: u64,
    pub address: ContractAddress,
    pub name: String,
}

/// Result of a successful attendance check-in
///
/// `signature` signs `keccak256(student, lecture_id, timestamp_ms)`. Nothing
/// on-chain verifies it; it is kept for the audit log only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReceipt {
    pub tx_hash: String,
    pub student: ContractAddress,
    pub lecture_id: u64,
    pub timestamp_ms: u64,
    pub signature: String,
}

/// Whether the own-attendance vector marks a lecture as attended
///
/// The class contract returns one flag per lecture in creation order. Lecture
/// ids start at 1, so lecture `n` sits at index `n - 1`. Ids beyond the end of
/// the vector are lectures created after the read.
pub fn has_attended(attendance: &[bool], lecture_id: u64) -> bool {
    lecture_id
        .checked_sub(1)
        .and_then(|idx| usize::try_from(idx).ok())
        .and_then(|idx| attendance.get(idx).copied())
        .unwrap_or(false)
}
