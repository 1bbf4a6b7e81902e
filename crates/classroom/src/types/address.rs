//! Strong identifiers for contracts and the entities they own

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ClassroomError;

/// A contract or account address (`0x` followed by 40 hex digits)
///
/// Addresses are stored lowercase so that equality and hashing ignore the
/// checksum casing the chain or the wallet happens to return.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractAddress(String);

impl ContractAddress {
    /// The zero address, returned by lookups that found nothing
    pub const ZERO_STR: &'static str = "0x0000000000000000000000000000000000000000";

    /// Parse and normalize an address
    pub fn parse(value: &str) -> Result<Self, ClassroomError> {
        let trimmed = value.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ClassroomError::invalid_parameter("address", "must start with 0x"))?;

        if hex.len() != 40 {
            return Err(ClassroomError::invalid_parameter(
                "address",
                format!("must be 40 hex digits after 0x, got {}", hex.len()),
            ));
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ClassroomError::invalid_parameter(
                "address",
                "must contain only hex characters after 0x",
            ));
        }

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn zero() -> Self {
        Self(Self::ZERO_STR.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Self::ZERO_STR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for tables and messages: `0x1234...abcd`
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContractAddress {
    type Err = ClassroomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContractAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContractAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A lecture inside a class contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LectureKey {
    pub class: ContractAddress,
    pub lecture_id: u64,
}

impl LectureKey {
    pub fn new(class: ContractAddress, lecture_id: u64) -> Self {
        Self { class, lecture_id }
    }
}

impl fmt::Display for LectureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.class, self.lecture_id)
    }
}

/// A quiz inside a quiz contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuizKey {
    pub contract: ContractAddress,
    pub quiz_id: u64,
}

impl QuizKey {
    pub fn new(contract: ContractAddress, quiz_id: u64) -> Self {
        Self { contract, quiz_id }
    }
}

impl fmt::Display for QuizKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.contract, self.quiz_id)
    }
}

/// A note inside a notes contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteKey {
    pub contract: ContractAddress,
    pub note_id: u64,
}

impl NoteKey {
    pub fn new(contract: ContractAddress, note_id: u64) -> Self {
        Self { contract, note_id }
    }
}

impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.contract, self.note_id)
    }
}
