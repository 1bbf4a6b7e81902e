//! Notes marketplace types

use serde::{Deserialize, Serialize};

use super::ContractAddress;

/// A notes contract deployed by the notes factory for one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesContractInfo {
    pub address: ContractAddress,
    pub owner: ContractAddress,
    pub class_name: String,
    pub created_at: u64,
}

/// A priced document reference; the file itself lives on the storage gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub ipfs_hash: String,
    pub creator: ContractAddress,
    /// Price in ether, converted from the wei value stored on-chain
    pub price: String,
    pub created_at: u64,
    pub lecture_id: u64,
    pub is_approved: bool,
    pub sales_count: u64,
}

/// Input for creating a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub description: String,
    pub ipfs_hash: String,
    /// Price in ether; converted to wei by the binding
    pub price: String,
    pub lecture_id: u64,
}
