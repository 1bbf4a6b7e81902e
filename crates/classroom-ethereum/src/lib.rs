//! Ethereum Classroom Binding
//!
//! This crate implements the `Classroom` trait from `pheroclass-classroom`
//! against the PheroClass contracts on an EVM chain (the Pharos devnet by
//! default).
//!
//! # Example
//!
//! ```no_run
//! use pheroclass_ethereum::{EthereumClassroom, EthereumClassroomConfig};
//! use pheroclass_classroom::Classroom;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let classroom = EthereumClassroom::new(EthereumClassroomConfig::default())?;
//! classroom.verify_network().await?;
//! let classes = classroom.fetch_classes().await?;
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod classroom;
pub mod config;
pub mod contract;
pub mod conversions;
pub mod error;
pub mod networks;
pub mod signing;

pub use classroom::EthereumClassroom;
pub use config::EthereumClassroomConfig;
pub use contract::ContractClient;
pub use error::{EthereumClassroomError, Result};
pub use networks::{ClassroomNetwork, PHAROS_DEVNET};

/// Re-export the Classroom trait for convenience
pub use pheroclass_classroom::Classroom;
