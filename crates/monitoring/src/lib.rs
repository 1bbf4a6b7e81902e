//! # PheroClass Monitoring
//!
//! Logging setup shared by the PheroClass binaries: console output for
//! interactive use or daily rotating files, filtered through `RUST_LOG`.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     monitoring::init_logging()?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod logging;

pub use logging::{LogDestination, LoggingConfig, init_logging, init_logging_with, truncate_message};
