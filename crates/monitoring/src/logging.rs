//! Logging configuration and initialization
//!
//! Console logging or daily rotating file logging, chosen by environment:
//! - `LOG_DESTINATION`: "console" or "file" (default: "console")
//! - `LOG_DIR`: directory for log files (default: "./logs")
//! - `LOG_FILE_PREFIX`: prefix for log file names (default: "pheroclass")
//! - `RUST_LOG`: filter directives (default: "info")

use anyhow::{Result, anyhow};
use std::env;
use std::fmt::Write as _;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::{Writer, debug_fn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Maximum length for log messages (999 characters)
const MAX_LOG_MESSAGE_LENGTH: usize = 999;

const TRUNCATION_MARKER: &str = "...[truncated]";

/// Truncate a message to the maximum allowed length
pub fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message.to_string();
    }

    let mut cut = MAX_LOG_MESSAGE_LENGTH - TRUNCATION_MARKER.len();
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &message[..cut], TRUNCATION_MARKER)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Console,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub destination: LogDestination,
    pub log_dir: String,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            destination: LogDestination::Console,
            log_dir: "./logs".to_string(),
            file_prefix: "pheroclass".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Read the configuration from the environment
    ///
    /// Any `LOG_DESTINATION` other than "file" (case-insensitive) logs to the console.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let destination = match env::var("LOG_DESTINATION") {
            Ok(value) if value.eq_ignore_ascii_case("file") => LogDestination::File,
            _ => LogDestination::Console,
        };
        Self {
            destination,
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            file_prefix: env::var("LOG_FILE_PREFIX").unwrap_or(defaults.file_prefix),
        }
    }
}

/// Format event fields, truncating the message
fn write_field(writer: &mut Writer<'_>, field: &tracing::field::Field, value: &dyn std::fmt::Debug) -> std::fmt::Result {
    if field.name() == "message" {
        let mut message = String::new();
        write!(message, "{:?}", value)?;
        writer.write_str(&truncate_message(&message))
    } else {
        write!(writer, " {}={:?}", field.name(), value)
    }
}

/// Initialize tracing from the environment
pub fn init_logging() -> Result<()> {
    init_logging_with(LoggingConfig::from_env())
}

/// Initialize tracing with an explicit configuration
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init_logging_with(config: LoggingConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    match config.destination {
        LogDestination::Console => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(true)
                        .with_target(false)
                        .fmt_fields(debug_fn(write_field)),
                )
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize console tracing subscriber: {}", e))?;
        }
        LogDestination::File => {
            std::fs::create_dir_all(&config.log_dir)
                .map_err(|e| anyhow!("Failed to create log directory '{}': {}", config.log_dir, e))?;

            let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(false)
                        .fmt_fields(debug_fn(write_field)),
                )
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize file tracing subscriber: {}", e))?;

            info!("Logging to daily rotating files in: {}/", config.log_dir);
            info!("Log file pattern: {}/{}.<YYYY-MM-DD>", config.log_dir, config.file_prefix);

            // The writer thread lives as long as the guard; keep it for the whole process
            std::mem::forget(guard);
        }
    }

    if env::var("RUST_LOG").is_err() {
        warn!("RUST_LOG not set, defaulting to 'info' level");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_message() {
        let short_message = "This is a short message";
        assert_eq!(truncate_message(short_message), short_message);

        let long_message = "a".repeat(1500);
        let truncated = truncate_message(&long_message);
        assert_eq!(truncated.len(), 999);
        assert!(truncated.ends_with("...[truncated]"));
        assert!(truncated.starts_with("aaa"));

        let exactly_999 = "b".repeat(999);
        assert_eq!(truncate_message(&exactly_999), exactly_999);

        let exactly_1000 = "c".repeat(1000);
        assert_eq!(truncate_message(&exactly_1000).len(), 999);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let multibyte = "é".repeat(600);
        let truncated = truncate_message(&multibyte);
        assert!(truncated.len() <= 999);
        assert!(truncated.ends_with("...[truncated]"));
    }

    #[test]
    fn test_environment_variable_fallbacks() {
        unsafe {
            env::remove_var("LOG_DESTINATION");
            env::remove_var("LOG_DIR");
            env::remove_var("LOG_FILE_PREFIX");
        }
        assert_eq!(LoggingConfig::from_env(), LoggingConfig::default());

        unsafe {
            env::set_var("LOG_DESTINATION", "FILE");
            env::set_var("LOG_DIR", "/tmp/pheroclass-logs");
        }
        let config = LoggingConfig::from_env();
        assert_eq!(config.destination, LogDestination::File);
        assert_eq!(config.log_dir, "/tmp/pheroclass-logs");
        assert_eq!(config.file_prefix, "pheroclass");

        unsafe {
            env::set_var("LOG_DESTINATION", "invalid_value");
        }
        assert_eq!(LoggingConfig::from_env().destination, LogDestination::Console);

        unsafe {
            env::remove_var("LOG_DESTINATION");
            env::remove_var("LOG_DIR");
        }
    }

    #[test]
    fn test_logging_init_with_invalid_directory() {
        let invalid_path = "/proc/pheroclass/nonexistent/path";
        let result = init_logging_with(LoggingConfig {
            destination: LogDestination::File,
            log_dir: invalid_path.to_string(),
            file_prefix: "test-log".to_string(),
        });

        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.contains("Failed to create log directory"));
        assert!(error_msg.contains(invalid_path));
    }
}
