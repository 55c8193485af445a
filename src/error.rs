/*!
 * Error types for Vigil
 */

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VigilError>;

/// Startup-time failures.
///
/// Once the watchdog loop is running nothing is allowed to kill the
/// process; these errors can only surface before the loop starts.
#[derive(Debug, Error)]
pub enum VigilError {
    /// Policy file could not be read
    #[error("failed to read policy file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy file could not be parsed
    #[error("failed to parse policy file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Policy failed validation
    #[error("invalid policy: {0}")]
    Config(String),
}
