//! Configuration schema, parameter placeholders and layered loading.
//!
//! ```rust,no_run
//! use attach_uploader::config::{ConfigLoader, UploaderConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let layers = ConfigLoader::new()
//!     .file("config/attach_uploader.yaml")
//!     .optional_file("config/attach_uploader.local.yaml")
//!     .load()?;
//! let config = UploaderConfig::process(&layers)?;
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod parameters;
pub mod schema;

pub use loader::{ConfigLoader, ROOT_KEY, merge_layers};
pub use parameters::ParameterBag;
pub use schema::{
    CacheSetting, DbDriver, DirectoryConfig, FileCacheConfig, MappingConfig, MetadataConfig,
    UploaderConfig,
};

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `db_driver` names a driver this crate has no adapter for
    #[error("Invalid \"db_driver\" configuration option specified: \"{value}\"")]
    UnsupportedDriver {
        /// The offending value, lowercased
        value: String,
    },

    /// Invalid or missing configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The option path, dot separated
        key: String,
        /// Error message
        message: String,
    },

    /// A `%name%` placeholder references an undefined parameter
    #[error("Unknown parameter \"{name}\" referenced in \"{value}\"")]
    UnknownParameter { name: String, value: String },

    /// Parameters reference each other in a cycle
    #[error("Circular parameter reference: {}", chain.join(" -> "))]
    CircularParameter { chain: Vec<String> },

    /// Configuration file has an extension no parser is registered for
    #[error("Unsupported configuration format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Required configuration file is missing
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration file could not be parsed
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
