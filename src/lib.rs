//! # attach-uploader
//!
//! Startup configuration for a plugin that maps uploaded files to persisted
//! entity fields (ORM entities or ODM documents).
//!
//! Configuration is resolved exactly once, before the host starts serving:
//! the layered tree is validated, metadata search directories are collected
//! from plugins and explicit entries, and a metadata cache backend is chosen.
//! The result is an explicit [`LoadedConfiguration`] which the host applies
//! to its own [`ServiceRegistry`].
//!
//! ```rust,no_run
//! use attach_uploader::{ConfigLoader, ContainerBuilder, ParameterBag, PluginRegistry};
//!
//! fn main() -> Result<(), attach_uploader::Error> {
//!     let plugins = PluginRegistry::discover(&["plugins".into()])?;
//!     let params = ParameterBag::with_kernel_defaults("/srv/app");
//!     let loader = ConfigLoader::new().file("config/attach_uploader.yaml");
//!
//!     let mut container = ContainerBuilder::new();
//!     let loaded = attach_uploader::bootstrap(&loader, &plugins, &params, &mut container)?;
//!     println!("metadata cache: {}", loaded.cache.kind());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod container;
pub mod extension;
pub mod metadata;
pub mod plugins;

use std::path::PathBuf;

pub use config::{
    CacheSetting, ConfigError, ConfigLoader, DbDriver, DirectoryConfig, MappingConfig,
    MetadataConfig, ParameterBag, UploaderConfig,
};
pub use container::{ContainerBuilder, ServiceRegistry};
pub use extension::{LoadedConfiguration, UploaderExtension};
pub use metadata::{CacheConfig, CacheStrategySelector, DirectoryMap, DirectoryResolver};
pub use plugins::{Plugin, PluginDescriptor, PluginError, PluginRegistry};

/// Error type for attach-uploader operations.
///
/// Every variant aborts startup; none are retried.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration tree is invalid or references unknown parameters.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plugin registration failed or a `@Plugin` reference could not be resolved.
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// The file metadata cache directory is missing and could not be created.
    #[error("Could not create cache directory \"{}\": {source}", path.display())]
    CacheDirectoryCreateFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid values, unknown drivers, parameters or plugins
    Configuration,
    /// Filesystem side effects failed
    Filesystem,
    /// Internal errors (serialization, unexpected states)
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(ConfigError::Io(_)) | Error::Plugin(PluginError::Io(_)) => {
                ErrorCategory::Filesystem
            }
            Error::Config(_) | Error::Plugin(_) => ErrorCategory::Configuration,
            Error::CacheDirectoryCreateFailed { .. } => ErrorCategory::Filesystem,
            Error::Json(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_unsupported_driver(&self) -> bool {
        matches!(self, Error::Config(ConfigError::UnsupportedDriver { .. }))
    }

    pub fn is_unknown_plugin_reference(&self) -> bool {
        matches!(self, Error::Plugin(PluginError::UnknownReference { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Load every configuration layer, resolve it and register the result.
pub fn bootstrap<R: ServiceRegistry + ?Sized>(
    loader: &ConfigLoader,
    plugins: &PluginRegistry,
    params: &ParameterBag,
    registry: &mut R,
) -> Result<LoadedConfiguration> {
    let layers = loader.load()?;
    let loaded = UploaderExtension::new(plugins, params).load(&layers)?;
    loaded.apply(registry)?;
    Ok(loaded)
}
