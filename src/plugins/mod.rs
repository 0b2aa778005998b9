//! Plugin registry consulted while resolving metadata directories.
//!
//! Plugins are either registered in code (any type implementing [`Plugin`])
//! or discovered from directories carrying a `.plugin/plugin.json` manifest.
//! A plugin that ships upload mapping metadata keeps it under
//! `Resources/config/attach_uploader` inside its base directory.
//!
//! # Directory Structure
//!
//! ```text
//! plugins/
//! └── acme-blog/
//!     ├── .plugin/
//!     │   └── plugin.json
//!     └── Resources/
//!         └── config/
//!             └── attach_uploader/
//!                 └── Post.yaml
//! ```

mod discovery;
mod error;
mod manifest;
pub mod namespace;
mod registry;

pub use discovery::PluginDiscovery;
pub use error::PluginError;
pub use manifest::{METADATA_RESOURCE_DIR, Plugin, PluginDescriptor, PluginManifest};
pub use registry::PluginRegistry;
