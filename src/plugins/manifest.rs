use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::PluginError;

pub(super) const PLUGIN_CONFIG_DIR: &str = ".plugin";
const PLUGIN_MANIFEST_FILE: &str = "plugin.json";

/// Conventional per-plugin directory holding upload mapping metadata.
pub const METADATA_RESOURCE_DIR: &str = "Resources/config/attach_uploader";

/// A unit of application functionality that may ship its own resources.
///
/// Hosts implement this for their own module types; [`PluginDescriptor`]
/// covers plugins declared by manifest or built in code.
pub trait Plugin: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Namespace key used for auto-detected metadata directories.
    fn namespace(&self) -> &str {
        self.name()
    }

    /// Directory the plugin's resources live under, if it has one.
    fn base_dir(&self) -> Option<&Path>;

    fn metadata_dir(&self) -> Option<PathBuf> {
        self.base_dir().map(|dir| dir.join(METADATA_RESOURCE_DIR))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub description: String,
    pub version: String,
}

impl PluginManifest {
    pub fn load(root_dir: &Path) -> Result<Self, PluginError> {
        let manifest_path = root_dir.join(PLUGIN_CONFIG_DIR).join(PLUGIN_MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(PluginError::ManifestNotFound {
                path: manifest_path,
            });
        }
        let content = std::fs::read_to_string(&manifest_path)?;
        serde_json::from_str(&content).map_err(|e| PluginError::InvalidManifest {
            path: manifest_path,
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    name: String,
    namespace: String,
    base_dir: Option<PathBuf>,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            namespace: name.clone(),
            name,
            base_dir: Some(base_dir.into()),
        }
    }

    /// A plugin with no resource directory (compiled-in functionality).
    pub fn detached(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            namespace: name.clone(),
            name,
            base_dir: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub(crate) fn from_manifest(manifest: PluginManifest, root_dir: PathBuf) -> Self {
        let namespace = manifest
            .namespace
            .unwrap_or_else(|| manifest.name.clone());
        Self {
            name: manifest.name,
            namespace,
            base_dir: Some(root_dir),
        }
    }
}

impl Plugin for PluginDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}
