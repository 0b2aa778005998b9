use std::path::{Path, PathBuf};

use super::PluginError;
use super::manifest::{PLUGIN_CONFIG_DIR, PluginDescriptor, PluginManifest};

pub struct PluginDiscovery;

impl PluginDiscovery {
    pub fn discover(dirs: &[PathBuf]) -> Result<Vec<PluginDescriptor>, PluginError> {
        let mut descriptors = Vec::new();

        for dir in dirs {
            if !dir.exists() {
                tracing::debug!("Plugin directory {} does not exist", dir.display());
                continue;
            }

            if Self::is_plugin_root(dir) {
                let manifest = PluginManifest::load(dir)?;
                descriptors.push(PluginDescriptor::from_manifest(manifest, dir.clone()));
            } else {
                Self::scan_children(dir, &mut descriptors)?;
            }
        }

        Ok(descriptors)
    }

    fn is_plugin_root(dir: &Path) -> bool {
        dir.join(PLUGIN_CONFIG_DIR).is_dir()
    }

    fn scan_children(
        parent: &Path,
        descriptors: &mut Vec<PluginDescriptor>,
    ) -> Result<(), PluginError> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(parent)? {
            let path = entry?.path();
            if path.is_dir() && Self::is_plugin_root(&path) {
                children.push(path);
            }
        }
        // read_dir order is platform dependent
        children.sort();

        for path in children {
            let manifest = PluginManifest::load(&path)?;
            descriptors.push(PluginDescriptor::from_manifest(manifest, path));
        }

        Ok(())
    }
}
