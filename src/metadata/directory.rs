//! Metadata search directory resolution.
//!
//! Produces the namespace-prefix to directory map handed to the metadata
//! file locator. Auto-detected plugin directories are collected first, so an
//! explicit entry with the same prefix always replaces them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::DirectoryConfig;
use crate::plugins::namespace::{is_global, normalize_prefix};
use crate::plugins::{PluginError, PluginRegistry};

/// Namespace prefix to metadata directory. The empty key is the global scope.
pub type DirectoryMap = BTreeMap<String, PathBuf>;

pub struct DirectoryResolver;

impl DirectoryResolver {
    pub fn resolve(
        registry: &PluginRegistry,
        auto_detect: bool,
        entries: &[DirectoryConfig],
    ) -> Result<DirectoryMap, PluginError> {
        let mut directories = DirectoryMap::new();

        if auto_detect {
            Self::detect(registry, &mut directories);
        }

        for entry in entries {
            let path = Self::resolve_path(registry, &entry.path)?;
            let prefix = normalize_prefix(&entry.namespace_prefix).to_string();

            if let Some(previous) = directories.get(&prefix) {
                tracing::debug!(
                    prefix = %prefix,
                    previous = %previous.display(),
                    "Explicit metadata directory replaces earlier entry"
                );
            }
            tracing::debug!(
                prefix = %prefix,
                global = is_global(&prefix),
                path = %path,
                "Registered metadata directory"
            );
            directories.insert(prefix, PathBuf::from(path));
        }

        Ok(directories)
    }

    fn detect(registry: &PluginRegistry, directories: &mut DirectoryMap) {
        for plugin in registry.iter() {
            let Some(dir) = plugin.metadata_dir() else {
                tracing::debug!(plugin = plugin.name(), "Plugin has no base directory, skipping");
                continue;
            };

            if !dir.is_dir() {
                continue;
            }

            let prefix = normalize_prefix(plugin.namespace()).to_string();
            tracing::debug!(
                plugin = plugin.name(),
                path = %dir.display(),
                "Auto-detected metadata directory"
            );
            directories.insert(prefix, PathBuf::from(normalize_path(&path_string(&dir))));
        }
    }

    /// Normalize separators and expand a leading `@Plugin` reference.
    fn resolve_path(registry: &PluginRegistry, raw: &str) -> Result<String, PluginError> {
        let path = normalize_path(raw);

        let Some(reference) = path.strip_prefix('@') else {
            return Ok(path);
        };

        let (name, remainder) = match reference.find('/') {
            Some(i) => reference.split_at(i),
            None => (reference, ""),
        };

        let plugin = registry
            .get(name)
            .ok_or_else(|| PluginError::UnknownReference {
                name: name.to_string(),
                available: registry.names(),
            })?;

        let base_dir = plugin.base_dir().ok_or_else(|| PluginError::Unlocatable {
            name: name.to_string(),
        })?;

        let base = normalize_path(&path_string(base_dir));
        if base == "/" && !remainder.is_empty() {
            return Ok(trim_separators(remainder));
        }
        Ok(trim_separators(&format!("{}{}", base, remainder)))
    }
}

/// Convert `\` to `/` and strip trailing separators, keeping a bare root.
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    trim_separators(&path)
}

fn trim_separators(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !path.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{METADATA_RESOURCE_DIR, PluginDescriptor};
    use tempfile::tempdir;

    fn registry_with(plugins: Vec<PluginDescriptor>) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for plugin in plugins {
            registry.register(plugin).unwrap();
        }
        registry
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("C:\\app\\meta\\"), "C:/app/meta");
        assert_eq!(normalize_path("/srv/meta///"), "/srv/meta");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("relative/dir"), "relative/dir");
    }

    #[test]
    fn test_plugin_reference_expanded() {
        let registry = registry_with(vec![PluginDescriptor::new("Acme", "/app/plugins/acme")]);

        let map = DirectoryResolver::resolve(
            &registry,
            false,
            &[DirectoryConfig::new("@Acme/config", "")],
        )
        .unwrap();

        assert_eq!(map[""], PathBuf::from("/app/plugins/acme/config"));
    }

    #[test]
    fn test_plugin_reference_without_remainder() {
        let registry = registry_with(vec![PluginDescriptor::new("Acme", "/app/plugins/acme/")]);

        let map = DirectoryResolver::resolve(
            &registry,
            false,
            &[DirectoryConfig::new("@Acme", "Acme")],
        )
        .unwrap();

        assert_eq!(map["Acme"], PathBuf::from("/app/plugins/acme"));
    }

    #[test]
    fn test_plugin_at_filesystem_root() {
        let registry = registry_with(vec![PluginDescriptor::new("Root", "/")]);

        let map = DirectoryResolver::resolve(
            &registry,
            false,
            &[
                DirectoryConfig::new("@Root/config/", "App"),
                DirectoryConfig::new("@Root", ""),
            ],
        )
        .unwrap();

        assert_eq!(map["App"], PathBuf::from("/config"));
        assert_eq!(map[""], PathBuf::from("/"));
    }

    #[test]
    fn test_backslash_reference() {
        let registry = registry_with(vec![PluginDescriptor::new("Acme", "/app/plugins/acme")]);

        let map = DirectoryResolver::resolve(
            &registry,
            false,
            &[DirectoryConfig::new("@Acme\\Resources\\meta\\", "Acme\\Entity\\")],
        )
        .unwrap();

        assert_eq!(
            map["Acme\\Entity"],
            PathBuf::from("/app/plugins/acme/Resources/meta")
        );
    }

    #[test]
    fn test_unknown_plugin_reference() {
        let registry = registry_with(vec![
            PluginDescriptor::new("Acme", "/app/plugins/acme"),
            PluginDescriptor::new("Blog", "/app/plugins/blog"),
        ]);

        let err = DirectoryResolver::resolve(
            &registry,
            false,
            &[DirectoryConfig::new("@Ghost/config", "")],
        )
        .unwrap_err();

        match &err {
            PluginError::UnknownReference { name, available } => {
                assert_eq!(name, "Ghost");
                assert_eq!(available, &vec!["Acme".to_string(), "Blog".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn test_detached_plugin_reference() {
        let registry = registry_with(vec![PluginDescriptor::detached("Core")]);

        let err = DirectoryResolver::resolve(
            &registry,
            true,
            &[DirectoryConfig::new("@Core/meta", "")],
        )
        .unwrap_err();

        assert!(matches!(err, PluginError::Unlocatable { ref name } if name == "Core"));
    }

    #[test]
    fn test_auto_detection_counts_only_plugins_with_metadata() {
        let root = tempdir().unwrap();
        let mut plugins = Vec::new();
        for (name, has_metadata) in [("Acme", true), ("Blog", false), ("Shop", true)] {
            let base = root.path().join(name.to_lowercase());
            std::fs::create_dir_all(&base).unwrap();
            if has_metadata {
                std::fs::create_dir_all(base.join(METADATA_RESOURCE_DIR)).unwrap();
            }
            plugins.push(PluginDescriptor::new(name, base).with_namespace(format!("{name}\\")));
        }
        plugins.push(PluginDescriptor::detached("Core"));
        let registry = registry_with(plugins);

        let map = DirectoryResolver::resolve(&registry, true, &[]).unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.contains_key("Acme"));
        assert!(map.contains_key("Shop"));
        assert!(map["Acme"].ends_with(METADATA_RESOURCE_DIR));
    }

    #[test]
    fn test_auto_detection_disabled() {
        let root = tempdir().unwrap();
        let base = root.path().join("acme");
        std::fs::create_dir_all(base.join(METADATA_RESOURCE_DIR)).unwrap();
        let registry = registry_with(vec![PluginDescriptor::new("Acme", base)]);

        let map = DirectoryResolver::resolve(&registry, false, &[]).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_explicit_entry_overrides_auto_detected() {
        let root = tempdir().unwrap();
        let base = root.path().join("acme");
        std::fs::create_dir_all(base.join(METADATA_RESOURCE_DIR)).unwrap();
        let registry = registry_with(vec![PluginDescriptor::new("Acme", base)]);

        let map = DirectoryResolver::resolve(
            &registry,
            true,
            &[DirectoryConfig::new("/srv/override/", "Acme\\")],
        )
        .unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["Acme"], PathBuf::from("/srv/override"));
    }

    #[test]
    fn test_later_explicit_entry_wins() {
        let registry = PluginRegistry::new();

        let map = DirectoryResolver::resolve(
            &registry,
            true,
            &[
                DirectoryConfig::new("/first", ""),
                DirectoryConfig::new("/second", "App"),
                DirectoryConfig::new("/third", ""),
            ],
        )
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map[""], PathBuf::from("/third"));
        assert_eq!(map["App"], PathBuf::from("/second"));
    }
}
