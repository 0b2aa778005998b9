use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::PluginError;
use super::discovery::PluginDiscovery;
use super::manifest::Plugin;

/// Characters reserved by the `@Plugin/path` reference syntax.
const RESERVED_CHARS: [char; 3] = ['@', '/', '\\'];

/// Registered plugins in registration order, addressable by name.
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every plugin found under `dirs`.
    pub fn discover(dirs: &[PathBuf]) -> Result<Self, PluginError> {
        let mut registry = Self::new();
        for descriptor in PluginDiscovery::discover(dirs)? {
            registry.register(descriptor)?;
        }
        tracing::debug!(count = registry.len(), "Discovered plugins");
        Ok(registry)
    }

    pub fn register(&mut self, plugin: impl Plugin + 'static) -> Result<(), PluginError> {
        self.register_shared(Arc::new(plugin))
    }

    pub fn register_shared(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name();

        if name.is_empty() {
            return Err(PluginError::InvalidName {
                name: String::new(),
                reason: "must not be empty".into(),
            });
        }

        if let Some(c) = name.chars().find(|c| RESERVED_CHARS.contains(c)) {
            return Err(PluginError::InvalidName {
                name: name.to_string(),
                reason: format!("must not contain '{}'", c),
            });
        }

        if let Some(&existing) = self.index.get(name) {
            return Err(PluginError::DuplicateName {
                name: name.to_string(),
                first: describe_location(self.plugins[existing].as_ref()),
                second: describe_location(plugin.as_ref()),
            });
        }

        self.index.insert(name.to_string(), self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.index.get(name).map(|&i| self.plugins[i].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Plugin names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

fn describe_location(plugin: &dyn Plugin) -> String {
    match plugin.base_dir() {
        Some(dir) => dir.display().to_string(),
        None => "<detached>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginDescriptor;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginDescriptor::new("Acme", "/app/plugins/acme"))
            .unwrap();
        registry.register(PluginDescriptor::detached("Core")).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Acme"));
        assert!(!registry.contains("Ghost"));
        assert_eq!(registry.get("Core").unwrap().name(), "Core");
        assert_eq!(registry.names(), vec!["Acme", "Core"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginDescriptor::new("Acme", "/first"))
            .unwrap();
        let err = registry
            .register(PluginDescriptor::new("Acme", "/second"))
            .unwrap_err();

        match err {
            PluginError::DuplicateName { first, second, .. } => {
                assert_eq!(first, "/first");
                assert_eq!(second, "/second");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reserved_characters_rejected() {
        let mut registry = PluginRegistry::new();
        for name in ["@Acme", "Acme/Blog", "Acme\\Blog", ""] {
            let err = registry
                .register(PluginDescriptor::new(name, "/x"))
                .unwrap_err();
            assert!(matches!(err, PluginError::InvalidName { .. }), "{name}");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_discover_registers_plugins() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join("acme").join(".plugin");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("plugin.json"),
            r#"{"name":"Acme","version":"1.0.0"}"#,
        )
        .unwrap();

        let registry = PluginRegistry::discover(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(registry.names(), vec!["Acme"]);
    }
}
