//! Startup orchestration: configuration in, registrations out.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::Result;
use crate::config::{DbDriver, DirectoryConfig, MappingConfig, ParameterBag, UploaderConfig};
use crate::container::{
    LISTENER_UPLOADER, METADATA_CACHE, METADATA_FILE_CACHE, METADATA_FILE_LOCATOR,
    PARAM_ADAPTER_CLASS, PARAM_MAPPINGS, PARAM_STORAGE_SERVICE, ServiceRegistry,
};
use crate::metadata::{CacheConfig, CacheStrategySelector, DirectoryMap, DirectoryResolver};
use crate::plugins::PluginRegistry;

/// Service definition sets every configuration loads.
pub const CORE_RESOURCES: [&str; 8] = [
    "adapter", "listener", "storage", "injector", "templating", "mapping", "factory", "namer",
];
pub const GAUFRETTE_RESOURCE: &str = "gaufrette";
pub const TWIG_RESOURCE: &str = "twig";

/// Everything resolved at startup, ready to be registered with a host.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfiguration {
    pub config: UploaderConfig,
    pub resources: Vec<&'static str>,
    /// Mappings with parameter placeholders in `upload_destination` expanded
    pub mappings: BTreeMap<String, MappingConfig>,
    pub directories: DirectoryMap,
    pub cache: CacheConfig,
}

impl LoadedConfiguration {
    pub fn driver(&self) -> DbDriver {
        self.config.db_driver
    }

    pub fn apply<R: ServiceRegistry + ?Sized>(&self, registry: &mut R) -> Result<()> {
        for resource in &self.resources {
            registry.import_resource(resource);
        }

        let driver = self.driver();
        registry.set_parameter(PARAM_MAPPINGS, serde_json::to_value(&self.mappings)?);
        registry.set_parameter(
            PARAM_STORAGE_SERVICE,
            Value::String(self.config.storage.clone()),
        );
        registry.set_parameter(
            PARAM_ADAPTER_CLASS,
            Value::String(driver.adapter_class().to_string()),
        );
        registry.add_tag(LISTENER_UPLOADER, driver.event_subscriber_tag());

        let directories: serde_json::Map<String, Value> = self
            .directories
            .iter()
            .map(|(prefix, path)| (prefix.clone(), Value::String(path.display().to_string())))
            .collect();
        registry.set_argument(METADATA_FILE_LOCATOR, 0, Value::Object(directories));

        match &self.cache {
            CacheConfig::None => registry.remove_alias(METADATA_CACHE),
            CacheConfig::File { dir } => {
                registry.set_argument(
                    METADATA_FILE_CACHE,
                    0,
                    Value::String(dir.display().to_string()),
                );
                registry.set_alias(METADATA_CACHE, METADATA_FILE_CACHE, false);
            }
            CacheConfig::Service { name } => registry.set_alias(METADATA_CACHE, name, false),
        }

        tracing::debug!(
            driver = %driver,
            resources = self.resources.len(),
            "Applied uploader configuration"
        );
        Ok(())
    }
}

/// Runs configuration processing, directory resolution and cache selection
/// in that order.
#[derive(Debug)]
pub struct UploaderExtension<'a> {
    plugins: &'a PluginRegistry,
    params: &'a ParameterBag,
}

impl<'a> UploaderExtension<'a> {
    pub fn new(plugins: &'a PluginRegistry, params: &'a ParameterBag) -> Self {
        Self { plugins, params }
    }

    /// Merge and validate `layers`, then resolve everything that depends on
    /// the host. The file cache directory exists when this returns `Ok`.
    pub fn load(&self, layers: &[Value]) -> Result<LoadedConfiguration> {
        let config = UploaderConfig::process(layers)?;
        tracing::info!(driver = %config.db_driver, "Loading uploader configuration");
        self.load_config(config)
    }

    pub fn load_config(&self, config: UploaderConfig) -> Result<LoadedConfiguration> {
        let mut resources = CORE_RESOURCES.to_vec();
        if config.gaufrette {
            resources.push(GAUFRETTE_RESOURCE);
        }
        if config.twig {
            resources.push(TWIG_RESOURCE);
        }

        let mut mappings = config.mappings.clone();
        for mapping in mappings.values_mut() {
            mapping.upload_destination = self.params.resolve(&mapping.upload_destination)?;
        }

        let entries = config
            .metadata
            .directories
            .iter()
            .map(|entry| -> Result<DirectoryConfig> {
                let path = self.params.resolve(&entry.path)?;
                Ok(DirectoryConfig::new(path, entry.namespace_prefix.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;

        let directories =
            DirectoryResolver::resolve(self.plugins, config.metadata.auto_detection, &entries)?;
        tracing::debug!(count = directories.len(), "Resolved metadata directories");

        let cache = CacheStrategySelector::select(
            &config.metadata.cache,
            &config.metadata.file_cache.dir,
            self.params,
        )?;

        Ok(LoadedConfiguration {
            config,
            resources,
            mappings,
            directories,
            cache,
        })
    }
}
