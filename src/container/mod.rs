//! Registration API between resolved configuration and a host service registry.
//!
//! Resolution never touches a container directly. It produces a
//! [`LoadedConfiguration`](crate::LoadedConfiguration) which the host applies
//! through [`ServiceRegistry`]. [`ContainerBuilder`] is an in-memory registry
//! for hosts without one of their own.

use std::collections::BTreeMap;

use serde_json::Value;

pub const LISTENER_UPLOADER: &str = "attach_uploader.listener.uploader";
pub const METADATA_FILE_LOCATOR: &str = "attach_uploader.metadata.file_locator";
pub const METADATA_CACHE: &str = "attach_uploader.metadata.cache";
pub const METADATA_FILE_CACHE: &str = "attach_uploader.metadata.cache.file_cache";

pub const PARAM_MAPPINGS: &str = "attach_uploader.mappings";
pub const PARAM_STORAGE_SERVICE: &str = "attach_uploader.storage_service";
pub const PARAM_ADAPTER_CLASS: &str = "attach_uploader.adapter.class";

/// Host-side sink for service registrations.
pub trait ServiceRegistry {
    /// Load a named set of predefined service definitions.
    fn import_resource(&mut self, resource: &str);

    fn set_parameter(&mut self, name: &str, value: Value);

    /// Set constructor argument `index` of `service`, replacing any previous value.
    fn set_argument(&mut self, service: &str, index: usize, value: Value);

    fn add_tag(&mut self, service: &str, tag: &str);

    fn set_alias(&mut self, alias: &str, target: &str, public: bool);

    fn remove_alias(&mut self, alias: &str);
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    arguments: BTreeMap<usize, Value>,
    tags: Vec<String>,
}

impl Definition {
    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(&index)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub target: String,
    pub public: bool,
}

/// In-memory [`ServiceRegistry`].
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    resources: Vec<String>,
    parameters: BTreeMap<String, Value>,
    definitions: BTreeMap<String, Definition>,
    aliases: BTreeMap<String, Alias>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.iter().any(|r| r == resource)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn definition(&self, service: &str) -> Option<&Definition> {
        self.definitions.get(service)
    }

    pub fn alias(&self, alias: &str) -> Option<&Alias> {
        self.aliases.get(alias)
    }
}

impl ServiceRegistry for ContainerBuilder {
    fn import_resource(&mut self, resource: &str) {
        if !self.has_resource(resource) {
            self.resources.push(resource.to_string());
        }
    }

    fn set_parameter(&mut self, name: &str, value: Value) {
        self.parameters.insert(name.to_string(), value);
    }

    fn set_argument(&mut self, service: &str, index: usize, value: Value) {
        self.definitions
            .entry(service.to_string())
            .or_default()
            .arguments
            .insert(index, value);
    }

    fn add_tag(&mut self, service: &str, tag: &str) {
        let definition = self.definitions.entry(service.to_string()).or_default();
        if !definition.has_tag(tag) {
            definition.tags.push(tag.to_string());
        }
    }

    fn set_alias(&mut self, alias: &str, target: &str, public: bool) {
        self.aliases.insert(
            alias.to_string(),
            Alias {
                target: target.to_string(),
                public,
            },
        );
    }

    fn remove_alias(&mut self, alias: &str) {
        self.aliases.remove(alias);
    }
}
