//! Typed configuration tree with defaults.
//!
//! The tree is deserialized from a merged [`serde_json::Value`] into a raw
//! shape first, then validated into [`UploaderConfig`] so that driver and
//! cache values fail with dedicated errors instead of generic serde messages.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ConfigError, ConfigResult, merge_layers};

pub const DEFAULT_STORAGE: &str = "attach_uploader.storage.file_system";
pub const DEFAULT_FILE_CACHE_DIR: &str = "%kernel.cache_dir%/attach_uploader";
pub const DEFAULT_URI_PREFIX: &str = "/uploads";

/// Persistence layer the upload listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbDriver {
    Orm,
    #[serde(rename = "mongodb")]
    MongoDb,
}

impl DbDriver {
    pub const ALL: [DbDriver; 2] = [DbDriver::Orm, DbDriver::MongoDb];

    pub fn as_str(&self) -> &'static str {
        match self {
            DbDriver::Orm => "orm",
            DbDriver::MongoDb => "mongodb",
        }
    }

    /// Tag attached to the upload listener so the persistence layer
    /// dispatches its lifecycle events to it.
    pub fn event_subscriber_tag(&self) -> &'static str {
        match self {
            DbDriver::Orm => "doctrine.event_subscriber",
            DbDriver::MongoDb => "doctrine_mongodb.odm.event_subscriber",
        }
    }

    /// Identifier of the adapter translating persistence events for the listener.
    pub fn adapter_class(&self) -> &'static str {
        match self {
            DbDriver::Orm => "attach_uploader::adapter::orm::DoctrineOrmAdapter",
            DbDriver::MongoDb => "attach_uploader::adapter::odm::MongoDbAdapter",
        }
    }
}

impl FromStr for DbDriver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        DbDriver::ALL
            .into_iter()
            .find(|d| d.as_str() == value)
            .ok_or(ConfigError::UnsupportedDriver { value })
    }
}

impl fmt::Display for DbDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata cache backend as written in `metadata.cache`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheSetting {
    None,
    #[default]
    File,
    /// Identifier of an externally registered cache service
    Service(String),
}

impl CacheSetting {
    pub fn as_str(&self) -> &str {
        match self {
            CacheSetting::None => "none",
            CacheSetting::File => "file",
            CacheSetting::Service(name) => name,
        }
    }
}

impl FromStr for CacheSetting {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ConfigError::invalid(
                "metadata.cache",
                "expected \"none\", \"file\" or a cache service id",
            )),
            "none" => Ok(CacheSetting::None),
            "file" => Ok(CacheSetting::File),
            name => Ok(CacheSetting::Service(name.to_string())),
        }
    }
}

impl fmt::Display for CacheSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CacheSetting {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCacheConfig {
    #[serde(default = "default_file_cache_dir")]
    pub dir: String,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            dir: default_file_cache_dir(),
        }
    }
}

/// One explicitly configured metadata search location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: String,
    #[serde(default)]
    pub namespace_prefix: String,
}

impl DirectoryConfig {
    pub fn new(path: impl Into<String>, namespace_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            namespace_prefix: namespace_prefix.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataConfig {
    pub cache: CacheSetting,
    pub file_cache: FileCacheConfig,
    pub auto_detection: bool,
    pub directories: Vec<DirectoryConfig>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            cache: CacheSetting::File,
            file_cache: FileCacheConfig::default(),
            auto_detection: true,
            directories: Vec::new(),
        }
    }
}

/// How one class of uploadable file is stored and exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_uri_prefix")]
    pub uri_prefix: String,
    pub upload_destination: String,
    #[serde(default)]
    pub namer: Option<String>,
    #[serde(default)]
    pub directory_namer: Option<String>,
    #[serde(default = "default_true")]
    pub delete_on_remove: bool,
    #[serde(default = "default_true")]
    pub delete_on_update: bool,
    #[serde(default = "default_true")]
    pub inject_on_load: bool,
}

impl MappingConfig {
    pub fn new(upload_destination: impl Into<String>) -> Self {
        Self {
            uri_prefix: default_uri_prefix(),
            upload_destination: upload_destination.into(),
            namer: None,
            directory_namer: None,
            delete_on_remove: true,
            delete_on_update: true,
            inject_on_load: true,
        }
    }
}

/// Validated plugin configuration with every default applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploaderConfig {
    pub db_driver: DbDriver,
    pub storage: String,
    pub twig: bool,
    pub gaufrette: bool,
    pub metadata: MetadataConfig,
    pub mappings: BTreeMap<String, MappingConfig>,
}

impl UploaderConfig {
    /// Merge configuration layers in order, then validate the result.
    pub fn process(layers: &[Value]) -> ConfigResult<Self> {
        Self::from_value(merge_layers(layers))
    }

    pub fn from_value(value: Value) -> ConfigResult<Self> {
        if !value.is_object() {
            return Err(ConfigError::invalid(
                super::ROOT_KEY,
                format!("expected a mapping, found {}", type_name(&value)),
            ));
        }
        let raw: RawUploaderConfig = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid(super::ROOT_KEY, e.to_string()))?;
        raw.try_into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUploaderConfig {
    db_driver: Option<String>,
    #[serde(default = "default_storage")]
    storage: String,
    #[serde(default = "default_true")]
    twig: bool,
    #[serde(default)]
    gaufrette: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    metadata: RawMetadataConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    mappings: BTreeMap<String, MappingConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetadataConfig {
    #[serde(default = "default_cache")]
    cache: String,
    #[serde(default, deserialize_with = "null_as_default")]
    file_cache: FileCacheConfig,
    #[serde(default = "default_true")]
    auto_detection: bool,
    #[serde(default, alias = "directory", deserialize_with = "null_as_default")]
    directories: Vec<DirectoryConfig>,
}

impl Default for RawMetadataConfig {
    fn default() -> Self {
        Self {
            cache: default_cache(),
            file_cache: FileCacheConfig::default(),
            auto_detection: true,
            directories: Vec::new(),
        }
    }
}

impl TryFrom<RawUploaderConfig> for UploaderConfig {
    type Error = ConfigError;

    fn try_from(raw: RawUploaderConfig) -> Result<Self, Self::Error> {
        let db_driver = raw
            .db_driver
            .ok_or_else(|| ConfigError::invalid("db_driver", "option is required"))?
            .parse::<DbDriver>()?;

        for (index, directory) in raw.metadata.directories.iter().enumerate() {
            if directory.path.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("metadata.directories.{}.path", index),
                    "cannot be empty",
                ));
            }
        }

        for (id, mapping) in &raw.mappings {
            if mapping.upload_destination.trim().is_empty() {
                return Err(ConfigError::invalid(
                    format!("mappings.{}.upload_destination", id),
                    "cannot be empty",
                ));
            }
        }

        Ok(Self {
            db_driver,
            storage: raw.storage,
            twig: raw.twig,
            gaufrette: raw.gaufrette,
            metadata: MetadataConfig {
                cache: raw.metadata.cache.parse::<CacheSetting>()?,
                file_cache: raw.metadata.file_cache,
                auto_detection: raw.metadata.auto_detection,
                directories: raw.metadata.directories,
            },
            mappings: raw.mappings,
        })
    }
}

/// An empty node (`metadata: ~`) takes the same defaults as an absent one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

fn default_true() -> bool {
    true
}

fn default_storage() -> String {
    DEFAULT_STORAGE.to_string()
}

fn default_cache() -> String {
    CacheSetting::File.to_string()
}

fn default_file_cache_dir() -> String {
    DEFAULT_FILE_CACHE_DIR.to_string()
}

fn default_uri_prefix() -> String {
    DEFAULT_URI_PREFIX.to_string()
}
