//! Layered configuration loading.
//!
//! Each source contributes one layer. Layers are merged in the order they
//! were added: scalars from later layers win, mappings merge key by key and
//! sequences are concatenated.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{ConfigError, ConfigResult};

/// Top-level key a configuration file may nest the plugin tree under.
pub const ROOT_KEY: &str = "attach_uploader";

#[derive(Debug, Clone)]
enum LayerSource {
    File { path: PathBuf, required: bool },
    Value(Value),
}

/// Collects configuration layers from files and in-memory values.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    sources: Vec<LayerSource>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration file that must exist
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(LayerSource::File {
            path: path.as_ref().to_path_buf(),
            required: true,
        });
        self
    }

    /// Add a configuration file that is skipped when absent
    pub fn optional_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(LayerSource::File {
            path: path.as_ref().to_path_buf(),
            required: false,
        });
        self
    }

    /// Add an in-memory layer
    pub fn value(mut self, value: Value) -> Self {
        self.sources.push(LayerSource::Value(value));
        self
    }

    /// Read every source, returning the layers in priority order (lowest first).
    pub fn load(&self) -> ConfigResult<Vec<Value>> {
        let mut layers = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source {
                LayerSource::File { path, required } => {
                    if !path.exists() {
                        if *required {
                            return Err(ConfigError::FileNotFound { path: path.clone() });
                        }
                        tracing::debug!("Skipping missing config file {}", path.display());
                        continue;
                    }
                    layers.push(unwrap_root(read_file(path)?));
                }
                LayerSource::Value(value) => layers.push(unwrap_root(value.clone())),
            }
        }

        Ok(layers)
    }
}

fn read_file(path: &Path) -> ConfigResult<Value> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let content = std::fs::read_to_string(path)?;
    tracing::debug!("Loaded config layer from {}", path.display());

    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Some("yml" | "yaml") => {
            if content.trim().is_empty() {
                return Ok(Value::Object(Default::default()));
            }
            serde_yaml_bw::from_str(&content).map_err(|e| parse_error(e.to_string()))
        }
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn unwrap_root(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(ROOT_KEY) => {
            map.remove(ROOT_KEY).unwrap_or(Value::Null)
        }
        Value::Null => Value::Object(Default::default()),
        other => other,
    }
}

/// Deep-merge layers, later layers taking precedence.
pub fn merge_layers(layers: &[Value]) -> Value {
    let mut merged = Value::Object(Default::default());
    for layer in layers {
        merge_into(&mut merged, layer.clone());
    }
    merged
}

fn merge_into(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => target.extend(source),
        // an empty node (`metadata: ~`) keeps what earlier layers set
        (Value::Object(_) | Value::Array(_), Value::Null) => {}
        (target, source) => *target = source,
    }
}
