//! `%name%` placeholder resolution.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{ConfigError, ConfigResult};

pub const KERNEL_ROOT_DIR: &str = "kernel.root_dir";
pub const KERNEL_CACHE_DIR: &str = "kernel.cache_dir";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%%|%([^%\s]+)%").expect("valid placeholder regex"))
}

/// Named string parameters referenced from configuration values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBag {
    parameters: BTreeMap<String, String>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `kernel.root_dir` and `kernel.cache_dir` (`<root>/cache`).
    pub fn with_kernel_defaults(root_dir: impl AsRef<Path>) -> Self {
        let root = root_dir.as_ref().display().to_string();
        Self::new()
            .with(KERNEL_ROOT_DIR, root)
            .with(KERNEL_CACHE_DIR, format!("%{}%/cache", KERNEL_ROOT_DIR))
    }

    /// Seed the kernel parameters from the platform cache location for
    /// `application`, falling back to the working directory.
    pub fn for_application(application: &str) -> Self {
        match directories::ProjectDirs::from("", "", application) {
            Some(dirs) => Self::new()
                .with(KERNEL_ROOT_DIR, dirs.data_dir().display().to_string())
                .with(KERNEL_CACHE_DIR, dirs.cache_dir().display().to_string()),
            None => {
                tracing::warn!("No home directory found, using working directory for {application}");
                Self::with_kernel_defaults(".")
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Replace every placeholder in `value`. `%%` yields a literal `%`.
    pub fn resolve(&self, value: &str) -> ConfigResult<String> {
        self.resolve_with_stack(value, &mut Vec::new())
    }

    fn resolve_with_stack(&self, value: &str, stack: &mut Vec<String>) -> ConfigResult<String> {
        let mut error = None;

        let resolved = placeholder_regex().replace_all(value, |caps: &Captures<'_>| {
            if error.is_some() {
                return String::new();
            }
            let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                return "%".to_string();
            };
            match self.resolve_parameter(name, value, stack) {
                Ok(resolved) => resolved,
                Err(e) => {
                    error = Some(e);
                    String::new()
                }
            }
        });

        match error {
            Some(e) => Err(e),
            None => Ok(resolved.into_owned()),
        }
    }

    fn resolve_parameter(
        &self,
        name: &str,
        referenced_by: &str,
        stack: &mut Vec<String>,
    ) -> ConfigResult<String> {
        if stack.iter().any(|n| n == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(ConfigError::CircularParameter { chain });
        }

        let raw = self
            .parameters
            .get(name)
            .ok_or_else(|| ConfigError::UnknownParameter {
                name: name.to_string(),
                value: referenced_by.to_string(),
            })?;

        stack.push(name.to_string());
        let resolved = self.resolve_with_stack(raw, stack);
        stack.pop();
        resolved
    }
}
