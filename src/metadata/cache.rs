//! Metadata cache backend selection.

use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{CacheSetting, ParameterBag};
use crate::{Error, Result};

/// Finalized metadata cache backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheConfig {
    /// Metadata is parsed on every lookup
    None,
    /// Parsed metadata is written under `dir`, which exists once selected
    File { dir: PathBuf },
    /// Delegates to an externally registered cache service
    Service { name: String },
}

impl CacheConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            CacheConfig::None => "none",
            CacheConfig::File { .. } => "file",
            CacheConfig::Service { .. } => "service",
        }
    }

    pub fn file_dir(&self) -> Option<&Path> {
        match self {
            CacheConfig::File { dir } => Some(dir.as_path()),
            _ => None,
        }
    }

    pub fn service_name(&self) -> Option<&str> {
        match self {
            CacheConfig::Service { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

pub struct CacheStrategySelector;

impl CacheStrategySelector {
    /// Pick the backend for `setting`. For the file backend the placeholder
    /// expanded `file_cache_dir` is created before this returns.
    pub fn select(
        setting: &CacheSetting,
        file_cache_dir: &str,
        params: &ParameterBag,
    ) -> Result<CacheConfig> {
        let config = match setting {
            CacheSetting::None => CacheConfig::None,
            CacheSetting::File => {
                let dir = PathBuf::from(params.resolve(file_cache_dir)?);
                ensure_cache_dir(&dir)?;
                CacheConfig::File { dir }
            }
            CacheSetting::Service(name) => CacheConfig::Service { name: name.clone() },
        };

        tracing::info!(kind = config.kind(), "Selected metadata cache");
        Ok(config)
    }
}

fn ensure_cache_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let failed = |source: io::Error| Error::CacheDirectoryCreateFailed {
        path: dir.to_path_buf(),
        source,
    };

    if dir.exists() {
        return Err(failed(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists and is not a directory",
        )));
    }

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(dir).map_err(failed)?;

    tracing::debug!(path = %dir.display(), "Created metadata cache directory");
    Ok(())
}
