use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid plugin manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Duplicate plugin name '{name}': first at {first}, second at {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid plugin name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error(
        "The plugin \"{name}\" has not been registered. Available plugins: {}",
        available.join(", ")
    )]
    UnknownReference { name: String, available: Vec<String> },

    #[error("The plugin \"{name}\" is registered but its directory cannot be located")]
    Unlocatable { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::ManifestNotFound {
            path: PathBuf::from("/plugins/test"),
        };
        assert!(err.to_string().contains("/plugins/test"));

        let err = PluginError::InvalidManifest {
            path: PathBuf::from("/plugins/bad"),
            reason: "missing name".into(),
        };
        assert!(err.to_string().contains("missing name"));

        let err = PluginError::DuplicateName {
            name: "Acme".into(),
            first: "/plugins/first".into(),
            second: "/plugins/second".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Acme"));
        assert!(msg.contains("first"));
        assert!(msg.contains("second"));
    }

    #[test]
    fn test_unknown_reference_lists_available() {
        let err = PluginError::UnknownReference {
            name: "Ghost".into(),
            available: vec!["Acme".into(), "Blog".into()],
        };
        assert_eq!(
            err.to_string(),
            "The plugin \"Ghost\" has not been registered. Available plugins: Acme, Blog"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let plugin_err: PluginError = io_err.into();
        assert!(matches!(plugin_err, PluginError::Io(_)));
    }
}
