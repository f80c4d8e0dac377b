//! Error types for manifest loading

use bean_core::BeanError;
use std::path::PathBuf;

/// Errors while reading or applying a bean manifest
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File extension does not name a known format
    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(PathBuf),

    /// TOML syntax or schema error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML syntax or schema error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or schema error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Manifest parsed but is not usable
    #[error("invalid manifest: {0}")]
    Invalid(String),

    /// Registry construction failed
    #[error("context error: {0}")]
    Context(#[from] BeanError),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Result type alias for manifest operations
pub type ConfigResult<T> = Result<T, ConfigError>;
