//! Bean Manifests
//!
//! Loads bean definitions and context options from TOML, YAML or JSON files
//! and builds an [`bean_core::ApplicationContext`] from them.
//!
//! # Example
//!
//! ```rust,ignore
//! use bean_config::Manifest;
//!
//! let manifest = Manifest::load("beans.toml")?;
//! let report = manifest.validate()?;
//! let ctx = manifest.build_context(instantiator)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod manifest;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use manifest::{BeanSpec, ContextOptions, Format, Manifest, ManifestReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
