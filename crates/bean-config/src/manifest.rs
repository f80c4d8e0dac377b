//! Bean manifests
//!
//! A manifest declares bean definitions plus context options in TOML, YAML
//! or JSON. Formats share one schema:
//!
//! ```toml
//! [context]
//! duplicates = "reject"
//!
//! [[bean]]
//! name = "server"
//! type = "HttpServer"
//! scope = "prototype"
//! init = "start"
//! args = ["0.0.0.0", 8080]
//! fields = { timeout = 30 }
//! ```

use crate::error::{ConfigError, ConfigResult};
use bean_core::{
    ApplicationContext, BeanDefinition, DuplicatePolicy, Instantiator, Scope, Value,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Manifest file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl Format {
    /// Detect format from file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Context-wide options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextOptions {
    /// Duplicate-name handling
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// One declared bean
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeanSpec {
    /// Bean name
    pub name: String,

    /// Type handle understood by the instantiator
    #[serde(rename = "type")]
    pub type_handle: String,

    /// Construction scope
    #[serde(default)]
    pub scope: Scope,

    /// Initializer method
    #[serde(default, alias = "init_method")]
    pub init: Option<String>,

    /// Positional constructor arguments
    #[serde(default)]
    pub args: Vec<serde_json::Value>,

    /// Field values
    #[serde(default)]
    pub fields: IndexMap<String, serde_json::Value>,
}

impl BeanSpec {
    /// Convert to a core definition
    #[must_use]
    pub fn to_definition(&self) -> BeanDefinition {
        let mut definition = BeanDefinition::new(self.name.clone(), self.type_handle.clone())
            .with_scope(self.scope)
            .with_args(self.args.iter().cloned().map(Value::from).collect());
        if let Some(init) = &self.init {
            definition = definition.with_init_method(init.clone());
        }
        self.fields.iter().fold(definition, |def, (name, value)| {
            def.with_field(name.clone(), Value::from(value.clone()))
        })
    }
}

/// Parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Context options
    #[serde(default)]
    pub context: ContextOptions,

    /// Declared beans, in file order
    #[serde(default, rename = "bean", alias = "beans")]
    pub beans: Vec<BeanSpec>,
}

/// Summary of a validated manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReport {
    /// `(name, type, scope)` per declared bean, in file order
    pub beans: Vec<(String, String, Scope)>,
    /// Names declared more than once, in order of first repeat
    pub duplicates: Vec<String>,
}

impl ManifestReport {
    /// Check if any name repeats
    #[inline]
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

impl Manifest {
    /// Parse TOML manifest
    ///
    /// # Errors
    /// - `ConfigError::Toml` on syntax or schema errors
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Parse YAML manifest
    ///
    /// # Errors
    /// - `ConfigError::Yaml` on syntax or schema errors
    pub fn from_yaml_str(source: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse JSON manifest
    ///
    /// # Errors
    /// - `ConfigError::Json` on syntax or schema errors
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse manifest in the given format
    ///
    /// # Errors
    /// Format-specific parse errors.
    pub fn parse(source: &str, format: Format) -> ConfigResult<Self> {
        match format {
            Format::Toml => Self::from_toml_str(source),
            Format::Yaml => Self::from_yaml_str(source),
            Format::Json => Self::from_json_str(source),
        }
    }

    /// Read manifest from file; format follows the extension
    ///
    /// # Errors
    /// - `ConfigError::UnsupportedFormat` for unknown extensions
    /// - `ConfigError::Io` if the file cannot be read
    /// - format-specific parse errors
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format =
            Format::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let source =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let manifest = Self::parse(&source, format)?;
        tracing::debug!(
            "Loaded manifest {} with {} beans",
            path.display(),
            manifest.beans.len()
        );
        Ok(manifest)
    }

    /// Check names and types, and collect duplicate names
    ///
    /// # Errors
    /// - `ConfigError::Invalid` for empty names or types
    /// - `ConfigError::Context` for duplicates under [`DuplicatePolicy::Reject`]
    pub fn validate(&self) -> ConfigResult<ManifestReport> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let mut beans = Vec::with_capacity(self.beans.len());

        for (index, bean) in self.beans.iter().enumerate() {
            if bean.name.trim().is_empty() {
                return Err(ConfigError::invalid(format!("bean #{index} has an empty name")));
            }
            if bean.type_handle.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "bean '{}' has an empty type",
                    bean.name
                )));
            }
            if !seen.insert(bean.name.as_str()) && !duplicates.contains(&bean.name) {
                duplicates.push(bean.name.clone());
            }
            beans.push((bean.name.clone(), bean.type_handle.clone(), bean.scope));
        }

        if self.context.duplicates == DuplicatePolicy::Reject {
            if let Some(name) = duplicates.first() {
                return Err(bean_core::BeanError::DuplicateDefinition(name.clone()).into());
            }
        }

        Ok(ManifestReport { beans, duplicates })
    }

    /// Core definitions, in file order
    #[must_use]
    pub fn definitions(&self) -> Vec<BeanDefinition> {
        self.beans.iter().map(BeanSpec::to_definition).collect()
    }

    /// Validate and build a context honouring the manifest's options
    ///
    /// # Errors
    /// Anything [`Manifest::validate`] returns.
    pub fn build_context(&self, instantiator: Arc<dyn Instantiator>) -> ConfigResult<ApplicationContext> {
        self.validate()?;
        Ok(ApplicationContext::builder(instantiator)
            .with_definitions(self.definitions())
            .with_duplicate_policy(self.context.duplicates)
            .build()?)
    }
}
