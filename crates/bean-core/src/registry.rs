//! Canonical definition set
//!
//! Provides [`DefinitionRegistry`], the name-indexed set of definitions a
//! context is built from. The set is populated once and read-only afterwards,
//! so lookups need no locking.

use crate::definition::BeanDefinition;
use crate::error::{BeanError, BeanResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when two definitions share a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later definitions replace earlier ones
    #[default]
    LastWins,

    /// Fail with [`BeanError::DuplicateDefinition`]
    Reject,
}

/// Immutable name → definition index
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<String, BeanDefinition>,
}

impl DefinitionRegistry {
    /// Build registry; duplicate names resolve by list order, last one wins
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = BeanDefinition>) -> Self {
        let mut map = HashMap::new();
        for definition in definitions {
            if let Some(previous) = map.insert(definition.name().to_string(), definition) {
                tracing::debug!("Replacing earlier definition of bean '{}'", previous.name());
            }
        }
        Self { definitions: map }
    }

    /// Build registry under an explicit duplicate policy
    ///
    /// # Errors
    /// - `BeanError::DuplicateDefinition` if a name repeats under [`DuplicatePolicy::Reject`]
    pub fn with_policy(
        definitions: impl IntoIterator<Item = BeanDefinition>,
        policy: DuplicatePolicy,
    ) -> BeanResult<Self> {
        match policy {
            DuplicatePolicy::LastWins => Ok(Self::new(definitions)),
            DuplicatePolicy::Reject => {
                let mut map = HashMap::new();
                for definition in definitions {
                    let name = definition.name().to_string();
                    if map.contains_key(&name) {
                        return Err(BeanError::DuplicateDefinition(name));
                    }
                    map.insert(name, definition);
                }
                Ok(Self { definitions: map })
            }
        }
    }

    /// Look up definition by name
    ///
    /// # Errors
    /// - `BeanError::NotFound` if no definition is registered under `name`
    pub fn get(&self, name: &str) -> BeanResult<&BeanDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| BeanError::not_found(name))
    }

    /// Check if a definition is registered under `name`
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Registered names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Registered definitions, in no particular order
    pub fn definitions(&self) -> impl Iterator<Item = &BeanDefinition> {
        self.definitions.values()
    }

    /// Number of definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<BeanDefinition> for DefinitionRegistry {
    fn from_iter<I: IntoIterator<Item = BeanDefinition>>(iter: I) -> Self {
        Self::new(iter)
    }
}
