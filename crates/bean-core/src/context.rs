//! Application context
//!
//! [`ApplicationContext`] ties the canonical [`DefinitionRegistry`] to an
//! [`Instantiator`] and a singleton cache.
//!
//! # Singleton cache
//!
//! The cache is a sharded concurrent map. A cached read only takes a shard
//! read lock. On a miss the instance is built with no lock held, then stored
//! through the map's entry API: if another caller stored an instance for the
//! same name in the meantime, the fresh one is dropped and the stored one is
//! returned. Construction may therefore run more than once under a race, but
//! every caller observes the same singleton.
//!
//! Overrides passed for a singleton that is already cached are ignored.

use crate::definition::{BeanDefinition, Scope};
use crate::error::{BeanError, BeanResult};
use crate::instantiator::{Bean, Instantiator};
use crate::merge::merge;
use crate::overrides::Overrides;
use crate::registry::{DefinitionRegistry, DuplicatePolicy};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Registry of bean definitions with lazy singleton caching
pub struct ApplicationContext {
    registry: DefinitionRegistry,
    singletons: DashMap<String, Bean>,
    instantiator: Arc<dyn Instantiator>,
}

impl ApplicationContext {
    /// Create context; duplicate names resolve by list order, last one wins
    #[must_use]
    pub fn new(
        definitions: impl IntoIterator<Item = BeanDefinition>,
        instantiator: Arc<dyn Instantiator>,
    ) -> Self {
        Self::from_registry(DefinitionRegistry::new(definitions), instantiator)
    }

    /// Create context over an existing registry
    #[must_use]
    pub fn from_registry(registry: DefinitionRegistry, instantiator: Arc<dyn Instantiator>) -> Self {
        Self {
            registry,
            singletons: DashMap::new(),
            instantiator,
        }
    }

    /// Start a builder
    #[inline]
    #[must_use]
    pub fn builder(instantiator: Arc<dyn Instantiator>) -> ContextBuilder {
        ContextBuilder::new(instantiator)
    }

    /// Look up canonical definition by name
    ///
    /// # Errors
    /// - `BeanError::NotFound` if no definition is registered under `name`
    #[inline]
    pub fn definition(&self, name: &str) -> BeanResult<&BeanDefinition> {
        self.registry.get(name)
    }

    /// Check if a definition is registered under `name`
    ///
    /// Never constructs anything and never touches the singleton cache.
    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Get bean instance, applying per-call overrides
    ///
    /// # Arguments
    /// * `name` - Bean name
    /// * `overrides` - Field and constructor-argument overrides for this call
    ///
    /// # Errors
    /// - `BeanError::NotFound` if no definition is registered under `name`
    /// - `BeanError::Instantiate` if the instantiator fails; nothing is cached
    pub fn get(&self, name: &str, overrides: &Overrides) -> BeanResult<Bean> {
        let definition = self.registry.get(name)?;
        match definition.scope() {
            Scope::Singleton => self.singleton(definition, overrides),
            Scope::Prototype => {
                let effective = merge(definition, overrides);
                Ok(self.instantiator.instantiate(&effective)?)
            }
        }
    }

    /// Get bean instance with the definition's own values
    ///
    /// # Errors
    /// Same as [`ApplicationContext::get`].
    #[inline]
    pub fn get_default(&self, name: &str) -> BeanResult<Bean> {
        self.get(name, &Overrides::new())
    }

    /// Get bean instance downcast to `T`
    ///
    /// # Errors
    /// - `BeanError::TypeMismatch` if the instance is not a `T`
    /// - anything [`ApplicationContext::get`] returns
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str, overrides: &Overrides) -> BeanResult<Arc<T>> {
        self.get(name, overrides)?
            .downcast::<T>()
            .map_err(|_| BeanError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Get bean instance downcast to `T`, without overrides
    ///
    /// # Errors
    /// Same as [`ApplicationContext::get_as`].
    #[inline]
    pub fn get_default_as<T: Any + Send + Sync>(&self, name: &str) -> BeanResult<Arc<T>> {
        self.get_as(name, &Overrides::new())
    }

    /// Check if the singleton for `name` has been built and cached
    #[inline]
    #[must_use]
    pub fn is_instantiated(&self, name: &str) -> bool {
        self.singletons.contains_key(name)
    }

    /// Canonical definitions
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Registered bean names, in no particular order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Number of registered definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if no definitions are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn singleton(&self, definition: &BeanDefinition, overrides: &Overrides) -> BeanResult<Bean> {
        let name = definition.name();

        if let Some(cached) = self.singletons.get(name) {
            if overrides.is_empty() {
                tracing::trace!("Singleton cache hit for '{}'", name);
            } else {
                tracing::trace!("Ignoring overrides for cached singleton '{}'", name);
            }
            return Ok(Arc::clone(cached.value()));
        }

        // Built without holding a shard lock; a racing caller may do the same.
        let effective = merge(definition, overrides);
        let built = self.instantiator.instantiate(&effective)?;

        let stored = match self.singletons.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!("Discarding racing construction of singleton '{}'", name);
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => {
                tracing::debug!("Cached singleton '{}'", name);
                Arc::clone(entry.insert(built).value())
            }
        };
        Ok(stored)
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("definitions", &self.registry.len())
            .field("singletons", &self.singletons.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApplicationContext`]
pub struct ContextBuilder {
    definitions: Vec<BeanDefinition>,
    duplicates: DuplicatePolicy,
    instantiator: Arc<dyn Instantiator>,
}

impl ContextBuilder {
    /// Create builder with no definitions and [`DuplicatePolicy::LastWins`]
    #[must_use]
    pub fn new(instantiator: Arc<dyn Instantiator>) -> Self {
        Self {
            definitions: Vec::new(),
            duplicates: DuplicatePolicy::default(),
            instantiator,
        }
    }

    /// Add one definition
    #[inline]
    #[must_use]
    pub fn with_definition(mut self, definition: BeanDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Add definitions in order
    #[inline]
    #[must_use]
    pub fn with_definitions(mut self, definitions: impl IntoIterator<Item = BeanDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// With duplicate-name policy
    #[inline]
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// - `BeanError::DuplicateDefinition` under [`DuplicatePolicy::Reject`]
    pub fn build(self) -> BeanResult<ApplicationContext> {
        let registry = DefinitionRegistry::with_policy(self.definitions, self.duplicates)?;
        Ok(ApplicationContext::from_registry(registry, self.instantiator))
    }
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("definitions", &self.definitions.len())
            .field("duplicates", &self.duplicates)
            .finish_non_exhaustive()
    }
}
