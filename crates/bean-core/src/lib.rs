//! Bean Registry Core
//!
//! Named object blueprints, per-call override merging and a race-safe
//! singleton cache.
//!
//! # Core Concepts
//!
//! - [`BeanDefinition`]: how to build one named object
//! - [`Overrides`]: per-call field and constructor-argument overrides
//! - [`merge`]: combines a definition with overrides, never mutating it
//! - [`ApplicationContext`]: lookup, merge, instantiate and cache singletons
//! - [`Instantiator`]: the collaborator that turns a definition into an object
//!
//! # Example
//!
//! ```rust
//! use bean_core::prelude::*;
//! use std::sync::Arc;
//!
//! let instantiator = |def: &BeanDefinition| -> Result<Bean, InstantiateError> {
//!     Ok(Arc::new(def.constructor_args().to_vec()))
//! };
//! let ctx = ApplicationContext::new(
//!     vec![BeanDefinition::new("ports", "Vec").prototype().with_arg(80).with_arg(443)],
//!     Arc::new(instantiator),
//! );
//!
//! let ports = ctx
//!     .get_as::<Vec<Value>>("ports", &Overrides::new().arg(1, 8443))
//!     .unwrap();
//! assert_eq!(*ports, vec![Value::from(80), Value::from(8443)]);
//! assert!(!ctx.has("missing"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod definition;
pub mod error;
pub mod factory;
pub mod instantiator;
pub mod merge;
pub mod overrides;
pub mod registry;
pub mod value;

// Re-exports
pub use context::{ApplicationContext, ContextBuilder};
pub use definition::{BeanDefinition, ConstructorArgs, Fields, Scope, TypeHandle};
pub use error::{BeanError, BeanResult, InstantiateError};
pub use factory::{Args, FactoryInstantiator, TypeFactory, TypeFactoryBuilder};
pub use instantiator::{Bean, Instantiator};
pub use merge::merge;
pub use overrides::{ArgOverrides, Overrides};
pub use registry::{DefinitionRegistry, DuplicatePolicy};
pub use value::Value;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the bean registry
    pub use crate::{
        ApplicationContext, Args, Bean, BeanDefinition, BeanError, FactoryInstantiator,
        InstantiateError, Instantiator, Overrides, Scope, TypeFactory, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
