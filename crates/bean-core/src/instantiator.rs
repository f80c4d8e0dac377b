//! Instantiation collaborator
//!
//! The registry does not know how to build objects. It hands the effective
//! [`BeanDefinition`] to an [`Instantiator`], which is expected to:
//! 1. construct the target type from the positional constructor arguments
//! 2. invoke the initializer method, if one is named
//! 3. assign the field values
//!
//! Any closure `Fn(&BeanDefinition) -> Result<Bean, InstantiateError>` is an
//! instantiator.

use crate::definition::BeanDefinition;
use crate::error::InstantiateError;
use std::any::Any;
use std::sync::Arc;

/// Live bean instance
pub type Bean = Arc<dyn Any + Send + Sync>;

/// Builds live objects from effective definitions
pub trait Instantiator: Send + Sync {
    /// Build one instance
    ///
    /// # Errors
    /// Any failure is passed to the caller of `get` unchanged.
    fn instantiate(&self, definition: &BeanDefinition) -> Result<Bean, InstantiateError>;
}

impl<F> Instantiator for F
where
    F: Fn(&BeanDefinition) -> Result<Bean, InstantiateError> + Send + Sync,
{
    fn instantiate(&self, definition: &BeanDefinition) -> Result<Bean, InstantiateError> {
        self(definition)
    }
}
