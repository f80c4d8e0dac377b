//! Testing utilities for the bean registry workspace
//!
//! Shared fake instantiator, fixtures and helpers.

#![allow(missing_docs)]

use bean_core::{
    ApplicationContext, Bean, BeanDefinition, Fields, InstantiateError, Instantiator, Value,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Object produced by [`TaggingInstantiator`]
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    /// Unique per instantiator, starting at 1
    pub serial: u64,
    pub bean: String,
    pub type_handle: String,
    pub args: Vec<Value>,
    pub fields: Fields,
    pub init_method: Option<String>,
}

/// Fake collaborator that records what it was asked to build
///
/// Every instance gets a fresh serial, so identity is observable without
/// pointer comparisons.
#[derive(Debug, Default)]
pub struct TaggingInstantiator {
    next_serial: AtomicU64,
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Option<Duration>,
}

impl TaggingInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `count` calls with `InstantiateError::Failed`
    pub fn failing_first(count: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    /// Sleep inside every call, widening race windows
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `instantiate` calls, failed ones included
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Instantiator for TaggingInstantiator {
    fn instantiate(&self, definition: &BeanDefinition) -> Result<Bean, InstantiateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if injected {
            return Err(InstantiateError::failed(format!(
                "injected failure for '{}'",
                definition.name()
            )));
        }

        Ok(Arc::new(Tagged {
            serial: self.next_serial.fetch_add(1, Ordering::SeqCst) + 1,
            bean: definition.name().to_string(),
            type_handle: definition.type_handle().to_string(),
            args: definition.constructor_args().to_vec(),
            fields: definition.fields().clone(),
            init_method: definition.init_method().map(str::to_string),
        }))
    }
}

/// Downcast a bean produced by [`TaggingInstantiator`]
pub fn tagged(bean: &Bean) -> &Tagged {
    bean.downcast_ref::<Tagged>()
        .expect("bean was not built by TaggingInstantiator")
}

/// Singleton `"s"` and prototype `"p"`, both with args `[10, 20]` and fields `{x: 1, y: 2}`
pub fn sample_definitions() -> Vec<BeanDefinition> {
    vec![
        BeanDefinition::new("s", "Service")
            .with_init_method("init")
            .with_arg(10)
            .with_arg(20)
            .with_field("x", 1)
            .with_field("y", 2),
        BeanDefinition::new("p", "Request")
            .prototype()
            .with_arg(10)
            .with_arg(20)
            .with_field("x", 1)
            .with_field("y", 2),
    ]
}

/// Context over [`sample_definitions`] plus a handle on its instantiator
pub fn setup_test_context() -> (ApplicationContext, Arc<TaggingInstantiator>) {
    setup_context_with(TaggingInstantiator::new())
}

pub fn setup_context_with(
    instantiator: TaggingInstantiator,
) -> (ApplicationContext, Arc<TaggingInstantiator>) {
    let instantiator = Arc::new(instantiator);
    let ctx = ApplicationContext::new(sample_definitions(), instantiator.clone());
    (ctx, instantiator)
}
