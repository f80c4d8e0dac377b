//! Closure-table instantiator
//!
//! [`FactoryInstantiator`] maps each [`TypeHandle`] to a [`TypeFactory`]: a
//! constructor over positional [`Args`], plus named initializer methods and
//! named field setters. Building a definition runs, in order:
//! constructor → initializer (if named) → field setters (in field order).
//!
//! # Example
//!
//! ```rust
//! use bean_core::prelude::*;
//! use std::sync::Arc;
//!
//! struct Server { host: String, port: i64, timeout: i64, started: bool }
//!
//! let factory = TypeFactory::builder(|args: &Args<'_>| {
//!     Ok(Server { host: args.str(0)?.to_string(), port: args.int(1)?, timeout: 0, started: false })
//! })
//! .init_method("start", |s: &mut Server| { s.started = true; Ok(()) })
//! .field("timeout", |s: &mut Server, v: &Value| {
//!     s.timeout = v.as_i64().ok_or_else(|| InstantiateError::failed("timeout must be an int"))?;
//!     Ok(())
//! })
//! .build();
//!
//! let instantiator = FactoryInstantiator::new().with_type("Server", factory);
//! let ctx = ApplicationContext::new(
//!     vec![BeanDefinition::new("server", "Server")
//!         .with_init_method("start")
//!         .with_arg("localhost")
//!         .with_arg(8080)
//!         .with_field("timeout", 30)],
//!     Arc::new(instantiator),
//! );
//!
//! let server = ctx.get_default_as::<Server>("server").unwrap();
//! assert!(server.started);
//! assert_eq!(server.timeout, 30);
//! ```

use crate::definition::{BeanDefinition, TypeHandle};
use crate::error::InstantiateError;
use crate::instantiator::{Bean, Instantiator};
use crate::value::Value;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Object = Box<dyn Any + Send + Sync>;
type Constructor = Box<dyn Fn(&Args<'_>) -> Result<Object, InstantiateError> + Send + Sync>;
type Hook = Box<dyn Fn(&mut Object) -> Result<(), InstantiateError> + Send + Sync>;
type Setter = Box<dyn Fn(&mut Object, &Value) -> Result<(), InstantiateError> + Send + Sync>;

/// Positional constructor arguments with typed accessors
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    values: &'a [Value],
}

impl<'a> Args<'a> {
    /// Wrap argument slice
    #[inline]
    #[must_use]
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Number of arguments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument, if present
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }

    /// All arguments
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &'a [Value] {
        self.values
    }

    /// Required argument
    ///
    /// # Errors
    /// - `InstantiateError::MissingArgument` if the slot is absent
    pub fn value(&self, index: usize) -> Result<&'a Value, InstantiateError> {
        self.values
            .get(index)
            .ok_or(InstantiateError::MissingArgument { index })
    }

    /// Required string argument
    ///
    /// # Errors
    /// - `InstantiateError::MissingArgument` if absent, `InvalidArgument` if not a string
    pub fn str(&self, index: usize) -> Result<&'a str, InstantiateError> {
        let value = self.value(index)?;
        value.as_str().ok_or_else(|| mismatch(index, "string", value))
    }

    /// Required integer argument
    ///
    /// # Errors
    /// - `InstantiateError::MissingArgument` if absent, `InvalidArgument` if not an integer
    pub fn int(&self, index: usize) -> Result<i64, InstantiateError> {
        let value = self.value(index)?;
        value.as_i64().ok_or_else(|| mismatch(index, "int", value))
    }

    /// Required numeric argument
    ///
    /// # Errors
    /// - `InstantiateError::MissingArgument` if absent, `InvalidArgument` if not numeric
    pub fn float(&self, index: usize) -> Result<f64, InstantiateError> {
        let value = self.value(index)?;
        value.as_f64().ok_or_else(|| mismatch(index, "float", value))
    }

    /// Required boolean argument
    ///
    /// # Errors
    /// - `InstantiateError::MissingArgument` if absent, `InvalidArgument` if not a boolean
    pub fn bool(&self, index: usize) -> Result<bool, InstantiateError> {
        let value = self.value(index)?;
        value.as_bool().ok_or_else(|| mismatch(index, "bool", value))
    }

    /// Required object argument of type `T`
    ///
    /// # Errors
    /// - `InstantiateError::MissingArgument` if absent, `InvalidArgument` if not a `T`
    pub fn object<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, InstantiateError> {
        let value = self.value(index)?;
        value
            .downcast::<T>()
            .ok_or_else(|| mismatch(index, type_name::<T>(), value))
    }
}

fn mismatch(index: usize, expected: &'static str, found: &Value) -> InstantiateError {
    InstantiateError::InvalidArgument {
        index,
        expected,
        found: found.kind(),
    }
}

/// Construction recipe for one type
pub struct TypeFactory {
    type_name: &'static str,
    constructor: Constructor,
    init_methods: HashMap<String, Hook>,
    setters: HashMap<String, Setter>,
}

impl TypeFactory {
    /// Start a recipe for `T`
    pub fn builder<T, F>(constructor: F) -> TypeFactoryBuilder<T>
    where
        T: Any + Send + Sync,
        F: Fn(&Args<'_>) -> Result<T, InstantiateError> + Send + Sync + 'static,
    {
        TypeFactoryBuilder::new(constructor)
    }

    /// Rust type produced by this recipe
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn build(&self, definition: &BeanDefinition) -> Result<Bean, InstantiateError> {
        let mut object = (self.constructor)(&Args::new(definition.constructor_args()))?;

        if let Some(method) = definition.init_method() {
            let hook = self.init_methods.get(method).ok_or_else(|| {
                InstantiateError::UnknownInitMethod {
                    type_handle: definition.type_handle().clone(),
                    method: method.to_string(),
                }
            })?;
            hook(&mut object)?;
        }

        for (field, value) in definition.fields() {
            let setter = self
                .setters
                .get(field)
                .ok_or_else(|| InstantiateError::UnknownField {
                    type_handle: definition.type_handle().clone(),
                    field: field.clone(),
                })?;
            setter(&mut object, value)?;
        }

        Ok(Arc::from(object))
    }
}

impl fmt::Debug for TypeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeFactory")
            .field("type_name", &self.type_name)
            .field("init_methods", &self.init_methods.keys().collect::<Vec<_>>())
            .field("fields", &self.setters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Typed builder for [`TypeFactory`]
pub struct TypeFactoryBuilder<T> {
    factory: TypeFactory,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeFactoryBuilder<T> {
    fn new<F>(constructor: F) -> Self
    where
        F: Fn(&Args<'_>) -> Result<T, InstantiateError> + Send + Sync + 'static,
    {
        Self {
            factory: TypeFactory {
                type_name: type_name::<T>(),
                constructor: Box::new(move |args: &Args<'_>| {
                    Ok(Box::new(constructor(args)?) as Object)
                }),
                init_methods: HashMap::new(),
                setters: HashMap::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Register a zero-argument initializer method
    #[must_use]
    pub fn init_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut T) -> Result<(), InstantiateError> + Send + Sync + 'static,
    {
        let hook: Hook = Box::new(move |object: &mut Object| method(downcast_mut::<T>(object)?));
        self.factory.init_methods.insert(name.into(), hook);
        self
    }

    /// Register a field setter
    #[must_use]
    pub fn field<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut T, &Value) -> Result<(), InstantiateError> + Send + Sync + 'static,
    {
        let setter: Setter =
            Box::new(move |object: &mut Object, value: &Value| {
                setter(downcast_mut::<T>(object)?, value)
            });
        self.factory.setters.insert(name.into(), setter);
        self
    }

    /// Finish the recipe
    #[inline]
    #[must_use]
    pub fn build(self) -> TypeFactory {
        self.factory
    }
}

fn downcast_mut<T: Any>(object: &mut Object) -> Result<&mut T, InstantiateError> {
    object
        .downcast_mut::<T>()
        .ok_or_else(|| InstantiateError::failed(format!("object is not a {}", type_name::<T>())))
}

/// [`Instantiator`] backed by per-type closure recipes
#[derive(Debug, Default)]
pub struct FactoryInstantiator {
    factories: HashMap<TypeHandle, TypeFactory>,
}

impl FactoryInstantiator {
    /// Create instantiator with no types
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register recipe under a type handle, replacing any earlier one
    pub fn register(&mut self, type_handle: impl Into<TypeHandle>, factory: TypeFactory) {
        self.factories.insert(type_handle.into(), factory);
    }

    /// With recipe under a type handle
    #[inline]
    #[must_use]
    pub fn with_type(mut self, type_handle: impl Into<TypeHandle>, factory: TypeFactory) -> Self {
        self.register(type_handle, factory);
        self
    }

    /// Check if a recipe is registered for the handle
    #[inline]
    #[must_use]
    pub fn contains(&self, type_handle: &TypeHandle) -> bool {
        self.factories.contains_key(type_handle)
    }
}

impl Instantiator for FactoryInstantiator {
    fn instantiate(&self, definition: &BeanDefinition) -> Result<Bean, InstantiateError> {
        self.factories
            .get(definition.type_handle())
            .ok_or_else(|| InstantiateError::UnknownType(definition.type_handle().clone()))?
            .build(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Pool {
        url: String,
        size: i64,
        events: Vec<&'static str>,
    }

    fn pool_factory() -> TypeFactory {
        TypeFactory::builder(|args: &Args<'_>| {
            Ok(Pool {
                url: args.str(0)?.to_string(),
                size: args.get(1).and_then(Value::as_i64).unwrap_or(4),
                events: vec!["construct"],
            })
        })
        .init_method("open", |pool: &mut Pool| {
            pool.events.push("open");
            Ok(())
        })
        .field("size", |pool: &mut Pool, value: &Value| {
            pool.size = value.as_i64().ok_or(InstantiateError::InvalidField {
                field: "size".to_string(),
                expected: "int",
                found: value.kind(),
            })?;
            pool.events.push("size");
            Ok(())
        })
        .build()
    }

    fn instantiator() -> FactoryInstantiator {
        FactoryInstantiator::new().with_type("Pool", pool_factory())
    }

    fn build(def: &BeanDefinition) -> Result<Arc<Pool>, InstantiateError> {
        let bean = instantiator().instantiate(def)?;
        Ok(bean.downcast::<Pool>().unwrap())
    }

    #[test]
    fn construct_init_then_fields() {
        let def = BeanDefinition::new("pool", "Pool")
            .with_init_method("open")
            .with_arg("pg://db")
            .with_field("size", 16);
        let pool = build(&def).unwrap();

        assert_eq!(pool.url, "pg://db");
        assert_eq!(pool.size, 16);
        assert_eq!(pool.events, vec!["construct", "open", "size"]);
    }

    #[test]
    fn no_init_method_skips_hook() {
        let def = BeanDefinition::new("pool", "Pool").with_arg("pg://db");
        let pool = build(&def).unwrap();
        assert_eq!(pool.events, vec!["construct"]);
        assert_eq!(pool.size, 4);
    }

    #[test]
    fn unknown_type() {
        let def = BeanDefinition::new("x", "Missing");
        let err = instantiator().instantiate(&def).unwrap_err();
        assert!(matches!(err, InstantiateError::UnknownType(ref t) if t.as_str() == "Missing"));
    }

    #[test]
    fn unknown_init_method() {
        let def = BeanDefinition::new("pool", "Pool")
            .with_arg("pg://db")
            .with_init_method("close");
        let err = build(&def).unwrap_err();
        assert!(matches!(err, InstantiateError::UnknownInitMethod { ref method, .. } if method == "close"));
    }

    #[test]
    fn unknown_field() {
        let def = BeanDefinition::new("pool", "Pool")
            .with_arg("pg://db")
            .with_field("colour", "red");
        let err = build(&def).unwrap_err();
        assert!(matches!(err, InstantiateError::UnknownField { ref field, .. } if field == "colour"));
    }

    #[test]
    fn invalid_field_value() {
        let def = BeanDefinition::new("pool", "Pool")
            .with_arg("pg://db")
            .with_field("size", "big");
        let err = build(&def).unwrap_err();
        assert!(matches!(err, InstantiateError::InvalidField { found: "string", .. }));
    }

    #[test]
    fn missing_and_invalid_arguments() {
        let err = build(&BeanDefinition::new("pool", "Pool")).unwrap_err();
        assert!(matches!(err, InstantiateError::MissingArgument { index: 0 }));

        let err = build(&BeanDefinition::new("pool", "Pool").with_arg(5)).unwrap_err();
        assert!(matches!(err, InstantiateError::InvalidArgument { index: 0, expected: "string", found: "int" }));
    }

    #[test]
    fn object_argument() {
        let shared = Value::object(Pool::default());
        let args = [shared.clone()];
        let args = Args::new(&args);

        let pool = args.object::<Pool>(0).unwrap();
        assert!(Arc::ptr_eq(&pool, &shared.downcast::<Pool>().unwrap()));
        assert!(args.object::<String>(0).is_err());
    }

    #[test]
    fn factory_type_name() {
        assert!(pool_factory().type_name().ends_with("Pool"));
    }

    #[test]
    fn registered_types() {
        let mut instantiator = FactoryInstantiator::new();
        assert!(!instantiator.contains(&TypeHandle::from("Pool")));

        instantiator.register("Pool", pool_factory());
        assert!(instantiator.contains(&TypeHandle::from("Pool")));
        assert!(!instantiator.contains(&TypeHandle::from("Cache")));
    }

    #[test]
    fn args_slice_view() {
        let values = [Value::from("pg://db"), Value::from(8)];
        let args = Args::new(&values);

        assert_eq!(args.as_slice(), &values);
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
        assert!(Args::new(&[]).is_empty());
    }
}
