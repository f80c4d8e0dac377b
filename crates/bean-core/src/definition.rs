//! Bean definitions
//!
//! A [`BeanDefinition`] describes how to build one named object: the type to
//! build, its [`Scope`], an optional initializer and the constructor
//! arguments and field values to use. Definitions are plain data; the
//! registry never mutates one after it has been registered.

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named field values, assigned after construction in insertion order
pub type Fields = IndexMap<String, Value>;

/// Positional constructor arguments
pub type ConstructorArgs = Vec<Value>;

/// Opaque handle naming the type to build
///
/// The registry never interprets the handle; it is the instantiation
/// collaborator's key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeHandle(String);

impl TypeHandle {
    /// Create handle from name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Handle as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeHandle {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeHandle {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Construction scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One shared instance per registry, built on first request
    #[default]
    Singleton,

    /// New instance on every request
    Prototype,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Singleton => "singleton",
            Self::Prototype => "prototype",
        })
    }
}

/// Blueprint for one named bean
#[derive(Debug, Clone, PartialEq)]
pub struct BeanDefinition {
    name: String,
    type_handle: TypeHandle,
    scope: Scope,
    init_method: Option<String>,
    constructor_args: ConstructorArgs,
    fields: Fields,
}

impl BeanDefinition {
    /// Create singleton definition with no arguments or fields
    #[must_use]
    pub fn new(name: impl Into<String>, type_handle: impl Into<TypeHandle>) -> Self {
        Self {
            name: name.into(),
            type_handle: type_handle.into(),
            scope: Scope::default(),
            init_method: None,
            constructor_args: ConstructorArgs::new(),
            fields: Fields::new(),
        }
    }

    /// With scope
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// With prototype scope
    #[inline]
    #[must_use]
    pub fn prototype(self) -> Self {
        self.with_scope(Scope::Prototype)
    }

    /// With initializer method; an empty name clears it
    #[must_use]
    pub fn with_init_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        self.init_method = (!method.is_empty()).then_some(method);
        self
    }

    /// Append one constructor argument
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.constructor_args.push(value.into());
        self
    }

    /// Replace all constructor arguments
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: ConstructorArgs) -> Self {
        self.constructor_args = args;
        self
    }

    /// Set one field value
    #[inline]
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Replace all field values
    #[inline]
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Bean name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type to build
    #[inline]
    #[must_use]
    pub fn type_handle(&self) -> &TypeHandle {
        &self.type_handle
    }

    /// Construction scope
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Initializer invoked after construction, if any
    #[inline]
    #[must_use]
    pub fn init_method(&self) -> Option<&str> {
        self.init_method.as_deref()
    }

    /// Positional constructor arguments
    #[inline]
    #[must_use]
    pub fn constructor_args(&self) -> &[Value] {
        &self.constructor_args
    }

    /// Field values
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Same identity (name, type, scope, initializer) with new arguments and fields
    pub(crate) fn derive(&self, constructor_args: ConstructorArgs, fields: Fields) -> Self {
        Self {
            name: self.name.clone(),
            type_handle: self.type_handle.clone(),
            scope: self.scope,
            init_method: self.init_method.clone(),
            constructor_args,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_defaults() {
        let def = BeanDefinition::new("db", "Database");
        assert_eq!(def.name(), "db");
        assert_eq!(def.type_handle().as_str(), "Database");
        assert_eq!(def.scope(), Scope::Singleton);
        assert!(def.init_method().is_none());
        assert!(def.constructor_args().is_empty());
        assert!(def.fields().is_empty());
    }

    #[test]
    fn definition_builder() {
        let def = BeanDefinition::new("server", "HttpServer")
            .prototype()
            .with_init_method("start")
            .with_arg("0.0.0.0")
            .with_arg(8080)
            .with_field("timeout", 30);

        assert_eq!(def.scope(), Scope::Prototype);
        assert_eq!(def.init_method(), Some("start"));
        assert_eq!(def.constructor_args(), &[Value::from("0.0.0.0"), Value::from(8080)]);
        assert_eq!(def.fields()["timeout"], Value::from(30));
    }

    #[test]
    fn empty_init_method_is_absent() {
        let def = BeanDefinition::new("a", "A").with_init_method("");
        assert!(def.init_method().is_none());
    }

    #[test]
    fn fields_keep_insertion_order() {
        let def = BeanDefinition::new("a", "A")
            .with_field("z", 1)
            .with_field("a", 2);
        let keys: Vec<&str> = def.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn scope_serde_names() {
        assert_eq!(serde_json::to_string(&Scope::Prototype).unwrap(), "\"prototype\"");
        let scope: Scope = serde_json::from_str("\"singleton\"").unwrap();
        assert_eq!(scope, Scope::Singleton);
    }
}
