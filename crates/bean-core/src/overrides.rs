//! Per-call overrides
//!
//! [`Overrides`] holds the field values and constructor-argument slots a
//! caller wants to change for one `get` call. It is merge input only and is
//! never stored by the registry.

use crate::definition::Fields;
use crate::value::Value;
use std::collections::BTreeMap;

/// Constructor-argument overrides keyed by positional slot
///
/// Iterated in ascending slot order. A [`Value::Null`] entry means "leave
/// this slot alone", not "set it to null".
pub type ArgOverrides = BTreeMap<usize, Value>;

/// Field and constructor-argument overrides for one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    fields: Fields,
    args: ArgOverrides,
}

impl Overrides {
    /// Create empty override set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from both parts
    #[inline]
    #[must_use]
    pub fn from_parts(fields: Fields, args: ArgOverrides) -> Self {
        Self { fields, args }
    }

    /// Override one field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Override one constructor-argument slot
    #[must_use]
    pub fn arg(mut self, slot: usize, value: impl Into<Value>) -> Self {
        self.args.insert(slot, value.into());
        self
    }

    /// Override slots `0..n` from a positional list
    ///
    /// `Null` entries keep the definition's value for that slot.
    #[must_use]
    pub fn positional(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values.into_iter().enumerate());
        self
    }

    /// Field overrides
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Constructor-argument overrides
    #[inline]
    #[must_use]
    pub fn args(&self) -> &ArgOverrides {
        &self.args
    }

    /// True when neither part has entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.args.is_empty()
    }
}
