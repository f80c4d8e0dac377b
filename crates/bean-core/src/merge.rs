//! Override merging
//!
//! [`merge`] combines a canonical definition with per-call [`Overrides`].
//!
//! # Rules
//! - No overrides: the canonical definition is returned borrowed.
//! - Fields: override entries insert or replace, `Null` included.
//! - Constructor arguments: `Null` entries are skipped; a slot inside the
//!   original argument list is replaced in place, any other slot is appended.
//!
//! The result of a real merge is always a fresh owned definition.

use crate::definition::BeanDefinition;
use crate::overrides::Overrides;
use std::borrow::Cow;

/// Produce the effective definition for one call
#[must_use]
pub fn merge<'a>(definition: &'a BeanDefinition, overrides: &Overrides) -> Cow<'a, BeanDefinition> {
    if overrides.is_empty() {
        return Cow::Borrowed(definition);
    }

    let mut fields = definition.fields().clone();
    for (name, value) in overrides.fields() {
        fields.insert(name.clone(), value.clone());
    }

    let original_len = definition.constructor_args().len();
    let mut args = definition.constructor_args().to_vec();
    for (&slot, value) in overrides.args() {
        if value.is_null() {
            continue;
        }
        if slot < original_len {
            args[slot] = value.clone();
        } else {
            args.push(value.clone());
        }
    }

    Cow::Owned(definition.derive(args, fields))
}
