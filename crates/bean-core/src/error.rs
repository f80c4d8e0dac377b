//! Error types for the bean registry
//!
//! Provides error handling for:
//! - Definition lookup (unknown bean names)
//! - Registry construction (duplicate definitions)
//! - Typed retrieval (downcast failures)
//! - Instantiation failures raised by the collaborator

use crate::definition::TypeHandle;

/// Main registry error type
#[derive(Debug, thiserror::Error)]
pub enum BeanError {
    /// No definition registered under the requested name
    #[error("bean not found: {0}")]
    NotFound(String),

    /// Two definitions share a name and the registry rejects duplicates
    #[error("duplicate bean definition: {0}")]
    DuplicateDefinition(String),

    /// The instance could not be downcast to the requested type
    #[error("bean '{name}' is not of type {expected}")]
    TypeMismatch {
        /// Requested bean name
        name: String,
        /// Requested Rust type
        expected: &'static str,
    },

    /// Failure raised by the instantiation collaborator, passed through as-is
    #[error(transparent)]
    Instantiate(#[from] InstantiateError),
}

impl BeanError {
    /// Create not-found error for name
    #[inline]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Check if error is a missing definition
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Name carried by a not-found error
    #[must_use]
    pub fn missing_name(&self) -> Option<&str> {
        match self {
            Self::NotFound(name) => Some(name),
            _ => None,
        }
    }
}

/// Errors raised while turning a definition into a live object
#[derive(Debug, thiserror::Error)]
pub enum InstantiateError {
    /// No factory registered for the type handle
    #[error("no factory registered for type: {0}")]
    UnknownType(TypeHandle),

    /// Constructor needs an argument the definition does not supply
    #[error("missing constructor argument {index}")]
    MissingArgument {
        /// Positional slot
        index: usize,
    },

    /// Constructor argument has the wrong shape
    #[error("constructor argument {index}: expected {expected}, got {found}")]
    InvalidArgument {
        /// Positional slot
        index: usize,
        /// Expected value kind
        expected: &'static str,
        /// Actual value kind
        found: &'static str,
    },

    /// Initializer method not known for the type
    #[error("unknown init method '{method}' on {type_handle}")]
    UnknownInitMethod {
        /// Type being constructed
        type_handle: TypeHandle,
        /// Requested method
        method: String,
    },

    /// Field not known for the type
    #[error("unknown field '{field}' on {type_handle}")]
    UnknownField {
        /// Type being constructed
        type_handle: TypeHandle,
        /// Requested field
        field: String,
    },

    /// Field value has the wrong shape
    #[error("field '{field}': expected {expected}, got {found}")]
    InvalidField {
        /// Field name
        field: String,
        /// Expected value kind
        expected: &'static str,
        /// Actual value kind
        found: &'static str,
    },

    /// Constructor, initializer or setter reported a failure
    #[error("instantiation failed: {0}")]
    Failed(String),
}

impl InstantiateError {
    /// Create failure with message
    #[inline]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Result type alias for registry operations
pub type BeanResult<T> = Result<T, BeanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = BeanError::not_found("db");
        assert_eq!(err.to_string(), "bean not found: db");
        assert!(err.is_not_found());
        assert_eq!(err.missing_name(), Some("db"));
    }

    #[test]
    fn instantiate_error_is_transparent() {
        let err: BeanError = InstantiateError::failed("boom").into();
        assert_eq!(err.to_string(), "instantiation failed: boom");
        assert!(!err.is_not_found());
        assert!(err.missing_name().is_none());
    }

    #[test]
    fn unknown_type_display() {
        let err = InstantiateError::UnknownType(TypeHandle::new("Database"));
        assert_eq!(err.to_string(), "no factory registered for type: Database");
    }
}
