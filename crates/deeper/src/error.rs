//! Error types for the clone engine
//!
//! Any error raised anywhere in a traversal aborts the whole top-level clone;
//! no partial clone is ever returned.

use crate::value::ValueError;

/// Clone engine error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CloneError {
    /// Callable, channel or (when sharing is disabled) opaque value
    #[error("cannot clone {kind} value of type {type_name}")]
    UnclonableKind {
        /// Offending kind: `func`, `chan` or `opaque`
        kind: &'static str,
        /// Type name of the offending value
        type_name: String,
    },

    /// Typed wrapper could not view the clone as the requested type
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Caller's static type
        expected: String,
        /// Dynamic type of the clone
        actual: String,
    },

    /// Recursion went deeper than the configured limit
    #[error("clone depth limit of {limit} exceeded")]
    DepthExceeded {
        /// Configured limit
        limit: usize,
    },

    /// Session already failed; start a new one
    #[error("clone session is poisoned by an earlier failure")]
    Poisoned,

    /// Extension or self-cloning code reported a failure
    #[error("custom cloner for {type_name} failed: {message}")]
    Custom {
        /// Type being cloned
        type_name: String,
        /// Failure description
        message: String,
    },

    /// Handle access failed
    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

impl CloneError {
    /// Create unclonable kind error
    #[inline]
    #[must_use]
    pub fn unclonable(kind: &'static str, type_name: impl Into<String>) -> Self {
        Self::UnclonableKind {
            kind,
            type_name: type_name.into(),
        }
    }

    /// Create type mismatch error
    #[inline]
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create error for extension and self-cloning code
    #[inline]
    #[must_use]
    pub fn custom(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for clone operations
pub type CloneResult<T> = Result<T, CloneError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RefKind;

    #[test]
    fn unclonable_display() {
        let err = CloneError::unclonable("chan", "int");
        assert_eq!(err.to_string(), "cannot clone chan value of type int");
    }

    #[test]
    fn type_mismatch_display() {
        let err = CloneError::type_mismatch("int", "str");
        assert_eq!(err.to_string(), "type mismatch: expected int, got str");
    }

    #[test]
    fn value_error_conversion() {
        let err: CloneError = ValueError::Borrowed {
            kind: RefKind::Mapping,
        }
        .into();
        assert!(matches!(err, CloneError::Value(_)));
        assert_eq!(err.to_string(), "value error: mapping is already mutably borrowed");
    }
}
