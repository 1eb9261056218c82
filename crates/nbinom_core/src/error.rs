//! Error types for generator construction and state management.
//!
//! This module provides:
//! - `PrngError`: argument and option failures, split into two kinds
//! - `ErrorKind`: the kind tag, for callers matching on category only
//!
//! Only construction, validation and state assignment fail. Sampling never
//! returns an error; out-of-domain per-call parameters produce NaN instead.

use std::fmt;
use thiserror::Error;

/// Category of a [`PrngError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong kind or shape of value for an argument or option.
    Type,
    /// Value of the right kind but outside its numeric domain.
    Range,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Type => write!(f, "TypeError"),
            ErrorKind::Range => write!(f, "RangeError"),
        }
    }
}

/// Argument and option validation errors.
///
/// # Variants
/// - `TypeKind`: wrong value kind (non-numeric parameter, non-boolean `copy`,
///   malformed state array, non-callable `prng`)
/// - `RangeKind`: numerically out-of-domain value (`r <= 0`, `p` outside
///   `(0, 1)`, a state array whose layout the engine rejects)
///
/// # Examples
/// ```
/// use nbinom_core::{ErrorKind, PrngError};
///
/// let err = PrngError::range_kind("invalid argument. Second argument must be on the interval `(0,1)`. Value: `1.5`.");
/// assert_eq!(err.kind(), ErrorKind::Range);
/// assert!(err.to_string().starts_with("RangeError"));
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrngError {
    /// Wrong value kind or shape.
    #[error("TypeError: {message}")]
    TypeKind {
        /// Description including the offending value
        message: String,
    },

    /// Value outside its valid domain.
    #[error("RangeError: {message}")]
    RangeKind {
        /// Description including the offending value
        message: String,
    },
}

impl PrngError {
    /// Creates a [`PrngError::TypeKind`] error.
    pub fn type_kind(message: impl Into<String>) -> Self {
        PrngError::TypeKind {
            message: message.into(),
        }
    }

    /// Creates a [`PrngError::RangeKind`] error.
    pub fn range_kind(message: impl Into<String>) -> Self {
        PrngError::RangeKind {
            message: message.into(),
        }
    }

    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrngError::TypeKind { .. } => ErrorKind::Type,
            PrngError::RangeKind { .. } => ErrorKind::Range,
        }
    }

    /// Returns the message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            PrngError::TypeKind { message } | PrngError::RangeKind { message } => message,
        }
    }
}
