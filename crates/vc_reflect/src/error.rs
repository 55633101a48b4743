use thiserror::Error;

use crate::info::{Type, TypeName};

// -----------------------------------------------------------------------------
// ReflectError

/// Failures of the runtime object model.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("type `{0}` is not registered")]
    UnknownType(TypeName),

    #[error("type `{0}` cannot be instantiated")]
    NotInstantiable(Type),

    #[error("type `{ty}` has no member `{member}`")]
    MissingMember { ty: TypeName, member: String },

    #[error("constructor of `{ty}` expects {expected} arguments, found {found}")]
    ArgumentCount {
        ty: TypeName,
        expected: usize,
        found: usize,
    },

    #[error("expected a value of type `{expected}`, found `{found}`")]
    TypeMismatch { expected: Type, found: Type },

    #[error("value of type `{0}` has no JSON representation")]
    NotRepresentable(Type),

    #[error("{0}")]
    Custom(String),
}

impl ReflectError {
    /// Creates a [`ReflectError::Custom`] from any message.
    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}
