use alloc::sync::Arc;

use crate::info::{AccessLevel, Type};

/// A field declared on a struct type.
///
/// Field storage lives in the object slot of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    name: Arc<str>,
    ty: Type,
    access: AccessLevel,
}

impl FieldInfo {
    /// Creates a public field.
    pub fn new(name: impl Into<Arc<str>>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            access: AccessLevel::Public,
        }
    }

    /// Sets the visibility.
    #[inline]
    pub fn with_access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn access(&self) -> AccessLevel {
        self.access
    }
}
