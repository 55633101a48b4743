use alloc::sync::Arc;

use crate::property::PropertyKind;

// -----------------------------------------------------------------------------
// NamingConvention

/// Decides whether a member name qualifies as an accessor or mutator.
pub trait NamingConvention: Send + Sync {
    fn applies(&self, name: &str, kind: PropertyKind) -> bool;

    /// A stable name, part of the descriptor cache key and of [`Settings`](crate::Settings).
    fn name(&self) -> &str;
}

/// Fields, `getX` and `isX` methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaBeansAccessorConvention;

impl NamingConvention for JavaBeansAccessorConvention {
    fn applies(&self, name: &str, kind: PropertyKind) -> bool {
        kind == PropertyKind::Field
            || (name.starts_with("get") && name.len() > 3)
            || (name.starts_with("is") && name.len() > 2)
    }

    fn name(&self) -> &str {
        "Javabeans Accessor"
    }
}

/// Fields and `setX` methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaBeansMutatorConvention;

impl NamingConvention for JavaBeansMutatorConvention {
    fn applies(&self, name: &str, kind: PropertyKind) -> bool {
        kind == PropertyKind::Field || (name.starts_with("set") && name.len() > 3)
    }

    fn name(&self) -> &str {
        "Javabeans Mutator"
    }
}

/// Every member qualifies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneConvention;

impl NamingConvention for NoneConvention {
    #[inline]
    fn applies(&self, _name: &str, _kind: PropertyKind) -> bool {
        true
    }

    fn name(&self) -> &str {
        "None"
    }
}

// -----------------------------------------------------------------------------
// NamingConventions

/// The built-in conventions.
pub struct NamingConventions;

impl NamingConventions {
    #[inline]
    pub fn javabeans_accessor() -> Arc<dyn NamingConvention> {
        Arc::new(JavaBeansAccessorConvention)
    }

    #[inline]
    pub fn javabeans_mutator() -> Arc<dyn NamingConvention> {
        Arc::new(JavaBeansMutatorConvention)
    }

    #[inline]
    pub fn none() -> Arc<dyn NamingConvention> {
        Arc::new(NoneConvention)
    }

    /// Looks a built-in convention up by its [`name`](NamingConvention::name).
    pub fn by_name(name: &str) -> Option<Arc<dyn NamingConvention>> {
        match name {
            "Javabeans Accessor" => Some(Self::javabeans_accessor()),
            "Javabeans Mutator" => Some(Self::javabeans_mutator()),
            "None" => Some(Self::none()),
            _ => None,
        }
    }
}
