//! Pluggable string strategies used while building type maps.
//!
//! - [`NameTokenizer`]: splits a name into tokens.
//! - [`NameTransformer`]: turns a member name into a property name (`getName` to `name`).
//! - [`NamingConvention`]: decides which members qualify as accessors or mutators.
//!
//! None of them is consulted while mapping, so changing them only affects
//! type maps built afterwards.

// -----------------------------------------------------------------------------
// Modules

mod convention;
mod tokenizer;
mod transformer;

// -----------------------------------------------------------------------------
// Exports

pub use convention::{
    JavaBeansAccessorConvention, JavaBeansMutatorConvention, NamingConvention, NamingConventions,
    NoneConvention,
};
pub use tokenizer::{CamelCaseTokenizer, NameTokenizer, NameTokenizers, UnderscoreTokenizer};
pub use transformer::{
    IdentityTransformer, JavaBeansAccessorTransformer, JavaBeansMutatorTransformer, NameTransformer,
    NameTransformers,
};

use crate::property::PropertyKind;

// -----------------------------------------------------------------------------
// NameableType

/// What kind of name is being tokenized or transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameableType {
    /// A type name.
    Class,
    Field,
    Method,
    /// A member that is neither field nor method, e.g. a key of a map source.
    Generic,
}

impl NameableType {
    #[inline]
    pub const fn for_property_kind(kind: PropertyKind) -> Self {
        match kind {
            PropertyKind::Field => Self::Field,
            PropertyKind::Method => Self::Method,
            PropertyKind::Synthetic => Self::Generic,
        }
    }
}
