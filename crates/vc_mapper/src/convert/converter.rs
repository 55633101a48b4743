use alloc::sync::Arc;
use core::fmt;

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;

use crate::engine::MappingContext;
use crate::error::ConvertError;

// -----------------------------------------------------------------------------
// Converter

/// Produces the destination value of a mapping context.
///
/// A converter may re-enter the mapper through
/// [`MappingContext::map`] to convert nested values.
///
/// Returning an error records a mapping error for the current invocation
/// and leaves the destination value unset; only
/// [`ConvertError::Configuration`] aborts the whole call.
pub trait Converter: Send + Sync {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError>;

    /// A name used in error messages.
    fn name(&self) -> &str {
        "Converter"
    }
}

/// How well a [`ConditionalConverter`] supports a pair of types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Full,
    /// Usable, but only when nothing supports the pair fully.
    Partial,
    None,
}

/// A converter that declares which type pairs it supports.
pub trait ConditionalConverter: Converter {
    fn match_types(&self, source: &Type, destination: &Type, registry: &TypeRegistry) -> MatchResult;
}

// -----------------------------------------------------------------------------
// Converters

struct FnConverter<F> {
    name: String,
    f: F,
}

impl<F> Converter for FnConverter<F>
where
    F: Fn(&mut MappingContext<'_>) -> Result<Value, ConvertError> + Send + Sync,
{
    #[inline]
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        (self.f)(ctx)
    }

    #[inline]
    fn name(&self) -> &str {
        &self.name
    }
}

struct FnConditionalConverter<F, M> {
    inner: FnConverter<F>,
    matcher: M,
}

impl<F, M> Converter for FnConditionalConverter<F, M>
where
    F: Fn(&mut MappingContext<'_>) -> Result<Value, ConvertError> + Send + Sync,
    M: Fn(&Type, &Type) -> MatchResult + Send + Sync,
{
    #[inline]
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        self.inner.convert(ctx)
    }

    #[inline]
    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<F, M> ConditionalConverter for FnConditionalConverter<F, M>
where
    F: Fn(&mut MappingContext<'_>) -> Result<Value, ConvertError> + Send + Sync,
    M: Fn(&Type, &Type) -> MatchResult + Send + Sync,
{
    #[inline]
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        (self.matcher)(source, destination)
    }
}

/// Constructors for closure-backed converters.
///
/// # Examples
///
/// ```
/// use vc_mapper::convert::{Converter, Converters};
///
/// let upper = Converters::from_fn("upper", |ctx| {
///     Ok(ctx.source().as_str().map(str::to_uppercase).into())
/// });
/// assert_eq!(upper.name(), "upper");
/// ```
pub struct Converters;

impl Converters {
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Converter>
    where
        F: Fn(&mut MappingContext<'_>) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        Arc::new(FnConverter {
            name: name.into(),
            f,
        })
    }

    /// A conditional converter from a type matcher and a body.
    pub fn conditional<M, F>(name: impl Into<String>, matcher: M, f: F) -> Arc<dyn ConditionalConverter>
    where
        M: Fn(&Type, &Type) -> MatchResult + Send + Sync + 'static,
        F: Fn(&mut MappingContext<'_>) -> Result<Value, ConvertError> + Send + Sync + 'static,
    {
        Arc::new(FnConditionalConverter {
            inner: FnConverter {
                name: name.into(),
                f,
            },
            matcher,
        })
    }
}

impl fmt::Debug for dyn Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.name())
    }
}

impl fmt::Debug for dyn ConditionalConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConditionalConverter({})", self.name())
    }
}
