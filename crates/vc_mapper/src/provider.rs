//! Suppliers of destination instances.

use alloc::sync::Arc;
use core::fmt;

use vc_reflect::info::Type;
use vc_reflect::value::Value;

// -----------------------------------------------------------------------------
// ProvisionRequest

/// What a [`Provider`] is asked for.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionRequest<'a> {
    requested_type: &'a Type,
    source: &'a Value,
}

impl<'a> ProvisionRequest<'a> {
    #[inline]
    pub fn new(requested_type: &'a Type, source: &'a Value) -> Self {
        Self {
            requested_type,
            source,
        }
    }

    /// The type of the destination to provide.
    #[inline]
    pub fn requested_type(&self) -> &'a Type {
        self.requested_type
    }

    /// The source value the destination is created for.
    #[inline]
    pub fn source(&self) -> &'a Value {
        self.source
    }
}

// -----------------------------------------------------------------------------
// Provider

/// Supplies destination instances.
///
/// Returning `None` (or [`Value::Null`]) lets the mapper instantiate the
/// destination itself. A provided value that is not assignable to the
/// requested type is reported as a mapping error.
pub trait Provider: Send + Sync {
    fn get(&self, request: &ProvisionRequest<'_>) -> Option<Value>;
}

struct FnProvider<F>(F);

impl<F> Provider for FnProvider<F>
where
    F: Fn(&ProvisionRequest<'_>) -> Option<Value> + Send + Sync,
{
    #[inline]
    fn get(&self, request: &ProvisionRequest<'_>) -> Option<Value> {
        (self.0)(request)
    }
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Provider")
    }
}

/// Constructors for closure-backed providers.
///
/// # Examples
///
/// ```
/// use vc_mapper::provider::{ProvisionRequest, Providers};
/// use vc_reflect::info::Type;
/// use vc_reflect::value::{Object, Value};
///
/// let provider = Providers::from_fn(|request| {
///     let name = request.requested_type().struct_name()?.clone();
///     Some(Value::Object(Object::new(name)))
/// });
///
/// let ty = Type::structure("Person");
/// let provided = provider.get(&ProvisionRequest::new(&ty, &Value::Null)).unwrap();
/// assert_eq!(provided.runtime_type(), ty);
/// ```
pub struct Providers;

impl Providers {
    pub fn from_fn<F>(f: F) -> Arc<dyn Provider>
    where
        F: Fn(&ProvisionRequest<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        Arc::new(FnProvider(f))
    }
}
