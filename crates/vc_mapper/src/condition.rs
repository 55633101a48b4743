//! Predicates deciding whether a type map or a property mapping applies.

use alloc::sync::Arc;
use core::fmt;

use vc_reflect::info::Type;

use crate::engine::MappingContext;

// -----------------------------------------------------------------------------
// Condition

/// A predicate over a read-only mapping context.
///
/// At type level a failing condition leaves the destination unpopulated.
/// At property level it suppresses the mapping, and everything nested
/// under its destination path, for the current invocation.
pub trait Condition: Send + Sync {
    fn applies(&self, ctx: &MappingContext<'_>) -> bool;
}

struct FnCondition<F>(F);

impl<F> Condition for FnCondition<F>
where
    F: Fn(&MappingContext<'_>) -> bool + Send + Sync,
{
    #[inline]
    fn applies(&self, ctx: &MappingContext<'_>) -> bool {
        (self.0)(ctx)
    }
}

impl fmt::Debug for dyn Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition")
    }
}

// -----------------------------------------------------------------------------
// Conditions

/// Common conditions and combinators.
///
/// # Examples
///
/// ```
/// use vc_mapper::condition::Conditions;
/// use vc_reflect::info::Type;
///
/// let non_empty = Conditions::from_fn(|ctx| {
///     ctx.source().as_str().is_some_and(|s| !s.is_empty())
/// });
/// let either = Conditions::or(Conditions::is_type(Type::I32), non_empty);
/// let _never = Conditions::not(either);
/// ```
pub struct Conditions;

impl Conditions {
    pub fn from_fn<F>(f: F) -> Arc<dyn Condition>
    where
        F: Fn(&MappingContext<'_>) -> bool + Send + Sync + 'static,
    {
        Arc::new(FnCondition(f))
    }

    /// Applies when the source value is null.
    pub fn is_null() -> Arc<dyn Condition> {
        Self::from_fn(|ctx| ctx.source().is_null())
    }

    /// Applies when the source value is not null.
    pub fn is_not_null() -> Arc<dyn Condition> {
        Self::from_fn(|ctx| !ctx.source().is_null())
    }

    /// Applies when the runtime type of the source value is `ty`.
    pub fn is_type(ty: Type) -> Arc<dyn Condition> {
        Self::from_fn(move |ctx| ctx.source().runtime_type() == ty)
    }

    pub fn always() -> Arc<dyn Condition> {
        Self::from_fn(|_| true)
    }

    pub fn never() -> Arc<dyn Condition> {
        Self::from_fn(|_| false)
    }

    pub fn and(a: Arc<dyn Condition>, b: Arc<dyn Condition>) -> Arc<dyn Condition> {
        Self::from_fn(move |ctx| a.applies(ctx) && b.applies(ctx))
    }

    pub fn or(a: Arc<dyn Condition>, b: Arc<dyn Condition>) -> Arc<dyn Condition> {
        Self::from_fn(move |ctx| a.applies(ctx) || b.applies(ctx))
    }

    pub fn not(condition: Arc<dyn Condition>) -> Arc<dyn Condition> {
        Self::from_fn(move |ctx| !condition.applies(ctx))
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;
    use vc_reflect::value::Value;

    use super::Conditions;
    use crate::fixtures;

    #[test]
    fn combinators() {
        let string = Conditions::is_type(Type::String);
        let not_null = Conditions::is_not_null();
        let both = Conditions::and(string.clone(), not_null.clone());
        let negated = Conditions::not(both.clone());

        fixtures::with_context(Value::from("x"), Type::String, |ctx| {
            assert!(both.applies(ctx));
            assert!(!negated.applies(ctx));
            assert!(Conditions::or(Conditions::never(), Conditions::always()).applies(ctx));
            assert!(!Conditions::is_null().applies(ctx));
        });

        fixtures::with_context(Value::Null, Type::String, |ctx| {
            assert!(!both.applies(ctx));
            assert!(negated.applies(ctx));
            assert!(Conditions::is_null().applies(ctx));
        });
    }
}
