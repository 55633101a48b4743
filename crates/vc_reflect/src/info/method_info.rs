use alloc::sync::Arc;
use core::fmt;

use crate::ReflectError;
use crate::info::{AccessLevel, Type};
use crate::value::{Object, Value};

// -----------------------------------------------------------------------------
// Method bodies

/// Body of a getter: reads a value from the receiver.
pub type GetterFn = Arc<dyn Fn(&Object) -> Result<Value, ReflectError> + Send + Sync>;

/// Body of a setter: writes a value into the receiver.
pub type SetterFn = Arc<dyn Fn(&Object, Value) -> Result<(), ReflectError> + Send + Sync>;

/// What a method does when invoked.
#[derive(Clone)]
pub enum MethodBody {
    Getter(GetterFn),
    Setter(SetterFn),
}

// -----------------------------------------------------------------------------
// MethodInfo

/// A getter or setter method declared on a struct type.
///
/// `ty` is the returned type for getters and the parameter type for setters.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::{MethodInfo, Type};
/// use vc_reflect::value::{Object, Value};
///
/// let getter = MethodInfo::slot_getter("getName", Type::String, "name");
/// let setter = MethodInfo::slot_setter("setName", Type::String, "name");
///
/// let obj = Object::new("Person");
/// setter.invoke_set(&obj, Value::from("Ada")).unwrap();
/// assert_eq!(getter.invoke_get(&obj).unwrap(), Value::from("Ada"));
/// ```
#[derive(Clone)]
pub struct MethodInfo {
    name: Arc<str>,
    ty: Type,
    access: AccessLevel,
    body: MethodBody,
}

impl MethodInfo {
    /// Creates a public getter with a custom body.
    pub fn getter<F>(name: impl Into<Arc<str>>, ty: Type, body: F) -> Self
    where
        F: Fn(&Object) -> Result<Value, ReflectError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ty,
            access: AccessLevel::Public,
            body: MethodBody::Getter(Arc::new(body)),
        }
    }

    /// Creates a public setter with a custom body.
    pub fn setter<F>(name: impl Into<Arc<str>>, ty: Type, body: F) -> Self
    where
        F: Fn(&Object, Value) -> Result<(), ReflectError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ty,
            access: AccessLevel::Public,
            body: MethodBody::Setter(Arc::new(body)),
        }
    }

    /// Creates a public getter returning the content of `slot`.
    pub fn slot_getter(name: impl Into<Arc<str>>, ty: Type, slot: impl Into<Arc<str>>) -> Self {
        let slot: Arc<str> = slot.into();
        Self::getter(name, ty, move |obj| Ok(obj.get(&slot)))
    }

    /// Creates a public setter writing into `slot`.
    pub fn slot_setter(name: impl Into<Arc<str>>, ty: Type, slot: impl Into<Arc<str>>) -> Self {
        let slot: Arc<str> = slot.into();
        Self::setter(name, ty, move |obj, value| {
            obj.set(slot.clone(), value);
            Ok(())
        })
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
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn access(&self) -> AccessLevel {
        self.access
    }

    #[inline]
    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    #[inline]
    pub fn is_getter(&self) -> bool {
        matches!(self.body, MethodBody::Getter(_))
    }

    #[inline]
    pub fn is_setter(&self) -> bool {
        matches!(self.body, MethodBody::Setter(_))
    }

    /// Invokes a getter.
    pub fn invoke_get(&self, receiver: &Object) -> Result<Value, ReflectError> {
        match &self.body {
            MethodBody::Getter(f) => f(receiver),
            MethodBody::Setter(_) => Err(ReflectError::custom(format!(
                "method `{}` is not a getter",
                self.name
            ))),
        }
    }

    /// Invokes a setter.
    pub fn invoke_set(&self, receiver: &Object, value: Value) -> Result<(), ReflectError> {
        match &self.body {
            MethodBody::Setter(f) => f(receiver, value),
            MethodBody::Getter(_) => Err(ReflectError::custom(format!(
                "method `{}` is not a setter",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_getter() { "getter" } else { "setter" };
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("access", &self.access)
            .field("kind", &kind)
            .finish()
    }
}
