use alloc::sync::Arc;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_utils::hash::HashMap;

use crate::info::TypeName;
use crate::value::Value;

// -----------------------------------------------------------------------------
// ObjectId

/// Identity of a live [`Object`], stable while the object is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

// -----------------------------------------------------------------------------
// Object

struct ObjectData {
    ty: TypeName,
    slots: RwLock<HashMap<Arc<str>, Value>>,
}

/// A shared handle to an instance of a registered struct type.
///
/// Cloning the handle aliases the same instance; equality is identity.
/// Slots hold field storage and are read as [`Value::Null`] until written.
///
/// Because handles alias, graphs may contain cycles. [`Debug`] never
/// walks slots, so printing a cyclic graph terminates.
///
/// # Examples
///
/// ```
/// use vc_reflect::value::{Object, Value};
///
/// let person = Object::new("Person");
/// person.set("person", Value::Object(person.clone()));
///
/// let inner = person.get("person");
/// assert!(inner.as_object().unwrap().ptr_eq(&person));
/// assert!(person.get("name").is_null());
/// ```
#[derive(Clone)]
pub struct Object(Arc<ObjectData>);

impl Object {
    /// Creates an empty instance of `ty`.
    ///
    /// This does not consult a registry. Use
    /// [`TypeRegistry::instantiate`](crate::registry::TypeRegistry::instantiate)
    /// to honor constructors.
    pub fn new(ty: impl Into<TypeName>) -> Self {
        Self(Arc::new(ObjectData {
            ty: ty.into(),
            slots: RwLock::new(HashMap::default()),
        }))
    }

    /// Returns the concrete type of this instance.
    #[inline]
    pub fn type_name(&self) -> &TypeName {
        &self.0.ty
    }

    /// Returns the identity of this instance.
    #[inline]
    pub fn id(&self) -> ObjectId {
        ObjectId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Returns `true` if both handles point at the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Reads a slot, [`Value::Null`] if it was never written.
    pub fn get(&self, slot: &str) -> Value {
        let slots = self.0.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(slot).cloned().unwrap_or_default()
    }

    /// Writes a slot, returning the previous value.
    pub fn set(&self, slot: impl Into<Arc<str>>, value: Value) -> Value {
        let mut slots = self.0.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(slot.into(), value).unwrap_or_default()
    }

    /// Returns `true` if the slot has been written.
    pub fn has(&self, slot: &str) -> bool {
        let slots = self.0.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.contains_key(slot)
    }

    /// Returns the names of all written slots, sorted.
    pub fn slot_names(&self) -> Vec<Arc<str>> {
        let slots = self.0.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = slots.keys().cloned().collect();
        names.sort();
        names
    }
}

impl PartialEq for Object {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.0.ty, self.id())
    }
}
