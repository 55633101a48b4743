use alloc::sync::Arc;
use core::fmt;
use core::hash::{Hash, Hasher};

use vc_reflect::ReflectError;
use vc_reflect::info::{MethodInfo, Type};
use vc_reflect::value::{Object, Value};

use super::ValueReader;

// -----------------------------------------------------------------------------
// PropertyKind

/// Where a property comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Field,
    Method,
    /// Neither field nor method: a value-reader key or a constructor parameter.
    Synthetic,
}

// -----------------------------------------------------------------------------
// PropertyInfo

pub(crate) enum Access {
    /// Reads and writes the object slot named after the member.
    Field,
    Getter(MethodInfo),
    Setter(MethodInfo),
    /// Constructor parameter at `index`; written by construction, never directly.
    Parameter(usize),
    /// A key read through a value reader. `nested` holds the member value
    /// when it exposes members itself.
    Reader {
        reader: Arc<dyn ValueReader>,
        nested: Option<Value>,
    },
}

struct PropertyData {
    declaring: Type,
    name: Arc<str>,
    member: Arc<str>,
    ty: Type,
    kind: PropertyKind,
    access: Access,
}

/// One step of a property path: an accessor, a mutator or both.
///
/// `name` is the transformed name used for matching (`getFirstName`
/// becomes `firstName`), `member` the underlying member name.
///
/// Two properties are equal when they are declared on the same type and
/// share a name, whichever member backs them.
#[derive(Clone)]
pub struct PropertyInfo(Arc<PropertyData>);

impl PropertyInfo {
    fn new(declaring: Type, name: &str, member: &str, ty: Type, kind: PropertyKind, access: Access) -> Self {
        Self(Arc::new(PropertyData {
            declaring,
            name: name.into(),
            member: member.into(),
            ty,
            kind,
            access,
        }))
    }

    pub(crate) fn field(declaring: Type, name: &str, member: &str, ty: Type) -> Self {
        Self::new(declaring, name, member, ty, PropertyKind::Field, Access::Field)
    }

    pub(crate) fn getter(declaring: Type, name: &str, method: MethodInfo) -> Self {
        let member = method.name().to_owned();
        let ty = method.ty().clone();
        Self::new(declaring, name, &member, ty, PropertyKind::Method, Access::Getter(method))
    }

    pub(crate) fn setter(declaring: Type, name: &str, method: MethodInfo) -> Self {
        let member = method.name().to_owned();
        let ty = method.ty().clone();
        Self::new(declaring, name, &member, ty, PropertyKind::Method, Access::Setter(method))
    }

    pub(crate) fn parameter(declaring: Type, name: &str, ty: Type, index: usize) -> Self {
        Self::new(declaring, name, name, ty, PropertyKind::Synthetic, Access::Parameter(index))
    }

    pub(crate) fn reader(
        declaring: Type,
        name: &str,
        member: &str,
        ty: Type,
        reader: Arc<dyn ValueReader>,
        nested: Option<Value>,
    ) -> Self {
        let access = Access::Reader { reader, nested };
        Self::new(declaring, name, member, ty, PropertyKind::Synthetic, access)
    }

    #[inline]
    pub fn declaring_type(&self) -> &Type {
        &self.0.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn member_name(&self) -> &str {
        &self.0.member
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.0.kind
    }

    /// Returns the constructor parameter index for parameter mutators.
    #[inline]
    pub fn parameter_index(&self) -> Option<usize> {
        match self.0.access {
            Access::Parameter(index) => Some(index),
            _ => None,
        }
    }

    #[inline]
    pub fn is_parameter(&self) -> bool {
        self.parameter_index().is_some()
    }

    /// Returns `true` for setters and (non-parameter) fields.
    pub fn is_writable(&self) -> bool {
        matches!(self.0.access, Access::Field | Access::Setter(_))
    }

    /// The member value behind a value-reader key, if it has members itself.
    pub(crate) fn nested_value(&self) -> Option<&Value> {
        match &self.0.access {
            Access::Reader { nested, .. } => nested.as_ref(),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn is_reader(&self) -> bool {
        matches!(self.0.access, Access::Reader { .. })
    }

    /// Reads this property from `source`.
    pub fn read(&self, source: &Value) -> Result<Value, ReflectError> {
        match &self.0.access {
            Access::Reader { reader, .. } => Ok(reader.get(source, &self.0.member).unwrap_or_default()),
            Access::Field => Ok(self.receiver(source)?.get(&self.0.member)),
            Access::Getter(method) => method.invoke_get(self.receiver(source)?),
            Access::Setter(_) | Access::Parameter(_) => Err(ReflectError::custom(format!(
                "{self} is not readable"
            ))),
        }
    }

    /// Writes `value` into this property of `target`.
    pub fn write(&self, target: &Object, value: Value) -> Result<(), ReflectError> {
        match &self.0.access {
            Access::Field => {
                target.set(self.0.member.clone(), value);
                Ok(())
            }
            Access::Setter(method) => method.invoke_set(target, value),
            _ => Err(ReflectError::custom(format!("{self} is not writable"))),
        }
    }

    fn receiver<'v>(&self, source: &'v Value) -> Result<&'v Object, ReflectError> {
        source.as_object().ok_or_else(|| ReflectError::TypeMismatch {
            expected: self.0.declaring.clone(),
            found: source.runtime_type(),
        })
    }
}

impl PartialEq for PropertyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.0.declaring == other.0.declaring && self.0.name == other.0.name
    }
}

impl Eq for PropertyInfo {}

impl Hash for PropertyInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.declaring.hash(state);
        self.0.name.hash(state);
    }
}

impl fmt::Display for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.access {
            Access::Getter(_) | Access::Setter(_) => write!(f, "{}.{}()", self.0.declaring, self.0.member),
            Access::Parameter(index) => write!(f, "{}(#{index} {})", self.0.declaring, self.0.member),
            Access::Field | Access::Reader { .. } => write!(f, "{}.{}", self.0.declaring, self.0.member),
        }
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("declaring", &self.0.declaring)
            .field("name", &self.0.name)
            .field("member", &self.0.member)
            .field("ty", &self.0.ty)
            .field("kind", &self.0.kind)
            .finish()
    }
}

/// Joins the property names of a path with a trailing dot: `address.street.`.
pub(crate) fn join_path(properties: &[PropertyInfo]) -> String {
    let mut path = String::new();
    for property in properties {
        path.push_str(property.name());
        path.push('.');
    }
    path
}

/// Joins the members of a path for messages: `Order.getCustomer().getName()`.
pub(crate) fn join_members(properties: &[PropertyInfo]) -> String {
    let mut out = String::new();
    for (index, property) in properties.iter().enumerate() {
        if index == 0 {
            out.push_str(&property.to_string());
        } else {
            out.push('.');
            out.push_str(property.member_name());
            if matches!(property.0.access, Access::Getter(_) | Access::Setter(_)) {
                out.push_str("()");
            }
        }
    }
    out
}
