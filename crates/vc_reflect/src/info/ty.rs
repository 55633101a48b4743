use core::fmt;

use crate::info::TypeName;

// -----------------------------------------------------------------------------
// Type

/// A declared or runtime type.
///
/// Scalars and `String` are *primitive*: they never contain properties.
/// Lists and arrays are *iterable*. Struct types are looked up in a
/// [`TypeRegistry`](crate::registry::TypeRegistry) by name.
///
/// `Any` plays the role of an unknown or erased type, e.g. the element
/// type of a list observed at runtime.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::Type;
///
/// let ty = Type::list(Type::structure("Order"));
/// assert!(ty.is_iterable());
/// assert_eq!(ty.element_type(), Some(&Type::structure("Order")));
/// assert_eq!(ty.to_string(), "List<Order>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Any,
    Bool,
    Char,
    I32,
    I64,
    F32,
    F64,
    String,
    Struct(TypeName),
    List(Box<Type>),
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
}

impl Type {
    /// Creates a struct type.
    #[inline]
    pub fn structure(name: impl Into<TypeName>) -> Self {
        Self::Struct(name.into())
    }

    /// Creates a list type.
    #[inline]
    pub fn list(element: Type) -> Self {
        Self::List(Box::new(element))
    }

    /// Creates an array type.
    #[inline]
    pub fn array(element: Type) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates a map type.
    #[inline]
    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Returns `true` for scalars and `String`.
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool
                | Self::Char
                | Self::I32
                | Self::I64
                | Self::F32
                | Self::F64
                | Self::String
        )
    }

    /// Returns `true` for the numeric scalars.
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::I32 | Self::I64 | Self::F32 | Self::F64)
    }

    /// Returns `true` for lists and arrays.
    #[inline]
    pub const fn is_iterable(&self) -> bool {
        matches!(self, Self::List(_) | Self::Array(_))
    }

    /// Returns `true` for maps.
    #[inline]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }

    /// Returns `true` if values of this type may expose named members.
    #[inline]
    pub const fn might_contain_properties(&self) -> bool {
        matches!(self, Self::Struct(_) | Self::Map(..))
    }

    /// Returns the struct name, if this is a struct type.
    #[inline]
    pub fn struct_name(&self) -> Option<&TypeName> {
        match self {
            Self::Struct(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the element type of a list or array.
    #[inline]
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Self::List(e) | Self::Array(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the key and value types of a map.
    #[inline]
    pub fn entry_types(&self) -> Option<(&Type, &Type)> {
        match self {
            Self::Map(k, v) => Some((k, v)),
            _ => None,
        }
    }

    /// A short name used for class-name tokens: the simple struct name,
    /// or the kind name for everything else (`"String"`, `"List"`, ...).
    pub fn simple_name(&self) -> &str {
        match self {
            Self::Any => "Object",
            Self::Bool => "Boolean",
            Self::Char => "Character",
            Self::I32 => "Integer",
            Self::I64 => "Long",
            Self::F32 => "Float",
            Self::F64 => "Double",
            Self::String => "String",
            Self::Struct(name) => name.simple_name(),
            Self::List(_) => "List",
            Self::Array(_) => "Array",
            Self::Map(..) => "Map",
        }
    }
}

impl From<TypeName> for Type {
    #[inline]
    fn from(value: TypeName) -> Self {
        Self::Struct(value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Bool => f.write_str("bool"),
            Self::Char => f.write_str("char"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::String => f.write_str("String"),
            Self::Struct(name) => fmt::Display::fmt(name, f),
            Self::List(e) => write!(f, "List<{e}>"),
            Self::Array(e) => write!(f, "[{e}]"),
            Self::Map(k, v) => write!(f, "Map<{k}, {v}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Type;

    #[test]
    fn classification() {
        assert!(Type::String.is_primitive());
        assert!(!Type::String.might_contain_properties());
        assert!(Type::structure("A").might_contain_properties());
        assert!(Type::map(Type::String, Type::Any).might_contain_properties());
        assert!(!Type::list(Type::I32).might_contain_properties());
        assert!(Type::array(Type::I32).is_iterable());
        assert!(!Type::Any.is_primitive());
    }

    #[test]
    fn display() {
        let ty = Type::map(Type::String, Type::list(Type::structure("a::B")));
        assert_eq!(ty.to_string(), "Map<String, List<a::B>>");
        assert_eq!(Type::array(Type::Char).to_string(), "[char]");
    }
}
