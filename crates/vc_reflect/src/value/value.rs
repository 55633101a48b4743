use core::fmt;

use crate::info::Type;
use crate::value::Object;

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value.
///
/// Lists and maps are owned; objects are shared handles. A map keeps its
/// entries in insertion order, keys may be any value.
///
/// Equality compares scalars and containers structurally and objects by
/// identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Object(Object),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the runtime type of this value.
    ///
    /// Element types of lists and maps are not tracked and reported as
    /// [`Type::Any`]. `Null` has no type and reports `Any` as well.
    pub fn runtime_type(&self) -> Type {
        match self {
            Self::Null => Type::Any,
            Self::Bool(_) => Type::Bool,
            Self::Char(_) => Type::Char,
            Self::I32(_) => Type::I32,
            Self::I64(_) => Type::I64,
            Self::F32(_) => Type::F32,
            Self::F64(_) => Type::F64,
            Self::String(_) => Type::String,
            Self::List(_) => Type::list(Type::Any),
            Self::Map(_) => Type::map(Type::Any, Type::Any),
            Self::Object(obj) => Type::Struct(obj.type_name().clone()),
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the integer value of any integral variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the numeric value of any numeric variant as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::I32(v) => Some(f64::from(*v)),
            Self::I64(v) => Some(*v as f64),
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Looks up a map entry by string key.
    pub fn map_get(&self, key: &str) -> Option<&Value> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Builds a string-keyed map value.
    pub fn string_map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::String(k.into()), v))
                .collect(),
        )
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    char => Char,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<Value> => List,
    Object => Object,
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    /// Scalars print their plain value, strings print unquoted,
    /// objects print their type name and identity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
            Self::Object(obj) => write!(f, "{obj:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::info::Type;
    use crate::value::Object;

    #[test]
    fn runtime_types() {
        assert_eq!(Value::from(1).runtime_type(), Type::I32);
        assert_eq!(Value::from("a").runtime_type(), Type::String);
        assert_eq!(
            Value::from(Object::new("A")).runtime_type(),
            Type::structure("A")
        );
        assert_eq!(Value::List(vec![]).runtime_type(), Type::list(Type::Any));
    }

    #[test]
    fn string_map_lookup() {
        let map = Value::string_map([("a", Value::from(1)), ("b", Value::Null)]);
        assert_eq!(map.map_get("a"), Some(&Value::I32(1)));
        assert_eq!(map.map_get("b"), Some(&Value::Null));
        assert_eq!(map.map_get("c"), None);
    }

    #[test]
    fn display() {
        let list = Value::List(vec![Value::from(1), Value::from("x"), Value::Null]);
        assert_eq!(list.to_string(), "[1, x, null]");
        assert_eq!(Value::from(Some(2_i64)).to_string(), "2");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
