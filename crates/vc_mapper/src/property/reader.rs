use vc_reflect::info::Type;
use vc_reflect::value::Value;

// -----------------------------------------------------------------------------
// ValueReader

/// Reads members out of untyped, key/value sources.
///
/// When a source value is supported by a registered reader, its accessors
/// come from [`member_names`](Self::member_names) instead of the struct
/// description of its type.
pub trait ValueReader: Send + Sync {
    /// Returns `true` if values of `ty` can be read.
    fn supports(&self, ty: &Type) -> bool;

    /// Returns the member named `member`, `None` if absent.
    fn get(&self, source: &Value, member: &str) -> Option<Value>;

    /// Describes the member named `member`.
    fn member(&self, source: &Value, member: &str) -> Option<ReaderMember>;

    fn member_names(&self, source: &Value) -> Vec<String>;

    fn name(&self) -> &str;
}

/// What a [`ValueReader`] knows about one member.
#[derive(Debug, Clone)]
pub struct ReaderMember {
    pub value_type: Type,
    /// The member value, when it can be read by a reader itself.
    pub nested: Option<Value>,
}

// -----------------------------------------------------------------------------
// MapValueReader

/// Reads string-keyed [`Value::Map`]s.
///
/// # Examples
///
/// ```
/// use vc_mapper::property::{MapValueReader, ValueReader};
/// use vc_reflect::value::Value;
///
/// let source = Value::string_map([("name", Value::from("Ada"))]);
/// let reader = MapValueReader;
///
/// assert_eq!(reader.member_names(&source), ["name"]);
/// assert_eq!(reader.get(&source, "name"), Some(Value::from("Ada")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MapValueReader;

impl ValueReader for MapValueReader {
    #[inline]
    fn supports(&self, ty: &Type) -> bool {
        ty.is_map()
    }

    fn get(&self, source: &Value, member: &str) -> Option<Value> {
        source.map_get(member).cloned()
    }

    fn member(&self, source: &Value, member: &str) -> Option<ReaderMember> {
        let value = self.get(source, member)?;
        Some(match value {
            Value::Map(_) => ReaderMember {
                value_type: value.runtime_type(),
                nested: Some(value),
            },
            other => ReaderMember {
                value_type: other.runtime_type(),
                nested: None,
            },
        })
    }

    fn member_names(&self, source: &Value) -> Vec<String> {
        source
            .as_map()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, _)| k.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn name(&self) -> &str {
        "Map"
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;
    use vc_reflect::value::Value;

    use super::{MapValueReader, ValueReader};

    #[test]
    fn nested_maps_are_reported() {
        let source = Value::string_map([
            ("address", Value::string_map([("street", Value::from("Main"))])),
            ("age", Value::I32(3)),
            ("none", Value::Null),
        ]);
        let reader = MapValueReader;

        let address = reader.member(&source, "address").unwrap();
        assert!(address.nested.is_some());
        assert!(address.value_type.is_map());

        let age = reader.member(&source, "age").unwrap();
        assert_eq!(age.value_type, Type::I32);
        assert!(age.nested.is_none());

        assert_eq!(reader.member(&source, "none").unwrap().value_type, Type::Any);
        assert!(reader.member(&source, "missing").is_none());
        assert!(reader.member_names(&Value::I32(1)).is_empty());
    }
}
