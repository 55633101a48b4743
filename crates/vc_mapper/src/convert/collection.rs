use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;

use crate::convert::{ConditionalConverter, Converter, MatchResult};
use crate::engine::MappingContext;
use crate::error::ConvertError;

// -----------------------------------------------------------------------------
// Collection

/// Maps lists and arrays element by element.
///
/// Every non-null element is mapped to the destination element type, null
/// elements stay null and the order is preserved.
///
/// Arrays, and lists when collection merging is enabled, merge into an
/// existing destination: object elements at the same index are mapped
/// into, and destination elements past the end of the source are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionConverter;

impl Converter for CollectionConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        let Some(items) = ctx.source().as_list().map(<[Value]>::to_vec) else {
            return Ok(Value::Null);
        };
        let element_type = ctx
            .destination_type()
            .element_type()
            .cloned()
            .unwrap_or(Type::Any);
        let merge = matches!(ctx.destination_type(), Type::Array(_))
            || ctx.configuration().is_collections_merge_enabled();
        let original: Vec<Value> = if merge {
            ctx.destination().as_list().map(<[Value]>::to_vec).unwrap_or_default()
        } else {
            Vec::new()
        };

        let mut destination = Vec::with_capacity(items.len().max(original.len()));
        for (index, element) in items.iter().enumerate() {
            let existing = original.get(index).filter(|v| !v.is_null());
            let mapped = match existing {
                _ if element.is_null() => existing.cloned().unwrap_or_default(),
                Some(target @ Value::Object(_)) => ctx.map_into(element, target)?,
                _ => ctx.map(element, &element_type)?,
            };
            destination.push(mapped);
        }
        destination.extend(original.into_iter().skip(items.len()));

        Ok(Value::List(destination))
    }

    fn name(&self) -> &str {
        "CollectionConverter"
    }
}

impl ConditionalConverter for CollectionConverter {
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        if source.is_iterable() && destination.is_iterable() {
            MatchResult::Full
        } else {
            MatchResult::None
        }
    }
}

// -----------------------------------------------------------------------------
// Map

/// Maps the keys and values of a map into a new or existing map.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapConverter;

impl Converter for MapConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        let Some(entries) = ctx.source().as_map().map(<[(Value, Value)]>::to_vec) else {
            return Ok(Value::Null);
        };
        let (key_type, value_type) = match ctx.destination_type().entry_types() {
            Some((k, v)) => (k.clone(), v.clone()),
            None => (Type::Any, Type::Any),
        };
        let mut destination = ctx
            .destination()
            .as_map()
            .map(<[(Value, Value)]>::to_vec)
            .unwrap_or_default();

        for (key, value) in &entries {
            let key = if key.is_null() {
                Value::Null
            } else {
                ctx.map(key, &key_type)?
            };
            let value = if value.is_null() {
                Value::Null
            } else {
                ctx.map(value, &value_type)?
            };
            match destination.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => destination.push((key, value)),
            }
        }

        Ok(Value::Map(destination))
    }

    fn name(&self) -> &str {
        "MapConverter"
    }
}

impl ConditionalConverter for MapConverter {
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        if source.is_map() && destination.is_map() {
            MatchResult::Full
        } else {
            MatchResult::None
        }
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;
    use vc_reflect::value::Value;

    use super::{CollectionConverter, MapConverter};
    use crate::fixtures;

    #[test]
    fn lists_keep_order_and_nulls() {
        let source = Value::List(vec![Value::I32(1), Value::Null, Value::I32(3)]);
        let result = fixtures::convert(&CollectionConverter, source, Type::list(Type::String)).unwrap();
        assert_eq!(
            result,
            Value::List(vec![Value::from("1"), Value::Null, Value::from("3")])
        );
    }

    #[test]
    fn maps_convert_keys_and_values() {
        let source = Value::Map(vec![(Value::I32(1), Value::from("2"))]);
        let result = fixtures::convert(&MapConverter, source, Type::map(Type::String, Type::I64)).unwrap();
        assert_eq!(result, Value::Map(vec![(Value::from("1"), Value::I64(2))]));
    }
}
