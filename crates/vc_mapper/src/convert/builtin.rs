use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;

use crate::convert::{ConditionalConverter, Converter, MatchResult};
use crate::engine::MappingContext;
use crate::error::ConvertError;

fn error_mapping(source: &Value, destination: &Type) -> ConvertError {
    ConvertError::message(format!("Error mapping {source} to {destination}"))
}

// -----------------------------------------------------------------------------
// Assignable

/// Passes values through when the destination type accepts the source type.
///
/// An existing object, list or map destination is kept as is; scalars and
/// strings are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignableConverter;

impl Converter for AssignableConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        Ok(if ctx.destination().is_null() || ctx.source_type().is_primitive() {
            ctx.source().clone()
        } else {
            ctx.destination().clone()
        })
    }

    fn name(&self) -> &str {
        "AssignableConverter"
    }
}

impl ConditionalConverter for AssignableConverter {
    fn match_types(&self, source: &Type, destination: &Type, registry: &TypeRegistry) -> MatchResult {
        if registry.is_assignable(destination, source) {
            MatchResult::Full
        } else {
            MatchResult::None
        }
    }
}

// -----------------------------------------------------------------------------
// String

/// Converts anything to a string. Only strings match fully.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter;

impl Converter for StringConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        let source = ctx.source();
        if source.is_null() {
            return Ok(Value::Null);
        }
        if let Some(items) = source.as_list()
            && items.iter().all(|item| matches!(item, Value::Char(_)))
        {
            let text = items
                .iter()
                .filter_map(|item| match item {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })
                .collect::<String>();
            return Ok(Value::String(text));
        }
        Ok(Value::String(source.to_string()))
    }

    fn name(&self) -> &str {
        "StringConverter"
    }
}

impl ConditionalConverter for StringConverter {
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        match (source, destination) {
            (Type::String, Type::String) => MatchResult::Full,
            (_, Type::String) => MatchResult::Partial,
            _ => MatchResult::None,
        }
    }
}

// -----------------------------------------------------------------------------
// Number

/// Converts between numeric types, and from booleans and strings to numbers.
///
/// Narrowing conversions fail when the value does not fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl NumberConverter {
    fn from_integer(value: i64, source: &Value, destination: &Type) -> Result<Value, ConvertError> {
        match destination {
            Type::I32 => {
                if value > i64::from(i32::MAX) {
                    Err(too_large(source, destination))
                } else if value < i64::from(i32::MIN) {
                    Err(too_small(source, destination))
                } else {
                    Ok(Value::I32(value as i32))
                }
            }
            Type::I64 => Ok(Value::I64(value)),
            Type::F32 => Ok(Value::F32(value as f32)),
            Type::F64 => Ok(Value::F64(value as f64)),
            _ => Err(error_mapping(source, destination)),
        }
    }

    fn from_float(value: f64, source: &Value, destination: &Type) -> Result<Value, ConvertError> {
        match destination {
            Type::I32 | Type::I64 => {
                // Truncates toward zero, then range checks.
                if value.is_nan() {
                    return Err(error_mapping(source, destination));
                }
                if value >= i64::MAX as f64 {
                    return Err(too_large(source, destination));
                }
                if value < i64::MIN as f64 {
                    return Err(too_small(source, destination));
                }
                Self::from_integer(value as i64, source, destination)
            }
            Type::F32 => {
                if value > f64::from(f32::MAX) {
                    Err(too_large(source, destination))
                } else {
                    Ok(Value::F32(value as f32))
                }
            }
            Type::F64 => Ok(Value::F64(value)),
            _ => Err(error_mapping(source, destination)),
        }
    }

    fn parse(text: &str, source: &Value, destination: &Type) -> Result<Value, ConvertError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::Null);
        }
        let parsed = match destination {
            Type::I32 => text.parse::<i32>().map(Value::I32).map_err(|e| e.to_string()),
            Type::I64 => text.parse::<i64>().map(Value::I64).map_err(|e| e.to_string()),
            Type::F32 => text.parse::<f32>().map(Value::F32).map_err(|e| e.to_string()),
            Type::F64 => text.parse::<f64>().map(Value::F64).map_err(|e| e.to_string()),
            _ => return Err(error_mapping(source, destination)),
        };
        parsed.map_err(|e| ConvertError::message(format!("Error mapping {source} to {destination}: {e}")))
    }
}

fn too_large(source: &Value, destination: &Type) -> ConvertError {
    ConvertError::message(format!("Value '{source}' is too large for {destination}"))
}

fn too_small(source: &Value, destination: &Type) -> ConvertError {
    ConvertError::message(format!("Value '{source}' is too small for {destination}"))
}

impl Converter for NumberConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        let source = ctx.source();
        let destination = ctx.destination_type();
        match source {
            Value::Null => Ok(Value::Null),
            Value::Bool(b) => Self::from_integer(i64::from(*b), source, destination),
            Value::I32(v) => Self::from_integer(i64::from(*v), source, destination),
            Value::I64(v) => Self::from_integer(*v, source, destination),
            Value::F32(v) => Self::from_float(f64::from(*v), source, destination),
            Value::F64(v) => Self::from_float(*v, source, destination),
            Value::String(s) => Self::parse(s, source, destination),
            other => Self::parse(&other.to_string(), source, destination),
        }
    }

    fn name(&self) -> &str {
        "NumberConverter"
    }
}

impl ConditionalConverter for NumberConverter {
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        if !destination.is_number() {
            return MatchResult::None;
        }
        if source.is_number() || matches!(source, Type::Bool | Type::String) {
            MatchResult::Full
        } else {
            MatchResult::Partial
        }
    }
}

// -----------------------------------------------------------------------------
// Boolean

const TRUE_STRINGS: [&str; 5] = ["true", "yes", "y", "on", "1"];
const FALSE_STRINGS: [&str; 5] = ["false", "no", "n", "off", "0"];

/// Converts strings and numbers to booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        let source = ctx.source();
        match source {
            Value::Null => return Ok(Value::Null),
            Value::Bool(b) => return Ok(Value::Bool(*b)),
            _ => {}
        }

        let text = source.to_string().to_lowercase();
        if text.is_empty() {
            return Ok(Value::Null);
        }
        if TRUE_STRINGS.contains(&text.as_str()) {
            Ok(Value::Bool(true))
        } else if FALSE_STRINGS.contains(&text.as_str()) {
            Ok(Value::Bool(false))
        } else {
            Err(error_mapping(source, ctx.destination_type()))
        }
    }

    fn name(&self) -> &str {
        "BooleanConverter"
    }
}

impl ConditionalConverter for BooleanConverter {
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        match (source, destination) {
            (Type::Bool, Type::Bool) => MatchResult::Full,
            (_, Type::Bool) => MatchResult::Partial,
            _ => MatchResult::None,
        }
    }
}

// -----------------------------------------------------------------------------
// Character

/// Converts one-character strings and code points to characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterConverter;

impl Converter for CharacterConverter {
    fn convert(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConvertError> {
        let source = ctx.source();
        let converted = match source {
            Value::Null => return Ok(Value::Null),
            Value::Char(c) => Some(*c),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (None, _) => return Ok(Value::Null),
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            other => other
                .as_i64()
                .and_then(|code| u32::try_from(code).ok())
                .and_then(char::from_u32),
        };
        converted
            .map(Value::Char)
            .ok_or_else(|| error_mapping(source, ctx.destination_type()))
    }

    fn name(&self) -> &str {
        "CharacterConverter"
    }
}

impl ConditionalConverter for CharacterConverter {
    fn match_types(&self, source: &Type, destination: &Type, _: &TypeRegistry) -> MatchResult {
        match (source, destination) {
            (Type::Char, Type::Char) => MatchResult::Full,
            (Type::String | Type::I32 | Type::I64, Type::Char) => MatchResult::Full,
            (_, Type::Char) => MatchResult::Partial,
            _ => MatchResult::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::value::Value;

    use super::{
        AssignableConverter, BooleanConverter, CharacterConverter, NumberConverter, StringConverter,
    };
    use crate::convert::{ConditionalConverter, MatchResult};
    use crate::fixtures;

    #[test]
    fn match_results() {
        let registry = TypeRegistry::new();
        assert_eq!(StringConverter.match_types(&Type::String, &Type::String, &registry), MatchResult::Full);
        assert_eq!(StringConverter.match_types(&Type::I32, &Type::String, &registry), MatchResult::Partial);
        assert_eq!(StringConverter.match_types(&Type::I32, &Type::I64, &registry), MatchResult::None);
        assert_eq!(NumberConverter.match_types(&Type::String, &Type::I64, &registry), MatchResult::Full);
        assert_eq!(NumberConverter.match_types(&Type::Char, &Type::I64, &registry), MatchResult::Partial);
        assert_eq!(BooleanConverter.match_types(&Type::I32, &Type::Bool, &registry), MatchResult::Partial);
        assert_eq!(AssignableConverter.match_types(&Type::I32, &Type::Any, &registry), MatchResult::Full);
        assert_eq!(CharacterConverter.match_types(&Type::Bool, &Type::Char, &registry), MatchResult::Partial);
    }

    #[test]
    fn numbers_widen_narrow_and_parse() {
        assert_eq!(fixtures::convert(&NumberConverter, Value::I32(7), Type::I64).unwrap(), Value::I64(7));
        assert_eq!(fixtures::convert(&NumberConverter, Value::from(" 42 "), Type::I32).unwrap(), Value::I32(42));
        assert_eq!(fixtures::convert(&NumberConverter, Value::Bool(true), Type::I32).unwrap(), Value::I32(1));
        assert_eq!(fixtures::convert(&NumberConverter, Value::F64(2.9), Type::I32).unwrap(), Value::I32(2));
        assert_eq!(fixtures::convert(&NumberConverter, Value::from(""), Type::I32).unwrap(), Value::Null);

        let error = fixtures::convert(&NumberConverter, Value::I64(1 << 40), Type::I32).unwrap_err();
        assert_eq!(error.to_string(), "Value '1099511627776' is too large for i32");
        let error = fixtures::convert(&NumberConverter, Value::I64(-(1 << 40)), Type::I32).unwrap_err();
        assert!(error.to_string().contains("too small"));
        assert!(fixtures::convert(&NumberConverter, Value::from("abc"), Type::I64).is_err());
    }

    #[test]
    fn booleans_from_strings_and_numbers() {
        for (input, expected) in [("yes", true), ("N", false), ("on", true), ("0", false)] {
            let result = fixtures::convert(&BooleanConverter, Value::from(input), Type::Bool).unwrap();
            assert_eq!(result, Value::Bool(expected), "{input}");
        }
        assert_eq!(fixtures::convert(&BooleanConverter, Value::I32(1), Type::Bool).unwrap(), Value::Bool(true));
        assert!(fixtures::convert(&BooleanConverter, Value::from("maybe"), Type::Bool).is_err());
    }

    #[test]
    fn strings_and_characters() {
        assert_eq!(fixtures::convert(&StringConverter, Value::I32(5), Type::String).unwrap(), Value::from("5"));
        let chars = Value::List(vec![Value::Char('h'), Value::Char('i')]);
        assert_eq!(fixtures::convert(&StringConverter, chars, Type::String).unwrap(), Value::from("hi"));

        assert_eq!(fixtures::convert(&CharacterConverter, Value::from("x"), Type::Char).unwrap(), Value::Char('x'));
        assert_eq!(fixtures::convert(&CharacterConverter, Value::I32(65), Type::Char).unwrap(), Value::Char('A'));
        assert!(fixtures::convert(&CharacterConverter, Value::from("xy"), Type::Char).is_err());
    }
}
