use serde_json::{Map, Number};

use crate::ReflectError;
use crate::value::Value;

impl Value {
    /// Converts a JSON document into a value.
    ///
    /// Objects become string-keyed [`Value::Map`]s in document order,
    /// integers become `I64`, other numbers `F64`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::I64(i),
                None => n.as_f64().map_or(Self::Null, Self::F64),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Self::String(k), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value into a JSON document.
    ///
    /// Objects, non-string map keys and non-finite floats have no JSON
    /// representation and produce [`ReflectError::NotRepresentable`].
    pub fn to_json(&self) -> Result<serde_json::Value, ReflectError> {
        let not_representable = || ReflectError::NotRepresentable(self.runtime_type());
        Ok(match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Char(c) => serde_json::Value::String(c.to_string()),
            Self::I32(i) => serde_json::Value::Number(Number::from(*i)),
            Self::I64(i) => serde_json::Value::Number(Number::from(*i)),
            Self::F32(f) => Number::from_f64(f64::from(*f))
                .map(serde_json::Value::Number)
                .ok_or_else(not_representable)?,
            Self::F64(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(not_representable)?,
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(
                items.iter().map(Self::to_json).collect::<Result<_, _>>()?,
            ),
            Self::Map(entries) => {
                let mut map = Map::new();
                for (k, v) in entries {
                    let key = k.as_str().ok_or_else(|| {
                        ReflectError::NotRepresentable(k.runtime_type())
                    })?;
                    map.insert(key.to_owned(), v.to_json()?);
                }
                serde_json::Value::Object(map)
            }
            Self::Object(_) => return Err(not_representable()),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::value::{Object, Value};

    #[test]
    fn json_document_to_value() {
        let json = serde_json::json!({
            "name": "Ada",
            "age": 36,
            "tags": ["a", null],
            "address": { "street": "Main" }
        });
        let value = Value::from_json(json.clone());

        assert_eq!(value.map_get("name"), Some(&Value::from("Ada")));
        assert_eq!(value.map_get("age"), Some(&Value::I64(36)));
        assert_eq!(
            value.map_get("address").and_then(|a| a.map_get("street")),
            Some(&Value::from("Main"))
        );
        assert_eq!(value.to_json().ok(), Some(json));
    }

    #[test]
    fn objects_are_not_representable() {
        assert!(Value::from(Object::new("A")).to_json().is_err());
        assert!(Value::F64(f64::NAN).to_json().is_err());
    }
}
