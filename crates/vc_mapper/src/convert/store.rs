use alloc::sync::Arc;
use core::fmt;

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;

use crate::convert::{
    AssignableConverter, BooleanConverter, CharacterConverter, CollectionConverter,
    ConditionalConverter, MapConverter, MatchResult, NumberConverter, StringConverter,
};

/// The ordered list of [`ConditionalConverter`]s consulted when no type map
/// bridges two types.
///
/// The defaults are, in order: collection, map, assignable, string,
/// number, boolean and character.
///
/// # Examples
///
/// ```
/// use vc_mapper::convert::{Converter, ConverterStore};
/// use vc_reflect::info::Type;
/// use vc_reflect::registry::TypeRegistry;
///
/// let store = ConverterStore::new();
/// let registry = TypeRegistry::new();
///
/// let found = store.first_supported(&Type::I32, &Type::String, &registry).unwrap();
/// assert_eq!(found.name(), "StringConverter");
/// assert!(store.first_supported(&Type::Bool, &Type::list(Type::I32), &registry).is_none());
/// ```
#[derive(Clone)]
pub struct ConverterStore {
    converters: Vec<Arc<dyn ConditionalConverter>>,
}

impl ConverterStore {
    /// Creates a store holding the built-in converters.
    pub fn new() -> Self {
        Self {
            converters: vec![
                Arc::new(CollectionConverter),
                Arc::new(MapConverter),
                Arc::new(AssignableConverter),
                Arc::new(StringConverter),
                Arc::new(NumberConverter),
                Arc::new(BooleanConverter),
                Arc::new(CharacterConverter),
            ],
        }
    }

    /// Creates a store without any converter.
    #[inline]
    pub fn empty() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    #[inline]
    pub fn converters(&self) -> &[Arc<dyn ConditionalConverter>] {
        &self.converters
    }

    /// Adds a converter ahead of every existing one.
    pub fn add_converter(&mut self, converter: Arc<dyn ConditionalConverter>) -> &mut Self {
        self.converters.insert(0, converter);
        self
    }

    /// Removes every converter with the given name. Returns `true` if one was removed.
    pub fn remove_converter(&mut self, name: &str) -> bool {
        let len = self.converters.len();
        self.converters.retain(|c| c.name() != name);
        len != self.converters.len()
    }

    /// Returns the first converter that fully supports the pair, or else
    /// the first that partially supports it.
    pub fn first_supported(
        &self,
        source: &Type,
        destination: &Type,
        registry: &TypeRegistry,
    ) -> Option<Arc<dyn ConditionalConverter>> {
        let mut partial = None;
        for converter in &self.converters {
            match converter.match_types(source, destination, registry) {
                MatchResult::Full => return Some(converter.clone()),
                MatchResult::Partial if partial.is_none() => partial = Some(converter.clone()),
                _ => {}
            }
        }
        partial
    }
}

impl Default for ConverterStore {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.converters.iter().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::value::Value;

    use super::ConverterStore;
    use crate::convert::{Converters, MatchResult};

    #[test]
    fn full_match_beats_earlier_partial() {
        let registry = TypeRegistry::new();
        let store = ConverterStore::new();
        // String is partial for I64 -> String, nothing is full.
        let found = store.first_supported(&Type::I64, &Type::String, &registry).unwrap();
        assert_eq!(found.name(), "StringConverter");
        // Number is full for String -> I32 even though nothing earlier matches.
        let found = store.first_supported(&Type::String, &Type::I32, &registry).unwrap();
        assert_eq!(found.name(), "NumberConverter");
    }

    #[test]
    fn added_converters_come_first() {
        let registry = TypeRegistry::new();
        let mut store = ConverterStore::new();
        store.add_converter(Converters::conditional(
            "shout",
            |s, d| match (s, d) {
                (Type::String, Type::String) => MatchResult::Full,
                _ => MatchResult::None,
            },
            |ctx| Ok(ctx.source().as_str().map(str::to_uppercase).map_or(Value::Null, Value::String)),
        ));
        let found = store.first_supported(&Type::String, &Type::String, &registry).unwrap();
        assert_eq!(found.name(), "shout");

        assert!(store.remove_converter("shout"));
        assert!(ConverterStore::empty().converters().is_empty());
    }
}
