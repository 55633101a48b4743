use alloc::sync::Arc;
use std::sync::{Mutex, PoisonError, RwLock};

use vc_reflect::info::Type;
use vc_reflect::value::Value;
use vc_utils::hash::HashMap;

use crate::Configuration;
use crate::builder::{ImplicitMappingBuilder, PropertyMapBuilder};
use crate::convert::Converter;
use crate::error::ConfigurationError;
use crate::mapper::MapperShared;
use crate::mapping::Mapping;
use crate::typemap::TypeMap;

// -----------------------------------------------------------------------------
// TypePair

/// The identity of a type map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TypePair {
    pub source: Type,
    pub destination: Type,
    pub name: Option<Arc<str>>,
}

impl TypePair {
    #[inline]
    pub fn new(source: Type, destination: Type, name: Option<Arc<str>>) -> Self {
        Self {
            source,
            destination,
            name,
        }
    }
}

// -----------------------------------------------------------------------------
// TypeMapStore

#[derive(Default)]
struct Entries {
    by_pair: HashMap<TypePair, Arc<TypeMap>>,
    /// Creation order, for [`TypeMapStore::all`].
    order: Vec<Arc<TypeMap>>,
}

/// The type maps of one mapper.
///
/// Lookups only take the read lock. Creation is serialized by a separate
/// build lock so one pair is never built twice, while lookups of finished
/// type maps stay available during a build.
#[derive(Default)]
pub(crate) struct TypeMapStore {
    build: Mutex<()>,
    entries: RwLock<Entries>,
}

impl TypeMapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pair: &TypePair) -> Option<Arc<TypeMap>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_pair
            .get(pair)
            .cloned()
    }

    /// Every type map, in creation order.
    pub fn all(&self) -> Vec<Arc<TypeMap>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    fn insert(&self, type_map: Arc<TypeMap>, pair: TypePair) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.order.push(type_map.clone());
        entries.by_pair.insert(pair, type_map);
    }

    /// Returns the type map for `pair`, building it first if needed.
    ///
    /// A new type map receives the explicit mappings of `producer` first,
    /// then implicit mappings unless `converter` is given, implicit mapping
    /// is disabled, or either side cannot contain properties. It is stored
    /// only if every step succeeds. `source` is the value being mapped,
    /// used to discover the members of key/value sources.
    ///
    /// An existing type map receives the explicit mappings of `producer`.
    pub fn get_or_create<F>(
        &self,
        shared: &Arc<MapperShared>,
        config: &Arc<Configuration>,
        source: Option<&Value>,
        pair: TypePair,
        producer: F,
        converter: Option<Arc<dyn Converter>>,
    ) -> Result<Arc<TypeMap>, ConfigurationError>
    where
        F: FnOnce(&mut PropertyMapBuilder<'_>),
    {
        let _build = self.build.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = self.get(&pair) {
            existing.add_mappings(producer)?;
            if let Some(converter) = converter {
                existing.set_converter(converter);
            }
            return Ok(existing);
        }

        let type_map = Arc::new(TypeMap::new(shared, config.clone(), pair.clone()));
        type_map.add_mappings(producer)?;
        if converter.is_none() {
            self.build_implicit(shared, config, source, &type_map)?;
        }
        if let Some(converter) = converter {
            type_map.set_converter(converter);
        }

        log::debug!(
            "built {type_map} (name: {:?}) with {} mappings",
            pair.name,
            type_map.mappings().len()
        );
        self.insert(type_map.clone(), pair);
        Ok(type_map)
    }

    /// Builds a type map for a pair that must not exist yet.
    pub fn create(
        &self,
        shared: &Arc<MapperShared>,
        config: &Arc<Configuration>,
        pair: TypePair,
    ) -> Result<Arc<TypeMap>, ConfigurationError> {
        let _build = self.build.lock().unwrap_or_else(PoisonError::into_inner);
        self.ensure_absent(&pair)?;

        let type_map = Arc::new(TypeMap::new(shared, config.clone(), pair.clone()));
        self.build_implicit(shared, config, None, &type_map)?;
        log::debug!(
            "created {type_map} (name: {:?}) with {} mappings",
            pair.name,
            type_map.mappings().len()
        );
        self.insert(type_map.clone(), pair);
        Ok(type_map)
    }

    /// Stores a type map for a pair that must not exist yet, holding only
    /// `mappings`.
    pub fn include(
        &self,
        shared: &Arc<MapperShared>,
        config: Arc<Configuration>,
        pair: TypePair,
        mappings: Vec<Arc<Mapping>>,
    ) -> Result<Arc<TypeMap>, ConfigurationError> {
        let _build = self.build.lock().unwrap_or_else(PoisonError::into_inner);
        self.ensure_absent(&pair)?;

        let type_map = Arc::new(TypeMap::new(shared, config, pair.clone()));
        type_map.insert_mappings(mappings);
        log::debug!(
            "included {type_map} (name: {:?}) with {} mappings",
            pair.name,
            type_map.mappings().len()
        );
        self.insert(type_map.clone(), pair);
        Ok(type_map)
    }

    fn ensure_absent(&self, pair: &TypePair) -> Result<(), ConfigurationError> {
        if self.get(pair).is_some() {
            return Err(ConfigurationError::message(format!(
                "A TypeMap already exists for {} and {}.",
                pair.source, pair.destination
            )));
        }
        Ok(())
    }

    fn build_implicit(
        &self,
        shared: &MapperShared,
        config: &Configuration,
        source: Option<&Value>,
        type_map: &TypeMap,
    ) -> Result<(), ConfigurationError> {
        if !config.is_implicit_mapping_enabled()
            || !type_map.source_type().might_contain_properties()
            || !type_map.destination_type().might_contain_properties()
        {
            return Ok(());
        }
        ImplicitMappingBuilder::new(type_map, self, &shared.registry, &shared.descriptors, config, source).build()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use vc_reflect::info::Type;

    use super::TypePair;
    use crate::fixtures;

    #[test]
    fn get_or_create_builds_once() {
        let mapper = fixtures::mapper(fixtures::people());
        let shared = mapper.shared();
        let config = mapper.configuration();
        let pair = TypePair::new(Type::structure("Person"), Type::structure("PersonDto"), None);

        let first = shared
            .store
            .get_or_create(&shared, &config, None, pair.clone(), |_| {}, None)
            .unwrap();
        let second = shared
            .store
            .get_or_create(&shared, &config, None, pair.clone(), |_| {}, None)
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(shared.store.all().len(), 1);

        let duplicate = shared.store.create(&shared, &config, pair);
        assert!(duplicate.is_err());
    }

    #[test]
    fn failed_builds_are_not_stored() {
        let mapper = fixtures::mapper(fixtures::people());
        let shared = mapper.shared();
        let config = mapper.configuration();
        let pair = TypePair::new(Type::structure("Person"), Type::structure("PersonDto"), None);

        let result = shared.store.get_or_create(
            &shared,
            &config,
            None,
            pair.clone(),
            |m| {
                m.map("nickname", "name");
            },
            None,
        );
        assert!(result.is_err());
        assert!(shared.store.get(&pair).is_none());
    }
}
