use alloc::collections::BTreeMap;
use alloc::sync::{Arc, Weak};
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;

use crate::Configuration;
use crate::builder::PropertyMapBuilder;
use crate::condition::Condition;
use crate::convert::Converter;
use crate::engine::MappingEngine;
use crate::error::{ConfigurationError, Error, Errors, MappingError, ValidationError};
use crate::mapper::MapperShared;
use crate::mapping::Mapping;
use crate::property::{DescriptorCache, PropertyInfo};
use crate::provider::Provider;
use crate::typemap::TypePair;

// -----------------------------------------------------------------------------
// TypeMapState

#[derive(Default)]
struct TypeMapState {
    /// Keyed by destination path; iteration order is the mapping order.
    mappings: BTreeMap<String, Arc<Mapping>>,
    converter: Option<Arc<dyn Converter>>,
    pre_converter: Option<Arc<dyn Converter>>,
    post_converter: Option<Arc<dyn Converter>>,
    condition: Option<Arc<dyn Condition>>,
    provider: Option<Arc<dyn Provider>>,
    property_condition: Option<Arc<dyn Condition>>,
    property_converter: Option<Arc<dyn Converter>>,
    property_provider: Option<Arc<dyn Provider>>,
}

// -----------------------------------------------------------------------------
// TypeMap

/// The mapping plan from one source type to one destination type.
///
/// A type map is created by a [`ModelMapper`](crate::ModelMapper), either
/// on first use or explicitly, and is shared between threads. Its hooks can
/// be changed after creation through `&self`.
///
/// The type-level hooks are:
///
/// - a converter, which replaces property mapping entirely;
/// - pre- and post-converters, run around property mapping;
/// - a condition deciding whether properties are populated at all;
/// - a provider creating destination instances;
/// - property-level defaults for condition, converter and provider,
///   consulted when a mapping has none of its own.
///
/// # Examples
///
/// ```
/// use vc_mapper::ModelMapper;
/// use vc_reflect::info::{StructInfo, Type};
/// use vc_reflect::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new()
///     .with(StructInfo::new("User").with_property("name", Type::String))
///     .with(StructInfo::new("UserDto").with_property("name", Type::String));
/// let mapper = ModelMapper::new(registry);
///
/// let type_map = mapper
///     .create_type_map(&Type::structure("User"), &Type::structure("UserDto"), None, None)
///     .unwrap();
/// assert_eq!(type_map.to_string(), "TypeMap[User -> UserDto]");
/// assert_eq!(type_map.mappings().len(), 1);
/// assert!(type_map.validate().is_ok());
/// ```
pub struct TypeMap {
    source_type: Type,
    destination_type: Type,
    name: Option<Arc<str>>,
    config: Arc<Configuration>,
    registry: Arc<TypeRegistry>,
    descriptors: Arc<DescriptorCache>,
    shared: Weak<MapperShared>,
    state: RwLock<TypeMapState>,
}

impl TypeMap {
    pub(crate) fn new(shared: &Arc<MapperShared>, config: Arc<Configuration>, pair: TypePair) -> Self {
        Self {
            source_type: pair.source,
            destination_type: pair.destination,
            name: pair.name,
            config,
            registry: shared.registry.clone(),
            descriptors: shared.descriptors.clone(),
            shared: Arc::downgrade(shared),
            state: RwLock::new(TypeMapState::default()),
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, TypeMapState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, TypeMapState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn source_type(&self) -> &Type {
        &self.source_type
    }

    #[inline]
    pub fn destination_type(&self) -> &Type {
        &self.destination_type
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn name_arc(&self) -> Option<&Arc<str>> {
        self.name.as_ref()
    }

    /// The configuration this type map was built with.
    #[inline]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// A snapshot of the mappings, ordered by destination path.
    pub fn mappings(&self) -> Vec<Arc<Mapping>> {
        self.read().mappings.values().cloned().collect()
    }

    /// The mapping for a destination path such as `address.street.`.
    pub fn mapping_for(&self, path: &str) -> Option<Arc<Mapping>> {
        self.read().mappings.get(path).cloned()
    }

    /// Returns `true` if the mapping for `path` is marked skipped.
    pub fn is_skipped(&self, path: &str) -> bool {
        self.read().mappings.get(path).is_some_and(|m| m.is_skipped())
    }

    // -------------------------------------------------------------------------
    // Hooks

    pub fn converter(&self) -> Option<Arc<dyn Converter>> {
        self.read().converter.clone()
    }

    pub fn pre_converter(&self) -> Option<Arc<dyn Converter>> {
        self.read().pre_converter.clone()
    }

    pub fn post_converter(&self) -> Option<Arc<dyn Converter>> {
        self.read().post_converter.clone()
    }

    pub fn condition(&self) -> Option<Arc<dyn Condition>> {
        self.read().condition.clone()
    }

    pub fn provider(&self) -> Option<Arc<dyn Provider>> {
        self.read().provider.clone()
    }

    pub fn property_condition(&self) -> Option<Arc<dyn Condition>> {
        self.read().property_condition.clone()
    }

    pub fn property_converter(&self) -> Option<Arc<dyn Converter>> {
        self.read().property_converter.clone()
    }

    pub fn property_provider(&self) -> Option<Arc<dyn Provider>> {
        self.read().property_provider.clone()
    }

    /// Replaces property mapping with `converter`.
    pub fn set_converter(&self, converter: Arc<dyn Converter>) -> &Self {
        self.write().converter = Some(converter);
        self
    }

    /// Runs `converter` before the mappings, on the created destination.
    pub fn set_pre_converter(&self, converter: Arc<dyn Converter>) -> &Self {
        self.write().pre_converter = Some(converter);
        self
    }

    /// Runs `converter` after the mappings.
    pub fn set_post_converter(&self, converter: Arc<dyn Converter>) -> &Self {
        self.write().post_converter = Some(converter);
        self
    }

    /// Populates properties only while `condition` applies.
    pub fn set_condition(&self, condition: Arc<dyn Condition>) -> &Self {
        self.write().condition = Some(condition);
        self
    }

    pub fn set_provider(&self, provider: Arc<dyn Provider>) -> &Self {
        self.write().provider = Some(provider);
        self
    }

    pub fn set_property_condition(&self, condition: Arc<dyn Condition>) -> &Self {
        self.write().property_condition = Some(condition);
        self
    }

    pub fn set_property_converter(&self, converter: Arc<dyn Converter>) -> &Self {
        self.write().property_converter = Some(converter);
        self
    }

    pub fn set_property_provider(&self, provider: Arc<dyn Provider>) -> &Self {
        self.write().property_provider = Some(provider);
        self
    }

    // -------------------------------------------------------------------------
    // Mappings

    /// Inserts `mappings`, replacing any at the same paths.
    pub(crate) fn insert_mappings(&self, mappings: impl IntoIterator<Item = Arc<Mapping>>) {
        let mut state = self.write();
        for mapping in mappings {
            state.mappings.insert(mapping.path().to_owned(), mapping);
        }
    }

    /// Inserts `mapping` unless its path is already mapped.
    pub(crate) fn add_mapping_if_absent(&self, mapping: Mapping) -> bool {
        let mut state = self.write();
        if state.mappings.contains_key(mapping.path()) {
            return false;
        }
        state.mappings.insert(mapping.path().to_owned(), Arc::new(mapping));
        true
    }

    /// Adds the explicit mappings declared by `producer`.
    ///
    /// Explicit mappings replace implicit ones at the same path. Resolution
    /// failures and a second explicit mapping for an already explicit path
    /// are reported together; the valid mappings are still added.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_mapper::ModelMapper;
    /// use vc_reflect::info::{StructInfo, Type};
    /// use vc_reflect::registry::TypeRegistry;
    ///
    /// let registry = TypeRegistry::new()
    ///     .with(StructInfo::new("User").with_property("login", Type::String))
    ///     .with(StructInfo::new("UserDto").with_property("name", Type::String));
    /// let mapper = ModelMapper::new(registry);
    /// let type_map = mapper
    ///     .create_type_map(&Type::structure("User"), &Type::structure("UserDto"), None, None)
    ///     .unwrap();
    ///
    /// type_map.add_mappings(|m| { m.map("login", "name"); }).unwrap();
    /// assert!(type_map.mapping_for("name.").is_some_and(|m| m.is_explicit()));
    /// ```
    pub fn add_mappings<F>(&self, producer: F) -> Result<&Self, ConfigurationError>
    where
        F: FnOnce(&mut PropertyMapBuilder<'_>),
    {
        let mut builder = PropertyMapBuilder::new(
            &self.registry,
            &self.descriptors,
            &self.config,
            &self.source_type,
            &self.destination_type,
        );
        producer(&mut builder);
        let (mappings, mut errors) = builder.finish();

        {
            let mut state = self.write();
            for mapping in mappings {
                match state.mappings.get(mapping.path()) {
                    Some(existing) if existing.is_explicit() => {
                        errors.add(format!(
                            "A mapping already exists for {}.",
                            existing.last_destination_property()
                        ));
                    }
                    _ => {
                        state.mappings.insert(mapping.path().to_owned(), Arc::new(mapping));
                    }
                }
            }
        }

        errors.into_configuration()?;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Inheritance

    fn owner(&self) -> Result<Arc<MapperShared>, ConfigurationError> {
        self.shared
            .upgrade()
            .ok_or_else(|| ConfigurationError::message(format!("The mapper owning {self} has been dropped.")))
    }

    /// Registers a type map for a derived pair that starts with a copy of
    /// this type map's mappings, then returns `self`.
    ///
    /// Only mappings are copied; the converters, condition and provider of
    /// this type map are not. Fails if the derived pair already has a type
    /// map, or if either type does not derive from its side of this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_mapper::ModelMapper;
    /// use vc_reflect::info::{StructInfo, Type};
    /// use vc_reflect::registry::TypeRegistry;
    /// use vc_reflect::value::{Object, Value};
    ///
    /// let registry = TypeRegistry::new()
    ///     .with(StructInfo::new("Shape").with_property("label", Type::String))
    ///     .with(StructInfo::new("Circle").with_parent("Shape"))
    ///     .with(StructInfo::new("ShapeDto").with_property("title", Type::String))
    ///     .with(StructInfo::new("CircleDto").with_parent("ShapeDto"));
    /// let mapper = ModelMapper::new(registry);
    /// let (shape, shape_dto) = (Type::structure("Shape"), Type::structure("ShapeDto"));
    ///
    /// mapper
    ///     .add_mappings(&shape, &shape_dto, |m| { m.map("label", "title"); })
    ///     .unwrap()
    ///     .include(&Type::structure("Circle"), &Type::structure("CircleDto"))
    ///     .unwrap();
    ///
    /// let circle = Object::new("Circle");
    /// circle.set("label", Value::from("round"));
    /// let dto = mapper.map(&Value::Object(circle), &Type::structure("CircleDto")).unwrap();
    /// assert_eq!(dto.as_object().unwrap().get("title"), Value::from("round"));
    /// ```
    pub fn include(&self, source_type: &Type, destination_type: &Type) -> Result<&Self, ConfigurationError> {
        let shared = self.owner()?;
        if !self.registry.is_assignable(&self.source_type, source_type)
            || !self.registry.is_assignable(&self.destination_type, destination_type)
        {
            return Err(ConfigurationError::message(format!(
                "{source_type} -> {destination_type} does not derive from {self}."
            )));
        }

        let pair = TypePair::new(source_type.clone(), destination_type.clone(), None);
        shared
            .store
            .include(&shared, self.config.clone(), pair, self.mappings())?;
        Ok(self)
    }

    /// Copies the mappings of the unnamed type map of a base pair into this
    /// one, replacing mappings at the same paths. Fails if the base pair
    /// has no type map.
    pub fn include_base(&self, source_type: &Type, destination_type: &Type) -> Result<&Self, ConfigurationError> {
        let shared = self.owner()?;
        let pair = TypePair::new(source_type.clone(), destination_type.clone(), None);
        let Some(base) = shared.store.get(&pair) else {
            return Err(ConfigurationError::message(format!(
                "Cannot find a base TypeMap for {source_type} and {destination_type}."
            )));
        };

        let mappings = base.mappings();
        log::debug!("{self} includes {} mappings from {base}", mappings.len());
        self.insert_mappings(mappings);
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Validation

    fn is_converted(&self) -> bool {
        let state = self.read();
        state.converter.is_some() || state.pre_converter.is_some() || state.post_converter.is_some()
    }

    /// Top-level destination properties no mapping writes.
    pub fn unmapped_properties(&self) -> Vec<PropertyInfo> {
        let descriptor = self
            .descriptors
            .descriptor(&self.registry, &self.config, &self.destination_type);
        let state = self.read();
        descriptor
            .mutators()
            .values()
            .filter(|mutator| {
                !state
                    .mappings
                    .values()
                    .any(|m| m.destination_properties()[0].name() == mutator.name())
            })
            .cloned()
            .collect()
    }

    /// Top-level source properties no mapping reads.
    pub fn unmapped_source_properties(&self) -> Vec<PropertyInfo> {
        let descriptor = self
            .descriptors
            .descriptor(&self.registry, &self.config, &self.source_type);
        let state = self.read();
        descriptor
            .accessors()
            .values()
            .filter(|accessor| {
                !state
                    .mappings
                    .values()
                    .any(|m| m.source_properties().first().is_some_and(|p| p.name() == accessor.name()))
            })
            .cloned()
            .collect()
    }

    /// Reports unmapped destination properties.
    ///
    /// Under the `Strict` matching strategy this is [`validate_strict`](Self::validate_strict).
    /// A type map with a converter, pre-converter or post-converter is always valid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let strict = self.config.matching_strategy().name() == "Strict";
        self.collect_validation(strict).into_validation()
    }

    /// Reports unmapped destination and source properties.
    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        self.collect_validation(true).into_validation()
    }

    pub(crate) fn collect_validation(&self, strict: bool) -> Errors {
        let mut errors = Errors::new();
        if self.is_converted() {
            return errors;
        }

        let unmapped = self.unmapped_properties();
        if !unmapped.is_empty() {
            errors.add(format!(
                "Unmapped destination properties found in {self}:\n\n{}",
                list_properties(&unmapped)
            ));
        }
        if strict {
            let unmapped = self.unmapped_source_properties();
            if !unmapped.is_empty() {
                errors.add(format!(
                    "Unmapped source properties found in {self}:\n\n{}",
                    list_properties(&unmapped)
                ));
            }
        }
        errors
    }

    // -------------------------------------------------------------------------
    // Mapping

    fn engine(&self) -> Result<MappingEngine, Error> {
        match self.shared.upgrade() {
            Some(shared) => Ok(MappingEngine::new(shared)),
            None => Err(MappingError::message(format!("The mapper owning {self} has been dropped.")).into()),
        }
    }

    /// Maps `source` to a new instance of the destination type.
    pub fn map(self: &Arc<Self>, source: &Value) -> Result<Value, Error> {
        self.engine()?.map_with(self, source, Value::Null)
    }

    /// Maps `source` into the existing `destination`.
    pub fn map_into(self: &Arc<Self>, source: &Value, destination: &Value) -> Result<Value, Error> {
        self.engine()?.map_with(self, source, destination.clone())
    }
}

fn list_properties(properties: &[PropertyInfo]) -> String {
    properties
        .iter()
        .map(|p| format!("\t{p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for TypeMap {
    /// `TypeMap[Source -> Destination]`; the alternate form lists the
    /// mappings, one per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeMap[{} -> {}]",
            self.source_type.simple_name(),
            self.destination_type.simple_name()
        )?;
        if f.alternate() {
            for mapping in self.read().mappings.values() {
                write!(f, "\n  {mapping}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMap")
            .field("source_type", &self.source_type)
            .field("destination_type", &self.destination_type)
            .field("name", &self.name)
            .field("mappings", &self.read().mappings.len())
            .finish()
    }
}
