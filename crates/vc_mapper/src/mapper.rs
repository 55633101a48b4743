use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock};

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;
use vc_utils::hash::HashMap;

use crate::Configuration;
use crate::builder::PropertyMapBuilder;
use crate::convert::{ConditionalConverter, Converter};
use crate::engine::MappingEngine;
use crate::error::{Error, Errors, MappingError};
use crate::property::DescriptorCache;
use crate::typemap::{TypeMap, TypeMapStore, TypePair};

// -----------------------------------------------------------------------------
// MapperShared

/// State shared by a mapper, its type maps and running mapping calls.
pub(crate) struct MapperShared {
    pub registry: Arc<TypeRegistry>,
    pub config: RwLock<Arc<Configuration>>,
    pub store: TypeMapStore,
    pub descriptors: Arc<DescriptorCache>,
    pub converter_cache: RwLock<HashMap<TypePair, Arc<dyn ConditionalConverter>>>,
}

impl MapperShared {
    /// The current configuration.
    #[inline]
    pub fn configuration(&self) -> Arc<Configuration> {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

// -----------------------------------------------------------------------------
// ModelMapper

/// Maps object graphs onto other object graphs.
///
/// Type maps are created on first use by matching property names, or
/// explicitly through [`create_type_map`](Self::create_type_map) and
/// [`add_mappings`](Self::add_mappings). A mapper is cheap to share
/// between threads; every mapping call keeps its own state.
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
///     .with(StructInfo::new("Customer").with_property("name", Type::String))
///     .with(StructInfo::new("Order").with_property("customer", Type::structure("Customer")))
///     .with(StructInfo::new("OrderDto").with_property("customerName", Type::String));
/// let mapper = ModelMapper::new(registry);
///
/// let customer = Object::new("Customer");
/// customer.set("name", Value::from("Ada"));
/// let order = Object::new("Order");
/// order.set("customer", Value::Object(customer));
///
/// let dto = mapper.map(&Value::Object(order), &Type::structure("OrderDto")).unwrap();
/// assert_eq!(dto.as_object().unwrap().get("customerName"), Value::from("Ada"));
/// ```
pub struct ModelMapper {
    shared: Arc<MapperShared>,
}

impl ModelMapper {
    /// Creates a mapper with the default [`Configuration`].
    #[inline]
    pub fn new(registry: TypeRegistry) -> Self {
        Self::with_configuration(registry, Configuration::new())
    }

    pub fn with_configuration(registry: TypeRegistry, configuration: Configuration) -> Self {
        Self {
            shared: Arc::new(MapperShared {
                registry: Arc::new(registry),
                config: RwLock::new(Arc::new(configuration)),
                store: TypeMapStore::new(),
                descriptors: Arc::new(DescriptorCache::new()),
                converter_cache: RwLock::default(),
            }),
        }
    }

    /// A snapshot of the current configuration.
    #[inline]
    pub fn configuration(&self) -> Arc<Configuration> {
        self.shared.configuration()
    }

    /// Changes the configuration.
    ///
    /// Type maps built earlier keep the configuration they were built with.
    pub fn configure<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&mut Configuration),
    {
        {
            let mut config = self.shared.config.write().unwrap_or_else(PoisonError::into_inner);
            f(Arc::make_mut(&mut *config));
        }
        self.shared
            .converter_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.shared.registry
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> Arc<MapperShared> {
        self.shared.clone()
    }

    // -------------------------------------------------------------------------
    // Type maps

    /// Registers `converter` for the pair. The type map of the pair is
    /// created without implicit mappings if it does not exist yet.
    pub fn add_converter(
        &self,
        source_type: &Type,
        destination_type: &Type,
        converter: Arc<dyn Converter>,
    ) -> Result<Arc<TypeMap>, Error> {
        let pair = TypePair::new(source_type.clone(), destination_type.clone(), None);
        let config = self.configuration();
        let type_map = self
            .shared
            .store
            .get_or_create(&self.shared, &config, None, pair, |_| {}, Some(converter))?;
        Ok(type_map)
    }

    /// Adds explicit mappings to the type map of the pair, creating it
    /// first if needed.
    pub fn add_mappings<F>(&self, source_type: &Type, destination_type: &Type, producer: F) -> Result<Arc<TypeMap>, Error>
    where
        F: FnOnce(&mut PropertyMapBuilder<'_>),
    {
        let pair = TypePair::new(source_type.clone(), destination_type.clone(), None);
        let config = self.configuration();
        let type_map = self
            .shared
            .store
            .get_or_create(&self.shared, &config, None, pair, producer, None)?;
        Ok(type_map)
    }

    /// Creates the type map of a pair, optionally named and with its own
    /// configuration. Fails if it already exists.
    pub fn create_type_map(
        &self,
        source_type: &Type,
        destination_type: &Type,
        name: Option<&str>,
        configuration: Option<Configuration>,
    ) -> Result<Arc<TypeMap>, Error> {
        let pair = TypePair::new(source_type.clone(), destination_type.clone(), name.map(Arc::from));
        let config = match configuration {
            Some(configuration) => Arc::new(configuration),
            None => self.configuration(),
        };
        Ok(self.shared.store.create(&self.shared, &config, pair)?)
    }

    pub fn type_map(&self, source_type: &Type, destination_type: &Type, name: Option<&str>) -> Option<Arc<TypeMap>> {
        let pair = TypePair::new(source_type.clone(), destination_type.clone(), name.map(Arc::from));
        self.shared.store.get(&pair)
    }

    /// Every type map, in creation order.
    #[inline]
    pub fn type_maps(&self) -> Vec<Arc<TypeMap>> {
        self.shared.store.all()
    }

    // -------------------------------------------------------------------------
    // Mapping

    /// Maps `source` to a new value of `destination_type`.
    pub fn map(&self, source: &Value, destination_type: &Type) -> Result<Value, Error> {
        Self::require_source(source)?;
        self.engine()
            .map_root(source, Value::Null, destination_type.clone(), None)
    }

    /// Maps `source` through the type map named `name`.
    pub fn map_named(&self, source: &Value, destination_type: &Type, name: &str) -> Result<Value, Error> {
        Self::require_source(source)?;
        self.engine()
            .map_root(source, Value::Null, destination_type.clone(), Some(Arc::from(name)))
    }

    /// Maps `source` into the existing `destination` and returns it.
    pub fn map_into(&self, source: &Value, destination: &Value) -> Result<Value, Error> {
        Self::require_source(source)?;
        if destination.is_null() {
            return Err(MappingError::message("The destination cannot be null.").into());
        }
        self.engine()
            .map_root(source, destination.clone(), destination.runtime_type(), None)
    }

    fn require_source(source: &Value) -> Result<(), Error> {
        if source.is_null() {
            return Err(MappingError::message("The source cannot be null.").into());
        }
        Ok(())
    }

    #[inline]
    fn engine(&self) -> MappingEngine {
        MappingEngine::new(self.shared.clone())
    }

    /// Validates every type map, strictly for those built with the `Strict`
    /// matching strategy.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Errors::new();
        for type_map in self.type_maps() {
            let strict = type_map.configuration().matching_strategy().name() == "Strict";
            errors.merge(type_map.collect_validation(strict).take());
        }
        errors.into_validation()?;
        Ok(())
    }
}

impl core::fmt::Debug for ModelMapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelMapper")
            .field("type_maps", &self.shared.store.all().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::{Constructor, ParamInfo, StructInfo, Type};
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::value::{Object, Value};

    use crate::condition::Conditions;
    use crate::convert::Converters;
    use crate::error::Error;
    use crate::fixtures;
    use crate::matching::MatchingStrategies;
    use crate::naming::NameTokenizers;
    use crate::provider::Providers;

    fn order(name: &str, street: &str, city: &str) -> Value {
        let customer = Object::new("Customer");
        customer.set("name", Value::from(name));
        let address = Object::new("Address");
        address.set("street", Value::from(street));
        address.set("city", Value::from(city));
        let order = Object::new("Order");
        order.set("customer", Value::Object(customer));
        order.set("shippingAddress", Value::Object(address));
        Value::Object(order)
    }

    fn object(value: &Value) -> &Object {
        value.as_object().unwrap()
    }

    fn counters() -> TypeRegistry {
        TypeRegistry::new()
            .with(
                StructInfo::new("Src")
                    .with_property("name", Type::String)
                    .with_property("count", Type::I32),
            )
            .with(
                StructInfo::new("Dst")
                    .with_property("name", Type::String)
                    .with_property("count", Type::I32),
            )
    }

    fn src(name: Value, count: Value) -> Value {
        let src = Object::new("Src");
        src.set("name", name);
        src.set("count", count);
        Value::Object(src)
    }

    #[test]
    fn flattens_nested_sources() {
        let mapper = fixtures::mapper(fixtures::orders());
        let dto = mapper
            .map(&order("Joe", "Main", "Springfield"), &Type::structure("OrderDto"))
            .unwrap();

        let dto = object(&dto);
        assert_eq!(dto.type_name().as_str(), "OrderDto");
        assert_eq!(dto.get("customerName"), Value::from("Joe"));
        assert_eq!(dto.get("shippingAddressStreet"), Value::from("Main"));
        assert_eq!(dto.get("shippingAddressCity"), Value::from("Springfield"));
    }

    #[test]
    fn unflattens_into_shared_intermediates() {
        let mapper = fixtures::mapper(fixtures::orders());
        let dto = Object::new("OrderDto");
        dto.set("customerName", Value::from("Joe"));
        dto.set("shippingAddressStreet", Value::from("Main"));
        dto.set("shippingAddressCity", Value::from("Springfield"));

        let order = mapper
            .map(&Value::Object(dto), &Type::structure("Order"))
            .unwrap();
        let order = object(&order);
        let customer = order.get("customer");
        assert_eq!(object(&customer).get("name"), Value::from("Joe"));

        let address = order.get("shippingAddress");
        let address = object(&address);
        assert_eq!(address.type_name().as_str(), "Address");
        assert_eq!(address.get("street"), Value::from("Main"));
        assert_eq!(address.get("city"), Value::from("Springfield"));
    }

    #[test]
    fn maps_into_provided_destinations() {
        let mapper = fixtures::mapper(fixtures::orders());
        let customer = Object::new("Customer");
        customer.set("name", Value::from("old"));
        let existing = Object::new("Order");
        existing.set("customer", Value::Object(customer.clone()));

        let dto = Object::new("OrderDto");
        dto.set("customerName", Value::from("new"));
        let result = mapper
            .map_into(&Value::Object(dto), &Value::Object(existing.clone()))
            .unwrap();

        assert!(object(&result).ptr_eq(&existing));
        assert!(object(&existing.get("customer")).ptr_eq(&customer));
        assert_eq!(customer.get("name"), Value::from("new"));
    }

    #[test]
    fn cyclic_graphs_terminate() {
        let mapper = fixtures::mapper(fixtures::people());
        let person = Object::new("Person");
        person.set("name", Value::from("Ada"));
        person.set("person", Value::Object(person.clone()));

        let dto = mapper
            .map(&Value::Object(person), &Type::structure("PersonDto"))
            .unwrap();
        let inner = object(&dto).get("person");
        assert_eq!(inner, dto);
        assert_eq!(object(&inner).get("name"), Value::from("Ada"));
    }

    #[test]
    fn null_values_and_skip_null() {
        let mapper = fixtures::mapper(counters());
        let dst = mapper.map(&src(Value::Null, Value::Null), &Type::structure("Dst")).unwrap();
        assert_eq!(object(&dst).get("count"), Value::I32(0));
        assert!(object(&dst).has("name"));

        let skipping = fixtures::mapper(counters());
        skipping.configure(|c| {
            c.set_skip_null_enabled(true);
        });
        let dst = skipping
            .map(&src(Value::Null, Value::I32(4)), &Type::structure("Dst"))
            .unwrap();
        assert!(!object(&dst).has("name"));
        assert_eq!(object(&dst).get("count"), Value::I32(4));
    }

    #[test]
    fn property_conditions_suppress_writes() {
        let mapper = fixtures::mapper(counters());
        let type_map = mapper
            .create_type_map(&Type::structure("Src"), &Type::structure("Dst"), None, None)
            .unwrap();
        type_map.set_property_condition(Conditions::is_not_null());

        let dst = mapper.map(&src(Value::from("a"), Value::Null), &Type::structure("Dst")).unwrap();
        assert_eq!(object(&dst).get("name"), Value::from("a"));
        assert!(!object(&dst).has("count"));
    }

    #[test]
    fn skipped_and_conditional_mappings() {
        let mapper = fixtures::mapper(counters());
        mapper
            .add_mappings(&Type::structure("Src"), &Type::structure("Dst"), |m| {
                m.skip("name");
                m.when(Conditions::is_type(Type::I32)).skip_from("count", "count");
            })
            .unwrap();

        let dst = mapper.map(&src(Value::from("a"), Value::I32(3)), &Type::structure("Dst")).unwrap();
        assert!(!object(&dst).has("name"));
        assert!(!object(&dst).has("count"));

        let dst = mapper.map(&src(Value::from("a"), Value::Null), &Type::structure("Dst")).unwrap();
        assert_eq!(object(&dst).get("count"), Value::I32(0));
    }

    #[test]
    fn type_map_converters_replace_property_mapping() {
        let mapper = fixtures::mapper(counters());
        mapper
            .add_converter(
                &Type::structure("Src"),
                &Type::String,
                Converters::from_fn("SrcToString", |ctx| {
                    let name = ctx.source().as_object().map(|o| o.get("name")).unwrap_or_default();
                    Ok(Value::String(format!("<{name}>")))
                }),
            )
            .unwrap();

        let text = mapper.map(&src(Value::from("a"), Value::I32(1)), &Type::String).unwrap();
        assert_eq!(text, Value::from("<a>"));
    }

    #[test]
    fn converter_failures_are_collected() {
        let mapper = fixtures::mapper(counters());
        mapper
            .add_mappings(&Type::structure("Src"), &Type::structure("Dst"), |m| {
                m.using(Converters::from_fn("Failing", |_| {
                    Err(crate::error::ConvertError::message("boom"))
                }))
                .map("name", "name");
            })
            .unwrap();

        let result = mapper.map(&src(Value::from("a"), Value::I32(1)), &Type::structure("Dst"));
        let Err(Error::Mapping(error)) = result else {
            panic!("expected a mapping error");
        };
        assert_eq!(error.messages().len(), 1);
        assert!(error.messages()[0].message().starts_with("Converter Failing failed to convert"));
    }

    #[test]
    fn providers_supply_destinations() {
        let mapper = fixtures::mapper(counters());
        let provided = Object::new("Dst");
        provided.set("marker", Value::Bool(true));
        let instance = provided.clone();
        mapper.configure(move |c| {
            c.set_provider(Providers::from_fn(move |request| {
                (request.requested_type() == &Type::structure("Dst")).then(|| Value::Object(instance.clone()))
            }));
        });

        let dst = mapper.map(&src(Value::from("a"), Value::I32(2)), &Type::structure("Dst")).unwrap();
        assert!(object(&dst).ptr_eq(&provided));
        assert_eq!(provided.get("name"), Value::from("a"));

        let wrong = fixtures::mapper(counters());
        wrong.configure(|c| {
            c.set_provider(Providers::from_fn(|_| Some(Value::I32(1))));
        });
        let result = wrong.map(&src(Value::from("a"), Value::I32(2)), &Type::structure("Dst"));
        let Err(Error::Mapping(error)) = result else {
            panic!("expected a mapping error");
        };
        assert!(error.messages()[0].message().starts_with("The provided destination instance 1"));
    }

    #[test]
    fn constructor_parameters_are_mapped() {
        let registry = TypeRegistry::new()
            .with(StructInfo::new("Src").with_property("name", Type::String))
            .with(
                StructInfo::new("Frozen")
                    .with_read_only_property("name", Type::String)
                    .with_constructor(Constructor::assigning(vec![ParamInfo::new("name", Type::String)])),
            );
        let mapper = fixtures::mapper(registry);
        let source = Object::new("Src");
        source.set("name", Value::from("Ada"));

        let frozen = mapper
            .map(&Value::Object(source), &Type::structure("Frozen"))
            .unwrap();
        assert_eq!(object(&frozen).get("name"), Value::from("Ada"));
    }

    #[test]
    fn key_value_sources() {
        let mapper = fixtures::mapper(counters());
        let source = Value::string_map([("name", Value::from("Ada")), ("count", Value::I32(2))]);
        let dst = mapper.map(&source, &Type::structure("Dst")).unwrap();
        assert_eq!(object(&dst).get("name"), Value::from("Ada"));
        assert_eq!(object(&dst).get("count"), Value::I32(2));
    }

    #[test]
    fn named_type_maps_are_separate() {
        let mapper = fixtures::mapper(counters());
        let named = mapper
            .create_type_map(&Type::structure("Src"), &Type::structure("Dst"), Some("names"), None)
            .unwrap();
        named.set_post_converter(Converters::from_fn("Tag", |ctx| {
            if let Some(dst) = ctx.destination().as_object() {
                dst.set("tagged", Value::Bool(true));
            }
            Ok(ctx.destination().clone())
        }));

        let plain = mapper.map(&src(Value::from("a"), Value::I32(1)), &Type::structure("Dst")).unwrap();
        assert!(!object(&plain).has("tagged"));
        let tagged = mapper
            .map_named(&src(Value::from("a"), Value::I32(1)), &Type::structure("Dst"), "names")
            .unwrap();
        assert_eq!(object(&tagged).get("tagged"), Value::Bool(true));
        assert_eq!(mapper.type_maps().len(), 2);
    }

    #[test]
    fn validation_reports_unmapped_properties() {
        let registry = TypeRegistry::new()
            .with(StructInfo::new("Src").with_property("name", Type::String))
            .with(
                StructInfo::new("Dst")
                    .with_property("name", Type::String)
                    .with_property("extra", Type::String),
            );
        let mapper = fixtures::mapper(registry);
        mapper
            .create_type_map(&Type::structure("Src"), &Type::structure("Dst"), None, None)
            .unwrap();

        let Err(Error::Validation(error)) = mapper.validate() else {
            panic!("expected a validation error");
        };
        assert_eq!(error.messages().len(), 1);
        assert!(
            error.messages()[0]
                .message()
                .starts_with("Unmapped destination properties found in TypeMap[Src -> Dst]")
        );
    }

    #[test]
    fn null_sources_are_rejected() {
        let mapper = fixtures::mapper(counters());
        assert!(matches!(mapper.map(&Value::Null, &Type::structure("Dst")), Err(Error::Mapping(_))));
        assert!(matches!(
            mapper.map_into(&src(Value::Null, Value::Null), &Value::Null),
            Err(Error::Mapping(_))
        ));
    }

    #[test]
    fn dropped_mappers_stop_type_maps() {
        let mapper = fixtures::mapper(counters());
        let type_map = mapper
            .create_type_map(&Type::structure("Src"), &Type::structure("Dst"), None, None)
            .unwrap();
        assert!(type_map.map(&src(Value::from("a"), Value::I32(1))).is_ok());

        drop(mapper);
        assert!(matches!(type_map.map(&src(Value::from("a"), Value::I32(1))), Err(Error::Mapping(_))));
    }

    #[test]
    fn concurrent_maps_build_one_type_map() {
        let mapper = fixtures::mapper(counters());
        std::thread::scope(|scope| {
            for count in 0..8 {
                let mapper = &mapper;
                scope.spawn(move || {
                    let dst = mapper
                        .map(&src(Value::from("a"), Value::I32(count)), &Type::structure("Dst"))
                        .unwrap();
                    assert_eq!(object(&dst).get("count"), Value::I32(count));
                });
            }
        });

        let type_maps = mapper.type_maps();
        assert_eq!(type_maps.len(), 1);
        let paths: Vec<_> = type_maps[0].mappings().iter().map(|m| m.path().to_owned()).collect();
        assert_eq!(paths, ["count.", "name."]);
    }

    #[test]
    fn indirect_cycles_reuse_the_destination() {
        let registry = TypeRegistry::new()
            .with(
                StructInfo::new("Husband")
                    .with_property("name", Type::String)
                    .with_property("wife", Type::structure("Wife")),
            )
            .with(
                StructInfo::new("Wife")
                    .with_property("name", Type::String)
                    .with_property("husband", Type::structure("Husband")),
            )
            .with(
                StructInfo::new("HusbandDto")
                    .with_property("name", Type::String)
                    .with_property("wife", Type::structure("WifeDto")),
            )
            .with(
                StructInfo::new("WifeDto")
                    .with_property("name", Type::String)
                    .with_property("husband", Type::structure("HusbandDto")),
            );
        let mapper = fixtures::mapper(registry);

        let husband = Object::new("Husband");
        let wife = Object::new("Wife");
        husband.set("name", Value::from("Bob"));
        husband.set("wife", Value::Object(wife.clone()));
        wife.set("name", Value::from("Alice"));
        wife.set("husband", Value::Object(husband.clone()));

        let dto = mapper
            .map(&Value::Object(husband), &Type::structure("HusbandDto"))
            .unwrap();
        let wife_dto = object(&dto).get("wife");
        assert_eq!(object(&wife_dto).type_name().as_str(), "WifeDto");
        assert_eq!(object(&wife_dto).get("name"), Value::from("Alice"));

        let back = object(&wife_dto).get("husband");
        assert!(object(&back).ptr_eq(object(&dto)));
        assert_eq!(object(&back).get("name"), Value::from("Bob"));
    }

    #[test]
    fn null_parents_shade_nested_writes() {
        let registry = fixtures::orders()
            .with(StructInfo::new("CustomerView").with_property("label", Type::String))
            .with(StructInfo::new("OrderView").with_property("customer", Type::structure("CustomerView")));
        let mapper = fixtures::mapper(registry);
        mapper.configure(|c| {
            c.set_skip_null_enabled(true);
        });
        mapper
            .add_mappings(&Type::structure("Order"), &Type::structure("OrderView"), |m| {
                m.map("customer", "customer")
                    .map("shippingAddress.street", "customer.label");
            })
            .unwrap();

        let full = mapper
            .map(&order("Joe", "Main", "Springfield"), &Type::structure("OrderView"))
            .unwrap();
        let customer = object(&full).get("customer");
        assert_eq!(object(&customer).get("label"), Value::from("Main"));

        let orphan = order("Joe", "Main", "Springfield");
        object(&orphan).set("customer", Value::Null);
        let view = mapper.map(&orphan, &Type::structure("OrderView")).unwrap();
        assert!(!object(&view).has("customer"));
    }

    #[test]
    fn symmetric_renames_round_trip() {
        for strategy in [MatchingStrategies::standard(), MatchingStrategies::loose()] {
            let registry = TypeRegistry::new()
                .with(StructInfo::new("Sample").with_property("sampleFieldOne", Type::String))
                .with(StructInfo::new("SampleDto").with_property("samplefieldone", Type::String));
            let mapper = fixtures::mapper(registry);
            mapper.configure(move |c| {
                c.set_matching_strategy(strategy);
            });

            let sample = Object::new("Sample");
            sample.set("sampleFieldOne", Value::from("v"));
            let dto = mapper
                .map(&Value::Object(sample), &Type::structure("SampleDto"))
                .unwrap();
            assert_eq!(object(&dto).get("samplefieldone"), Value::from("v"));

            let back = mapper.map(&dto, &Type::structure("Sample")).unwrap();
            assert_eq!(object(&back).get("sampleFieldOne"), Value::from("v"));
        }
    }

    #[test]
    fn explicit_rules_skip_and_rename() {
        let registry = TypeRegistry::new()
            .with(
                StructInfo::new("Source")
                    .with_property("one", Type::String)
                    .with_property("two", Type::String)
                    .with_property("three", Type::String)
                    .with_property("four", Type::String),
            )
            .with(
                StructInfo::new("Dest")
                    .with_property("one", Type::String)
                    .with_property("two", Type::String)
                    .with_property("v3", Type::String)
                    .with_property("v4", Type::String),
            );
        let mapper = fixtures::mapper(registry);
        mapper
            .add_mappings(&Type::structure("Source"), &Type::structure("Dest"), |m| {
                m.skip("one")
                    .map("three", "v3")
                    .map("two", "two")
                    .map("four", "v4");
            })
            .unwrap();

        let source = Object::new("Source");
        for (slot, value) in [("one", "1"), ("two", "2"), ("three", "3"), ("four", "4")] {
            source.set(slot, Value::from(value));
        }
        let dest = mapper.map(&Value::Object(source), &Type::structure("Dest")).unwrap();
        let dest = object(&dest);
        assert_eq!(dest.get("one"), Value::Null);
        assert_eq!(dest.get("two"), Value::from("2"));
        assert_eq!(dest.get("v3"), Value::from("3"));
        assert_eq!(dest.get("v4"), Value::from("4"));
    }

    #[test]
    fn unmatched_underscore_keys_are_ignored() {
        let registry = TypeRegistry::new().with(StructInfo::new("Dst").with_property("x", Type::String));
        let mapper = fixtures::mapper(registry);
        mapper.configure(|c| {
            c.set_name_tokenizer(NameTokenizers::underscore());
        });

        let source = Value::string_map([("__foo", Value::from("bar"))]);
        let dst = mapper.map(&source, &Type::structure("Dst"));
        assert!(dst.is_ok_and(|dst| !object(&dst).has("x")));
    }

    #[test]
    fn list_elements_are_converted_in_order() {
        let registry = TypeRegistry::new()
            .with(StructInfo::new("SourceChild").with_property("value", Type::I32))
            .with(StructInfo::new("DestChild").with_property("value", Type::String))
            .with(StructInfo::new("Parent").with_property("children", Type::list(Type::structure("SourceChild"))))
            .with(StructInfo::new("ParentDto").with_property("children", Type::list(Type::structure("DestChild"))));
        let mapper = fixtures::mapper(registry);

        let children = (1..=3)
            .map(|value| {
                let child = Object::new("SourceChild");
                child.set("value", Value::I32(value));
                Value::Object(child)
            })
            .collect();
        let parent = Object::new("Parent");
        parent.set("children", Value::List(children));

        let dto = mapper
            .map(&Value::Object(parent), &Type::structure("ParentDto"))
            .unwrap();
        let children = object(&dto).get("children");
        let values: Vec<_> = children
            .as_list()
            .unwrap()
            .iter()
            .map(|child| object(child).get("value"))
            .collect();
        assert_eq!(values, [Value::from("1"), Value::from("2"), Value::from("3")]);
    }
}
