//! Registries and helpers shared by the unit tests.

use vc_reflect::info::{StructInfo, Type};
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;

use crate::ModelMapper;
use crate::convert::Converter;
use crate::engine::{MappingContext, MappingEngine};
use crate::error::ConvertError;

pub(crate) fn mapper(registry: TypeRegistry) -> ModelMapper {
    ModelMapper::new(registry)
}

/// `Person` and `PersonDto`, each referring to itself.
pub(crate) fn people() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            StructInfo::new("Person")
                .with_property("name", Type::String)
                .with_property("person", Type::structure("Person")),
        )
        .with(
            StructInfo::new("PersonDto")
                .with_property("name", Type::String)
                .with_property("person", Type::structure("PersonDto")),
        )
}

/// A nested `Order` and the flat `OrderDto`.
pub(crate) fn orders() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            StructInfo::new("Order")
                .with_property("customer", Type::structure("Customer"))
                .with_property("shippingAddress", Type::structure("Address")),
        )
        .with(StructInfo::new("Customer").with_property("name", Type::String))
        .with(
            StructInfo::new("Address")
                .with_property("street", Type::String)
                .with_property("city", Type::String),
        )
        .with(
            StructInfo::new("OrderDto")
                .with_property("customerName", Type::String)
                .with_property("shippingAddressStreet", Type::String)
                .with_property("shippingAddressCity", Type::String),
        )
}

/// `Dst.name` matches `first.name` and `second.name` equally well.
pub(crate) fn ambiguous() -> TypeRegistry {
    TypeRegistry::new()
        .with(
            StructInfo::new("Src")
                .with_property("first", Type::structure("First"))
                .with_property("second", Type::structure("Second")),
        )
        .with(StructInfo::new("First").with_property("name", Type::String))
        .with(StructInfo::new("Second").with_property("name", Type::String))
        .with(StructInfo::new("Dst").with_property("name", Type::String))
}

/// Runs `converter` on a root context for `source`.
pub(crate) fn convert(
    converter: &dyn Converter,
    source: Value,
    destination_type: Type,
) -> Result<Value, ConvertError> {
    let mapper = mapper(TypeRegistry::new());
    MappingEngine::new(mapper.shared())
        .with_root_context(source, destination_type, |ctx| converter.convert(ctx))
}

pub(crate) fn with_context(source: Value, destination_type: Type, f: impl FnOnce(&MappingContext<'_>)) {
    let mapper = mapper(TypeRegistry::new());
    MappingEngine::new(mapper.shared()).with_root_context(source, destination_type, |ctx| f(ctx));
}
