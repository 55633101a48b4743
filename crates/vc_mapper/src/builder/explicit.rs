use alloc::sync::Arc;

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;

use crate::Configuration;
use crate::condition::Condition;
use crate::convert::Converter;
use crate::error::Errors;
use crate::mapping::{Mapping, MappingOptions, MappingSource};
use crate::property::{DescriptorCache, PropertyInfo};
use crate::provider::Provider;

// -----------------------------------------------------------------------------
// PropertyMapBuilder

enum Declared<'s> {
    Path(&'s str),
    Constant(Value),
    Source,
}

/// Declares explicit mappings for one type map.
///
/// Paths are dotted member names relative to the source or destination
/// type, e.g. `customer.name`. Property names and member names are both
/// accepted: `getName` and `setName` resolve like `name`.
///
/// Mapped types are described at runtime by a
/// [`TypeRegistry`], not by Rust structs, so there are no
/// getter or setter items a closure could record. A path string is
/// resolved against the registered [`StructInfo`](vc_reflect::info::StructInfo)
/// when the producer runs, which reports a typo as a configuration error
/// before anything is mapped.
///
/// Declarations that cannot be resolved are collected and reported as one
/// [`ConfigurationError`](crate::ConfigurationError) when the producer
/// returns.
///
/// # Examples
///
/// ```
/// use vc_mapper::ModelMapper;
/// use vc_mapper::condition::Conditions;
/// use vc_reflect::info::{StructInfo, Type};
/// use vc_reflect::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new()
///     .with(
///         StructInfo::new("Source")
///             .with_property("login", Type::String)
///             .with_property("secret", Type::String),
///     )
///     .with(
///         StructInfo::new("Dest")
///             .with_property("user", Type::String)
///             .with_property("secret", Type::String)
///             .with_property("origin", Type::String)
///             .with_property("note", Type::String),
///     );
/// let mapper = ModelMapper::new(registry);
///
/// let type_map = mapper
///     .add_mappings(&Type::structure("Source"), &Type::structure("Dest"), |m| {
///         m.map("login", "user")
///             .skip("secret")
///             .map_constant("import", "origin");
///         m.when(Conditions::is_not_null()).map("getSecret", "setNote");
///     })
///     .unwrap();
///
/// assert!(type_map.is_skipped("secret."));
/// assert!(type_map.mapping_for("note.").unwrap().condition().is_some());
/// ```
pub struct PropertyMapBuilder<'a> {
    registry: &'a TypeRegistry,
    descriptors: &'a DescriptorCache,
    config: &'a Configuration,
    source_type: &'a Type,
    destination_type: &'a Type,
    mappings: Vec<Mapping>,
    errors: Errors,
}

impl<'a> PropertyMapBuilder<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        descriptors: &'a DescriptorCache,
        config: &'a Configuration,
        source_type: &'a Type,
        destination_type: &'a Type,
    ) -> Self {
        Self {
            registry,
            descriptors,
            config,
            source_type,
            destination_type,
            mappings: Vec::new(),
            errors: Errors::new(),
        }
    }

    pub(crate) fn finish(self) -> (Vec<Mapping>, Errors) {
        (self.mappings, self.errors)
    }

    #[inline]
    pub fn source_type(&self) -> &Type {
        self.source_type
    }

    #[inline]
    pub fn destination_type(&self) -> &Type {
        self.destination_type
    }

    /// Maps the value at `source` to `destination`.
    pub fn map(&mut self, source: &str, destination: &str) -> &mut Self {
        self.declare(Declared::Path(source), destination, MappingOptions::default());
        self
    }

    /// Never writes `destination`.
    pub fn skip(&mut self, destination: &str) -> &mut Self {
        let options = MappingOptions {
            skipped: true,
            ..MappingOptions::default()
        };
        self.declare(Declared::Constant(Value::Null), destination, options);
        self
    }

    /// Maps `source` to `destination` but never writes it, unless a
    /// condition of the mapping fails.
    pub fn skip_from(&mut self, source: &str, destination: &str) -> &mut Self {
        let options = MappingOptions {
            skipped: true,
            ..MappingOptions::default()
        };
        self.declare(Declared::Path(source), destination, options);
        self
    }

    /// Writes `value` to `destination`.
    pub fn map_constant(&mut self, value: impl Into<Value>, destination: &str) -> &mut Self {
        self.declare(Declared::Constant(value.into()), destination, MappingOptions::default());
        self
    }

    /// Maps the source object itself to `destination`.
    pub fn map_source(&mut self, destination: &str) -> &mut Self {
        self.declare(Declared::Source, destination, MappingOptions::default());
        self
    }

    /// Starts a mapping that applies only while `condition` holds.
    pub fn when(&mut self, condition: Arc<dyn Condition>) -> MappingOptionsBuilder<'_, 'a> {
        MappingOptionsBuilder::new(self).when(condition)
    }

    /// Starts a mapping whose value is produced by `converter`.
    pub fn using(&mut self, converter: Arc<dyn Converter>) -> MappingOptionsBuilder<'_, 'a> {
        MappingOptionsBuilder::new(self).using(converter)
    }

    /// Starts a mapping whose destination value is created by `provider`.
    pub fn with(&mut self, provider: Arc<dyn Provider>) -> MappingOptionsBuilder<'_, 'a> {
        MappingOptionsBuilder::new(self).with(provider)
    }

    fn declare(&mut self, source: Declared<'_>, destination: &str, options: MappingOptions) {
        let destination = self.resolve_destination(destination);
        let source = match source {
            Declared::Path(path) => self
                .resolve_source(path)
                .map(|chain| {
                    let ty = chain.last().map_or(Type::Any, |p| p.ty().clone());
                    (MappingSource::Property(chain), ty)
                }),
            Declared::Constant(value) => {
                let ty = value.runtime_type();
                Some((MappingSource::Constant(value), ty))
            }
            Declared::Source => Some((MappingSource::Source, self.source_type.clone())),
        };

        if let (Some(destination), Some((source, source_type))) = (destination, source) {
            self.mappings
                .push(Mapping::explicit(source, destination, source_type, options));
        }
    }

    fn resolve_source(&mut self, path: &str) -> Option<Vec<PropertyInfo>> {
        let mut ty = self.source_type.clone();
        let mut chain = Vec::new();
        let segments: Vec<&str> = path.split('.').collect();

        for (index, segment) in segments.iter().enumerate() {
            let descriptor = self.descriptors.descriptor(self.registry, self.config, &ty);
            let accessors = descriptor.accessors();
            let found = accessors.get(segment).or_else(|| accessors.by_member(segment)).cloned();

            let property = match found {
                Some(property) => property,
                None => match self.config.value_reader_for(&ty).filter(|_| !segment.is_empty()) {
                    // Members of key/value sources are only known at runtime.
                    Some(reader) => {
                        let member_type = if index + 1 < segments.len() {
                            Type::map(Type::String, Type::Any)
                        } else {
                            Type::Any
                        };
                        PropertyInfo::reader(ty.clone(), segment, segment, member_type, reader, None)
                    }
                    None => {
                        self.errors.add(format!(
                            "The source path {path} is invalid: {ty}.{segment} cannot be resolved."
                        ));
                        return None;
                    }
                },
            };

            ty = property.ty().clone();
            chain.push(property);
        }
        Some(chain)
    }

    fn resolve_destination(&mut self, path: &str) -> Option<Vec<PropertyInfo>> {
        let mut ty = self.destination_type.clone();
        let mut chain = Vec::new();
        let segments: Vec<&str> = path.split('.').collect();

        for (index, segment) in segments.iter().enumerate() {
            let descriptor = self.descriptors.descriptor(self.registry, self.config, &ty);
            let mutators = descriptor.mutators();
            let Some(mutator) = mutators.get(segment).or_else(|| mutators.by_member(segment)).cloned() else {
                let accessors = descriptor.accessors();
                match accessors.get(segment).or_else(|| accessors.by_member(segment)) {
                    Some(accessor) => {
                        self.errors
                            .add(format!("No corresponding mutator was found for {accessor}."));
                    }
                    None => {
                        self.errors.add(format!(
                            "The destination path {path} is invalid: {ty}.{segment} cannot be resolved."
                        ));
                    }
                }
                return None;
            };

            let last = index + 1 == segments.len();
            if mutator.is_parameter() && segments.len() > 1 {
                self.errors.add(format!(
                    "Constructor parameter {mutator} can only be mapped at the top level of {}.",
                    self.destination_type
                ));
                return None;
            }
            if !last && self.registry.get_type(mutator.ty()).is_some_and(|info| info.is_final()) {
                self.errors.add(format!("Cannot map final type {}.", mutator.ty()));
                return None;
            }

            ty = mutator.ty().clone();
            chain.push(mutator);
        }
        Some(chain)
    }
}

// -----------------------------------------------------------------------------
// MappingOptionsBuilder

/// Options for the next mapping of a [`PropertyMapBuilder`].
///
/// The terminal calls (`map`, `skip_from`, ...) create the mapping and hand
/// back the builder.
pub struct MappingOptionsBuilder<'b, 'a> {
    builder: &'b mut PropertyMapBuilder<'a>,
    options: MappingOptions,
}

impl<'b, 'a> MappingOptionsBuilder<'b, 'a> {
    fn new(builder: &'b mut PropertyMapBuilder<'a>) -> Self {
        Self {
            builder,
            options: MappingOptions::default(),
        }
    }

    pub fn when(mut self, condition: Arc<dyn Condition>) -> Self {
        self.options.condition = Some(condition);
        self
    }

    pub fn using(mut self, converter: Arc<dyn Converter>) -> Self {
        self.options.converter = Some(converter);
        self
    }

    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        self.options.provider = Some(provider);
        self
    }

    pub fn map(self, source: &str, destination: &str) -> &'b mut PropertyMapBuilder<'a> {
        self.builder.declare(Declared::Path(source), destination, self.options);
        self.builder
    }

    /// Skips `destination`. A conditional skip needs a source; use
    /// [`skip_from`](Self::skip_from).
    pub fn skip(mut self, destination: &str) -> &'b mut PropertyMapBuilder<'a> {
        if self.options.condition.is_some() {
            self.builder.errors.add(format!(
                "A conditional skip of {destination} can only be declared with skip_from(source, destination)."
            ));
            return self.builder;
        }
        self.options.skipped = true;
        self.builder
            .declare(Declared::Constant(Value::Null), destination, self.options);
        self.builder
    }

    pub fn skip_from(mut self, source: &str, destination: &str) -> &'b mut PropertyMapBuilder<'a> {
        self.options.skipped = true;
        self.builder.declare(Declared::Path(source), destination, self.options);
        self.builder
    }

    pub fn map_constant(self, value: impl Into<Value>, destination: &str) -> &'b mut PropertyMapBuilder<'a> {
        self.builder
            .declare(Declared::Constant(value.into()), destination, self.options);
        self.builder
    }

    pub fn map_source(self, destination: &str) -> &'b mut PropertyMapBuilder<'a> {
        self.builder.declare(Declared::Source, destination, self.options);
        self.builder
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::{StructInfo, Type};
    use vc_reflect::registry::TypeRegistry;

    use super::PropertyMapBuilder;
    use crate::Configuration;
    use crate::condition::Conditions;
    use crate::mapping::MappingKind;
    use crate::property::DescriptorCache;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(
                StructInfo::new("Order")
                    .with_property("customer", Type::structure("Customer"))
                    .with_property("total", Type::I32),
            )
            .with(StructInfo::new("Customer").with_property("name", Type::String))
            .with(
                StructInfo::new("OrderDto")
                    .with_property("buyer", Type::structure("Buyer"))
                    .with_property("sealed", Type::structure("Sealed"))
                    .with_read_only_property("total", Type::I32),
            )
            .with(StructInfo::new("Buyer").with_property("label", Type::String))
            .with(
                StructInfo::new("Sealed")
                    .with_final(true)
                    .with_property("value", Type::String),
            )
    }

    #[test]
    fn resolves_member_paths() {
        let registry = registry();
        let descriptors = DescriptorCache::new();
        let config = Configuration::new();
        let (source, destination) = (Type::structure("Order"), Type::structure("OrderDto"));
        let mut builder = PropertyMapBuilder::new(&registry, &descriptors, &config, &source, &destination);

        builder
            .map("customer.name", "buyer.label")
            .map_constant("x", "setSealed");
        builder.when(Conditions::is_not_null()).skip_from("getCustomer.getName", "buyer");

        let (mappings, errors) = builder.finish();
        assert!(errors.is_empty());
        assert_eq!(mappings.len(), 3);
        assert_eq!(mappings[0].path(), "buyer.label.");
        assert_eq!(mappings[0].source_type(), &Type::String);
        assert_eq!(mappings[1].kind(), MappingKind::Constant);
        assert_eq!(mappings[1].path(), "sealed.");
        assert!(mappings[2].is_skipped() && mappings[2].condition().is_some());
    }

    #[test]
    fn resolution_errors_are_batched() {
        let registry = registry();
        let descriptors = DescriptorCache::new();
        let config = Configuration::new();
        let (source, destination) = (Type::structure("Order"), Type::structure("OrderDto"));
        let mut builder = PropertyMapBuilder::new(&registry, &descriptors, &config, &source, &destination);

        builder
            .map("customer.email", "buyer.label")
            .map("total", "total")
            .map("total", "sealed.value")
            .map("total", "buyer.nothing");
        builder.when(Conditions::always()).skip("buyer");

        let (mappings, mut errors) = builder.finish();
        assert!(mappings.is_empty());
        let messages: Vec<String> = errors.take().iter().map(|m| m.message().to_owned()).collect();
        assert_eq!(messages.len(), 5);
        assert_eq!(
            messages[0],
            "The source path customer.email is invalid: Customer.email cannot be resolved."
        );
        assert_eq!(messages[1], "No corresponding mutator was found for OrderDto.getTotal().");
        assert_eq!(messages[2], "Cannot map final type Sealed.");
        assert_eq!(
            messages[3],
            "The destination path buyer.nothing is invalid: Buyer.nothing cannot be resolved."
        );
        assert!(messages[4].starts_with("A conditional skip of buyer"));
    }
}
