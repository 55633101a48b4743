use alloc::sync::Arc;
use std::sync::PoisonError;

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::{Object, Value};

use crate::Configuration;
use crate::condition::Condition;
use crate::convert::{ConditionalConverter, Converter};
use crate::engine::MappingContext;
use crate::error::{ConfigurationError, ConvertError, Error};
use crate::mapper::MapperShared;
use crate::mapping::{Mapping, MappingSource};
use crate::property::PropertyInfo;
use crate::provider::ProvisionRequest;
use crate::typemap::{TypeMap, TypePair};

// -----------------------------------------------------------------------------
// MappingEngine

/// Executes mapping calls against the type maps of one mapper.
///
/// The engine holds a snapshot of the mapper configuration taken when the
/// call starts. Nested type maps are created on demand through the
/// shared store.
pub(crate) struct MappingEngine {
    shared: Arc<MapperShared>,
    config: Arc<Configuration>,
}

impl MappingEngine {
    pub fn new(shared: Arc<MapperShared>) -> Self {
        let config = shared.configuration();
        Self { shared, config }
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.shared.registry
    }

    #[inline]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Entry points

    /// Maps `source` to `destination_type`, or into `destination` when it is
    /// not `Null`.
    pub fn map_root(
        &self,
        source: &Value,
        destination: Value,
        destination_type: Type,
        type_map_name: Option<Arc<str>>,
    ) -> Result<Value, Error> {
        let mut ctx = MappingContext::root(self, source.clone(), destination, destination_type, type_map_name);
        let result = self.map(&mut ctx);
        Self::finish(&ctx, result)
    }

    /// Applies `type_map` to `source`.
    pub fn map_with(&self, type_map: &Arc<TypeMap>, source: &Value, destination: Value) -> Result<Value, Error> {
        let mut ctx = MappingContext::root(
            self,
            source.clone(),
            destination,
            type_map.destination_type().clone(),
            type_map.name_arc().cloned(),
        );
        let result = self.type_map(&mut ctx, type_map);
        Self::finish(&ctx, result)
    }

    fn finish(ctx: &MappingContext<'_>, result: Result<Value, ConfigurationError>) -> Result<Value, Error> {
        let value = result?;
        ctx.invocation.take_errors().into_mapping()?;
        Ok(value)
    }

    #[cfg(test)]
    pub fn with_root_context<R>(
        &self,
        source: Value,
        destination_type: Type,
        f: impl FnOnce(&mut MappingContext<'_>) -> R,
    ) -> R {
        let mut ctx = MappingContext::root(self, source, Value::Null, destination_type, None);
        f(&mut ctx)
    }

    // -------------------------------------------------------------------------
    // Mapping

    /// Maps the context through an existing type map, a converter, or a new
    /// type map, in that order.
    pub fn map(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConfigurationError> {
        if ctx.source.is_null() {
            return Ok(ctx.destination.clone());
        }

        if !ctx.destination_type.is_iterable()
            && let Some(existing) = ctx.destination_for(&ctx.source)
            && self.registry().is_assignable(&existing.runtime_type(), &ctx.destination_type)
        {
            return Ok(existing);
        }

        let pair = TypePair::new(
            ctx.source_type.clone(),
            ctx.destination_type.clone(),
            ctx.type_map_name.clone(),
        );
        let destination = if let Some(type_map) = self.shared.store.get(&pair) {
            self.type_map(ctx, &type_map)?
        } else if let Some(converter) = self.converter_for(&ctx.source_type, &ctx.destination_type)
            && (ctx.destination.is_null()
                || ctx.parent.is_some()
                || ctx.destination_type.struct_name().is_none())
        {
            self.convert(ctx, &*converter)?
        } else if !ctx.source_type.is_primitive() && !ctx.destination_type.is_primitive() {
            let source = ctx.source.clone();
            let type_map =
                self.shared
                    .store
                    .get_or_create(&self.shared, &self.config, Some(&source), pair, |_| {}, None)?;
            self.type_map(ctx, &type_map)?
        } else if self.registry().is_assignable(&ctx.destination_type, &ctx.source_type) {
            ctx.source.clone()
        } else {
            Value::Null
        };

        ctx.set_destination(destination.clone(), true);
        Ok(destination)
    }

    fn type_map(&self, ctx: &mut MappingContext<'_>, type_map: &Arc<TypeMap>) -> Result<Value, ConfigurationError> {
        if ctx.parent.is_some() && ctx.destination.is_null() {
            let existing = self.destination_property(ctx);
            ctx.set_destination(existing, false);
        }
        ctx.type_map = Some(type_map.clone());

        let no_skip = type_map.condition().is_none_or(|condition| condition.applies(&*ctx));
        if no_skip && let Some(converter) = type_map.converter() {
            return self.convert(ctx, &*converter);
        }

        if ctx.destination.is_null()
            && self.registry().is_instantiable(&ctx.destination_type)
            && self.create_destination(ctx)?.is_null()
        {
            return Ok(Value::Null);
        }

        if no_skip {
            if let Some(converter) = type_map.pre_converter() {
                let destination = self.convert(ctx, &*converter)?;
                ctx.set_destination(destination, true);
            }

            for mapping in type_map.mappings() {
                if mapping.destination_properties()[0].is_parameter() {
                    continue;
                }
                self.property_map(ctx, &mapping)?;
            }

            if let Some(converter) = type_map.post_converter() {
                let destination = self.convert(ctx, &*converter)?;
                ctx.set_destination(destination, true);
            }
        }

        Ok(ctx.destination.clone())
    }

    fn property_map(&self, ctx: &mut MappingContext<'_>, mapping: &Arc<Mapping>) -> Result<(), ConfigurationError> {
        let path = format!("{}{}", ctx.destination_path, mapping.path());
        if ctx.is_shaded(&path) {
            return Ok(());
        }
        if mapping.condition().is_none() && mapping.is_skipped() {
            return Ok(());
        }

        let Some(source) = self.resolve_source_value(ctx, mapping) else {
            return Ok(());
        };
        let mut property_ctx = ctx.property_context(source, mapping);

        if let Some(condition) = self.property_condition(ctx, mapping) {
            let applies = condition.applies(&property_ctx);
            if applies && mapping.is_skipped() {
                return Ok(());
            }
            if !applies && !mapping.is_skipped() {
                ctx.shade(path);
                return Ok(());
            }
        }

        self.set_destination_value(ctx, &mut property_ctx, mapping)
    }

    fn property_condition(&self, ctx: &MappingContext<'_>, mapping: &Mapping) -> Option<Arc<dyn Condition>> {
        mapping
            .condition()
            .cloned()
            .or_else(|| ctx.type_map.as_ref().and_then(|tm| tm.property_condition()))
            .or_else(|| self.config.property_condition().cloned())
    }

    /// Reads the source value of `mapping`. Returns `None` when a read fails.
    fn resolve_source_value(&self, ctx: &MappingContext<'_>, mapping: &Mapping) -> Option<Value> {
        match mapping.source() {
            MappingSource::Property(accessors) | MappingSource::Circular(accessors) => {
                let mut source = ctx.source.clone();
                let mut path = ctx.destination_path.clone();
                for accessor in accessors {
                    path.push_str(accessor.name());
                    path.push('.');
                    source = match accessor.read(&source) {
                        Ok(value) => value,
                        Err(e) => {
                            ctx.add_error_with_cause(format!("Failed to get value from {accessor}"), Arc::new(e));
                            return None;
                        }
                    };
                    ctx.invocation.add_parent_source(&path, source.clone());
                    if source.is_null() {
                        return Some(Value::Null);
                    }
                    if let Some(existing) = ctx.destination_for(&source) {
                        ctx.intermediates.borrow_mut().insert(path.clone(), existing);
                    }
                }
                Some(source)
            }
            MappingSource::Constant(value) => {
                ctx.invocation.add_parent_source("", value.clone());
                Some(value.clone())
            }
            MappingSource::Source => {
                ctx.invocation.add_parent_source("", ctx.source.clone());
                Some(ctx.source.clone())
            }
        }
    }

    /// Produces and writes the value of `mapping` into the destination.
    fn set_destination_value(
        &self,
        ctx: &mut MappingContext<'_>,
        property_ctx: &mut MappingContext<'_>,
        mapping: &Arc<Mapping>,
    ) -> Result<(), ConfigurationError> {
        let path = format!("{}{}", ctx.destination_path, mapping.path());
        let converter = mapping
            .converter()
            .cloned()
            .or_else(|| ctx.type_map.as_ref().and_then(|tm| tm.property_converter()));
        if converter.is_some() {
            ctx.shade(path.clone());
        }

        let destination = self.parent_destination(property_ctx, mapping);
        let Some(target) = destination.as_object().cloned() else {
            return Ok(());
        };

        let mutator = mapping.last_destination_property();
        match self.provide(property_ctx) {
            Some(provided) => property_ctx.set_destination(provided, false),
            None if property_ctx.provided_destination => {
                if let Some(existing) = self.read_member(&destination, mutator.name()) {
                    property_ctx.set_destination(existing, false);
                }
            }
            None => {}
        }

        let value = self.property_value(property_ctx, converter)?;
        ctx.paths.borrow_mut().destinations.insert(path, value.clone());

        if !value.is_null() || !self.config.is_skip_null_enabled() {
            let written = if value.is_null() {
                default_value(mutator.ty())
            } else {
                value.clone()
            };
            self.write(ctx, mutator, &target, written);
        }
        if value.is_null() {
            ctx.shade(property_ctx.destination_path.clone());
        }
        Ok(())
    }

    fn property_value(
        &self,
        property_ctx: &mut MappingContext<'_>,
        converter: Option<Arc<dyn Converter>>,
    ) -> Result<Value, ConfigurationError> {
        if let Some(converter) = converter {
            return self.convert(property_ctx, &*converter);
        }
        if !property_ctx.source.is_null() {
            return self.map(property_ctx);
        }
        match self.converter_for(&property_ctx.source_type, &property_ctx.destination_type) {
            Some(converter) => self.convert(property_ctx, &*converter),
            None => Ok(property_ctx.destination.clone()),
        }
    }

    /// Walks the mutator chain of `mapping` up to its last mutator, creating
    /// intermediate destinations as needed, and returns the object the last
    /// mutator writes into.
    fn parent_destination(&self, property_ctx: &MappingContext<'_>, mapping: &Mapping) -> Value {
        let Some(parent) = property_ctx.parent.clone() else {
            return Value::Null;
        };
        let mutators = mapping.destination_properties();
        let mut path = parent.destination_path().to_owned();
        let mut current = parent.destination().clone();

        for mutator in &mutators[..mutators.len() - 1] {
            let Some(target) = current.as_object().cloned() else {
                return Value::Null;
            };
            path.push_str(mutator.name());
            path.push('.');

            let cached = {
                let paths = parent.paths.borrow();
                paths.destinations.get(&path).filter(|v| !v.is_null()).cloned()
            };
            let mut next = cached
                .or_else(|| parent.intermediates.borrow().get(&path).cloned())
                .or_else(|| {
                    if property_ctx.provided_destination {
                        self.read_member(&current, mutator.name())
                    } else {
                        None
                    }
                })
                .unwrap_or_default();

            let source = property_ctx.invocation.parent_source(&path);
            if next.is_null() && !source.is_null() {
                next = self.create_via_global_provider(property_ctx, &source, mutator.ty());
            }

            if !next.is_null() {
                self.write(property_ctx, mutator, &target, next.clone());
                parent.paths.borrow_mut().destinations.insert(path.clone(), next.clone());
            }
            current = next;
        }
        current
    }

    /// The existing destination of a nested type map step when mapping into
    /// a provided destination.
    fn destination_property(&self, ctx: &MappingContext<'_>) -> Value {
        let (Some(mapping), Some(parent)) = (&ctx.mapping, &ctx.parent) else {
            return Value::Null;
        };
        if !ctx.provided_destination {
            return Value::Null;
        }

        let mut current = parent.destination().clone();
        for mutator in mapping.destination_properties() {
            if current.is_null() {
                break;
            }
            if let Some(next) = self.member(&current, mutator.name()) {
                current = next;
            }
        }
        current
    }

    // -------------------------------------------------------------------------
    // Destinations

    fn create_destination(&self, ctx: &mut MappingContext<'_>) -> Result<Value, ConfigurationError> {
        let destination_type = ctx.destination_type.clone();
        let destination = match self.provide(ctx) {
            Some(provided) => provided,
            None if self.needs_arguments(&destination_type) => self.construct(ctx, &destination_type)?,
            None => self.instantiate(ctx, &destination_type),
        };
        ctx.set_destination(destination.clone(), true);
        Ok(destination)
    }

    /// Asks the mapping provider, the parent type map's property provider,
    /// the type map provider and the global provider, in that order.
    fn provide(&self, ctx: &MappingContext<'_>) -> Option<Value> {
        let mut provider = None;
        if let Some(mapping) = &ctx.mapping {
            provider = mapping.provider().cloned().or_else(|| {
                ctx.parent
                    .as_ref()
                    .and_then(|p| p.type_map())
                    .and_then(|tm| tm.property_provider())
            });
        }
        let provider = provider
            .or_else(|| ctx.type_map.as_ref().and_then(|tm| tm.provider()))
            .or_else(|| self.config.provider().cloned())?;

        let provided = provider
            .get(&ProvisionRequest::new(&ctx.destination_type, &ctx.source))
            .filter(|v| !v.is_null())?;
        self.validate_provided(ctx, &ctx.destination_type, provided)
    }

    fn create_via_global_provider(&self, ctx: &MappingContext<'_>, source: &Value, ty: &Type) -> Value {
        if let Some(provider) = self.config.provider()
            && let Some(provided) = provider.get(&ProvisionRequest::new(ty, source)).filter(|v| !v.is_null())
            && let Some(valid) = self.validate_provided(ctx, ty, provided)
        {
            return valid;
        }
        self.instantiate(ctx, ty)
    }

    fn validate_provided(&self, ctx: &MappingContext<'_>, ty: &Type, provided: Value) -> Option<Value> {
        if self.registry().is_assignable(ty, &provided.runtime_type()) {
            return Some(provided);
        }
        let message = format!("The provided destination instance {provided} is not of the required type {ty}.");
        log::warn!("{message}");
        ctx.add_error(message);
        None
    }

    fn instantiate(&self, ctx: &MappingContext<'_>, ty: &Type) -> Value {
        match self.registry().instantiate(ty) {
            Ok(object) => Value::Object(object),
            Err(e) => {
                ctx.add_error_with_cause(
                    format!(
                        "Failed to instantiate instance of destination {ty}. \
                         Ensure that {ty} has a non-private no-argument constructor."
                    ),
                    Arc::new(e),
                );
                Value::Null
            }
        }
    }

    fn needs_arguments(&self, ty: &Type) -> bool {
        self.registry()
            .get_type(ty)
            .is_some_and(|info| info.constructor().has_params())
    }

    /// Creates the destination through its parameter constructor. Arguments
    /// come from the parameter mappings of the current type map; missing
    /// ones take the default of their type.
    fn construct(&self, ctx: &mut MappingContext<'_>, ty: &Type) -> Result<Value, ConfigurationError> {
        let Some(info) = self.registry().get_type(ty).cloned() else {
            return Ok(self.instantiate(ctx, ty));
        };
        let mut args: Vec<Value> = info
            .constructor()
            .params()
            .iter()
            .map(|param| default_value(param.ty()))
            .collect();

        if let Some(type_map) = ctx.type_map.clone() {
            for mapping in type_map.mappings() {
                let [parameter] = mapping.destination_properties() else {
                    continue;
                };
                let Some(index) = parameter.parameter_index() else {
                    continue;
                };
                if let Some(value) = self.parameter_value(ctx, &mapping)?
                    && !value.is_null()
                    && let Some(arg) = args.get_mut(index)
                {
                    *arg = value;
                }
            }
        }

        match self.registry().construct(ty, &args) {
            Ok(object) => Ok(Value::Object(object)),
            Err(e) => {
                ctx.add_error_with_cause(format!("Failed to construct instance of destination {ty}."), Arc::new(e));
                Ok(Value::Null)
            }
        }
    }

    fn parameter_value(
        &self,
        ctx: &mut MappingContext<'_>,
        mapping: &Arc<Mapping>,
    ) -> Result<Option<Value>, ConfigurationError> {
        if mapping.condition().is_none() && mapping.is_skipped() {
            return Ok(None);
        }
        let Some(source) = self.resolve_source_value(ctx, mapping) else {
            return Ok(None);
        };
        let mut property_ctx = ctx.property_context(source, mapping);
        if let Some(condition) = self.property_condition(ctx, mapping)
            && condition.applies(&property_ctx) == mapping.is_skipped()
        {
            return Ok(None);
        }

        let converter = mapping
            .converter()
            .cloned()
            .or_else(|| ctx.type_map.as_ref().and_then(|tm| tm.property_converter()));
        self.property_value(&mut property_ctx, converter).map(Some)
    }

    /// Reads member `name` of `value`. `None` if there is no such accessor.
    fn member(&self, value: &Value, name: &str) -> Option<Value> {
        let descriptor =
            self.shared
                .descriptors
                .source_descriptor(self.registry(), &self.config, Some(value), &value.runtime_type());
        let accessor = descriptor.accessors().get(name)?;
        accessor.read(value).ok()
    }

    #[inline]
    fn read_member(&self, value: &Value, name: &str) -> Option<Value> {
        self.member(value, name).filter(|v| !v.is_null())
    }

    fn write(&self, ctx: &MappingContext<'_>, mutator: &PropertyInfo, target: &Object, value: Value) {
        if let Err(e) = mutator.write(target, value.clone()) {
            ctx.add_error_with_cause(format!("Failed to set value '{value}' on {mutator}"), Arc::new(e));
        }
    }

    // -------------------------------------------------------------------------
    // Converters

    fn convert(&self, ctx: &mut MappingContext<'_>, converter: &dyn Converter) -> Result<Value, ConfigurationError> {
        match converter.convert(ctx) {
            Ok(value) => Ok(value),
            Err(ConvertError::Configuration(e)) => Err(e),
            Err(e) => {
                let message = format!(
                    "Converter {} failed to convert {} to {}.",
                    converter.name(),
                    ctx.source_type,
                    ctx.destination_type,
                );
                ctx.add_error_with_cause(message, Arc::new(e));
                Ok(Value::Null)
            }
        }
    }

    /// The first configured converter supporting the pair, memoized per mapper.
    fn converter_for(&self, source: &Type, destination: &Type) -> Option<Arc<dyn ConditionalConverter>> {
        let pair = TypePair::new(source.clone(), destination.clone(), None);
        {
            let cache = self.shared.converter_cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = cache.get(&pair) {
                return Some(found.clone());
            }
        }

        let converter = self
            .config
            .converters()
            .first_supported(source, destination, self.registry())?;
        self.shared
            .converter_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pair, converter.clone());
        Some(converter)
    }
}

/// The value written for a `Null` result into a property of type `ty`.
fn default_value(ty: &Type) -> Value {
    match ty {
        Type::Bool => Value::Bool(false),
        Type::Char => Value::Char('\0'),
        Type::I32 => Value::I32(0),
        Type::I64 => Value::I64(0),
        Type::F32 => Value::F32(0.0),
        Type::F64 => Value::F64(0.0),
        _ => Value::Null,
    }
}
