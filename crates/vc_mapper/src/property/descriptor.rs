use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock};

use vc_reflect::info::{Constructor, Type};
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;
use vc_utils::hash::HashMap;

use crate::Configuration;
use crate::naming::NameableType;
use crate::property::{PropertyInfo, PropertyKind};

// -----------------------------------------------------------------------------
// PropertyMap

/// Properties by name, in resolution order.
///
/// Re-inserting a name replaces the property but keeps its position, so a
/// child member shadows the parent member of the same name.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    properties: HashMap<Arc<str>, PropertyInfo>,
    names: Vec<Arc<str>>,
    /// Member name, e.g. `getName`, to property name.
    members: HashMap<Arc<str>, Arc<str>>,
}

impl PropertyMap {
    pub(crate) fn insert(&mut self, name: &str, property: PropertyInfo) {
        let name = match self.properties.get_key_value(name) {
            Some((existing, old)) => {
                let existing = existing.clone();
                if self.members.get(old.member_name()) == Some(&existing) {
                    self.members.remove(old.member_name());
                }
                existing
            }
            None => {
                let name: Arc<str> = name.into();
                self.names.push(name.clone());
                name
            }
        };
        self.members
            .entry(property.member_name().into())
            .or_insert_with(|| name.clone());
        self.properties.insert(name, property);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    /// Finds a property by its underlying member name, e.g. `getName`.
    pub fn by_member(&self, member: &str) -> Option<&PropertyInfo> {
        self.properties.get(self.members.get(member)?)
    }

    /// Properties in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyInfo)> {
        self.names
            .iter()
            .filter_map(|name| self.properties.get(name).map(|p| (&**name, p)))
    }

    pub fn values(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.iter().map(|(_, p)| p)
    }

    /// Property names in resolution order.
    #[inline]
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// The accessors and mutators of one type under one configuration.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    ty: Type,
    accessors: PropertyMap,
    mutators: PropertyMap,
}

impl TypeDescriptor {
    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn accessors(&self) -> &PropertyMap {
        &self.accessors
    }

    #[inline]
    pub fn mutators(&self) -> &PropertyMap {
        &self.mutators
    }

    /// Walks the hierarchy of `ty` from its root to `ty` itself.
    ///
    /// Fields are resolved first (only when field matching is enabled),
    /// then methods, then constructor parameters.
    fn resolve(registry: &TypeRegistry, config: &Configuration, ty: &Type) -> Self {
        let mut accessors = PropertyMap::default();
        let mut mutators = PropertyMap::default();

        if let Type::Struct(name) = ty {
            let mut chain = registry.hierarchy(name.as_str());
            chain.reverse();

            let src_convention = config.source_naming_convention();
            let dst_convention = config.destination_naming_convention();
            let src_transformer = config.source_name_transformer();
            let dst_transformer = config.destination_name_transformer();

            if config.is_field_matching_enabled() {
                let level = config.field_access_level();
                for field in chain.iter().flat_map(|info| info.fields()) {
                    if !level.permits(field.access()) {
                        continue;
                    }
                    let member = field.name();
                    if src_convention.applies(member, PropertyKind::Field) {
                        let prop = src_transformer.transform(member, NameableType::Field);
                        let info = PropertyInfo::field(ty.clone(), &prop, member, field.ty().clone());
                        accessors.insert(&prop, info);
                    }
                    if dst_convention.applies(member, PropertyKind::Field) {
                        let prop = dst_transformer.transform(member, NameableType::Field);
                        let info = PropertyInfo::field(ty.clone(), &prop, member, field.ty().clone());
                        mutators.insert(&prop, info);
                    }
                }
            }

            let level = config.method_access_level();
            for method in chain.iter().flat_map(|info| info.methods()) {
                if !level.permits(method.access()) {
                    continue;
                }
                let member = method.name();
                if method.is_getter() && src_convention.applies(member, PropertyKind::Method) {
                    let prop = src_transformer.transform(member, NameableType::Method);
                    accessors.insert(&prop, PropertyInfo::getter(ty.clone(), &prop, method.clone()));
                }
                if method.is_setter() && dst_convention.applies(member, PropertyKind::Method) {
                    let prop = dst_transformer.transform(member, NameableType::Method);
                    mutators.insert(&prop, PropertyInfo::setter(ty.clone(), &prop, method.clone()));
                }
            }

            if let Some(info) = registry.get(name.as_str())
                && let Constructor::Parameters { params, .. } = info.constructor()
            {
                for (index, param) in params.iter().enumerate() {
                    let prop = PropertyInfo::parameter(ty.clone(), param.name(), param.ty().clone(), index);
                    mutators.insert(param.name(), prop);
                }
            }
        }

        Self {
            ty: ty.clone(),
            accessors,
            mutators,
        }
    }

    /// Builds accessors from the members a value reader reports for `source`.
    fn from_reader(base: &TypeDescriptor, config: &Configuration, source: &Value) -> Option<Self> {
        let reader = config.value_reader_for(&base.ty)?;
        let transformer = config.source_name_transformer();
        let mut accessors = PropertyMap::default();

        for member in reader.member_names(source) {
            let Some(found) = reader.member(source, &member) else {
                continue;
            };
            let name = transformer.transform(&member, NameableType::Generic);
            let info = PropertyInfo::reader(
                base.ty.clone(),
                &name,
                &member,
                found.value_type,
                reader.clone(),
                found.nested,
            );
            accessors.insert(&name, info);
        }

        Some(Self {
            ty: base.ty.clone(),
            accessors,
            mutators: base.mutators.clone(),
        })
    }
}

// -----------------------------------------------------------------------------
// DescriptorKey

/// The configuration options member resolution depends on.
///
/// Structurally equal configurations produce equal keys and share cache
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorKey {
    pub source_transformer: String,
    pub destination_transformer: String,
    pub source_convention: String,
    pub destination_convention: String,
    pub field_access: u8,
    pub method_access: u8,
    pub field_matching: bool,
}

impl DescriptorKey {
    pub fn of(config: &Configuration) -> Self {
        Self {
            source_transformer: config.source_name_transformer().name().to_owned(),
            destination_transformer: config.destination_name_transformer().name().to_owned(),
            source_convention: config.source_naming_convention().name().to_owned(),
            destination_convention: config.destination_naming_convention().name().to_owned(),
            field_access: config.field_access_level() as u8,
            method_access: config.method_access_level() as u8,
            field_matching: config.is_field_matching_enabled(),
        }
    }
}

// -----------------------------------------------------------------------------
// DescriptorCache

/// Memoized [`TypeDescriptor`]s keyed by type and [`DescriptorKey`].
///
/// Entries are built once and never invalidated. Descriptors of values read
/// through a [`ValueReader`](crate::property::ValueReader) depend on the
/// value and are not cached.
#[derive(Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<(Type, DescriptorKey), Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached descriptor of `ty`, resolving it on first use.
    pub fn descriptor(
        &self,
        registry: &TypeRegistry,
        config: &Configuration,
        ty: &Type,
    ) -> Arc<TypeDescriptor> {
        let key = (ty.clone(), DescriptorKey::of(config));
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = entries.get(&key) {
                return found.clone();
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(TypeDescriptor::resolve(registry, config, ty)))
            .clone()
    }

    /// Returns the descriptor used to read `source`: built from a value
    /// reader when one supports `ty`, the cached descriptor otherwise.
    pub fn source_descriptor(
        &self,
        registry: &TypeRegistry,
        config: &Configuration,
        source: Option<&Value>,
        ty: &Type,
    ) -> Arc<TypeDescriptor> {
        let base = self.descriptor(registry, config, ty);
        match source.filter(|v| !v.is_null()) {
            Some(value) => match TypeDescriptor::from_reader(&base, config, value) {
                Some(read) => Arc::new(read),
                None => base,
            },
            None => base,
        }
    }

    /// Returns the descriptor of the value behind `accessor`.
    pub(crate) fn accessor_descriptor(
        &self,
        registry: &TypeRegistry,
        config: &Configuration,
        accessor: &PropertyInfo,
    ) -> Arc<TypeDescriptor> {
        self.source_descriptor(registry, config, accessor.nested_value(), accessor.ty())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::{AccessLevel, Constructor, FieldInfo, MethodInfo, ParamInfo, StructInfo, Type};
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::value::Value;

    use super::{DescriptorCache, DescriptorKey, PropertyMap};
    use crate::Configuration;
    use crate::property::PropertyInfo;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with(
                StructInfo::new("Base")
                    .with_property("id", Type::I64)
                    .with_property("name", Type::String)
                    .with_public_field("code", Type::String),
            )
            .with(
                StructInfo::new("Child")
                    .with_parent("Base")
                    .with_property("name", Type::I32)
                    .with_method(
                        MethodInfo::slot_getter("getSecret", Type::String, "secret")
                            .with_access(AccessLevel::Private),
                    )
                    .with_field(FieldInfo::new("hidden", Type::Bool).with_access(AccessLevel::Protected)),
            )
            .with(StructInfo::new("Point").with_constructor(Constructor::assigning(vec![
                ParamInfo::new("x", Type::I32),
                ParamInfo::new("y", Type::I32),
            ])))
    }

    #[test]
    fn replacing_a_property_keeps_its_position() {
        let mut map = PropertyMap::default();
        map.insert("id", PropertyInfo::field(Type::structure("Base"), "id", "id", Type::I64));
        map.insert("name", PropertyInfo::field(Type::structure("Base"), "name", "name", Type::String));
        map.insert("id", PropertyInfo::field(Type::structure("Child"), "id", "identifier", Type::I32));

        let names: Vec<_> = map.iter().map(|(n, _)| n.to_owned()).collect();
        assert_eq!(names, ["id", "name"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("id").unwrap().ty(), &Type::I32);
        assert_eq!(map.by_member("identifier").unwrap().ty(), &Type::I32);
        assert!(map.by_member("id").is_none());
        assert!(map.by_member("name").is_some());
    }

    #[test]
    fn child_shadows_parent_and_keeps_order() {
        let registry = registry();
        let cache = DescriptorCache::new();
        let config = Configuration::new();
        let descriptor = cache.descriptor(&registry, &config, &Type::structure("Child"));

        let names: Vec<_> = descriptor.accessors().iter().map(|(n, _)| n.to_owned()).collect();
        assert_eq!(names, ["id", "name"]);
        assert_eq!(descriptor.accessors().get("name").unwrap().ty(), &Type::I32);
        assert!(descriptor.mutators().get("id").is_some());
        assert!(descriptor.accessors().get("secret").is_none());
        assert!(descriptor.accessors().get("code").is_none());
        assert!(descriptor.accessors().by_member("getId").is_some());
    }

    #[test]
    fn field_matching_adds_permitted_fields() {
        let registry = registry();
        let cache = DescriptorCache::new();
        let mut config = Configuration::new();
        config.set_field_matching_enabled(true);

        let descriptor = cache.descriptor(&registry, &config, &Type::structure("Child"));
        assert!(descriptor.accessors().get("code").is_some());
        assert!(descriptor.accessors().get("hidden").is_none());

        config.set_field_access_level(AccessLevel::Protected);
        let descriptor = cache.descriptor(&registry, &config, &Type::structure("Child"));
        assert!(descriptor.accessors().get("hidden").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn equal_configurations_share_entries() {
        let registry = registry();
        let cache = DescriptorCache::new();
        let a = Configuration::new();
        let b = Configuration::new();
        assert_eq!(DescriptorKey::of(&a), DescriptorKey::of(&b));

        let first = cache.descriptor(&registry, &a, &Type::structure("Base"));
        let second = cache.descriptor(&registry, &b, &Type::structure("Base"));
        assert!(alloc::sync::Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn constructor_parameters_are_mutators() {
        let registry = registry();
        let descriptor = DescriptorCache::new().descriptor(&registry, &Configuration::new(), &Type::structure("Point"));
        let x = descriptor.mutators().get("x").unwrap();
        assert_eq!(x.parameter_index(), Some(0));
        assert_eq!(descriptor.mutators().get("y").unwrap().parameter_index(), Some(1));
    }

    #[test]
    fn map_sources_use_the_reader() {
        let registry = registry();
        let cache = DescriptorCache::new();
        let config = Configuration::new();
        let source = Value::string_map([
            ("firstName", Value::from("Ada")),
            ("address", Value::string_map([("city", Value::from("X"))])),
        ]);

        let descriptor = cache.source_descriptor(&registry, &config, Some(&source), &source.runtime_type());
        assert_eq!(descriptor.accessors().len(), 2);
        let address = descriptor.accessors().get("address").unwrap();
        let nested = cache.accessor_descriptor(&registry, &config, address);
        assert!(nested.accessors().get("city").is_some());
        assert_eq!(cache.len(), 1);
    }
}
