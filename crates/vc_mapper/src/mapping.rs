//! The mapping data model: one resolved correspondence between a source
//! expression and a destination property path.

use alloc::sync::Arc;
use core::fmt;

use vc_reflect::info::Type;
use vc_reflect::value::Value;

use crate::condition::Condition;
use crate::convert::Converter;
use crate::property::{PropertyInfo, join_members, join_path};
use crate::provider::Provider;

// -----------------------------------------------------------------------------
// MappingSource

/// Where the value of a [`Mapping`] comes from.
#[derive(Debug, Clone)]
pub enum MappingSource {
    /// A chain of accessors read from the source object.
    Property(Vec<PropertyInfo>),
    /// An accessor chain that leads back into the graph being mapped.
    Circular(Vec<PropertyInfo>),
    /// A value captured when the mapping was declared.
    Constant(Value),
    /// The source object itself.
    Source,
}

/// The variant of a [`Mapping`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Property,
    Circular,
    Constant,
    Source,
}

/// Per-mapping options set by the explicit builder.
#[derive(Clone, Default)]
pub(crate) struct MappingOptions {
    pub skipped: bool,
    pub condition: Option<Arc<dyn Condition>>,
    pub converter: Option<Arc<dyn Converter>>,
    pub provider: Option<Arc<dyn Provider>>,
}

// -----------------------------------------------------------------------------
// Mapping

/// A source expression bound to a destination path.
///
/// The joined destination path (`address.street.`) is the identity of a
/// mapping inside a [`TypeMap`](crate::TypeMap).
#[derive(Clone)]
pub struct Mapping {
    source: MappingSource,
    destination: Vec<PropertyInfo>,
    path: String,
    source_type: Type,
    explicit: bool,
    options: MappingOptions,
}

impl Mapping {
    fn new(
        source: MappingSource,
        destination: Vec<PropertyInfo>,
        source_type: Type,
        explicit: bool,
        options: MappingOptions,
    ) -> Self {
        debug_assert!(!destination.is_empty(), "a mapping needs a destination");
        Self {
            path: join_path(&destination),
            source,
            destination,
            source_type,
            explicit,
            options,
        }
    }

    /// An inferred property mapping; `cyclic` marks it as circular.
    pub(crate) fn implicit(source: &[PropertyInfo], destination: &[PropertyInfo], cyclic: bool) -> Self {
        let source_type = source.last().map_or(Type::Any, |p| p.ty().clone());
        let source = if cyclic {
            MappingSource::Circular(source.to_vec())
        } else {
            MappingSource::Property(source.to_vec())
        };
        Self::new(source, destination.to_vec(), source_type, false, MappingOptions::default())
    }

    /// An inferred property mapping that defers to an existing type map's
    /// converter and provider.
    pub(crate) fn implicit_with(
        source: &[PropertyInfo],
        destination: &[PropertyInfo],
        converter: Option<Arc<dyn Converter>>,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        let mut mapping = Self::implicit(source, destination, false);
        mapping.options.converter = converter;
        mapping.options.provider = provider;
        mapping
    }

    pub(crate) fn explicit(
        source: MappingSource,
        destination: Vec<PropertyInfo>,
        source_type: Type,
        options: MappingOptions,
    ) -> Self {
        Self::new(source, destination, source_type, true, options)
    }

    /// Re-roots this mapping under a matched accessor and mutator path.
    ///
    /// The copy is implicit: explicit mappings of the merged type map do
    /// not become explicit in the type map they are merged into. A source
    /// mapping becomes a property mapping of `source_prefix`.
    pub(crate) fn merged_copy(&self, source_prefix: &[PropertyInfo], destination_prefix: &[PropertyInfo]) -> Self {
        let mut destination = destination_prefix.to_vec();
        destination.extend(self.destination.iter().cloned());

        let prefixed = |own: &[PropertyInfo]| {
            let mut path = source_prefix.to_vec();
            path.extend(own.iter().cloned());
            path
        };
        let (source, source_type) = match &self.source {
            MappingSource::Property(own) => (MappingSource::Property(prefixed(own)), self.source_type.clone()),
            MappingSource::Circular(own) => (MappingSource::Circular(prefixed(own)), self.source_type.clone()),
            MappingSource::Constant(value) => (MappingSource::Constant(value.clone()), self.source_type.clone()),
            MappingSource::Source => match source_prefix.last() {
                Some(last) => (MappingSource::Property(source_prefix.to_vec()), last.ty().clone()),
                None => (MappingSource::Source, self.source_type.clone()),
            },
        };

        Self::new(source, destination, source_type, false, self.options.clone())
    }

    #[inline]
    pub fn source(&self) -> &MappingSource {
        &self.source
    }

    pub fn kind(&self) -> MappingKind {
        match self.source {
            MappingSource::Property(_) => MappingKind::Property,
            MappingSource::Circular(_) => MappingKind::Circular,
            MappingSource::Constant(_) => MappingKind::Constant,
            MappingSource::Source => MappingKind::Source,
        }
    }

    /// The accessor chain of property and circular mappings, empty otherwise.
    pub fn source_properties(&self) -> &[PropertyInfo] {
        match &self.source {
            MappingSource::Property(path) | MappingSource::Circular(path) => path,
            MappingSource::Constant(_) | MappingSource::Source => &[],
        }
    }

    #[inline]
    pub fn last_source_property(&self) -> Option<&PropertyInfo> {
        self.source_properties().last()
    }

    #[inline]
    pub fn destination_properties(&self) -> &[PropertyInfo] {
        &self.destination
    }

    #[inline]
    pub fn last_destination_property(&self) -> &PropertyInfo {
        &self.destination[self.destination.len() - 1]
    }

    /// The joined destination path with a trailing dot, e.g. `address.street.`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The type of the value this mapping reads.
    #[inline]
    pub fn source_type(&self) -> &Type {
        &self.source_type
    }

    #[inline]
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    #[inline]
    pub fn is_cyclic(&self) -> bool {
        matches!(self.source, MappingSource::Circular(_))
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.options.skipped
    }

    #[inline]
    pub fn condition(&self) -> Option<&Arc<dyn Condition>> {
        self.options.condition.as_ref()
    }

    #[inline]
    pub fn converter(&self) -> Option<&Arc<dyn Converter>> {
        self.options.converter.as_ref()
    }

    #[inline]
    pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
        self.options.provider.as_ref()
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destination = join_members(&self.destination);
        match &self.source {
            MappingSource::Property(path) => write!(f, "PropertyMapping[{} -> {destination}]", join_members(path)),
            MappingSource::Circular(path) => write!(f, "CircularMapping[{} -> {destination}]", join_members(path)),
            MappingSource::Constant(value) => write!(f, "ConstantMapping[{value} -> {destination}]"),
            MappingSource::Source => write!(f, "SourceMapping[{} -> {destination}]", self.source_type),
        }
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("source", &self.source)
            .field("path", &self.path)
            .field("explicit", &self.explicit)
            .field("skipped", &self.options.skipped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;
    use vc_reflect::value::Value;

    use super::{Mapping, MappingKind, MappingOptions, MappingSource};
    use crate::property::PropertyInfo;

    fn field(owner: &str, name: &str, ty: Type) -> PropertyInfo {
        PropertyInfo::field(Type::structure(owner), name, name, ty)
    }

    #[test]
    fn implicit_mapping_paths() {
        let customer = field("Order", "customer", Type::structure("Customer"));
        let name = field("Customer", "name", Type::String);
        let dest = field("OrderDto", "customerName", Type::String);

        let mapping = Mapping::implicit(&[customer, name], &[dest], false);
        assert_eq!(mapping.path(), "customerName.");
        assert_eq!(mapping.kind(), MappingKind::Property);
        assert_eq!(mapping.source_type(), &Type::String);
        assert!(!mapping.is_explicit());
        assert_eq!(mapping.to_string(), "PropertyMapping[Order.customer.name -> OrderDto.customerName]");
    }

    #[test]
    fn merged_copies_are_re_rooted() {
        let street = field("Address", "street", Type::String);
        let dest_street = field("AddressDto", "street", Type::String);
        let inner = Mapping::implicit(&[street], &[dest_street], false);

        let address = field("Person", "address", Type::structure("Address"));
        let dest_address = field("PersonDto", "address", Type::structure("AddressDto"));
        let merged = inner.merged_copy(&[address.clone()], &[dest_address.clone()]);
        assert_eq!(merged.path(), "address.street.");
        assert_eq!(merged.source_properties().len(), 2);

        let constant = Mapping::explicit(
            MappingSource::Constant(Value::from("x")),
            vec![field("AddressDto", "city", Type::String)],
            Type::String,
            MappingOptions::default(),
        );
        let merged = constant.merged_copy(&[address.clone()], &[dest_address.clone()]);
        assert_eq!(merged.kind(), MappingKind::Constant);
        assert_eq!(merged.path(), "address.city.");
        assert!(!merged.is_explicit());

        let source = Mapping::explicit(
            MappingSource::Source,
            vec![field("AddressDto", "raw", Type::structure("Address"))],
            Type::structure("Address"),
            MappingOptions::default(),
        );
        let merged = source.merged_copy(&[address], &[dest_address]);
        assert_eq!(merged.kind(), MappingKind::Property);
        assert_eq!(merged.source_type(), &Type::structure("Address"));
    }
}
