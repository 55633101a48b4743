use alloc::sync::Arc;

use vc_reflect::info::Type;
use vc_reflect::registry::TypeRegistry;
use vc_reflect::value::Value;
use vc_utils::hash::{HashMap, HashSet};

use crate::Configuration;
use crate::convert::MatchResult;
use crate::error::{ConfigurationError, Errors};
use crate::mapping::{Mapping, MappingKind};
use crate::matching::{MatchingStrategy, PropertyNameInfo};
use crate::naming::NameableType;
use crate::property::{DescriptorCache, PropertyInfo, TypeDescriptor, join_members, join_path};
use crate::typemap::{TypeMap, TypeMapStore, TypePair};

// -----------------------------------------------------------------------------
// ImplicitMappingBuilder

/// Discovers the mappings of a type map by matching property names.
///
/// Every destination mutator, including the mutators of nested destination
/// types, is matched against every source accessor path. Nested source
/// types are searched depth first; a type already on the current source
/// branch is searched once more and then treated as a leaf, which keeps
/// self-referencing types finite.
///
/// Candidates a converter (or an existing type map) fully bridges win over
/// partially bridged ones. Several winners are ranked by the share of
/// tokens they have in common with the destination; a tie is ambiguous.
pub(crate) struct ImplicitMappingBuilder<'a> {
    type_map: &'a TypeMap,
    store: &'a TypeMapStore,
    registry: &'a TypeRegistry,
    descriptors: &'a DescriptorCache,
    config: &'a Configuration,
    strategy: Arc<dyn MatchingStrategy>,
    source_descriptor: Arc<TypeDescriptor>,
    name_info: PropertyNameInfo,
    errors: Errors,
    /// Source types on the current source branch.
    source_types: HashSet<Type>,
    /// Destination types on the current destination branch.
    destination_types: HashSet<Type>,
    mappings: Vec<Mapping>,
    partial_mappings: Vec<Mapping>,
    /// Matches no converter bridged, kept for collection destinations.
    intermediate_mappings: HashMap<PropertyInfo, Mapping>,
    merged_mappings: Vec<Mapping>,
}

impl<'a> ImplicitMappingBuilder<'a> {
    pub fn new(
        type_map: &'a TypeMap,
        store: &'a TypeMapStore,
        registry: &'a TypeRegistry,
        descriptors: &'a DescriptorCache,
        config: &'a Configuration,
        source: Option<&Value>,
    ) -> Self {
        let source_descriptor = descriptors.source_descriptor(registry, config, source, type_map.source_type());
        Self {
            type_map,
            store,
            registry,
            descriptors,
            config,
            strategy: config.matching_strategy().clone(),
            source_descriptor,
            name_info: PropertyNameInfo::new(type_map.source_type(), config),
            errors: Errors::new(),
            source_types: HashSet::default(),
            destination_types: HashSet::default(),
            mappings: Vec::new(),
            partial_mappings: Vec::new(),
            intermediate_mappings: HashMap::default(),
            merged_mappings: Vec::new(),
        }
    }

    /// Adds the discovered mappings to the type map.
    ///
    /// Paths the type map already maps are left alone. Ambiguous
    /// destinations are reported together once every destination has been
    /// visited.
    pub fn build(mut self) -> Result<(), ConfigurationError> {
        let destination = self.descriptors.descriptor(
            self.registry,
            self.config,
            self.type_map.destination_type(),
        );
        self.match_destination(&destination);
        self.errors.into_configuration()
    }

    fn match_destination(&mut self, descriptor: &TypeDescriptor) {
        self.destination_types.insert(descriptor.ty().clone());

        for (name, mutator) in descriptor.mutators().iter() {
            self.name_info.push_destination(name, mutator);
            let path = join_path(self.name_info.destination_properties());
            let existing = self.type_map.mapping_for(&path);

            if existing.is_none() {
                let source = self.source_descriptor.clone();
                self.match_source(&source, mutator, false);
                self.name_info.clear_source();
                self.source_types.clear();
            }

            if self.mappings.is_empty() {
                self.mappings.append(&mut self.partial_mappings);
            }

            if !self.mappings.is_empty() {
                self.commit();
            } else if !self.merged_mappings.is_empty() {
                for mapping in self.merged_mappings.drain(..) {
                    self.type_map.add_mapping_if_absent(mapping);
                }
            } else if self.should_recurse(mutator, &path, existing.as_deref()) {
                let nested = self.descriptors.descriptor(self.registry, self.config, mutator.ty());
                self.match_destination(&nested);
            }

            self.name_info.pop_destination();
        }

        self.destination_types.remove(descriptor.ty());
    }

    fn match_source(&mut self, descriptor: &TypeDescriptor, mutator: &PropertyInfo, hit_same_type: bool) {
        self.source_types.insert(descriptor.ty().clone());

        for (name, accessor) in descriptor.accessors().iter() {
            self.name_info.push_source(name, accessor);
            let mut done = false;

            if self.strategy.accepts(&self.name_info) {
                log::trace!(
                    "{} matches {} ({})",
                    join_members(self.name_info.source_properties()),
                    join_members(self.name_info.destination_properties()),
                    self.name_info.strength().as_str(),
                );
                done = self.add_candidate(accessor, mutator);
            }

            if !done && !hit_same_type && accessor.ty().might_contain_properties() {
                if accessor.is_reader() {
                    let nested = self.descriptors.accessor_descriptor(self.registry, self.config, accessor);
                    self.match_source(&nested, mutator, false);
                } else {
                    let nested = self.descriptors.descriptor(self.registry, self.config, accessor.ty());
                    let seen = self.source_types.contains(accessor.ty());
                    self.match_source(&nested, mutator, seen);
                }
            }

            self.name_info.pop_source();
            if done {
                break;
            }
        }

        if !hit_same_type {
            self.source_types.remove(descriptor.ty());
        }
    }

    /// Records the current source path as a candidate for `mutator`.
    /// Returns `true` when an exact strategy needs no further candidates.
    fn add_candidate(&mut self, accessor: &PropertyInfo, mutator: &PropertyInfo) -> bool {
        let source = self.name_info.source_properties();
        let destination = self.name_info.destination_properties();

        if self.destination_types.contains(mutator.ty()) {
            self.mappings.push(Mapping::implicit(source, destination, true));
            return false;
        }

        let pair = TypePair::new(accessor.ty().clone(), mutator.ty().clone(), None);
        if let Some(existing) = self.store.get(&pair) {
            match existing.converter() {
                Some(converter) => self.mappings.push(Mapping::implicit_with(
                    source,
                    destination,
                    Some(converter),
                    existing.provider(),
                )),
                None => {
                    for mapping in existing.mappings() {
                        self.merged_mappings.push(mapping.merged_copy(source, destination));
                    }
                }
            }
            self.intermediate_mappings
                .insert(accessor.clone(), Mapping::implicit(source, destination, false));
            return self.strategy.is_exact();
        }

        let mut matched = false;
        for converter in self.config.converters().converters() {
            match converter.match_types(accessor.ty(), mutator.ty(), self.registry) {
                MatchResult::None => {}
                MatchResult::Full => {
                    self.mappings.push(Mapping::implicit(source, destination, false));
                    return self.strategy.is_exact();
                }
                MatchResult::Partial => {
                    matched = true;
                    if !self.config.is_full_type_matching_required() {
                        self.partial_mappings.push(Mapping::implicit(source, destination, false));
                        return false;
                    }
                }
            }
        }

        // Types that need constructor arguments are mapped through their own
        // type map instead of being flattened.
        if !matched && self.needs_arguments(mutator.ty()) && accessor.ty().might_contain_properties() {
            self.mappings.push(Mapping::implicit(source, destination, false));
            return self.strategy.is_exact();
        }

        if !matched {
            self.intermediate_mappings
                .insert(accessor.clone(), Mapping::implicit(source, destination, false));
        }
        false
    }

    /// Commits the single or best candidate of the current destination.
    fn commit(&mut self) {
        let candidates = core::mem::take(&mut self.mappings);
        let mapping = if candidates.len() == 1 {
            candidates.into_iter().next()
        } else {
            match self.disambiguate(&candidates) {
                Some(index) => candidates.into_iter().nth(index),
                None => {
                    let destination = join_members(self.name_info.destination_properties());
                    let sources = candidates
                        .iter()
                        .map(|m| format!("\t{}", join_members(m.source_properties())))
                        .collect::<Vec<_>>()
                        .join("\n");
                    if self.config.is_ambiguity_ignored() {
                        log::warn!("ignoring ambiguous destination {destination}:\n{sources}");
                    } else {
                        self.errors.add(format!(
                            "The destination property {destination} matches multiple source property hierarchies:\n\n{sources}"
                        ));
                    }
                    None
                }
            }
        };

        if let Some(mapping) = mapping {
            log::debug!("{}: {mapping}", self.type_map);
            let iterable = mapping.last_destination_property().ty().is_iterable();
            let path = mapping.path().to_owned();
            let sources = mapping.source_properties().to_vec();
            self.type_map.add_mapping_if_absent(mapping);

            if iterable {
                for accessor in &sources {
                    if let Some(intermediate) = self.intermediate_mappings.remove(accessor)
                        && intermediate.path() != path
                    {
                        self.type_map.add_mapping_if_absent(intermediate);
                    }
                }
            }
        }

        self.partial_mappings.clear();
        self.intermediate_mappings.clear();
    }

    /// Picks the candidate sharing the largest share of tokens with the
    /// destination. Returns `None` on a tie.
    fn disambiguate(&self, candidates: &[Mapping]) -> Option<usize> {
        let destination = self.tokens(candidates[0].destination_properties(), false);

        // (matched, total) per candidate; compared as fractions.
        let ratios: Vec<(usize, usize)> = candidates
            .iter()
            .map(|candidate| {
                let mut unmatched = self.tokens(candidate.source_properties(), true);
                let total = unmatched.len() + destination.len();
                let mut matched = 0;
                for token in &destination {
                    if let Some(index) = unmatched.iter().position(|s| s.eq_ignore_ascii_case(token)) {
                        unmatched.remove(index);
                        matched += 1;
                    }
                }
                (matched, total.max(1))
            })
            .collect();

        let mut best = 0;
        let mut tied = false;
        for (index, &(matched, total)) in ratios.iter().enumerate().skip(1) {
            let (best_matched, best_total) = ratios[best];
            let lhs = matched * best_total;
            let rhs = best_matched * total;
            if lhs > rhs {
                best = index;
                tied = false;
            } else if lhs == rhs {
                tied = true;
            }
        }
        (!tied).then_some(best)
    }

    fn tokens(&self, properties: &[PropertyInfo], source: bool) -> Vec<String> {
        let tokenizer = if source {
            self.config.source_name_tokenizer()
        } else {
            self.config.destination_name_tokenizer()
        };
        properties
            .iter()
            .flat_map(|p| tokenizer.tokenize(p.name(), NameableType::for_property_kind(p.kind())))
            .collect()
    }

    fn should_recurse(&self, mutator: &PropertyInfo, path: &str, existing: Option<&Mapping>) -> bool {
        mutator.ty().might_contain_properties()
            && !mutator.is_parameter()
            && !self.destination_types.contains(mutator.ty())
            && !self.type_map.is_skipped(path)
            && !self.needs_arguments(mutator.ty())
            && !existing.is_some_and(|m| self.is_convertible(m))
    }

    /// Returns `true` if an existing mapping already bridges its whole value.
    fn is_convertible(&self, mapping: &Mapping) -> bool {
        if !matches!(mapping.kind(), MappingKind::Property | MappingKind::Circular) || mapping.provider().is_some() {
            return false;
        }
        let Some(source) = mapping.last_source_property() else {
            return false;
        };
        let destination = mapping.last_destination_property();
        self.config
            .converters()
            .first_supported(source.ty(), destination.ty(), self.registry)
            .is_some()
            || self
                .store
                .get(&TypePair::new(source.ty().clone(), destination.ty().clone(), None))
                .is_some()
    }

    fn needs_arguments(&self, ty: &Type) -> bool {
        self.registry
            .get_type(ty)
            .is_some_and(|info| info.constructor().has_params())
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::{StructInfo, Type};
    use vc_reflect::registry::TypeRegistry;

    use crate::ModelMapper;
    use crate::error::Error;
    use crate::fixtures;
    use crate::matching::MatchingStrategies;

    fn paths(mapper: &ModelMapper, source: &str, destination: &str) -> Vec<String> {
        let type_map = mapper
            .create_type_map(&Type::structure(source), &Type::structure(destination), None, None)
            .unwrap();
        type_map.mappings().iter().map(|m| m.path().to_owned()).collect()
    }

    #[test]
    fn flattens_and_unflattens() {
        let mapper = fixtures::mapper(fixtures::orders());
        assert_eq!(
            paths(&mapper, "Order", "OrderDto"),
            ["customerName.", "shippingAddressCity.", "shippingAddressStreet."]
        );
        assert_eq!(
            paths(&mapper, "OrderDto", "Order"),
            ["customer.name.", "shippingAddress.city.", "shippingAddress.street."]
        );
    }

    #[test]
    fn best_token_ratio_wins() {
        // Under the loose strategy both `street.name` and `name` match
        // `streetName`; the first shares two of its tokens, the second one.
        let registry = TypeRegistry::new()
            .with(
                StructInfo::new("Src")
                    .with_property("street", Type::structure("Street"))
                    .with_property("name", Type::String),
            )
            .with(StructInfo::new("Street").with_property("name", Type::String))
            .with(StructInfo::new("Dst").with_property("streetName", Type::String));
        let mapper = fixtures::mapper(registry);
        mapper.configure(|c| {
            c.set_matching_strategy(MatchingStrategies::loose());
        });

        let type_map = mapper
            .create_type_map(&Type::structure("Src"), &Type::structure("Dst"), None, None)
            .unwrap();
        let mapping = type_map.mapping_for("streetName.").unwrap();
        let names: Vec<&str> = mapping.source_properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["street", "name"]);
    }

    #[test]
    fn ties_are_ambiguous() {
        let mapper = fixtures::mapper(fixtures::ambiguous());
        mapper.configure(|c| {
            c.set_matching_strategy(MatchingStrategies::loose());
        });
        let result = mapper.create_type_map(&Type::structure("Src"), &Type::structure("Dst"), None, None);
        let Err(Error::Configuration(error)) = result else {
            panic!("expected a configuration error");
        };
        assert_eq!(error.messages().len(), 1);
        assert!(
            error.messages()[0]
                .message()
                .starts_with("The destination property Dst.setName() matches multiple source property hierarchies")
        );
        assert!(mapper.type_map(&Type::structure("Src"), &Type::structure("Dst"), None).is_none());

        let lenient = fixtures::mapper(fixtures::ambiguous());
        lenient.configure(|c| {
            c.set_matching_strategy(MatchingStrategies::loose()).set_ambiguity_ignored(true);
        });
        let type_map = lenient
            .create_type_map(&Type::structure("Src"), &Type::structure("Dst"), None, None)
            .unwrap();
        assert!(type_map.mapping_for("name.").is_none());
    }

    #[test]
    fn explicit_paths_are_not_rematched() {
        let mapper = fixtures::mapper(fixtures::orders());
        mapper
            .add_mappings(&Type::structure("Order"), &Type::structure("OrderDto"), |m| {
                m.map_constant("n/a", "customerName");
            })
            .unwrap();
        let type_map = mapper
            .type_map(&Type::structure("Order"), &Type::structure("OrderDto"), None)
            .unwrap();
        let mapping = type_map.mapping_for("customerName.").unwrap();
        assert!(mapping.is_explicit());
        assert_eq!(type_map.mappings().len(), 3);
    }

    #[test]
    fn collection_members_keep_their_bridged_parent() {
        let registry = TypeRegistry::new()
            .with(StructInfo::new("Customer").with_property("tags", Type::list(Type::String)))
            .with(StructInfo::new("CustomerDto").with_property("tags", Type::list(Type::String)))
            .with(StructInfo::new("Order").with_property("customer", Type::structure("Customer")))
            .with(StructInfo::new("OrderDto").with_property("customer", Type::structure("CustomerDto")));
        let mapper = fixtures::mapper(registry);

        // An empty type map for the nested pair still bridges `customer`.
        let mut config = (*mapper.configuration()).clone();
        config.set_implicit_mapping_enabled(false);
        mapper
            .create_type_map(&Type::structure("Customer"), &Type::structure("CustomerDto"), None, Some(config))
            .unwrap();

        assert_eq!(paths(&mapper, "Order", "OrderDto"), ["customer.", "customer.tags."]);
    }

    #[test]
    fn self_references_terminate() {
        let mapper = fixtures::mapper(fixtures::people());
        let type_map = mapper
            .create_type_map(&Type::structure("Person"), &Type::structure("PersonDto"), None, None)
            .unwrap();
        let mapping = type_map.mapping_for("person.").unwrap();
        assert!(mapping.is_cyclic());
        assert!(type_map.mapping_for("name.").is_some());
    }
}
