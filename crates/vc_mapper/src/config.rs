use alloc::sync::Arc;
use core::fmt;

use serde::{Deserialize, Serialize};
use vc_reflect::info::{AccessLevel, Type};

use crate::condition::Condition;
use crate::convert::ConverterStore;
use crate::error::{ConfigurationError, Errors};
use crate::matching::{MatchingStrategies, MatchingStrategy};
use crate::naming::{
    NameTokenizer, NameTokenizers, NameTransformer, NameTransformers, NamingConvention,
    NamingConventions,
};
use crate::property::{DescriptorKey, MapValueReader, ValueReader};
use crate::provider::Provider;

// -----------------------------------------------------------------------------
// Configuration

/// Options that drive matching, member discovery and mapping.
///
/// Naming strategies, access levels and field matching are only read while
/// type maps are built; changing them does not affect type maps that
/// already exist.
///
/// # Examples
///
/// ```
/// use vc_mapper::Configuration;
/// use vc_mapper::matching::MatchingStrategies;
/// use vc_reflect::info::AccessLevel;
///
/// let mut config = Configuration::new();
/// config
///     .set_matching_strategy(MatchingStrategies::strict())
///     .set_field_matching_enabled(true)
///     .set_field_access_level(AccessLevel::Private);
///
/// assert_eq!(config.matching_strategy().name(), "Strict");
/// assert!(config.is_field_matching_enabled());
/// ```
#[derive(Clone)]
pub struct Configuration {
    source_name_tokenizer: Arc<dyn NameTokenizer>,
    destination_name_tokenizer: Arc<dyn NameTokenizer>,
    source_name_transformer: Arc<dyn NameTransformer>,
    destination_name_transformer: Arc<dyn NameTransformer>,
    source_naming_convention: Arc<dyn NamingConvention>,
    destination_naming_convention: Arc<dyn NamingConvention>,
    matching_strategy: Arc<dyn MatchingStrategy>,
    field_access_level: AccessLevel,
    method_access_level: AccessLevel,
    field_matching_enabled: bool,
    ambiguity_ignored: bool,
    full_type_matching_required: bool,
    implicit_mapping_enabled: bool,
    skip_null_enabled: bool,
    collections_merge_enabled: bool,
    property_condition: Option<Arc<dyn Condition>>,
    provider: Option<Arc<dyn Provider>>,
    value_readers: Vec<Arc<dyn ValueReader>>,
    converters: ConverterStore,
}

impl Configuration {
    /// Creates the default configuration: camel case tokenizers, JavaBeans
    /// naming, the standard strategy and public members only.
    pub fn new() -> Self {
        Self {
            source_name_tokenizer: NameTokenizers::camel_case(),
            destination_name_tokenizer: NameTokenizers::camel_case(),
            source_name_transformer: NameTransformers::javabeans_accessor(),
            destination_name_transformer: NameTransformers::javabeans_mutator(),
            source_naming_convention: NamingConventions::javabeans_accessor(),
            destination_naming_convention: NamingConventions::javabeans_mutator(),
            matching_strategy: MatchingStrategies::standard(),
            field_access_level: AccessLevel::Public,
            method_access_level: AccessLevel::Public,
            field_matching_enabled: false,
            ambiguity_ignored: false,
            full_type_matching_required: false,
            implicit_mapping_enabled: true,
            skip_null_enabled: false,
            collections_merge_enabled: false,
            property_condition: None,
            provider: None,
            value_readers: vec![Arc::new(MapValueReader)],
            converters: ConverterStore::new(),
        }
    }

    #[inline]
    pub fn source_name_tokenizer(&self) -> &Arc<dyn NameTokenizer> {
        &self.source_name_tokenizer
    }

    #[inline]
    pub fn destination_name_tokenizer(&self) -> &Arc<dyn NameTokenizer> {
        &self.destination_name_tokenizer
    }

    #[inline]
    pub fn source_name_transformer(&self) -> &Arc<dyn NameTransformer> {
        &self.source_name_transformer
    }

    #[inline]
    pub fn destination_name_transformer(&self) -> &Arc<dyn NameTransformer> {
        &self.destination_name_transformer
    }

    #[inline]
    pub fn source_naming_convention(&self) -> &Arc<dyn NamingConvention> {
        &self.source_naming_convention
    }

    #[inline]
    pub fn destination_naming_convention(&self) -> &Arc<dyn NamingConvention> {
        &self.destination_naming_convention
    }

    #[inline]
    pub fn matching_strategy(&self) -> &Arc<dyn MatchingStrategy> {
        &self.matching_strategy
    }

    #[inline]
    pub fn field_access_level(&self) -> AccessLevel {
        self.field_access_level
    }

    #[inline]
    pub fn method_access_level(&self) -> AccessLevel {
        self.method_access_level
    }

    #[inline]
    pub fn is_field_matching_enabled(&self) -> bool {
        self.field_matching_enabled
    }

    #[inline]
    pub fn is_ambiguity_ignored(&self) -> bool {
        self.ambiguity_ignored
    }

    /// Whether partially matched converters are refused while building.
    #[inline]
    pub fn is_full_type_matching_required(&self) -> bool {
        self.full_type_matching_required
    }

    #[inline]
    pub fn is_implicit_mapping_enabled(&self) -> bool {
        self.implicit_mapping_enabled
    }

    #[inline]
    pub fn is_skip_null_enabled(&self) -> bool {
        self.skip_null_enabled
    }

    #[inline]
    pub fn is_collections_merge_enabled(&self) -> bool {
        self.collections_merge_enabled
    }

    /// The condition applied to every property mapping without its own.
    #[inline]
    pub fn property_condition(&self) -> Option<&Arc<dyn Condition>> {
        self.property_condition.as_ref()
    }

    /// The provider consulted last when a destination must be created.
    #[inline]
    pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
        self.provider.as_ref()
    }

    #[inline]
    pub fn value_readers(&self) -> &[Arc<dyn ValueReader>] {
        &self.value_readers
    }

    /// Returns the first value reader that supports `ty`.
    pub fn value_reader_for(&self, ty: &Type) -> Option<Arc<dyn ValueReader>> {
        self.value_readers.iter().find(|r| r.supports(ty)).cloned()
    }

    #[inline]
    pub fn converters(&self) -> &ConverterStore {
        &self.converters
    }

    #[inline]
    pub fn converters_mut(&mut self) -> &mut ConverterStore {
        &mut self.converters
    }

    /// The key this configuration shares descriptor cache entries under.
    #[inline]
    pub fn descriptor_key(&self) -> DescriptorKey {
        DescriptorKey::of(self)
    }

    // -------------------------------------------------------------------------
    // Setters

    /// Sets the tokenizer of both source and destination names.
    pub fn set_name_tokenizer(&mut self, tokenizer: Arc<dyn NameTokenizer>) -> &mut Self {
        self.source_name_tokenizer = tokenizer.clone();
        self.destination_name_tokenizer = tokenizer;
        self
    }

    pub fn set_source_name_tokenizer(&mut self, tokenizer: Arc<dyn NameTokenizer>) -> &mut Self {
        self.source_name_tokenizer = tokenizer;
        self
    }

    pub fn set_destination_name_tokenizer(&mut self, tokenizer: Arc<dyn NameTokenizer>) -> &mut Self {
        self.destination_name_tokenizer = tokenizer;
        self
    }

    pub fn set_source_name_transformer(&mut self, transformer: Arc<dyn NameTransformer>) -> &mut Self {
        self.source_name_transformer = transformer;
        self
    }

    pub fn set_destination_name_transformer(
        &mut self,
        transformer: Arc<dyn NameTransformer>,
    ) -> &mut Self {
        self.destination_name_transformer = transformer;
        self
    }

    pub fn set_source_naming_convention(&mut self, convention: Arc<dyn NamingConvention>) -> &mut Self {
        self.source_naming_convention = convention;
        self
    }

    pub fn set_destination_naming_convention(
        &mut self,
        convention: Arc<dyn NamingConvention>,
    ) -> &mut Self {
        self.destination_naming_convention = convention;
        self
    }

    pub fn set_matching_strategy(&mut self, strategy: Arc<dyn MatchingStrategy>) -> &mut Self {
        self.matching_strategy = strategy;
        self
    }

    pub fn set_field_access_level(&mut self, level: AccessLevel) -> &mut Self {
        self.field_access_level = level;
        self
    }

    pub fn set_method_access_level(&mut self, level: AccessLevel) -> &mut Self {
        self.method_access_level = level;
        self
    }

    pub fn set_field_matching_enabled(&mut self, enabled: bool) -> &mut Self {
        self.field_matching_enabled = enabled;
        self
    }

    pub fn set_ambiguity_ignored(&mut self, ignored: bool) -> &mut Self {
        self.ambiguity_ignored = ignored;
        self
    }

    pub fn set_full_type_matching_required(&mut self, required: bool) -> &mut Self {
        self.full_type_matching_required = required;
        self
    }

    pub fn set_implicit_mapping_enabled(&mut self, enabled: bool) -> &mut Self {
        self.implicit_mapping_enabled = enabled;
        self
    }

    pub fn set_skip_null_enabled(&mut self, enabled: bool) -> &mut Self {
        self.skip_null_enabled = enabled;
        self
    }

    pub fn set_collections_merge_enabled(&mut self, enabled: bool) -> &mut Self {
        self.collections_merge_enabled = enabled;
        self
    }

    pub fn set_property_condition(&mut self, condition: Arc<dyn Condition>) -> &mut Self {
        self.property_condition = Some(condition);
        self
    }

    pub fn set_provider(&mut self, provider: Arc<dyn Provider>) -> &mut Self {
        self.provider = Some(provider);
        self
    }

    /// Adds a value reader ahead of the existing ones.
    pub fn add_value_reader(&mut self, reader: Arc<dyn ValueReader>) -> &mut Self {
        self.value_readers.insert(0, reader);
        self
    }

    // -------------------------------------------------------------------------
    // Settings

    /// A snapshot of the named and scalar options.
    pub fn settings(&self) -> Settings {
        Settings {
            matching_strategy: self.matching_strategy.name().to_owned(),
            source_name_tokenizer: self.source_name_tokenizer.name().to_owned(),
            destination_name_tokenizer: self.destination_name_tokenizer.name().to_owned(),
            source_name_transformer: self.source_name_transformer.name().to_owned(),
            destination_name_transformer: self.destination_name_transformer.name().to_owned(),
            source_naming_convention: self.source_naming_convention.name().to_owned(),
            destination_naming_convention: self.destination_naming_convention.name().to_owned(),
            field_access_level: self.field_access_level.as_str().to_owned(),
            method_access_level: self.method_access_level.as_str().to_owned(),
            field_matching_enabled: self.field_matching_enabled,
            ambiguity_ignored: self.ambiguity_ignored,
            full_type_matching_required: self.full_type_matching_required,
            implicit_mapping_enabled: self.implicit_mapping_enabled,
            skip_null_enabled: self.skip_null_enabled,
            collections_merge_enabled: self.collections_merge_enabled,
        }
    }

    /// Applies `settings`, resolving every strategy by name.
    ///
    /// Nothing is changed unless every name resolves; all unknown names
    /// are reported together.
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), ConfigurationError> {
        let mut errors = Errors::new();
        let mut next = self.clone();

        macro_rules! resolve {
            ($field:ident, $lookup:expr, $what:literal) => {
                match $lookup(&settings.$field) {
                    Some(found) => next.$field = found,
                    None => {
                        errors.add(format!("Unknown {} '{}'.", $what, settings.$field));
                    }
                }
            };
        }

        resolve!(matching_strategy, MatchingStrategies::by_name, "matching strategy");
        resolve!(source_name_tokenizer, NameTokenizers::by_name, "name tokenizer");
        resolve!(destination_name_tokenizer, NameTokenizers::by_name, "name tokenizer");
        resolve!(source_name_transformer, NameTransformers::by_name, "name transformer");
        resolve!(destination_name_transformer, NameTransformers::by_name, "name transformer");
        resolve!(source_naming_convention, NamingConventions::by_name, "naming convention");
        resolve!(destination_naming_convention, NamingConventions::by_name, "naming convention");
        resolve!(field_access_level, parse_access_level, "access level");
        resolve!(method_access_level, parse_access_level, "access level");
        errors.into_configuration()?;

        next.field_matching_enabled = settings.field_matching_enabled;
        next.ambiguity_ignored = settings.ambiguity_ignored;
        next.full_type_matching_required = settings.full_type_matching_required;
        next.implicit_mapping_enabled = settings.implicit_mapping_enabled;
        next.skip_null_enabled = settings.skip_null_enabled;
        next.collections_merge_enabled = settings.collections_merge_enabled;
        *self = next;
        Ok(())
    }
}

impl Default for Configuration {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("settings", &self.settings())
            .field("property_condition", &self.property_condition.is_some())
            .field("provider", &self.provider.is_some())
            .field("value_readers", &self.value_readers.iter().map(|r| r.name()).collect::<Vec<_>>())
            .field("converters", &self.converters)
            .finish()
    }
}

fn parse_access_level(name: &str) -> Option<AccessLevel> {
    [
        AccessLevel::Public,
        AccessLevel::Protected,
        AccessLevel::PackagePrivate,
        AccessLevel::Private,
    ]
    .into_iter()
    .find(|level| level.as_str() == name)
}

// -----------------------------------------------------------------------------
// Settings

/// The serializable part of a [`Configuration`].
///
/// Strategies are referred to by name. Missing entries take their default
/// values, so a settings file only lists what it changes.
///
/// # Examples
///
/// ```
/// use vc_mapper::{Configuration, Settings};
///
/// let settings = Settings {
///     matching_strategy: "Loose".into(),
///     skip_null_enabled: true,
///     ..Settings::default()
/// };
///
/// let mut config = Configuration::new();
/// config.apply_settings(&settings).unwrap();
/// assert_eq!(config.matching_strategy().name(), "Loose");
/// assert!(config.is_skip_null_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub matching_strategy: String,
    pub source_name_tokenizer: String,
    pub destination_name_tokenizer: String,
    pub source_name_transformer: String,
    pub destination_name_transformer: String,
    pub source_naming_convention: String,
    pub destination_naming_convention: String,
    pub field_access_level: String,
    pub method_access_level: String,
    pub field_matching_enabled: bool,
    pub ambiguity_ignored: bool,
    pub full_type_matching_required: bool,
    pub implicit_mapping_enabled: bool,
    pub skip_null_enabled: bool,
    pub collections_merge_enabled: bool,
}

impl Default for Settings {
    #[inline]
    fn default() -> Self {
        Configuration::new().settings()
    }
}
