use alloc::sync::Arc;

use vc_reflect::info::Type;

use crate::Configuration;
use crate::matching::{MatchStrength, TokenMatcher};
use crate::naming::{NameTokenizer, NameTransformer, NameableType};
use crate::property::PropertyInfo;

/// The source and destination paths currently being compared, with their
/// tokens.
///
/// The implicit builder pushes and pops properties while it walks both
/// trees; [`MatchingStrategy`](crate::matching::MatchingStrategy)
/// implementations only read it.
pub struct PropertyNameInfo {
    source_tokenizer: Arc<dyn NameTokenizer>,
    destination_tokenizer: Arc<dyn NameTokenizer>,
    source_transformer: Arc<dyn NameTransformer>,
    source_class_tokens: Vec<String>,
    source_properties: Vec<PropertyInfo>,
    source_property_tokens: Vec<Vec<String>>,
    source_property_type_tokens: Vec<Vec<String>>,
    destination_properties: Vec<PropertyInfo>,
    destination_property_tokens: Vec<Vec<String>>,
}

impl PropertyNameInfo {
    pub fn new(source_type: &Type, config: &Configuration) -> Self {
        let source_tokenizer = config.source_name_tokenizer().clone();
        let source_transformer = config.source_name_transformer().clone();
        let class_name = source_transformer.transform(source_type.simple_name(), NameableType::Class);
        let source_class_tokens = source_tokenizer.tokenize(&class_name, NameableType::Class);

        Self {
            destination_tokenizer: config.destination_name_tokenizer().clone(),
            source_tokenizer,
            source_transformer,
            source_class_tokens,
            source_properties: Vec::new(),
            source_property_tokens: Vec::new(),
            source_property_type_tokens: Vec::new(),
            destination_properties: Vec::new(),
            destination_property_tokens: Vec::new(),
        }
    }

    #[inline]
    pub fn source_properties(&self) -> &[PropertyInfo] {
        &self.source_properties
    }

    #[inline]
    pub fn destination_properties(&self) -> &[PropertyInfo] {
        &self.destination_properties
    }

    /// Tokens of each source property name.
    #[inline]
    pub fn source_property_tokens(&self) -> &[Vec<String>] {
        &self.source_property_tokens
    }

    /// Tokens of each destination property name.
    #[inline]
    pub fn destination_property_tokens(&self) -> &[Vec<String>] {
        &self.destination_property_tokens
    }

    /// Tokens of the source type's simple name.
    #[inline]
    pub fn source_class_tokens(&self) -> &[String] {
        &self.source_class_tokens
    }

    /// Tokens of the simple type name of each source property.
    #[inline]
    pub fn source_property_type_tokens(&self) -> &[Vec<String>] {
        &self.source_property_type_tokens
    }

    /// Folds token strengths and path depth into one strength.
    ///
    /// The flattened source and destination tokens are compared with the
    /// [`TokenMatcher`]. Paths of different depth are moved into the
    /// matching "ignoring property position" tier.
    pub fn strength(&self) -> MatchStrength {
        let source: Vec<&str> = self.source_property_tokens.iter().flatten().map(String::as_str).collect();
        let destination: Vec<&str> = self
            .destination_property_tokens
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();

        let strength = MatchStrength::fold(&TokenMatcher::match_tokens(&source, &destination));
        if self.source_properties.len() == self.destination_properties.len() {
            strength
        } else {
            strength.ignoring_property_position()
        }
    }

    pub(crate) fn push_source(&mut self, name: &str, property: &PropertyInfo) {
        let nameable = NameableType::for_property_kind(property.kind());
        self.source_property_tokens.push(self.source_tokenizer.tokenize(name, nameable));
        self.source_property_type_tokens.push(self.type_tokens(property.ty()));
        self.source_properties.push(property.clone());
    }

    pub(crate) fn pop_source(&mut self) {
        self.source_properties.pop();
        self.source_property_tokens.pop();
        self.source_property_type_tokens.pop();
    }

    pub(crate) fn clear_source(&mut self) {
        self.source_properties.clear();
        self.source_property_tokens.clear();
        self.source_property_type_tokens.clear();
    }

    pub(crate) fn push_destination(&mut self, name: &str, property: &PropertyInfo) {
        let nameable = NameableType::for_property_kind(property.kind());
        self.destination_property_tokens
            .push(self.destination_tokenizer.tokenize(name, nameable));
        self.destination_properties.push(property.clone());
    }

    pub(crate) fn pop_destination(&mut self) {
        self.destination_properties.pop();
        self.destination_property_tokens.pop();
    }

    fn type_tokens(&self, ty: &Type) -> Vec<String> {
        let name = self.source_transformer.transform(ty.simple_name(), NameableType::Class);
        self.source_tokenizer.tokenize(&name, NameableType::Class)
    }
}
