use alloc::sync::Arc;

use super::NameableType;

// -----------------------------------------------------------------------------
// NameTokenizer

/// Splits a property or type name into tokens.
pub trait NameTokenizer: Send + Sync {
    fn tokenize(&self, name: &str, nameable: NameableType) -> Vec<String>;

    /// A stable name, part of the descriptor cache key and of [`Settings`](crate::Settings).
    fn name(&self) -> &str;
}

/// Splits camel-case names, keeping the original case of each token.
///
/// A new token starts at an upper-case letter following a non-upper-case
/// character, at the last upper-case letter of an acronym followed by a
/// lower-case letter, and at a non-letter following a letter.
///
/// # Examples
///
/// ```
/// use vc_mapper::naming::{NameTokenizer, NameTokenizers, NameableType};
///
/// let tokens = NameTokenizers::camel_case().tokenize("customerHTTPAddress2", NameableType::Method);
/// assert_eq!(tokens, ["customer", "HTTP", "Address", "2"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseTokenizer;

impl NameTokenizer for CamelCaseTokenizer {
    fn tokenize(&self, name: &str, _nameable: NameableType) -> Vec<String> {
        let chars: Vec<char> = name.chars().collect();
        let mut tokens = Vec::new();
        let mut start = 0;

        for i in 1..chars.len() {
            let prev = chars[i - 1];
            let cur = chars[i];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());

            let acronym_end = prev.is_ascii_uppercase() && cur.is_ascii_uppercase() && next_is_lower;
            let word_start = !prev.is_ascii_uppercase() && cur.is_ascii_uppercase();
            let letter_end = prev.is_ascii_alphabetic() && !cur.is_ascii_alphabetic();

            if acronym_end || word_start || letter_end {
                tokens.push(chars[start..i].iter().collect());
                start = i;
            }
        }
        if start < chars.len() {
            tokens.push(chars[start..].iter().collect());
        }
        tokens
    }

    fn name(&self) -> &str {
        "Camel Case"
    }
}

/// Splits names on `_`, dropping empty fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnderscoreTokenizer;

impl NameTokenizer for UnderscoreTokenizer {
    fn tokenize(&self, name: &str, _nameable: NameableType) -> Vec<String> {
        name.split('_')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn name(&self) -> &str {
        "Underscore"
    }
}

// -----------------------------------------------------------------------------
// NameTokenizers

/// The built-in tokenizers.
pub struct NameTokenizers;

impl NameTokenizers {
    #[inline]
    pub fn camel_case() -> Arc<dyn NameTokenizer> {
        Arc::new(CamelCaseTokenizer)
    }

    #[inline]
    pub fn underscore() -> Arc<dyn NameTokenizer> {
        Arc::new(UnderscoreTokenizer)
    }

    /// Looks a built-in tokenizer up by its [`name`](NameTokenizer::name).
    pub fn by_name(name: &str) -> Option<Arc<dyn NameTokenizer>> {
        match name {
            "Camel Case" => Some(Self::camel_case()),
            "Underscore" => Some(Self::underscore()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CamelCaseTokenizer, NameTokenizer, UnderscoreTokenizer};
    use crate::naming::NameableType;

    fn camel(name: &str) -> Vec<String> {
        CamelCaseTokenizer.tokenize(name, NameableType::Method)
    }

    #[test]
    fn camel_case_boundaries() {
        assert_eq!(camel("getCustomerName"), ["get", "Customer", "Name"]);
        assert_eq!(camel("address"), ["address"]);
        assert_eq!(camel("XMLParser"), ["XML", "Parser"]);
        assert_eq!(camel("value2"), ["value", "2"]);
        assert_eq!(camel("v3"), ["v", "3"]);
        assert_eq!(camel("ID"), ["ID"]);
        assert!(camel("").is_empty());
    }

    #[test]
    fn underscore_drops_empty_fragments() {
        let tokens = UnderscoreTokenizer.tokenize("__foo_bar_", NameableType::Generic);
        assert_eq!(tokens, ["foo", "bar"]);
        assert!(UnderscoreTokenizer.tokenize("__", NameableType::Generic).is_empty());
    }
}
