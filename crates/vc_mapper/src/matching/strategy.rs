use alloc::sync::Arc;

use crate::matching::{MatchStrength, PropertyNameInfo};

// -----------------------------------------------------------------------------
// MatchingStrategy

/// Decides whether a source path matches a destination path.
///
/// A candidate is accepted when [`matches`](Self::matches) holds and its
/// [composite strength](PropertyNameInfo::strength) is no weaker than
/// [`threshold`](Self::threshold).
pub trait MatchingStrategy: Send + Sync {
    fn matches(&self, info: &PropertyNameInfo) -> bool;

    /// Exact strategies never produce ambiguous matches, so the builder
    /// stops searching a destination once one source matched.
    fn is_exact(&self) -> bool;

    fn threshold(&self) -> MatchStrength;

    /// A stable name, part of [`Settings`](crate::Settings).
    fn name(&self) -> &str;

    /// [`matches`](Self::matches) gated by [`threshold`](Self::threshold).
    fn accepts(&self, info: &PropertyNameInfo) -> bool {
        self.matches(info) && info.strength() <= self.threshold()
    }
}

// -----------------------------------------------------------------------------
// Inexact matching

/// Counts how many destination tokens, starting at `dst_start`, are covered
/// by `src` when both token lists are read as one character stream.
///
/// `["customer", "Name"]` covers both tokens of `["customerName"]`, and
/// `["customername"]` covers both of `["customer", "Name"]`.
fn match_tokens(src: &[String], dst: &[String], dst_start: usize) -> usize {
    if dst_start >= dst.len() {
        return 0;
    }

    for src_start in 0..src.len() {
        let mut src_token = src_start;
        let mut dst_token = dst_start;
        let mut s = Chars::new(&src[src_token]);
        let mut d = Chars::new(&dst[dst_token]);

        while s.has_next() {
            if !match_token(&mut s, &mut d) {
                break;
            }
            if !s.has_next() && !d.has_next() {
                return dst_token - dst_start + 1;
            }
            if !s.has_next() && src_token + 1 >= src.len() {
                break;
            }
            if !d.has_next() && dst_token + 1 >= dst.len() {
                break;
            }
            if !s.has_next() {
                src_token += 1;
                s = Chars::new(&src[src_token]);
            }
            if !d.has_next() {
                dst_token += 1;
                d = Chars::new(&dst[dst_token]);
            }
        }
    }
    0
}

fn match_token(src: &mut Chars, dst: &mut Chars) -> bool {
    while let (Some(a), Some(b)) = (src.peek(), dst.peek()) {
        src.advance();
        dst.advance();
        if !a.to_lowercase().eq(b.to_lowercase()) || !a.to_uppercase().eq(b.to_uppercase()) {
            return false;
        }
    }
    true
}

struct Chars {
    chars: Vec<char>,
    pos: usize,
}

impl Chars {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    #[inline]
    fn has_next(&self) -> bool {
        self.pos < self.chars.len()
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }
}

fn any_token_eq(tokens: &[String], token: &str) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
}

/// Whether `token` names the source type or the type of a source property.
fn matches_source_type(info: &PropertyNameInfo, token: &str) -> bool {
    info.source_property_type_tokens()
        .iter()
        .any(|tokens| any_token_eq(tokens, token))
        || any_token_eq(info.source_class_tokens(), token)
}

// -----------------------------------------------------------------------------
// Standard

/// Every destination token must be matched, and every source property
/// must contribute at least one match. Destination tokens may also be
/// matched by source type names.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMatchingStrategy;

impl MatchingStrategy for StandardMatchingStrategy {
    fn matches(&self, info: &PropertyNameInfo) -> bool {
        let sources = info.source_property_tokens();
        let mut matched_sources = vec![false; sources.len()];

        for dst in info.destination_property_tokens() {
            let mut index = 0;
            while index < dst.len() {
                let counts: Vec<usize> = sources.iter().map(|src| match_tokens(src, dst, index)).collect();
                let max = counts.iter().copied().max().unwrap_or(0);
                if max > 0 {
                    index += max;
                    for (i, count) in counts.iter().enumerate() {
                        if *count > 0 {
                            matched_sources[i] = true;
                        }
                    }
                } else if matches_source_type(info, &dst[index]) {
                    index += 1;
                } else {
                    return false;
                }
            }
        }

        matched_sources.iter().all(|m| *m)
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn threshold(&self) -> MatchStrength {
        MatchStrength::None
    }

    fn name(&self) -> &str {
        "Standard"
    }
}

// -----------------------------------------------------------------------------
// Loose

/// Only the last destination property and the last source property have
/// to match.
#[derive(Debug, Clone, Copy, Default)]
pub struct LooseMatchingStrategy;

impl MatchingStrategy for LooseMatchingStrategy {
    fn matches(&self, info: &PropertyNameInfo) -> bool {
        let sources = info.source_property_tokens();
        let destinations = info.destination_property_tokens();
        let mut last_source_matched = false;
        let mut last_destination_matched = false;

        for dst_index in (0..destinations.len()).rev() {
            if last_source_matched {
                break;
            }
            let tokens = &destinations[dst_index];
            let is_last = dst_index + 1 == destinations.len();

            let mut token_index = 0;
            while token_index < tokens.len() {
                let mut matched = 0;
                for src_index in (0..sources.len()).rev() {
                    matched = match_tokens(&sources[src_index], tokens, token_index);
                    if matched > 0 {
                        if src_index + 1 == sources.len() {
                            last_source_matched = true;
                        }
                        break;
                    }
                }

                if is_last && (matched > 0 || matches_source_type(info, &tokens[token_index])) {
                    last_destination_matched = true;
                }
                token_index += matched.max(1);
            }
        }

        last_source_matched && last_destination_matched
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn threshold(&self) -> MatchStrength {
        MatchStrength::None
    }

    fn name(&self) -> &str {
        "Loose"
    }
}

// -----------------------------------------------------------------------------
// Strict

/// Same depth, same token count, tokens equal ignoring case at every position.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictMatchingStrategy;

impl MatchingStrategy for StrictMatchingStrategy {
    fn matches(&self, info: &PropertyNameInfo) -> bool {
        let sources = info.source_property_tokens();
        let destinations = info.destination_property_tokens();
        sources.len() == destinations.len()
            && sources.iter().zip(destinations).all(|(s, d)| {
                s.len() == d.len() && s.iter().zip(d).all(|(a, b)| a.eq_ignore_ascii_case(b))
            })
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn threshold(&self) -> MatchStrength {
        MatchStrength::IgnoringCase
    }

    fn name(&self) -> &str {
        "Strict"
    }
}

// -----------------------------------------------------------------------------
// StrictFlatNested

/// The flattened token sequences must be equal ignoring case, whatever the
/// depth: `address.street` matches `addressStreet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictFlatNestedMatchingStrategy;

impl MatchingStrategy for StrictFlatNestedMatchingStrategy {
    fn matches(&self, info: &PropertyNameInfo) -> bool {
        let flatten = |tokens: &[Vec<String>]| -> Vec<String> {
            tokens.iter().flatten().map(|t| t.to_lowercase()).collect()
        };
        let source = flatten(info.source_property_tokens());
        let destination = flatten(info.destination_property_tokens());
        !source.is_empty() && source == destination
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn threshold(&self) -> MatchStrength {
        MatchStrength::IgnoringCaseAndPropertyPosition
    }

    fn name(&self) -> &str {
        "StrictFlatNested"
    }
}

// -----------------------------------------------------------------------------
// MatchingStrategies

/// The built-in strategies.
pub struct MatchingStrategies;

impl MatchingStrategies {
    #[inline]
    pub fn standard() -> Arc<dyn MatchingStrategy> {
        Arc::new(StandardMatchingStrategy)
    }

    #[inline]
    pub fn loose() -> Arc<dyn MatchingStrategy> {
        Arc::new(LooseMatchingStrategy)
    }

    #[inline]
    pub fn strict() -> Arc<dyn MatchingStrategy> {
        Arc::new(StrictMatchingStrategy)
    }

    #[inline]
    pub fn strict_flat_nested() -> Arc<dyn MatchingStrategy> {
        Arc::new(StrictFlatNestedMatchingStrategy)
    }

    /// Looks a built-in strategy up by its [`name`](MatchingStrategy::name).
    pub fn by_name(name: &str) -> Option<Arc<dyn MatchingStrategy>> {
        match name {
            "Standard" => Some(Self::standard()),
            "Loose" => Some(Self::loose()),
            "Strict" => Some(Self::strict()),
            "StrictFlatNested" => Some(Self::strict_flat_nested()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use vc_reflect::info::Type;

    use super::{
        LooseMatchingStrategy, MatchingStrategy, StandardMatchingStrategy, StrictFlatNestedMatchingStrategy,
        StrictMatchingStrategy, match_tokens,
    };
    use crate::Configuration;
    use crate::matching::PropertyNameInfo;
    use crate::property::PropertyInfo;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    /// Builds the info for `source` (dotted) against `destination` (dotted).
    fn info(source_type: &str, source: &str, destination: &str) -> PropertyNameInfo {
        let config = Configuration::new();
        let mut info = PropertyNameInfo::new(&Type::structure(source_type), &config);
        for name in source.split('.') {
            info.push_source(name, &PropertyInfo::field(Type::structure(source_type), name, name, Type::String));
        }
        for name in destination.split('.') {
            info.push_destination(name, &PropertyInfo::field(Type::structure("Dest"), name, name, Type::String));
        }
        info
    }

    #[test]
    fn character_stream_matching() {
        assert_eq!(match_tokens(&tokens(&["customer", "Name"]), &tokens(&["customerName"]), 0), 1);
        assert_eq!(match_tokens(&tokens(&["customername"]), &tokens(&["customer", "Name"]), 0), 2);
        assert_eq!(match_tokens(&tokens(&["name"]), &tokens(&["customer", "Name"]), 1), 1);
        assert_eq!(match_tokens(&tokens(&["name"]), &tokens(&["customer", "Name"]), 0), 0);
        assert_eq!(match_tokens(&tokens(&["a"]), &tokens(&["a"]), 3), 0);
    }

    #[test]
    fn standard() {
        let s = StandardMatchingStrategy;
        assert!(s.accepts(&info("Order", "customer.name", "customerName")));
        assert!(s.accepts(&info("Order", "sampleFieldOne", "samplefieldone")));
        assert!(!s.accepts(&info("Order", "address.street", "street")));
        // the source type name may stand in for a destination token
        assert!(s.accepts(&info("Order", "number", "orderNumber")));
        assert!(!s.accepts(&info("Order", "name", "customerName")));
    }

    #[test]
    fn loose() {
        let s = LooseMatchingStrategy;
        assert!(s.accepts(&info("Order", "address.street", "street")));
        assert!(s.accepts(&info("Order", "customer.address.city", "city")));
        assert!(!s.accepts(&info("Order", "street.address", "street")));
        assert!(s.accepts(&info("Order", "samplefieldone", "sampleFieldOne")));
    }

    #[test]
    fn strict() {
        let s = StrictMatchingStrategy;
        assert!(s.accepts(&info("Order", "customer.name", "customer.Name")));
        assert!(!s.accepts(&info("Order", "customer.name", "customerName")));
        assert!(!s.accepts(&info("Order", "sampleFieldOne", "samplefieldone")));
    }

    #[test]
    fn strict_flat_nested() {
        let s = StrictFlatNestedMatchingStrategy;
        assert!(s.accepts(&info("Order", "customer.name", "customerName")));
        assert!(s.accepts(&info("Order", "customer.name", "customer.name")));
        assert!(!s.accepts(&info("Order", "customer.name", "name")));
    }
}
