use crate::Configuration;
use crate::matching::MatchStrength;
use crate::naming::{NameTokenizer, NameableType};
use crate::property::PropertyInfo;

// -----------------------------------------------------------------------------
// TokenMatcher

/// Compares a source token sequence with a destination token sequence.
///
/// Returns one strength per source token, followed by one
/// [`MatchStrength::None`] per destination token left unconsumed.
///
/// # Examples
///
/// ```
/// use vc_mapper::matching::{MatchStrength, TokenMatcher};
///
/// let source = ["default", "Value"];
/// let destination = ["Default", "Value", "x"];
///
/// assert_eq!(
///     TokenMatcher::match_tokens(&source, &destination),
///     [MatchStrength::IgnoringCase, MatchStrength::Exact, MatchStrength::None],
/// );
/// ```
pub struct TokenMatcher;

impl TokenMatcher {
    pub fn match_tokens<S, D>(source: &[S], destination: &[D]) -> Vec<MatchStrength>
    where
        S: AsRef<str>,
        D: AsRef<str>,
    {
        let destination: Vec<&str> = destination.iter().map(AsRef::as_ref).collect();
        let mut unmatched = destination.clone();
        let mut strengths = Vec::with_capacity(source.len() + destination.len());

        for (position, token) in source.iter().map(AsRef::as_ref).enumerate() {
            let strength = match destination.get(position) {
                Some(&dest) if dest == token => {
                    if let Some(i) = unmatched.iter().position(|t| *t == token) {
                        unmatched.remove(i);
                    }
                    MatchStrength::Exact
                }
                Some(&dest) if dest.eq_ignore_ascii_case(token) => {
                    // The exact token may have been consumed by a differently
                    // cased twin already.
                    let found = unmatched
                        .iter()
                        .position(|t| *t == dest)
                        .or_else(|| unmatched.iter().position(|t| t.eq_ignore_ascii_case(dest)));
                    if let Some(i) = found {
                        unmatched.remove(i);
                    }
                    MatchStrength::IgnoringCase
                }
                _ => Self::manually_match(&mut unmatched, &destination, token),
            };
            strengths.push(strength);
        }

        strengths.extend(unmatched.iter().map(|_| MatchStrength::None));
        strengths
    }

    fn manually_match(unmatched: &mut Vec<&str>, all: &[&str], token: &str) -> MatchStrength {
        let found = unmatched.iter().enumerate().find_map(|(i, other)| {
            if *other == token {
                Some((i, MatchStrength::IgnoringTokenPosition))
            } else if other.eq_ignore_ascii_case(token) {
                Some((i, MatchStrength::IgnoringCaseAndTokenPosition))
            } else {
                None
            }
        });
        if let Some((i, strength)) = found {
            unmatched.remove(i);
            return strength;
        }

        if all.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            MatchStrength::Partial
        } else {
            MatchStrength::None
        }
    }
}

// -----------------------------------------------------------------------------
// PropertiesMatcher

/// Runs the [`TokenMatcher`] over two property paths, tokenizing every
/// property name with the configured tokenizers.
pub struct PropertiesMatcher<'a> {
    config: &'a Configuration,
}

impl<'a> PropertiesMatcher<'a> {
    #[inline]
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    pub fn compare(&self, source: &[PropertyInfo], destination: &[PropertyInfo]) -> Vec<MatchStrength> {
        let source = all_tokens(source, &**self.config.source_name_tokenizer());
        let destination = all_tokens(destination, &**self.config.destination_name_tokenizer());
        TokenMatcher::match_tokens(&source, &destination)
    }
}

fn all_tokens(properties: &[PropertyInfo], tokenizer: &dyn NameTokenizer) -> Vec<String> {
    properties
        .iter()
        .flat_map(|p| tokenizer.tokenize(p.name(), NameableType::for_property_kind(p.kind())))
        .collect()
}

// -----------------------------------------------------------------------------
// MatchingSummary

/// The tokens of one property together with its depth in a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingSummary {
    pub tokens: Vec<String>,
    pub property_position: usize,
}

impl MatchingSummary {
    #[inline]
    pub fn new(tokens: Vec<String>, property_position: usize) -> Self {
        Self {
            tokens,
            property_position,
        }
    }

    pub fn match_against(&self, other: &MatchingSummary) -> MatchStrength {
        let same_position = self.property_position == other.property_position;
        let same_tokens = self.tokens == other.tokens;
        let same_ignoring_case = tokens_equal_ignoring_case(&self.tokens, &other.tokens);

        if same_tokens && same_position {
            MatchStrength::Exact
        } else if same_ignoring_case && same_position {
            MatchStrength::IgnoringCase
        } else if same_tokens {
            MatchStrength::IgnoringPropertyPosition
        } else if same_ignoring_case {
            MatchStrength::IgnoringCaseAndPropertyPosition
        } else if self
            .tokens
            .iter()
            .any(|t| other.tokens.iter().any(|o| o.eq_ignore_ascii_case(t)))
        {
            MatchStrength::Partial
        } else {
            MatchStrength::None
        }
    }
}

/// Every token of each side has a case-insensitive twin on the other.
fn tokens_equal_ignoring_case(a: &[String], b: &[String]) -> bool {
    let covered = |xs: &[String], ys: &[String]| {
        xs.iter().all(|x| ys.iter().any(|y| y.eq_ignore_ascii_case(x)))
    };
    covered(a, b) && covered(b, a)
}
