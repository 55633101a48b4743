use core::fmt;

/// How strongly a source matches a destination. Lower is stronger.
///
/// Used as a sort key, never as a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchStrength {
    Exact,
    IgnoringCase,
    IgnoringTokenPosition,
    IgnoringCaseAndTokenPosition,
    IgnoringPropertyPosition,
    IgnoringCaseAndPropertyPosition,
    IgnoringTokenAndPropertyPosition,
    IgnoringCaseTokenAndPropertyPosition,
    Partial,
    None,
}

impl MatchStrength {
    /// The same strength when the matched paths sit at different depths.
    pub const fn ignoring_property_position(self) -> Self {
        match self {
            Self::Exact => Self::IgnoringPropertyPosition,
            Self::IgnoringCase => Self::IgnoringCaseAndPropertyPosition,
            Self::IgnoringTokenPosition => Self::IgnoringTokenAndPropertyPosition,
            Self::IgnoringCaseAndTokenPosition => Self::IgnoringCaseTokenAndPropertyPosition,
            other => other,
        }
    }

    /// Folds per-token strengths into one: all `None` is `None`, any
    /// `None` or `Partial` is `Partial`, otherwise the weakest token wins.
    pub fn fold(strengths: &[MatchStrength]) -> Self {
        if strengths.is_empty() || strengths.iter().all(|s| *s == Self::None) {
            return Self::None;
        }
        if strengths.iter().any(|s| *s >= Self::Partial) {
            return Self::Partial;
        }
        strengths.iter().copied().max().unwrap_or(Self::None)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::IgnoringCase => "IGNORING_CASE",
            Self::IgnoringTokenPosition => "IGNORING_TOKEN_POSITION",
            Self::IgnoringCaseAndTokenPosition => "IGNORING_CASE_AND_TOKEN_POSITION",
            Self::IgnoringPropertyPosition => "IGNORING_PROPERTY_POSITION",
            Self::IgnoringCaseAndPropertyPosition => "IGNORING_CASE_AND_PROPERTY_POSITION",
            Self::IgnoringTokenAndPropertyPosition => "IGNORING_TOKEN_AND_PROPERTY_POSITION",
            Self::IgnoringCaseTokenAndPropertyPosition => "IGNORING_CASE_TOKEN_AND_PROPERTY_POSITION",
            Self::Partial => "PARTIAL",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for MatchStrength {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::MatchStrength::{
        self, Exact, IgnoringCase, IgnoringCaseAndPropertyPosition, IgnoringCaseTokenAndPropertyPosition,
        IgnoringTokenPosition, Partial,
    };

    #[test]
    fn order_is_strongest_first() {
        assert!(Exact < IgnoringCase);
        assert!(IgnoringCaseTokenAndPropertyPosition < Partial);
        assert!(Partial < MatchStrength::None);
    }

    #[test]
    fn fold_rules() {
        assert_eq!(MatchStrength::fold(&[]), MatchStrength::None);
        assert_eq!(MatchStrength::fold(&[MatchStrength::None, MatchStrength::None]), MatchStrength::None);
        assert_eq!(MatchStrength::fold(&[Exact, MatchStrength::None]), Partial);
        assert_eq!(MatchStrength::fold(&[Exact, IgnoringTokenPosition, IgnoringCase]), IgnoringTokenPosition);
        assert_eq!(IgnoringCase.ignoring_property_position(), IgnoringCaseAndPropertyPosition);
        assert_eq!(Partial.ignoring_property_position(), Partial);
    }
}
