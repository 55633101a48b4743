//! Token matching and matching strategies.
//!
//! - [`MatchStrength`]: ranked verdict, strongest first.
//! - [`TokenMatcher`]: per-token strengths of two token sequences.
//! - [`PropertyNameInfo`]: the paths under comparison during a build.
//! - [`MatchingStrategy`]: `Standard`, `Loose`, `Strict` and `StrictFlatNested`.

// -----------------------------------------------------------------------------
// Modules

mod name_info;
mod strategy;
mod strength;
mod token;

// -----------------------------------------------------------------------------
// Exports

pub use name_info::PropertyNameInfo;
pub use strategy::{
    LooseMatchingStrategy, MatchingStrategies, MatchingStrategy, StandardMatchingStrategy,
    StrictFlatNestedMatchingStrategy, StrictMatchingStrategy,
};
pub use strength::MatchStrength;
pub use token::{MatchingSummary, PropertiesMatcher, TokenMatcher};
