//! Converters: the extension point that produces destination values.
//!
//! - [`Converter`]: turns a mapping context into a value.
//! - [`ConditionalConverter`]: a converter that reports which type pairs it supports.
//! - [`ConverterStore`]: the ordered converters consulted when no type map applies.
//!
//! The built-in converters handle collections, maps, assignable values,
//! strings, numbers, booleans and characters.

// -----------------------------------------------------------------------------
// Modules

mod builtin;
mod collection;
mod converter;
mod store;

// -----------------------------------------------------------------------------
// Exports

pub use builtin::{
    AssignableConverter, BooleanConverter, CharacterConverter, NumberConverter, StringConverter,
};
pub use collection::{CollectionConverter, MapConverter};
pub use converter::{ConditionalConverter, Converter, Converters, MatchResult};
pub use store::ConverterStore;
