//! Producers of mappings.
//!
//! - [`PropertyMapBuilder`]: declares explicit mappings by dotted member path.
//! - `ImplicitMappingBuilder`: discovers the remaining mappings of a type
//!   map by matching property names.

// -----------------------------------------------------------------------------
// Modules

mod explicit;
mod implicit;

// -----------------------------------------------------------------------------
// Exports

pub use explicit::{MappingOptionsBuilder, PropertyMapBuilder};

pub(crate) use implicit::ImplicitMappingBuilder;
