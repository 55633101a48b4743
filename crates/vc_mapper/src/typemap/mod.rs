//! Compiled mapping plans.
//!
//! - [`TypeMap`]: the ordered mappings for one source type, destination
//!   type and optional name, plus the type-level hooks (converters,
//!   conditions, providers).
//! - `TypeMapStore`: the per-mapper registry of type maps, built at most
//!   once per [`TypePair`].

// -----------------------------------------------------------------------------
// Modules

mod store;
mod type_map;

// -----------------------------------------------------------------------------
// Exports

pub use type_map::TypeMap;

pub(crate) use store::{TypeMapStore, TypePair};
