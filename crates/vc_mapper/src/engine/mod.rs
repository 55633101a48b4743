//! Mapping execution.
//!
//! - [`MappingContext`]: the state of one mapping step, handed to
//!   converters, conditions and providers.
//! - [`ParentContext`]: a read-only view of the enclosing step.
//! - `MappingEngine`: walks type maps and writes destination values.
//!
//! Every top-level call owns its caches: the destination objects created
//! per destination path, the paths whose nested mappings are suppressed,
//! and the destination already produced for each source object. The last
//! one is what lets cyclic source graphs terminate.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod engine;

// -----------------------------------------------------------------------------
// Exports

pub use context::{MappingContext, ParentContext};

pub(crate) use engine::MappingEngine;
