//! Runtime values and live objects.
//!
//! - [`Value`]: a dynamically typed value (scalars, strings, lists, maps, objects).
//! - [`Object`]: a shared, lockable instance of a registered struct.
//! - [`ObjectId`]: pointer identity of an object.

// -----------------------------------------------------------------------------
// Modules

mod object;
mod value;

#[cfg(feature = "json")]
mod json;

// -----------------------------------------------------------------------------
// Exports

pub use object::{Object, ObjectId};
pub use value::Value;
