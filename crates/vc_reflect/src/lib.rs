//! A runtime object model for type-directed value transfer.
//!
//! Struct types are described at runtime by [`StructInfo`](info::StructInfo)
//! (fields, getter and setter methods, parent type, constructor) and kept in a
//! [`TypeRegistry`](registry::TypeRegistry). Instances are shared
//! [`Object`](value::Object) handles whose slots hold dynamically typed
//! [`Value`](value::Value)s.
//!
//! Enable the `json` feature to convert between `serde_json::Value` and [`Value`](value::Value).

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod info;
pub mod registry;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::ReflectError;
