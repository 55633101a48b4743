//! Convention-based object graph mapping over the `vc_reflect` object model.
//!
//! A [`ModelMapper`] builds one [`TypeMap`] per source and destination type
//! pair, either implicitly by matching property names or explicitly through
//! a [`PropertyMapBuilder`](builder::PropertyMapBuilder), and then copies
//! values across using converters, conditions and providers.
//!
//! - [`config`]: matching, naming and access settings.
//! - [`naming`]: tokenizers, transformers and naming conventions.
//! - [`matching`]: the `Standard`, `Loose` and `Strict` strategies.
//! - [`property`]: property descriptors and value readers.
//! - [`typemap`]: type maps and the per-mapper store.
//! - [`convert`]: converters and the built-in converter chain.
//! - [`engine`]: mapping contexts and execution.
//!
//! # Examples
//!
//! ```
//! use vc_mapper::ModelMapper;
//! use vc_reflect::info::{StructInfo, Type};
//! use vc_reflect::registry::TypeRegistry;
//! use vc_reflect::value::{Object, Value};
//!
//! let registry = TypeRegistry::new()
//!     .with(StructInfo::new("User").with_property("name", Type::String))
//!     .with(StructInfo::new("UserDto").with_property("name", Type::String));
//! let mapper = ModelMapper::new(registry);
//!
//! let user = Object::new("User");
//! user.set("name", Value::from("Ada"));
//!
//! let dto = mapper.map(&Value::Object(user), &Type::structure("UserDto")).unwrap();
//! assert_eq!(dto.as_object().unwrap().get("name"), Value::from("Ada"));
//! ```

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod mapper;
mod mapping;

pub mod builder;
pub mod condition;
pub mod config;
pub mod convert;
pub mod engine;
pub mod matching;
pub mod naming;
pub mod property;
pub mod provider;
pub mod typemap;

#[cfg(test)]
pub(crate) mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use config::{Configuration, Settings};
pub use engine::{MappingContext, ParentContext};
pub use error::{Cause, ConfigurationError, ConvertError, Error, ErrorMessage, MappingError, ValidationError};
pub use mapper::ModelMapper;
pub use mapping::{Mapping, MappingKind, MappingSource};
pub use typemap::TypeMap;
