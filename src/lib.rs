//! Object graph mapping for runtime-described types.
//!
//! - [`reflect`]: the runtime object model (types, registry, values).
//! - [`mapper`]: the [`ModelMapper`](mapper::ModelMapper) and its type maps.
//! - [`utils`]: shared hash containers.

pub use vc_mapper as mapper;
pub use vc_reflect as reflect;
pub use vc_utils as utils;
