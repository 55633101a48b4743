//! Runtime type descriptions.
//!
//! - [`TypeName`]: the name of a struct type.
//! - [`Type`]: a declared or runtime type (scalars, struct, list, array, map).
//! - [`AccessLevel`]: member visibility, public to private.
//! - [`StructInfo`]: fields, getter/setter methods, parent and constructor of a struct type.
//!     - [`FieldInfo`]: a field, stored in the object slot of the same name.
//!     - [`MethodInfo`]: a getter or setter with its body.
//!     - [`Constructor`]: default, parameterized or none.

// -----------------------------------------------------------------------------
// Modules

mod access_level;
mod constructor;
mod field_info;
mod method_info;
mod struct_info;
mod ty;
mod type_name;

// -----------------------------------------------------------------------------
// Exports

pub use access_level::AccessLevel;
pub use constructor::{Constructor, FactoryFn, ParamInfo};
pub use field_info::FieldInfo;
pub use method_info::{GetterFn, MethodBody, MethodInfo, SetterFn};
pub use struct_info::StructInfo;
pub use ty::Type;
pub use type_name::TypeName;
