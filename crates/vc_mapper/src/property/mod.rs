//! The property model: accessors, mutators and the per-type descriptors
//! that list them.
//!
//! - [`PropertyInfo`]: one readable and/or writable member.
//! - [`TypeDescriptor`]: accessors and mutators of a type, resolved once
//!   per configuration and kept in a [`DescriptorCache`].
//! - [`ValueReader`]: member discovery for untyped key/value sources.

// -----------------------------------------------------------------------------
// Modules

mod descriptor;
mod info;
mod reader;

// -----------------------------------------------------------------------------
// Exports

pub use descriptor::{DescriptorCache, DescriptorKey, PropertyMap, TypeDescriptor};
pub use info::{PropertyInfo, PropertyKind};
pub use reader::{MapValueReader, ReaderMember, ValueReader};

pub(crate) use info::{join_members, join_path};
