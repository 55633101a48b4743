//! Small utilities shared by the mapper crates.

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
