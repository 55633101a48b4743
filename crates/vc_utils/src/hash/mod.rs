//! Hash containers with a stable hasher, re-exports *hashbrown* and *foldhash*.
//!
//! All maps in the workspace go through these aliases so that iteration order
//! only depends on the inserted keys, never on a per-process random seed.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
///
/// Create it with [`HashMap::default`], `new` is only available
/// for hashbrown's own default hasher.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
