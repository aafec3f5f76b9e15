//! Utility types.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Ordered hash map. Iteration follows insertion order, which keeps the
/// numbering of generated states stable across runs.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// Ordered hash set.
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
