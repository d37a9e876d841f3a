//! State hashing for determinism verification.
//!
//! Two maps built by the same sequence of operations must hash identically.
//! Simulation-level hashes fold this value in together with agent state.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::tilemap::TileMap;

/// Compute a deterministic hash of tile map state.
///
/// This hash includes:
/// - Grid dimensions and tile size
/// - Every cell code in row-major order
/// - The classification table
#[must_use]
pub fn hash_tilemap(map: &TileMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_tilemap_into(map, &mut hasher);
    hasher.finish()
}

/// Feed tile map state into an existing hasher.
pub fn hash_tilemap_into<H: Hasher>(map: &TileMap, hasher: &mut H) {
    map.width().hash(hasher);
    map.height().hash(hasher);
    map.tile_size().hash(hasher);

    for (_, code) in map.cells() {
        code.hash(hasher);
    }

    map.classes().default_class().hash(hasher);
    for (code, class) in map.classes().entries() {
        code.hash(hasher);
        class.hash(hasher);
    }
}
