//! Tile codes and passability classification.
//!
//! Tile codes are plain integers whose meaning belongs to the level
//! generator. The map only needs to know whether a code blocks movement,
//! which is answered by a closed [`TileClassTable`] attached at construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Integer code stored per grid cell.
pub type TileCode = i32;

/// Sentinel returned for reads outside the grid.
pub const VOID_TILE: TileCode = -1;

/// Passability class of a tile code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileClass {
    /// Agents may occupy the tile
    #[default]
    Passable,
    /// Agents may never overlap the tile
    Obstacle,
}

impl TileClass {
    /// True for [`TileClass::Obstacle`].
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Obstacle)
    }
}

/// Closed mapping from tile code to [`TileClass`].
///
/// Codes without an explicit entry fall back to the table's default class.
/// [`VOID_TILE`] always classifies as an obstacle.
///
/// # Example
///
/// ```
/// use cobble::{TileClass, TileClassTable, VOID_TILE};
///
/// let table = TileClassTable::new(TileClass::Obstacle)
///     .with(0, TileClass::Passable)
///     .with(2, TileClass::Passable);
///
/// assert_eq!(table.classify(0), TileClass::Passable);
/// assert_eq!(table.classify(1), TileClass::Obstacle);
/// assert_eq!(table.classify(VOID_TILE), TileClass::Obstacle);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileClassTable {
    /// Class used for codes with no entry
    default: TileClass,
    /// Explicit per-code classes
    entries: BTreeMap<TileCode, TileClass>,
}

impl TileClassTable {
    /// Create an empty table with the given fallback class.
    #[must_use]
    pub fn new(default: TileClass) -> Self {
        Self {
            default,
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, code: TileCode, class: TileClass) -> Self {
        self.insert(code, class);
        self
    }

    /// Set the class for a code.
    pub fn insert(&mut self, code: TileCode, class: TileClass) {
        self.entries.insert(code, class);
    }

    /// Class of a code.
    #[must_use]
    pub fn classify(&self, code: TileCode) -> TileClass {
        if code == VOID_TILE {
            return TileClass::Obstacle;
        }
        self.entries.get(&code).copied().unwrap_or(self.default)
    }

    /// Fallback class for unlisted codes.
    #[must_use]
    pub fn default_class(&self) -> TileClass {
        self.default
    }

    /// Explicit entries in code order.
    pub fn entries(&self) -> impl Iterator<Item = (TileCode, TileClass)> + '_ {
        self.entries.iter().map(|(code, class)| (*code, *class))
    }
}
