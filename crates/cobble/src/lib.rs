//! # Cobble
//!
//! Tile-grid spatial substrate for arcade traffic simulation.
//!
//! Cobble represents a level as a fixed grid of integer tile codes with a
//! closed passability table, and resolves agent movement against it:
//!
//! - **Tile queries**: bounds-checked reads and writes with a void sentinel
//! - **Obstacle extraction**: pixel rectangles of blocking tiles in a range
//! - **Sweep resolution**: axis-separated maximal displacement against
//!   obstacle and fence rectangles, so agents slide along walls
//! - **Determinism hashing**: stable hashes of map state for replay checks
//!
//! ## Quick Start
//!
//! ```
//! use cobble::{MovementResolver, Rect, TileClass, TileClassTable, TileMap};
//! use glam::IVec2;
//!
//! let classes = TileClassTable::new(TileClass::Passable).with(1, TileClass::Obstacle);
//! let mut map = TileMap::new(10, 10, 16, classes).unwrap();
//! map.set(3, 3, 1);
//!
//! // An 8x8 collider flush against the wall cannot move right.
//! let collider = Rect::new(40, 52, 8, 8);
//! let requested = IVec2::new(16, 0);
//! let obstacles = map.obstacle_rects(collider.expanded(requested));
//! let achieved = MovementResolver::new().resolve(collider, requested, &obstacles, &[map.bounds()]);
//! assert_eq!(achieved, IVec2::ZERO);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod hash;
pub mod resolver;
pub mod tile;
pub mod tilemap;

// Re-exports for convenience
pub use geom::{HeadingExt, Rect};
pub use hash::hash_tilemap;
pub use resolver::{AxisOrder, MovementResolver, Resolution};
pub use tile::{TileClass, TileClassTable, TileCode, VOID_TILE};
pub use tilemap::{TileMap, TileMapError};
