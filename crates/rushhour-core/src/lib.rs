//! # Rush Hour Core
//!
//! Traffic agent simulation core for Rush Hour.
//!
//! This crate drives mobile agents over a [`cobble::TileMap`]: a player
//! vehicle steered by directional input, autonomous traffic following a
//! reactive navigation state machine, and transient marker agents spawned by
//! external game rules.
//!
//! ## Architecture
//!
//! - **Agents**: one concrete [`agent::Agent`] type holding a tagged
//!   [`agent::Control`] strategy (player input, navigator, inert)
//! - **Movement**: every agent moves through [`cobble::MovementResolver`]
//!   against obstacle tiles and fence rectangles
//! - **Navigation**: intersection decisions from a turn table, feasibility
//!   probes, brake/yield heuristics and wedge recovery
//! - **Contacts**: a per-tick overlap scan invoking per-kind response hooks
//! - **Simulation**: the single-threaded, fixed-tick orchestrator with a
//!   seedable RNG and deferred spawns
//!
//! ## Usage
//!
//! ```
//! use cobble::{TileClass, TileClassTable, TileMap};
//! use glam::IVec2;
//! use rushhour_core::heading::Heading;
//! use rushhour_core::simulation::Simulation;
//! use rushhour_core::config::SimConfig;
//!
//! let classes = TileClassTable::new(TileClass::Passable).with(1, TileClass::Obstacle);
//! let map = TileMap::new(16, 16, 16, classes).unwrap();
//! let mut sim = Simulation::new(map, SimConfig::default()).unwrap();
//!
//! let car = sim.spawn_traffic(IVec2::new(8, 40), Heading::Down);
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert!(sim.agent(car).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export cobble for spatial queries
pub use cobble;

pub mod agent;
pub mod config;
pub mod contact;
pub mod event;
pub mod hash;
pub mod heading;
pub mod navigation;
pub mod player;
pub mod random;
pub mod simulation;

#[cfg(test)]
mod tests;
