//! Test helpers for building cities, scripting randomness and spawning.

use std::collections::VecDeque;

use cobble::{Rect, TileClass, TileClassTable, TileCode, TileMap};
use glam::IVec2;

use crate::agent::{Agent, AgentId};
use crate::config::SimConfig;
use crate::event::SimEvent;
use crate::heading::Heading;
use crate::random::RandomSource;
use crate::simulation::Simulation;

/// Tile edge length used by every test map.
pub const TILE: i32 = 16;

/// Code of a building tile.
pub const OBSTACLE: TileCode = 1;

// =============================================================================
// Maps
// =============================================================================

/// Passable by default, [`OBSTACLE`] blocks.
pub fn city_classes() -> TileClassTable {
    TileClassTable::new(TileClass::Passable).with(OBSTACLE, TileClass::Obstacle)
}

/// A `width` x `height` tile city of 4x4 blocks.
///
/// Each block has a 2x2 building at offsets `(1..=2, 1..=2)` and a one-tile
/// road ring around it.
pub fn city_map(width: i32, height: i32) -> TileMap {
    let mut map = TileMap::new(width, height, TILE, city_classes()).unwrap();
    for by in 0..height / 4 {
        for bx in 0..width / 4 {
            map.fill(OBSTACLE, Rect::new(bx * 4 + 1, by * 4 + 1, 2, 2));
        }
    }
    map
}

/// Pixel centre of tile `(x, y)`.
pub fn tile_center(x: i32, y: i32) -> IVec2 {
    IVec2::new(x * TILE + TILE / 2, y * TILE + TILE / 2)
}

// =============================================================================
// Randomness
// =============================================================================

/// A [`RandomSource`] replaying queued values.
///
/// Once a queue runs dry, `unit` returns the fallback (0.0 unless set) and
/// `below` returns 0.
#[derive(Debug, Default)]
pub struct ScriptedRandom {
    units: VecDeque<f32>,
    belows: VecDeque<u32>,
    fallback_unit: f32,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f32>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_belows(mut self, belows: impl IntoIterator<Item = u32>) -> Self {
        self.belows.extend(belows);
        self
    }

    pub fn with_fallback_unit(mut self, unit: f32) -> Self {
        self.fallback_unit = unit;
        self
    }

    pub fn remaining_units(&self) -> usize {
        self.units.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, n: u32) -> u32 {
        self.belows.pop_front().map_or(0, |v| v.min(n.saturating_sub(1)))
    }

    fn unit(&mut self) -> f32 {
        self.units.pop_front().unwrap_or(self.fallback_unit)
    }
}

// =============================================================================
// Simulations
// =============================================================================

/// A simulation over a 16x16 tile city with the given seed.
pub fn city_sim(seed: u64) -> Simulation {
    let config = SimConfig {
        seed,
        ..SimConfig::default()
    };
    Simulation::new(city_map(16, 16), config).unwrap()
}

/// Spawn two cars per block circulating clockwise around its building.
pub fn populate_traffic(sim: &mut Simulation) -> Vec<AgentId> {
    let blocks_x = sim.map().width() / 4;
    let blocks_y = sim.map().height() / 4;
    let mut ids = Vec::new();
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            ids.push(sim.spawn_traffic(tile_center(bx * 4, by * 4 + 2), Heading::Up));
            ids.push(sim.spawn_traffic(tile_center(bx * 4 + 3, by * 4 + 1), Heading::Down));
        }
    }
    ids
}

/// Count events matching `predicate`.
pub fn count_events(events: &[SimEvent], predicate: impl Fn(&SimEvent) -> bool) -> usize {
    events.iter().filter(|e| predicate(e)).count()
}

/// True if the agent's collider overlaps no obstacle tile.
pub fn clear_of_obstacles(map: &TileMap, agent: &Agent) -> bool {
    let collider = agent.collider();
    map.obstacle_rects(collider)
        .iter()
        .all(|r| !r.overlaps(&collider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_map_has_buildings_inside_blocks() {
        let map = city_map(8, 8);
        assert!(map.is_obstacle(1, 1));
        assert!(map.is_obstacle(2, 2));
        assert!(map.is_obstacle(5, 6));
        assert!(!map.is_obstacle(0, 0));
        assert!(!map.is_obstacle(3, 1));
        assert_eq!(map.count_matching(|code| code == OBSTACLE), 16);
    }

    #[test]
    fn scripted_random_replays_then_falls_back() {
        let mut rng = ScriptedRandom::new()
            .with_units([0.25])
            .with_belows([5])
            .with_fallback_unit(0.75);
        assert_eq!(rng.unit(), 0.25);
        assert_eq!(rng.unit(), 0.75);
        assert_eq!(rng.below(2), 1);
        assert_eq!(rng.below(2), 0);
    }

    #[test]
    fn populated_city_starts_clear() {
        let mut sim = city_sim(0);
        let ids = populate_traffic(&mut sim);
        assert_eq!(ids.len(), 32);
        for agent in sim.agents() {
            assert!(clear_of_obstacles(sim.map(), agent));
        }
    }
}
