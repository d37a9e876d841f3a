//! Simulation orchestrator with a fixed-tick loop.
//!
//! The `Simulation` struct owns the map, the agents and every piece of
//! per-run state, and advances them one tick at a time:
//!
//! 1. **OBSERVE**: Snapshot the player for the yield rule
//! 2. **ADVANCE**: Run each live agent's control in ID order (player input,
//!    navigation, marker lifetime) and move it through the resolver
//! 3. **CONTACT**: Scan overlapping pairs and invoke per-kind hooks
//! 4. **CLEANUP**: Despawn expired markers, flush deferred spawns, advance
//!    the tick counter
//!
//! # Determinism
//!
//! Given the same seed, map and inputs, the simulation produces identical
//! results:
//! - Agents are iterated in ID order (via `BTreeMap`)
//! - All randomness comes from one seeded `ChaCha8Rng`
//! - Spawns requested mid-tick are applied in request order after the pass
//!
//! # Example
//!
//! ```
//! use cobble::{TileClass, TileClassTable, TileMap};
//! use glam::IVec2;
//! use rushhour_core::config::SimConfig;
//! use rushhour_core::heading::Heading;
//! use rushhour_core::player::PlayerInput;
//! use rushhour_core::simulation::Simulation;
//!
//! let map = TileMap::new(12, 12, 16, TileClassTable::new(TileClass::Passable)).unwrap();
//! let mut sim = Simulation::new(map, SimConfig::default()).unwrap();
//!
//! let player = sim.spawn_player(IVec2::new(24, 24));
//! sim.set_player_input(PlayerInput::Steer(Heading::Right));
//! sim.step();
//!
//! assert_eq!(sim.agent(player).unwrap().position(), IVec2::new(26, 24));
//! assert_eq!(sim.tick(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use cobble::{MovementResolver, Rect, TileMap};
use glam::IVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::agent::{Agent, AgentId, AgentKind, AgentSpec, Control, Surroundings};
use crate::config::{ConfigError, SimConfig};
use crate::contact::{ContactContext, ContactDispatcher, ContactHook};
use crate::event::SimEvent;
use crate::heading::Heading;
use crate::navigation::{NavContext, PlayerObservation};
use crate::player::PlayerInput;

// =============================================================================
// Simulation
// =============================================================================

/// The single-threaded simulation orchestrator.
///
/// `Simulation` manages:
/// - The tile map, replaceable between ticks
/// - Agents keyed by ID, plus the current player's ID
/// - The contact dispatcher and its per-kind hooks
/// - A seeded RNG feeding the navigation heuristics
/// - Fences, the pause flag, the deferred spawn queue and the event log
pub struct Simulation {
    map: TileMap,
    agents: BTreeMap<AgentId, Agent>,
    next_id: u64,
    player: Option<AgentId>,
    resolver: MovementResolver,
    contacts: ContactDispatcher,
    rng: ChaCha8Rng,
    config: SimConfig,
    fences: Vec<Rect>,
    tick: u64,
    paused: bool,
    pending: Vec<AgentSpec>,
    events: Vec<SimEvent>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("paused", &self.paused)
            .field("agents", &self.agents.len())
            .field("player", &self.player)
            .field("contacts", &self.contacts)
            .field("seed", &self.config.seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation over `map`.
    ///
    /// Fences default to the map bounds and the RNG is seeded from
    /// `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the config is out of range or its
    /// decision window does not fit the map's tiles.
    pub fn new(map: TileMap, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate_for_tile_size(map.tile_size())?;
        let fences = vec![map.bounds()];
        Ok(Self {
            map,
            agents: BTreeMap::new(),
            next_id: 0,
            player: None,
            resolver: MovementResolver::with_order(config.axis_order),
            contacts: ContactDispatcher::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            fences,
            tick: 0,
            paused: false,
            pending: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Executes one tick.
    ///
    /// Does nothing while paused: no movement, no contacts, no timers and
    /// no tick advance.
    pub fn step(&mut self) {
        if self.paused {
            trace!(tick = self.tick, "paused, skipping tick");
            return;
        }

        // PHASE 1: OBSERVE
        let player = self
            .player
            .and_then(|id| self.agents.get(&id))
            .map(PlayerObservation::of);

        // PHASE 2: ADVANCE
        let ctx = NavContext {
            env: Surroundings {
                map: &self.map,
                fences: &self.fences,
                resolver: &self.resolver,
            },
            config: &self.config,
            player,
        };
        for agent in self.agents.values_mut() {
            if agent.is_stopped() {
                continue;
            }
            let Agent {
                id, body, control, ..
            } = agent;
            match control {
                Control::Player(input) => {
                    input.tick(*id, body, &ctx.env, &mut self.events);
                }
                Control::Navigator(nav) => {
                    nav.tick(*id, body, &ctx, &mut self.rng, &mut self.events);
                }
                Control::Inert { ttl } => {
                    if let Some(ttl) = ttl {
                        *ttl = ttl.saturating_sub(1);
                    }
                }
            }
        }

        // PHASE 3: CONTACT
        let mut contact_ctx = ContactContext::new(self.tick, &mut self.pending, &mut self.events);
        self.contacts.dispatch(&mut self.agents, &mut contact_ctx);

        // PHASE 4: CLEANUP
        let expired: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.control().is_expired())
            .map(Agent::id)
            .collect();
        for id in expired {
            self.despawn(id);
        }
        for spec in std::mem::take(&mut self.pending) {
            self.spawn(spec);
        }
        self.tick += 1;
    }

    /// Run `ticks` steps.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    // -------------------------------------------------------------------------
    // Agents
    // -------------------------------------------------------------------------

    /// Add an agent now and return its ID.
    ///
    /// Spawning a player makes it the agent that receives player input and
    /// that traffic yields to.
    pub fn spawn(&mut self, spec: AgentSpec) -> AgentId {
        let id = AgentId::new(self.next_id);
        self.next_id += 1;
        let kind = spec.kind;
        if kind == AgentKind::Player {
            self.player = Some(id);
        }
        info!(%id, %kind, position = ?spec.body.position, "spawned agent");
        self.agents.insert(id, Agent::new(id, spec));
        self.events.push(SimEvent::Spawned { id, kind });
        id
    }

    /// Spawn a player vehicle at rest, at the configured player speed.
    pub fn spawn_player(&mut self, position: IVec2) -> AgentId {
        self.spawn(AgentSpec::player(position, self.config.player_speed))
    }

    /// Spawn a traffic car at the configured traffic speed.
    pub fn spawn_traffic(&mut self, position: IVec2, heading: Heading) -> AgentId {
        self.spawn(AgentSpec::traffic(
            position,
            heading,
            self.config.traffic_speed,
        ))
    }

    /// Spawn a marker with the configured lifetime.
    pub fn spawn_marker(&mut self, position: IVec2) -> AgentId {
        self.spawn(AgentSpec::marker(position, Some(self.config.marker_ttl)))
    }

    /// Queue an agent to be spawned at the end of the next tick.
    pub fn queue_spawn(&mut self, spec: AgentSpec) {
        self.pending.push(spec);
    }

    /// Number of spawns waiting for the end of a tick.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    /// Remove an agent, returning it.
    pub fn despawn(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(&id)?;
        if self.player == Some(id) {
            self.player = None;
        }
        info!(%id, kind = %agent.kind(), "despawned agent");
        self.events.push(SimEvent::Despawned { id });
        Some(agent)
    }

    /// Returns an agent by ID.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Returns an agent by ID, mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// All agents in ID order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Number of agents, stopped ones included.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// ID of the current player agent.
    #[must_use]
    pub fn player_id(&self) -> Option<AgentId> {
        self.player
    }

    /// Latch the player's input. Returns `false` if there is no player.
    pub fn set_player_input(&mut self, input: PlayerInput) -> bool {
        let control = self
            .player
            .and_then(|id| self.agents.get_mut(&id))
            .and_then(|agent| agent.control_mut().as_player_mut());
        match control {
            Some(control) => {
                control.set_input(input);
                true
            }
            None => false,
        }
    }

    /// Set the hook answering contacts for agents of `kind`.
    pub fn register_contact_hook<H>(&mut self, kind: AgentKind, hook: H)
    where
        H: ContactHook + 'static,
    {
        self.contacts.register(kind, hook);
    }

    // -------------------------------------------------------------------------
    // World
    // -------------------------------------------------------------------------

    /// The tile map.
    #[must_use]
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// The tile map, for edits between ticks.
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    /// Current fence rectangles.
    #[must_use]
    pub fn fences(&self) -> &[Rect] {
        &self.fences
    }

    /// Replace the fence rectangles.
    pub fn set_fences(&mut self, fences: Vec<Rect>) {
        self.fences = fences;
    }

    /// The movement resolver.
    #[must_use]
    pub fn resolver(&self) -> &MovementResolver {
        &self.resolver
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------------

    /// Ticks simulated so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// The RNG seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Pause or resume.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!(tick = self.tick, paused, "pause toggled");
        }
        self.paused = paused;
    }

    /// True while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Events not yet drained.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Take all pending events.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::helpers::{city_map, tile_center};

    fn sim() -> Simulation {
        Simulation::new(city_map(8, 8), SimConfig::default()).unwrap()
    }

    #[test]
    fn new_rejects_oversized_decision_window() {
        let config = SimConfig {
            decision_radius: 8,
            ..SimConfig::default()
        };
        assert!(Simulation::new(city_map(8, 8), config).is_err());
    }

    #[test]
    fn fences_default_to_map_bounds() {
        let sim = sim();
        assert_eq!(sim.fences(), &[Rect::new(0, 0, 128, 128)]);
    }

    #[test]
    fn ids_increase_and_are_not_reused() {
        let mut sim = sim();
        let a = sim.spawn_marker(IVec2::ZERO);
        let b = sim.spawn_marker(IVec2::ZERO);
        assert!(sim.despawn(b).is_some());
        let c = sim.spawn_marker(IVec2::ZERO);
        assert!(a < b && b < c);
        assert!(sim.despawn(b).is_none());
    }

    #[test]
    fn spawn_and_despawn_emit_events() {
        let mut sim = sim();
        let id = sim.spawn_traffic(tile_center(0, 1), Heading::Down);
        sim.despawn(id);
        assert_eq!(
            sim.drain_events(),
            vec![
                SimEvent::Spawned {
                    id,
                    kind: AgentKind::Traffic
                },
                SimEvent::Despawned { id },
            ]
        );
        assert!(sim.events().is_empty());
    }

    #[test]
    fn player_input_needs_a_player() {
        let mut sim = sim();
        assert!(!sim.set_player_input(PlayerInput::Brake));
        let id = sim.spawn_player(tile_center(0, 0));
        assert_eq!(sim.player_id(), Some(id));
        assert!(sim.set_player_input(PlayerInput::Brake));
        sim.despawn(id);
        assert_eq!(sim.player_id(), None);
    }

    #[test]
    fn markers_expire_after_ttl() {
        let mut sim = Simulation::new(
            city_map(8, 8),
            SimConfig {
                marker_ttl: 3,
                ..SimConfig::default()
            },
        )
        .unwrap();
        let id = sim.spawn_marker(tile_center(0, 0));

        sim.run(2);
        assert!(sim.agent(id).is_some());
        sim.run(1);
        assert!(sim.agent(id).is_none());
    }

    #[test]
    fn permanent_marker_stays() {
        let mut sim = sim();
        let id = sim.spawn(AgentSpec::marker(tile_center(0, 0), None));
        sim.run(50);
        assert!(sim.agent(id).is_some());
    }

    #[test]
    fn queued_spawn_lands_after_tick() {
        let mut sim = sim();
        sim.queue_spawn(AgentSpec::marker(tile_center(0, 0), None));
        assert_eq!(sim.agent_count(), 0);
        assert_eq!(sim.pending_spawns(), 1);
        sim.step();
        assert_eq!(sim.agent_count(), 1);
        assert_eq!(sim.pending_spawns(), 0);
    }

    #[test]
    fn debug_output_is_compact() {
        let sim = sim();
        let text = format!("{sim:?}");
        assert!(text.contains("Simulation"));
        assert!(text.contains("tick: 0"));
    }
}
