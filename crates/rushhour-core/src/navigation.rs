//! Reactive navigation for autonomous traffic.
//!
//! A [`Navigator`] steers one traffic agent through the city grid without
//! path search. Each tick it runs a small state machine:
//!
//! - **Cruising**: continue straight; near a tile centre, maybe consult the
//!   [`TurnTable`] and probe the candidate turn
//! - **Cooldown**: continue straight, ignoring intersections for a while
//!   after a committed turn
//! - **Braking**: halted after repeated infeasible turns, bleeding off brake
//!   pressure until it can cruise again
//! - **Stopped**: permanently halted by a contact hook
//!
//! Two heuristics apply on top of the states. Traffic slows down when its
//! next step would run into a player heading another way, and a car that is
//! wedged without having tried a turn rotates a quarter turn at random.
//!
//! # Invariants
//!
//! - A turn commits only if probing the new heading at full speed achieves
//!   the whole displacement
//! - `brake_accumulator` stays within `[0, 1]`, only grows while cruising,
//!   only shrinks while braking, and is cleared by a committed turn
//! - Randomness comes only from the [`RandomSource`] passed in

use std::fmt;

use cobble::{HeadingExt, Rect};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::agent::{Agent, AgentFlags, AgentId, Body, Surroundings};
use crate::config::SimConfig;
use crate::event::SimEvent;
use crate::heading::Heading;
use crate::random::RandomSource;

// ============================================================================
// Turn table
// ============================================================================

/// Position of a tile within its intersection block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Block offset `(0, 0)`
    TopLeft,
    /// Block offset `(block_size - 1, 0)`
    TopRight,
    /// Block offset `(block_size - 1, block_size - 1)`
    BottomRight,
    /// Block offset `(0, block_size - 1)`
    BottomLeft,
}

impl Corner {
    /// Corner of the block containing grid cell `grid`, if it is one.
    ///
    /// Negative coordinates wrap the way floor division does.
    #[must_use]
    pub fn at(grid: IVec2, block_size: i32) -> Option<Self> {
        if block_size < 2 {
            return None;
        }
        let last = block_size - 1;
        let x = grid.x.rem_euclid(block_size);
        let y = grid.y.rem_euclid(block_size);
        match (x, y) {
            (0, 0) => Some(Self::TopLeft),
            (x, 0) if x == last => Some(Self::TopRight),
            (x, y) if x == last && y == last => Some(Self::BottomRight),
            (0, y) if y == last => Some(Self::BottomLeft),
            _ => None,
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLeft => write!(f, "top-left"),
            Self::TopRight => write!(f, "top-right"),
            Self::BottomRight => write!(f, "bottom-right"),
            Self::BottomLeft => write!(f, "bottom-left"),
        }
    }
}

/// One intersection rule: at `corner`, heading `heading`, turn to `turn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnRule {
    /// Block corner the rule applies at
    pub corner: Corner,
    /// Incoming heading
    pub heading: Heading,
    /// Heading to turn to
    pub turn: Heading,
}

/// Lookup from `(corner, heading)` to a candidate heading.
///
/// # Example
///
/// ```
/// use rushhour_core::heading::Heading;
/// use rushhour_core::navigation::{Corner, TurnTable};
///
/// let table = TurnTable::rotary();
/// assert_eq!(table.lookup(Corner::BottomRight, Heading::Down), Some(Heading::Left));
/// assert_eq!(table.lookup(Corner::BottomRight, Heading::Up), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnTable {
    rules: Vec<TurnRule>,
}

impl TurnTable {
    /// An empty table; traffic never turns on its own.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Clockwise circulation around every block.
    #[must_use]
    pub fn rotary() -> Self {
        Self::new()
            .with_rule(Corner::TopLeft, Heading::Up, Heading::Right)
            .with_rule(Corner::TopRight, Heading::Right, Heading::Down)
            .with_rule(Corner::BottomRight, Heading::Down, Heading::Left)
            .with_rule(Corner::BottomLeft, Heading::Left, Heading::Up)
    }

    /// Add a rule, replacing any rule for the same corner and heading.
    #[must_use]
    pub fn with_rule(mut self, corner: Corner, heading: Heading, turn: Heading) -> Self {
        self.insert(TurnRule {
            corner,
            heading,
            turn,
        });
        self
    }

    /// Add a rule, replacing any rule for the same corner and heading.
    pub fn insert(&mut self, rule: TurnRule) {
        match self
            .rules
            .iter_mut()
            .find(|r| r.corner == rule.corner && r.heading == rule.heading)
        {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Candidate heading for `heading` at `corner`.
    #[must_use]
    pub fn lookup(&self, corner: Corner, heading: Heading) -> Option<Heading> {
        self.rules
            .iter()
            .find(|r| r.corner == corner && r.heading == heading)
            .map(|r| r.turn)
    }

    /// All rules in insertion order.
    #[must_use]
    pub fn rules(&self) -> &[TurnRule] {
        &self.rules
    }
}

impl Default for TurnTable {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `position` lies within `radius` pixels of its tile's centre on
/// both axes.
#[must_use]
pub fn in_decision_window(position: IVec2, tile_size: i32, radius: i32) -> bool {
    let center = tile_size / 2;
    let dx = position.x.rem_euclid(tile_size) - center;
    let dy = position.y.rem_euclid(tile_size) - center;
    dx.abs() <= radius && dy.abs() <= radius
}

// ============================================================================
// Navigator
// ============================================================================

/// Navigation state. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavState {
    /// Driving straight, open to intersection decisions
    Cruising,
    /// Driving straight, ignoring intersections
    Cooldown {
        /// Ticks left before decisions resume
        remaining: u32,
    },
    /// Halted while brake pressure bleeds off
    Braking,
    /// Permanently halted
    Stopped,
}

/// What the player looks like to traffic this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerObservation {
    /// Player agent
    pub id: AgentId,
    /// World collider at the start of the tick
    pub collider: Rect,
    /// Current heading, `None` when at rest
    pub heading: Option<Heading>,
}

impl PlayerObservation {
    /// Snapshot a player agent.
    #[must_use]
    pub fn of(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            collider: agent.collider(),
            heading: Heading::of(agent.movement()),
        }
    }
}

/// Read-only inputs to a navigation tick.
#[derive(Debug, Clone, Copy)]
pub struct NavContext<'a> {
    /// Map, fences and resolver
    pub env: Surroundings<'a>,
    /// Tunables and the turn table
    pub config: &'a SimConfig,
    /// Player snapshot for the yield rule
    pub player: Option<PlayerObservation>,
}

enum Decision {
    /// Not at a corner, or the table has nothing to offer
    Skipped,
    Committed,
    Blocked,
}

/// Navigation state for one traffic agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Navigator {
    pub(crate) state: NavState,
    last_heading: Heading,
    brake_accumulator: f32,
}

impl Navigator {
    /// A cruising navigator heading along `heading`.
    #[must_use]
    pub fn new(heading: Heading) -> Self {
        Self {
            state: NavState::Cruising,
            last_heading: heading,
            brake_accumulator: 0.0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> NavState {
        self.state
    }

    /// Heading most recently driven or committed to.
    #[must_use]
    pub fn last_heading(&self) -> Heading {
        self.last_heading
    }

    /// Brake pressure in `[0, 1]`.
    #[must_use]
    pub fn brake_accumulator(&self) -> f32 {
        self.brake_accumulator
    }

    /// Run one navigation tick and move `body`.
    ///
    /// Returns the achieved displacement.
    pub fn tick(
        &mut self,
        id: AgentId,
        body: &mut Body,
        ctx: &NavContext<'_>,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) -> IVec2 {
        let config = ctx.config;

        let may_decide = match self.state {
            NavState::Stopped => return IVec2::ZERO,
            NavState::Braking => {
                self.bleed_brake(id, body, config, rng, events);
                return IVec2::ZERO;
            }
            NavState::Cooldown { remaining } => {
                self.state = match remaining.saturating_sub(1) {
                    0 => NavState::Cruising,
                    remaining => NavState::Cooldown { remaining },
                };
                false
            }
            NavState::Cruising => true,
        };

        let mut attempted = false;
        if may_decide
            && in_decision_window(body.position, ctx.env.map.tile_size(), config.decision_radius)
            && rng.unit() < config.decision_chance
        {
            match self.decide(id, body, ctx, rng, events) {
                Decision::Skipped => {}
                Decision::Committed => attempted = true,
                Decision::Blocked => {
                    attempted = true;
                    if self.state == NavState::Braking {
                        return IVec2::ZERO;
                    }
                }
            }
        }

        let mut requested = body.movement;
        if let Some(player) = ctx.player {
            if should_yield(body, &player) {
                requested /= config.yield_divisor;
                trace!(%id, player = %player.id, ?requested, "yielding to player");
            }
        }

        let achieved = body.step(requested, &ctx.env);

        if !requested.is_zero() && achieved.is_zero() && !attempted {
            self.recover(id, body, rng, events);
        }
        achieved
    }

    fn decide(
        &mut self,
        id: AgentId,
        body: &mut Body,
        ctx: &NavContext<'_>,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) -> Decision {
        let config = ctx.config;
        let grid = ctx.env.map.coord_to_map(body.position);
        let Some(corner) = Corner::at(grid, config.block_size) else {
            return Decision::Skipped;
        };
        let Some(turn) = config.turn_table.lookup(corner, self.last_heading) else {
            return Decision::Skipped;
        };
        if turn == self.last_heading {
            return Decision::Skipped;
        }

        let probe = turn.unit() * body.speed;
        if body.probe(probe, &ctx.env) == probe {
            let from = self.last_heading;
            body.movement = probe;
            self.last_heading = turn;
            self.brake_accumulator = 0.0;
            self.state = NavState::Cooldown {
                remaining: config.cooldown_ticks,
            };
            debug!(%id, %corner, %from, to = %turn, "turn committed");
            events.push(SimEvent::TurnCommitted { id, from, to: turn });
            return Decision::Committed;
        }

        self.brake_accumulator += brake_step(config, rng);
        trace!(%id, %corner, %turn, pressure = self.brake_accumulator, "turn blocked");
        if self.brake_accumulator >= 1.0 {
            self.brake_accumulator = 1.0;
            self.state = NavState::Braking;
            body.movement = IVec2::ZERO;
            body.flags.insert(AgentFlags::BRAKED);
            debug!(%id, "traffic braking");
            events.push(SimEvent::TrafficBraking { id });
        }
        Decision::Blocked
    }

    fn bleed_brake(
        &mut self,
        id: AgentId,
        body: &mut Body,
        config: &SimConfig,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) {
        body.movement = IVec2::ZERO;
        self.brake_accumulator -= brake_step(config, rng);
        if self.brake_accumulator <= 0.0 {
            self.brake_accumulator = 0.0;
            self.state = NavState::Cruising;
            body.movement = self.last_heading.unit() * body.speed;
            body.flags.remove(AgentFlags::BRAKED);
            debug!(%id, heading = %self.last_heading, "traffic released");
            events.push(SimEvent::TrafficReleased { id });
        }
    }

    fn recover(
        &mut self,
        id: AgentId,
        body: &mut Body,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) {
        let heading = if rng.below(2) == 0 {
            self.last_heading.rotated_cw()
        } else {
            self.last_heading.rotated_ccw()
        };
        debug!(%id, from = %self.last_heading, to = %heading, "wedged, rotating");
        self.last_heading = heading;
        body.movement = heading.unit() * body.speed;
        events.push(SimEvent::Recovered { id, heading });
    }
}

fn brake_step(config: &SimConfig, rng: &mut dyn RandomSource) -> f32 {
    config.brake_step_min + rng.unit() * (config.brake_step_max - config.brake_step_min)
}

fn should_yield(body: &Body, player: &PlayerObservation) -> bool {
    let heading = Heading::of(body.movement);
    heading.is_some()
        && player.heading != heading
        && body
            .world_collider()
            .translated(body.movement)
            .overlaps(&player.collider)
}
