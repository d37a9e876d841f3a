//! Agent types for the traffic simulation.
//!
//! This module provides:
//! - [`AgentId`]: Unique, ordered identifier for agents
//! - [`AgentKind`]: Classification used for contact hook selection
//! - [`AgentFlags`]: Braked, stopped and ghost bits
//! - [`Body`]: Position, collider and movement shared by every agent
//! - [`Control`]: The per-agent strategy (player input, navigator, inert)
//! - [`Agent`]: The complete agent container
//! - [`AgentSpec`]: A blueprint used to spawn agents
//!
//! # Architecture
//!
//! All agents share one concrete type. Behaviour differences live in the
//! [`Control`] tag rather than in a type hierarchy, and `AgentKind` selects
//! which contact hook answers for the agent.
//!
//! # Example
//!
//! ```
//! use rushhour_core::agent::{Agent, AgentId, AgentKind, AgentSpec};
//! use rushhour_core::heading::Heading;
//! use glam::IVec2;
//!
//! let car = Agent::new(AgentId::new(3), AgentSpec::traffic(IVec2::new(24, 24), Heading::Left, 2));
//!
//! assert_eq!(car.kind(), AgentKind::Traffic);
//! assert_eq!(car.movement(), IVec2::new(-2, 0));
//! assert_eq!(car.collider().min(), IVec2::new(20, 20));
//! ```

use std::fmt;

use bitflags::bitflags;
use cobble::{MovementResolver, Rect, TileMap};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::heading::Heading;
use crate::navigation::{NavState, Navigator};
use crate::player::PlayerControl;

/// Default collider edge length in pixels.
pub const DEFAULT_COLLIDER_SIZE: i32 = 8;

// ============================================================================
// Identity
// ============================================================================

/// Unique identifier for an agent.
///
/// IDs are assigned in increasing order by the simulation and never reused,
/// so ordering by ID is ordering by spawn time. All per-tick iteration
/// follows this order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(u64);

impl AgentId {
    /// Creates an `AgentId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<AgentId> for u64 {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// Agent classification.
///
/// Each kind has at most one registered contact hook.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// The player-controlled vehicle
    Player,
    /// An autonomous car
    Traffic,
    /// A transient, motionless marker (score popups, debris)
    Marker,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Traffic => write!(f, "Traffic"),
            Self::Marker => write!(f, "Marker"),
        }
    }
}

bitflags! {
    /// Per-agent status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AgentFlags: u8 {
        /// Brake engaged (player input or traffic hard stop)
        const BRAKED = 0b0000_0001;
        /// Permanently stopped; skips movement and contact checks
        const STOPPED = 0b0000_0010;
        /// Never takes part in contact checks
        const GHOST = 0b0000_0100;
    }
}

// ============================================================================
// Body
// ============================================================================

/// Static surroundings an agent moves through during a tick.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// The tile map
    pub map: &'a TileMap,
    /// Rectangles the agent must stay inside
    pub fences: &'a [Rect],
    /// The shared resolver
    pub resolver: &'a MovementResolver,
}

impl Surroundings<'_> {
    /// Achieved displacement for `collider` moving by `requested`.
    #[must_use]
    pub fn resolve(&self, collider: Rect, requested: IVec2) -> IVec2 {
        let obstacles = self.map.obstacle_rects(collider.expanded(requested));
        self.resolver
            .resolve(collider, requested, &obstacles, self.fences)
    }
}

/// Physical state of an agent.
///
/// `position` is the agent's centre in pixels; `collider` is relative to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Body {
    /// Centre position in pixels
    pub position: IVec2,
    /// Collider rectangle relative to `position`
    pub collider: Rect,
    /// Displacement requested per tick
    pub movement: IVec2,
    /// Speed in pixels per tick
    pub speed: i32,
    /// Status bits
    pub flags: AgentFlags,
}

impl Body {
    /// Collider in world coordinates.
    #[must_use]
    pub fn world_collider(&self) -> Rect {
        self.collider.translated(self.position)
    }

    /// Achieved displacement for `requested` without moving.
    #[must_use]
    pub fn probe(&self, requested: IVec2, env: &Surroundings<'_>) -> IVec2 {
        env.resolve(self.world_collider(), requested)
    }

    /// Move by the resolved displacement for `requested`.
    ///
    /// Stopped bodies never move. Returns the achieved displacement.
    pub fn step(&mut self, requested: IVec2, env: &Surroundings<'_>) -> IVec2 {
        if self.flags.contains(AgentFlags::STOPPED) {
            return IVec2::ZERO;
        }
        let achieved = self.probe(requested, env);
        if achieved != requested {
            trace!(
                position = ?self.position,
                ?requested,
                ?achieved,
                "movement cut short"
            );
        }
        self.position += achieved;
        achieved
    }
}

// ============================================================================
// Control
// ============================================================================

/// Per-agent movement strategy.
///
/// The variant should match the agent's [`AgentKind`]; [`AgentSpec`]
/// constructors guarantee this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Control {
    /// Directional input from the player
    Player(PlayerControl),
    /// Autonomous navigation state machine
    Navigator(Navigator),
    /// No movement; expires after `ttl` ticks when set
    Inert {
        /// Remaining lifetime in ticks
        ttl: Option<u32>,
    },
}

impl Control {
    /// Returns the navigator, if this is one.
    #[must_use]
    pub const fn as_navigator(&self) -> Option<&Navigator> {
        match self {
            Self::Navigator(nav) => Some(nav),
            _ => None,
        }
    }

    /// Returns the navigator mutably, if this is one.
    #[must_use]
    pub fn as_navigator_mut(&mut self) -> Option<&mut Navigator> {
        match self {
            Self::Navigator(nav) => Some(nav),
            _ => None,
        }
    }

    /// Returns the player control, if this is one.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerControl> {
        match self {
            Self::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Returns the player control mutably, if this is one.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerControl> {
        match self {
            Self::Player(player) => Some(player),
            _ => None,
        }
    }

    /// True for an inert control whose lifetime has run out.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Inert { ttl: Some(0) })
    }
}

// ============================================================================
// Spec
// ============================================================================

/// Blueprint for spawning an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Agent kind
    pub kind: AgentKind,
    /// Initial physical state
    pub body: Body,
    /// Movement strategy
    pub control: Control,
}

impl AgentSpec {
    /// A player vehicle at rest.
    #[must_use]
    pub fn player(position: IVec2, speed: i32) -> Self {
        Self {
            kind: AgentKind::Player,
            body: Body {
                position,
                collider: default_collider(),
                movement: IVec2::ZERO,
                speed,
                flags: AgentFlags::empty(),
            },
            control: Control::Player(PlayerControl::default()),
        }
    }

    /// A traffic car cruising along `heading`.
    #[must_use]
    pub fn traffic(position: IVec2, heading: Heading, speed: i32) -> Self {
        Self {
            kind: AgentKind::Traffic,
            body: Body {
                position,
                collider: default_collider(),
                movement: heading.unit() * speed,
                speed,
                flags: AgentFlags::empty(),
            },
            control: Control::Navigator(Navigator::new(heading)),
        }
    }

    /// A motionless marker that expires after `ttl` ticks, or never.
    #[must_use]
    pub fn marker(position: IVec2, ttl: Option<u32>) -> Self {
        Self {
            kind: AgentKind::Marker,
            body: Body {
                position,
                collider: default_collider(),
                movement: IVec2::ZERO,
                speed: 0,
                flags: AgentFlags::GHOST,
            },
            control: Control::Inert { ttl },
        }
    }

    /// Replace the collider size, keeping it centred on the position.
    #[must_use]
    pub fn with_collider_size(mut self, size: IVec2) -> Self {
        self.body.collider = Rect::centered(IVec2::ZERO, size);
        self
    }

    /// Add status flags.
    #[must_use]
    pub fn with_flags(mut self, flags: AgentFlags) -> Self {
        self.body.flags |= flags;
        self
    }
}

fn default_collider() -> Rect {
    Rect::centered(IVec2::ZERO, IVec2::splat(DEFAULT_COLLIDER_SIZE))
}

// ============================================================================
// Agent
// ============================================================================

/// A mobile simulation agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub(crate) id: AgentId,
    pub(crate) kind: AgentKind,
    pub(crate) body: Body,
    pub(crate) control: Control,
}

impl Agent {
    /// Creates an agent from a spec.
    #[must_use]
    pub fn new(id: AgentId, spec: AgentSpec) -> Self {
        Self {
            id,
            kind: spec.kind,
            body: spec.body,
            control: spec.control,
        }
    }

    /// Returns the agent's ID.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Returns the agent's kind.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Returns the physical state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the physical state mutably.
    #[must_use]
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Returns the movement strategy.
    #[must_use]
    pub const fn control(&self) -> &Control {
        &self.control
    }

    /// Returns the movement strategy mutably.
    #[must_use]
    pub fn control_mut(&mut self) -> &mut Control {
        &mut self.control
    }

    /// Centre position in pixels.
    #[must_use]
    pub const fn position(&self) -> IVec2 {
        self.body.position
    }

    /// Teleport to `position` without collision checks.
    pub fn set_position(&mut self, position: IVec2) {
        self.body.position = position;
    }

    /// Collider in world coordinates.
    #[must_use]
    pub fn collider(&self) -> Rect {
        self.body.world_collider()
    }

    /// Displacement requested per tick.
    #[must_use]
    pub const fn movement(&self) -> IVec2 {
        self.body.movement
    }

    /// Current heading, from movement or the navigator's last heading.
    #[must_use]
    pub fn heading(&self) -> Option<Heading> {
        Heading::of(self.body.movement).or_else(|| {
            self.control
                .as_navigator()
                .map(Navigator::last_heading)
        })
    }

    /// Status bits.
    #[must_use]
    pub const fn flags(&self) -> AgentFlags {
        self.body.flags
    }

    /// True while the brake is engaged.
    #[must_use]
    pub const fn braked(&self) -> bool {
        self.body.flags.contains(AgentFlags::BRAKED)
    }

    /// True once the agent has been stopped for good.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.body.flags.contains(AgentFlags::STOPPED)
    }

    /// True if the agent never takes part in contact checks.
    #[must_use]
    pub const fn is_ghost(&self) -> bool {
        self.body.flags.contains(AgentFlags::GHOST)
    }

    /// True if the agent takes part in this tick's contact pass.
    #[must_use]
    pub const fn is_contact_participant(&self) -> bool {
        !self
            .body
            .flags
            .intersects(AgentFlags::STOPPED.union(AgentFlags::GHOST))
    }

    /// Stop the agent permanently.
    ///
    /// Clears movement, parks any navigator and removes the agent from future
    /// movement and contact processing. Idempotent.
    pub fn mark_stopped(&mut self) {
        self.body.flags.insert(AgentFlags::STOPPED);
        self.body.movement = IVec2::ZERO;
        if let Some(nav) = self.control.as_navigator_mut() {
            nav.state = NavState::Stopped;
        }
    }

    /// Move by the resolved displacement for `requested`.
    pub fn step(&mut self, requested: IVec2, env: &Surroundings<'_>) -> IVec2 {
        self.body.step(requested, env)
    }
}
