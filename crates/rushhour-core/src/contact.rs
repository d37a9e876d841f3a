//! Pairwise contact detection and per-kind response hooks.
//!
//! Each tick the dispatcher scans every unordered pair of participating
//! agents and, for each pair whose world colliders overlap, calls the hook
//! registered for each side's [`AgentKind`]. A hook receives its own agent
//! mutably and a snapshot of the other one, so it can stop itself, change
//! its movement or queue new agents through the [`ContactContext`].
//!
//! # Invariants
//!
//! - Participants (not stopped, not ghost) are fixed when the pass starts
//! - Pairs are visited in ascending ID order, lower ID first
//! - Hooks fire on every tick the overlap persists
//! - Spawns requested by hooks take effect after the pass

use std::collections::BTreeMap;

use cobble::Rect;
use glam::IVec2;
use tracing::info;

use crate::agent::{Agent, AgentId, AgentKind, AgentSpec};
use crate::event::SimEvent;
use crate::heading::Heading;

/// Read-only view of the other side of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSnapshot {
    /// Agent ID
    pub id: AgentId,
    /// Agent kind
    pub kind: AgentKind,
    /// Centre position
    pub position: IVec2,
    /// World collider
    pub collider: Rect,
    /// Requested displacement per tick
    pub movement: IVec2,
    /// Heading, if moving or navigating
    pub heading: Option<Heading>,
    /// Brake engaged
    pub braked: bool,
}

impl AgentSnapshot {
    /// Snapshot an agent's current state.
    #[must_use]
    pub fn of(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            kind: agent.kind(),
            position: agent.position(),
            collider: agent.collider(),
            movement: agent.movement(),
            heading: agent.heading(),
            braked: agent.braked(),
        }
    }
}

/// Side channel available to hooks during a pass.
pub struct ContactContext<'a> {
    tick: u64,
    spawns: &'a mut Vec<AgentSpec>,
    events: &'a mut Vec<SimEvent>,
}

impl<'a> ContactContext<'a> {
    /// Creates a context writing into the given queues.
    #[must_use]
    pub fn new(tick: u64, spawns: &'a mut Vec<AgentSpec>, events: &'a mut Vec<SimEvent>) -> Self {
        Self {
            tick,
            spawns,
            events,
        }
    }

    /// The tick being simulated.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Queue an agent to be spawned once the pass has finished.
    pub fn spawn(&mut self, spec: AgentSpec) {
        self.spawns.push(spec);
    }

    /// Number of spawns queued so far this tick.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawns.len()
    }
}

/// Response to an overlap, registered per [`AgentKind`].
pub trait ContactHook {
    /// Called with `agent` overlapping `other`.
    fn on_contact(&mut self, agent: &mut Agent, other: &AgentSnapshot, ctx: &mut ContactContext<'_>);
}

impl<F> ContactHook for F
where
    F: FnMut(&mut Agent, &AgentSnapshot, &mut ContactContext<'_>),
{
    fn on_contact(&mut self, agent: &mut Agent, other: &AgentSnapshot, ctx: &mut ContactContext<'_>) {
        self(agent, other, ctx);
    }
}

/// Holds one contact hook per agent kind and runs contact passes.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use glam::IVec2;
/// use rushhour_core::agent::{Agent, AgentId, AgentKind, AgentSpec};
/// use rushhour_core::contact::{AgentSnapshot, ContactContext, ContactDispatcher};
/// use rushhour_core::heading::Heading;
///
/// let mut dispatcher = ContactDispatcher::new();
/// dispatcher.register(AgentKind::Traffic, |agent: &mut Agent, _: &AgentSnapshot, _: &mut ContactContext<'_>| {
///     agent.mark_stopped();
/// });
///
/// let mut agents = BTreeMap::new();
/// for (id, x) in [(1, 40), (2, 44)] {
///     let id = AgentId::new(id);
///     agents.insert(id, Agent::new(id, AgentSpec::traffic(IVec2::new(x, 40), Heading::Right, 2)));
/// }
///
/// let (mut spawns, mut events) = (Vec::new(), Vec::new());
/// let pairs = dispatcher.dispatch(&mut agents, &mut ContactContext::new(0, &mut spawns, &mut events));
/// assert_eq!(pairs, 1);
/// assert!(agents.values().all(Agent::is_stopped));
/// ```
#[derive(Default)]
pub struct ContactDispatcher {
    hooks: BTreeMap<AgentKind, Box<dyn ContactHook>>,
}

impl ContactDispatcher {
    /// Creates a dispatcher with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook for `kind`, returning the one it replaces.
    pub fn register<H>(&mut self, kind: AgentKind, hook: H) -> Option<Box<dyn ContactHook>>
    where
        H: ContactHook + 'static,
    {
        self.hooks.insert(kind, Box::new(hook))
    }

    /// Remove the hook for `kind`.
    pub fn unregister(&mut self, kind: AgentKind) -> Option<Box<dyn ContactHook>> {
        self.hooks.remove(&kind)
    }

    /// True if `kind` has a hook.
    #[must_use]
    pub fn has_hook(&self, kind: AgentKind) -> bool {
        self.hooks.contains_key(&kind)
    }

    /// Run one contact pass over `agents`.
    ///
    /// Returns the number of overlapping pairs found.
    pub fn dispatch(
        &mut self,
        agents: &mut BTreeMap<AgentId, Agent>,
        ctx: &mut ContactContext<'_>,
    ) -> usize {
        let participants: Vec<AgentId> = agents
            .values()
            .filter(|a| a.is_contact_participant())
            .map(Agent::id)
            .collect();

        let mut pairs = 0;
        for (i, &first) in participants.iter().enumerate() {
            for &second in &participants[i + 1..] {
                let (Some(a), Some(b)) = (agents.get(&first), agents.get(&second)) else {
                    continue;
                };
                if !a.collider().overlaps(&b.collider()) {
                    continue;
                }
                pairs += 1;
                ctx.events.push(SimEvent::Contact { first, second });

                let snapshot_b = AgentSnapshot::of(b);
                let snapshot_a = AgentSnapshot::of(a);
                self.notify(agents, first, &snapshot_b, ctx);
                self.notify(agents, second, &snapshot_a, ctx);
            }
        }
        pairs
    }

    fn notify(
        &mut self,
        agents: &mut BTreeMap<AgentId, Agent>,
        id: AgentId,
        other: &AgentSnapshot,
        ctx: &mut ContactContext<'_>,
    ) {
        let Some(agent) = agents.get_mut(&id) else {
            return;
        };
        let Some(hook) = self.hooks.get_mut(&agent.kind()) else {
            return;
        };
        let was_stopped = agent.is_stopped();
        hook.on_contact(agent, other, ctx);
        if !was_stopped && agent.is_stopped() {
            info!(%id, other = %other.id, tick = ctx.tick, "agent stopped by contact");
            ctx.events.push(SimEvent::Stopped { id });
        }
    }
}

impl std::fmt::Debug for ContactDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactDispatcher")
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}
