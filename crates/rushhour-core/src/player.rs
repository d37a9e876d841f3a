//! Player input handling.
//!
//! The player vehicle has no navigation logic. Each tick the latched
//! [`PlayerInput`] sets its movement: steering picks a heading at player
//! speed, braking zeroes movement, and idle leaves movement as it was.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::{AgentFlags, AgentId, Body, Surroundings};
use crate::event::SimEvent;
use crate::heading::Heading;

/// Directional input for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerInput {
    /// No key held; keep the current movement
    #[default]
    Idle,
    /// Drive along a heading
    Steer(Heading),
    /// Hold the brake
    Brake,
}

/// Player control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerControl {
    input: PlayerInput,
}

impl PlayerControl {
    /// Returns the latched input.
    #[must_use]
    pub const fn input(&self) -> PlayerInput {
        self.input
    }

    /// Latch the input used by following ticks.
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    /// Apply the latched input and move. Returns the achieved displacement.
    ///
    /// Brake transitions emit [`SimEvent::BrakeEngaged`] and
    /// [`SimEvent::BrakeReleased`].
    pub fn tick(
        &mut self,
        id: AgentId,
        body: &mut Body,
        env: &Surroundings<'_>,
        events: &mut Vec<SimEvent>,
    ) -> IVec2 {
        match self.input {
            PlayerInput::Idle => {}
            PlayerInput::Steer(heading) => {
                body.movement = heading.unit() * body.speed;
                if body.flags.contains(AgentFlags::BRAKED) {
                    body.flags.remove(AgentFlags::BRAKED);
                    debug!(%id, %heading, "player brake released");
                    events.push(SimEvent::BrakeReleased { id });
                }
            }
            PlayerInput::Brake => {
                body.movement = IVec2::ZERO;
                if !body.flags.contains(AgentFlags::BRAKED) {
                    body.flags.insert(AgentFlags::BRAKED);
                    debug!(%id, "player brake engaged");
                    events.push(SimEvent::BrakeEngaged { id });
                }
            }
        }
        let requested = body.movement;
        body.step(requested, env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentSpec};
    use cobble::{MovementResolver, TileClass, TileClassTable, TileMap};

    fn run(control: &mut PlayerControl, agent: &mut Agent, events: &mut Vec<SimEvent>) -> IVec2 {
        let map = TileMap::new(8, 8, 16, TileClassTable::new(TileClass::Passable)).unwrap();
        let resolver = MovementResolver::new();
        let fences = [map.bounds()];
        let env = Surroundings {
            map: &map,
            fences: &fences,
            resolver: &resolver,
        };
        control.tick(agent.id(), agent.body_mut(), &env, events)
    }

    #[test]
    fn steer_sets_movement_at_player_speed() {
        let mut agent = Agent::new(AgentId::new(0), AgentSpec::player(IVec2::new(40, 40), 3));
        let mut control = PlayerControl::default();
        let mut events = Vec::new();

        control.set_input(PlayerInput::Steer(Heading::Right));
        assert_eq!(run(&mut control, &mut agent, &mut events), IVec2::new(3, 0));
        assert_eq!(agent.position(), IVec2::new(43, 40));
        assert!(events.is_empty());
    }

    #[test]
    fn idle_keeps_movement() {
        let mut agent = Agent::new(AgentId::new(0), AgentSpec::player(IVec2::new(40, 40), 2));
        let mut control = PlayerControl::default();
        let mut events = Vec::new();

        control.set_input(PlayerInput::Steer(Heading::Up));
        run(&mut control, &mut agent, &mut events);
        control.set_input(PlayerInput::Idle);
        assert_eq!(run(&mut control, &mut agent, &mut events), IVec2::new(0, -2));
    }

    #[test]
    fn brake_edges_emit_events_once() {
        let id = AgentId::new(5);
        let mut agent = Agent::new(id, AgentSpec::player(IVec2::new(40, 40), 2));
        let mut control = PlayerControl::default();
        let mut events = Vec::new();

        control.set_input(PlayerInput::Steer(Heading::Down));
        run(&mut control, &mut agent, &mut events);

        control.set_input(PlayerInput::Brake);
        assert_eq!(run(&mut control, &mut agent, &mut events), IVec2::ZERO);
        run(&mut control, &mut agent, &mut events);
        assert!(agent.braked());
        assert_eq!(events, vec![SimEvent::BrakeEngaged { id }]);

        control.set_input(PlayerInput::Steer(Heading::Left));
        run(&mut control, &mut agent, &mut events);
        assert!(!agent.braked());
        assert_eq!(
            events,
            vec![SimEvent::BrakeEngaged { id }, SimEvent::BrakeReleased { id }]
        );
    }

    #[test]
    fn idle_while_braked_stays_braked() {
        let mut agent = Agent::new(AgentId::new(0), AgentSpec::player(IVec2::new(40, 40), 2));
        let mut control = PlayerControl::default();
        let mut events = Vec::new();

        control.set_input(PlayerInput::Brake);
        run(&mut control, &mut agent, &mut events);
        control.set_input(PlayerInput::Idle);
        assert_eq!(run(&mut control, &mut agent, &mut events), IVec2::ZERO);
        assert!(agent.braked());
        assert_eq!(events.len(), 1);
    }
}
