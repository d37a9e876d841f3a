//! Events emitted by the simulation.
//!
//! Events are appended during [`crate::simulation::Simulation::step`] in the
//! order they happen and drained by the caller (audio, HUD, scoring).

use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, AgentKind};
use crate::heading::Heading;

/// Something observable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An agent entered the simulation.
    Spawned {
        /// New agent
        id: AgentId,
        /// Its kind
        kind: AgentKind,
    },
    /// An agent left the simulation.
    Despawned {
        /// Removed agent
        id: AgentId,
    },
    /// A navigator committed to a turn at an intersection.
    TurnCommitted {
        /// Turning agent
        id: AgentId,
        /// Heading before the turn
        from: Heading,
        /// Heading after the turn
        to: Heading,
    },
    /// A navigator's brake pressure saturated and it came to a halt.
    TrafficBraking {
        /// Braking agent
        id: AgentId,
    },
    /// A braking navigator resumed cruising.
    TrafficReleased {
        /// Released agent
        id: AgentId,
    },
    /// A wedged navigator rotated to free itself.
    Recovered {
        /// Recovering agent
        id: AgentId,
        /// New heading
        heading: Heading,
    },
    /// The player engaged the brake.
    BrakeEngaged {
        /// Player agent
        id: AgentId,
    },
    /// The player released the brake.
    BrakeReleased {
        /// Player agent
        id: AgentId,
    },
    /// Two agents' colliders overlap this tick.
    Contact {
        /// Lower ID of the pair
        first: AgentId,
        /// Higher ID of the pair
        second: AgentId,
    },
    /// A contact hook stopped an agent.
    Stopped {
        /// Stopped agent
        id: AgentId,
    },
}

impl SimEvent {
    /// The agent the event is mainly about.
    #[must_use]
    pub const fn subject(&self) -> AgentId {
        match *self {
            Self::Spawned { id, .. }
            | Self::Despawned { id }
            | Self::TurnCommitted { id, .. }
            | Self::TrafficBraking { id }
            | Self::TrafficReleased { id }
            | Self::Recovered { id, .. }
            | Self::BrakeEngaged { id }
            | Self::BrakeReleased { id }
            | Self::Stopped { id } => id,
            Self::Contact { first, .. } => first,
        }
    }
}
