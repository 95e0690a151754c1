use super::entity::{DeathCause, EntityKind};
use super::stats::SimulationStats;
use super::vector::Vec3;
use serde::{Deserialize, Serialize};

/// One-shot notifications emitted during a tick, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    TickUpdated {
        tick: u64,
        stats: Box<SimulationStats>,
        /// Wall-clock duration of the tick in milliseconds.
        delta_time: f64,
    },
    EntityDied {
        entity_type: EntityKind,
        id: u64,
        position: Vec3,
        cause_of_death: DeathCause,
    },
    EntitySpawned {
        entity_type: EntityKind,
        id: u64,
        position: Vec3,
    },
    EntityReproduced {
        parent_id: u64,
        child_id: u64,
        generation: u32,
    },
}

impl SimEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::TickUpdated { .. } => "tick_updated",
            SimEvent::EntityDied { .. } => "entity_died",
            SimEvent::EntitySpawned { .. } => "entity_spawned",
            SimEvent::EntityReproduced { .. } => "entity_reproduced",
        }
    }
}
