use super::genome::{Color, Genome, OrganismKind};
use super::vector::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on any organism's stored energy.
pub const MAX_ENERGY: f64 = 200.0;

/// Collision radius of a food pellet.
pub const FOOD_RADIUS: f64 = 0.5;

/// Entity category as seen by the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Prey,
    Predator,
    Food,
    Obstacle,
}

impl From<OrganismKind> for EntityKind {
    fn from(kind: OrganismKind) -> Self {
        match kind {
            OrganismKind::Prey => EntityKind::Prey,
            OrganismKind::Predator => EntityKind::Predator,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Prey => "prey",
            EntityKind::Predator => "predator",
            EntityKind::Food => "food",
            EntityKind::Obstacle => "obstacle",
        };
        f.write_str(s)
    }
}

/// Per-tick activity label, recomputed by the behavior pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activity {
    #[default]
    Idle,
    Seeking,
    Fleeing,
    Hunting,
    Reproducing,
    Dying,
}

impl Activity {
    /// Stable numeric code used in render buffers.
    pub fn code(self) -> u8 {
        match self {
            Activity::Idle => 0,
            Activity::Seeking => 1,
            Activity::Fleeing => 2,
            Activity::Hunting => 3,
            Activity::Reproducing => 4,
            Activity::Dying => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Predation,
    OldAge,
    /// Food pellets only.
    Consumed,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeathCause::Starvation => "starvation",
            DeathCause::Predation => "predation",
            DeathCause::OldAge => "old_age",
            DeathCause::Consumed => "consumed",
        };
        f.write_str(s)
    }
}

/// A mobile agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: u64,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Steering accumulator, zeroed by the physics pass every tick.
    pub acceleration: Vec3,
    pub radius: f64,
    pub energy: f64,
    pub age: u64,
    pub activity: Activity,
    pub is_dead: bool,
    pub cause_of_death: Option<DeathCause>,
    pub genome: Genome,
    /// Lookup-only reference to the parent organism.
    pub parent_id: Option<u64>,
    pub hunt_successes: u32,
    pub offspring_count: u32,
    pub birth_tick: u64,
}

impl Organism {
    #[inline]
    pub fn kind(&self) -> OrganismKind {
        self.genome.kind()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// Marks the organism dead. Only the first call has any effect; returns
    /// whether this call performed the transition.
    pub fn die(&mut self, cause: DeathCause) -> bool {
        if self.is_dead {
            return false;
        }
        self.is_dead = true;
        self.cause_of_death = Some(cause);
        self.activity = Activity::Dying;
        true
    }

    /// Adds energy, saturating at `MAX_ENERGY`.
    pub fn gain_energy(&mut self, amount: f64) {
        self.energy = (self.energy + amount).min(MAX_ENERGY);
    }

    /// Diagnostic only: `0.5 × size × |v|²`.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.genome.traits.size * self.velocity.length_squared()
    }
}

/// An ambient food pellet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: u64,
    pub position: Vec3,
    pub energy: f64,
    pub spawn_tick: u64,
    pub consumed: bool,
}

impl Food {
    /// Takes the pellet's energy. Returns `None` if it was already eaten.
    pub fn consume(&mut self) -> Option<f64> {
        if self.consumed {
            None
        } else {
            self.consumed = true;
            Some(self.energy)
        }
    }
}

/// A static spherical obstacle. Never moves, never dies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub position: Vec3,
    pub radius: f64,
    pub color: Color,
    pub opacity: f64,
    pub wireframe: bool,
}
