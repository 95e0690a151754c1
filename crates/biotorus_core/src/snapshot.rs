//! Complete, serializable simulation state.
//!
//! A `SimulationState` holds everything a resumed run needs to produce the
//! same future ticks as an uninterrupted one: configuration, PRNG position,
//! tick and id counters, every entity collection and the genetic forest.

use crate::config::AppConfig;
use crate::entity_manager::EntityCounters;
use crate::lifecycle::FactoryCounters;
use crate::rng::RngState;
use biotorus_data::{EcologicalZone, Food, GeneticTreeNode, Obstacle, Organism, SimulationStats};
use serde::{Deserialize, Serialize};

/// Bumped whenever the layout of [`SimulationState`] changes.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub version: u32,
    pub config: AppConfig,
    pub rng: RngState,
    pub tick: u64,
    pub factory: FactoryCounters,
    pub counters: EntityCounters,
    pub organisms: Vec<Organism>,
    pub food: Vec<Food>,
    pub obstacles: Vec<Obstacle>,
    pub zones: Vec<EcologicalZone>,
    pub tree_nodes: Vec<GeneticTreeNode>,
    pub tree_roots: Vec<u64>,
    pub stats: SimulationStats,
}

impl SimulationState {
    /// Structural checks that do not need a running simulation.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.version <= STATE_VERSION,
            "State version {} is newer than supported version {}",
            self.version,
            STATE_VERSION
        );
        self.config.validate()?;
        anyhow::ensure!(
            self.rng.seed == self.config.world.seed,
            "PRNG seed does not match the configured seed"
        );
        anyhow::ensure!(
            self.organisms
                .iter()
                .all(|o| o.id < self.factory.next_organism_id
                    && o.genome.id < self.factory.next_genome_id),
            "Organism or genome id at or beyond its counter"
        );
        anyhow::ensure!(
            self.food.iter().all(|f| f.id < self.counters.next_food_id),
            "Food id at or beyond its counter"
        );
        anyhow::ensure!(
            self.obstacles
                .iter()
                .all(|o| o.id < self.counters.next_obstacle_id),
            "Obstacle id at or beyond its counter"
        );
        anyhow::ensure!(
            self.organisms.iter().all(|o| o.position.is_finite()),
            "Organism with non-finite position"
        );
        Ok(())
    }
}
