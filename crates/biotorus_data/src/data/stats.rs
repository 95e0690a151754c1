use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
/// Aggregate statistics refreshed once per tick.
pub struct SimulationStats {
    /// Tick these statistics were computed for.
    pub tick: u64,
    /// Living prey.
    pub prey_count: usize,
    /// Living predators.
    pub predator_count: usize,
    /// Uneaten food pellets.
    pub food_count: usize,
    /// Static obstacles.
    pub obstacle_count: usize,
    /// Mean energy across living prey (0 when none).
    pub avg_prey_energy: f64,
    /// Mean energy across living predators (0 when none).
    pub avg_predator_energy: f64,
    /// Scalar in [0, 1] summarizing population imbalance and scarcity.
    pub extinction_risk: f64,
    /// Oldest living organism, in ticks.
    pub max_age: u64,
    /// Highest genome generation among living organisms.
    pub max_generation: u32,
    /// Births since the simulation started.
    pub total_births: u64,
    /// Organism deaths since the simulation started.
    pub total_deaths: u64,
    /// Deaths caused by an empty energy store.
    pub starvation_deaths: u64,
    /// Prey deaths caused by predators.
    pub predation_deaths: u64,
    /// Deaths from exceeding the species max age.
    pub old_age_deaths: u64,
    /// Mean `max_speed` of living prey.
    pub avg_prey_speed: f64,
    /// Mean `sense_radius` of living prey.
    pub avg_prey_sense: f64,
    /// Mean `size` of living prey.
    pub avg_prey_size: f64,
    /// Mean `max_speed` of living predators.
    pub avg_predator_speed: f64,
    /// Mean `sense_radius` of living predators.
    pub avg_predator_sense: f64,
    /// Mean `size` of living predators.
    pub avg_predator_size: f64,
}

impl SimulationStats {
    pub fn population(&self) -> usize {
        self.prey_count + self.predator_count
    }
}
