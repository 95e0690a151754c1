//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every numeric knob the engine reads per tick lives
//! here and can be swapped between ticks with `Simulation::update_config`.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing sections fall back)
//! 3. Command-line overrides applied by the binary (seed)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! size = 200.0
//! cell_size = 20.0
//! seed = 42
//! initial_prey = 150
//! initial_predators = 20
//!
//! [food]
//! spawn_rate = 1.5
//! max_food = 400
//!
//! [evolution]
//! mutation_factor = 0.2
//! ```

use serde::{Deserialize, Serialize};

/// World geometry and initial population.
///
/// `size`, `cell_size` and `seed` are fixed once a simulation is built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub size: f64,
    pub cell_size: f64,
    pub seed: u64,
    pub initial_prey: usize,
    pub initial_predators: usize,
    pub initial_food: usize,
    pub obstacle_count: usize,
    pub zone_count: usize,
    pub obstacle_min_radius: f64,
    pub obstacle_max_radius: f64,
    pub zone_min_radius: f64,
    pub zone_max_radius: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size: 200.0,
            cell_size: 20.0,
            seed: 42,
            initial_prey: 150,
            initial_predators: 20,
            initial_food: 200,
            obstacle_count: 12,
            zone_count: 6,
            obstacle_min_radius: 2.0,
            obstacle_max_radius: 6.0,
            zone_min_radius: 15.0,
            zone_max_radius: 35.0,
        }
    }
}

/// Ambient food spawning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FoodConfig {
    /// Expected pellets spawned per tick. The integer part always spawns, the
    /// fractional part is a spawn probability.
    pub spawn_rate: f64,
    pub max_food: usize,
    pub food_energy: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            spawn_rate: 1.5,
            max_food: 400,
            food_energy: 40.0,
        }
    }
}

/// Steering weights used by the behavior pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BehaviorConfig {
    pub separation_radius: f64,
    pub separation_weight: f64,
    pub seek_weight: f64,
    pub avoid_weight: f64,
    pub obstacle_weight: f64,
    /// Obstacles closer than this (edge to edge) are handled by collision,
    /// not by avoidance steering.
    pub obstacle_margin: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            separation_radius: 4.0,
            separation_weight: 1.5,
            seek_weight: 1.0,
            avoid_weight: 2.0,
            obstacle_weight: 3.0,
            obstacle_margin: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub max_force: f64,
    /// Per-tick velocity retention, in (0, 1].
    pub drag: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_force: 0.2,
            drag: 0.98,
        }
    }
}

/// Energy drain coefficients and lifespan limits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MetabolismConfig {
    pub exist_cost: f64,
    pub move_cost: f64,
    pub sense_cost: f64,
    pub size_cost: f64,
    pub prey_max_age: u64,
    pub predator_max_age: u64,
    pub hungry_threshold: f64,
    pub critical_threshold: f64,
    pub old_age_ratio: f64,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            exist_cost: 0.02,
            move_cost: 0.01,
            sense_cost: 0.001,
            size_cost: 0.01,
            prey_max_age: 4000,
            predator_max_age: 5000,
            hungry_threshold: 0.5,
            critical_threshold: 0.2,
            old_age_ratio: 0.8,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReproductionConfig {
    pub threshold: f64,
    pub min_age: u64,
    /// Fraction of the parent's energy handed to the offspring.
    pub cost_fraction: f64,
    pub max_population: usize,
    /// Offspring spawn offset, in parent radii.
    pub offspring_offset: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            threshold: 150.0,
            min_age: 100,
            cost_fraction: 0.5,
            max_population: 600,
            offspring_offset: 3.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    pub mutation_factor: f64,
    /// Probability a predator offspring keeps its parent's subtype.
    pub subtype_inheritance: f64,
    pub founder_jitter: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_factor: 0.2,
            subtype_inheritance: 0.9,
            founder_jitter: 0.2,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CollisionConfig {
    pub search_margin: f64,
    pub bounce_damping: f64,
    pub push_multiplier: f64,
    pub predator_energy_efficiency: f64,
    pub min_energy_gain: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            search_margin: 5.0,
            bounce_damping: 0.8,
            push_multiplier: 1.1,
            predator_energy_efficiency: 0.7,
            min_energy_gain: 20.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub food: FoodConfig,
    pub behavior: BehaviorConfig,
    pub physics: PhysicsConfig,
    pub metabolism: MetabolismConfig,
    pub reproduction: ReproductionConfig,
    pub evolution: EvolutionConfig,
    pub collision: CollisionConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    ///
    /// # Validation Rules
    /// - World size and cell size must be positive, and a cell may not be
    ///   larger than the world
    /// - Interaction radii must stay below half the world size
    /// - Costs, weights and rates must be non-negative
    /// - Fractions and probabilities must lie in [0.0, 1.0]
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        let w = &self.world;
        anyhow::ensure!(
            w.size.is_finite() && w.size > 0.0,
            "World size must be positive"
        );
        anyhow::ensure!(w.size <= 100_000.0, "World size too large (max 100000)");
        anyhow::ensure!(
            w.cell_size.is_finite() && w.cell_size > 0.0,
            "Cell size must be positive"
        );
        anyhow::ensure!(
            w.cell_size <= w.size,
            "Cell size must not exceed the world size"
        );
        anyhow::ensure!(
            (w.size / w.cell_size) <= 1024.0,
            "Grid too fine (max 1024 cells per axis)"
        );
        anyhow::ensure!(
            w.obstacle_min_radius > 0.0 && w.obstacle_min_radius <= w.obstacle_max_radius,
            "Obstacle radius range must be positive and ordered"
        );
        anyhow::ensure!(
            w.zone_min_radius > 0.0 && w.zone_min_radius <= w.zone_max_radius,
            "Zone radius range must be positive and ordered"
        );
        anyhow::ensure!(
            w.obstacle_max_radius < w.size / 2.0 && w.zone_max_radius < w.size / 2.0,
            "Obstacle and zone radii must stay below half the world size"
        );
        anyhow::ensure!(
            w.initial_prey + w.initial_predators <= self.reproduction.max_population,
            "Initial population exceeds max population"
        );

        // Food validation
        anyhow::ensure!(
            self.food.spawn_rate >= 0.0,
            "Food spawn rate must be non-negative"
        );
        anyhow::ensure!(
            self.food.food_energy > 0.0,
            "Food energy must be positive"
        );

        // Behavior validation
        let b = &self.behavior;
        anyhow::ensure!(
            b.separation_radius >= 0.0 && b.separation_radius < w.size / 2.0,
            "Separation radius must be in [0, world_size / 2)"
        );
        anyhow::ensure!(
            b.separation_weight >= 0.0
                && b.seek_weight >= 0.0
                && b.avoid_weight >= 0.0
                && b.obstacle_weight >= 0.0,
            "Steering weights must be non-negative"
        );
        anyhow::ensure!(
            b.obstacle_margin >= 0.0,
            "Obstacle margin must be non-negative"
        );

        // Physics validation
        anyhow::ensure!(
            self.physics.max_force > 0.0,
            "Max steering force must be positive"
        );
        anyhow::ensure!(
            self.physics.drag > 0.0 && self.physics.drag <= 1.0,
            "Drag must be in (0.0, 1.0]"
        );

        // Metabolism validation
        let m = &self.metabolism;
        anyhow::ensure!(
            m.exist_cost >= 0.0 && m.move_cost >= 0.0 && m.sense_cost >= 0.0 && m.size_cost >= 0.0,
            "Metabolic costs must be non-negative"
        );
        anyhow::ensure!(
            m.prey_max_age > 0 && m.predator_max_age > 0,
            "Max ages must be positive"
        );
        anyhow::ensure!(
            m.critical_threshold >= 0.0
                && m.critical_threshold <= m.hungry_threshold
                && m.hungry_threshold <= 1.0,
            "Energy thresholds must satisfy 0 <= critical <= hungry <= 1"
        );
        anyhow::ensure!(
            m.old_age_ratio > 0.0 && m.old_age_ratio <= 1.0,
            "Old age ratio must be in (0.0, 1.0]"
        );

        // Reproduction validation
        let r = &self.reproduction;
        anyhow::ensure!(
            r.threshold > 0.0,
            "Reproduction threshold must be positive"
        );
        anyhow::ensure!(
            r.cost_fraction > 0.0 && r.cost_fraction < 1.0,
            "Reproduction cost fraction must be in (0.0, 1.0)"
        );
        anyhow::ensure!(r.max_population > 0, "Max population must be positive");
        anyhow::ensure!(
            r.offspring_offset >= 0.0,
            "Offspring offset must be non-negative"
        );

        // Evolution validation
        let e = &self.evolution;
        anyhow::ensure!(
            e.mutation_factor >= 0.0 && e.mutation_factor <= 2.0,
            "Mutation factor must be in [0.0, 2.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&e.subtype_inheritance),
            "Subtype inheritance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&e.founder_jitter),
            "Founder jitter must be in [0.0, 1.0)"
        );

        // Collision validation
        let c = &self.collision;
        anyhow::ensure!(
            c.search_margin >= 0.0 && c.search_margin < w.size / 2.0,
            "Collision search margin must be in [0, world_size / 2)"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&c.bounce_damping),
            "Bounce damping must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            c.push_multiplier >= 1.0,
            "Push multiplier must be at least 1.0"
        );
        anyhow::ensure!(
            c.predator_energy_efficiency >= 0.0 && c.min_energy_gain >= 0.0,
            "Predation gains must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys keep their
    /// defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Whether `other` keeps the fields that cannot change after start-up.
    pub fn same_geometry(&self, other: &AppConfig) -> bool {
        self.world.size == other.world.size
            && self.world.cell_size == other.world.cell_size
            && self.world.seed == other.world.seed
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.food).as_bytes());
        hasher.update(format!("{:?}", self.behavior).as_bytes());
        hasher.update(format!("{:?}", self.physics).as_bytes());
        hasher.update(format!("{:?}", self.metabolism).as_bytes());
        hasher.update(format!("{:?}", self.reproduction).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.collision).as_bytes());
        hex::encode(hasher.finalize())
    }
}
