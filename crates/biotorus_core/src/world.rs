//! The simulation orchestrator.
//!
//! `Simulation` owns every entity collection, the grids, the factories, the
//! genetic forest and the PRNG. One call to [`Simulation::tick`] runs the
//! whole pipeline synchronously:
//!
//! 1. spawn food
//! 2. rebuild grids (static only when dirty)
//! 3. behavior, physics, metabolism, collision, reproduction
//! 4. statistics refresh
//! 5. death processing (tree update, removal)
//! 6. `TickUpdated`

use crate::config::AppConfig;
use crate::entity_manager::EntityManager;
use crate::genetic_tree::GeneticTree;
use crate::grid_manager::GridManager;
use crate::lifecycle::OrganismFactory;
use crate::math::toroidal_distance_squared;
use crate::metrics::Metrics;
use crate::render::{InstanceIndex, RenderBuffers};
use crate::rng::SimRng;
use crate::snapshot::{SimulationState, STATE_VERSION};
use crate::systems::reproduction::update_genetic_tree_on_death;
use crate::systems::{
    update_population_stats, BehaviorContext, BehaviorSystem, CollisionContext, CollisionSystem,
    MetabolismSystem, PhysicsSystem, ReproductionContext, ReproductionSystem, StatsContext,
};
use biotorus_data::{
    Color, DeathCause, EcologicalZone, EntityKind, Food, GeneticTreeNode, Obstacle, Organism,
    OrganismKind, SimEvent, SimulationStats, Vec3, ZoneType,
};
use std::collections::BTreeMap;
use std::time::Instant;

/// Draws made before giving up on an obstacle-free spawn point.
const PLACEMENT_ATTEMPTS: usize = 8;

#[derive(Debug)]
pub struct Simulation {
    config: AppConfig,
    rng: SimRng,
    tick: u64,
    entities: EntityManager,
    grids: GridManager,
    factory: OrganismFactory,
    tree: GeneticTree,
    stats: SimulationStats,
    behavior: BehaviorSystem,
    physics: PhysicsSystem,
    metabolism: MetabolismSystem,
    collision: CollisionSystem,
    reproduction: ReproductionSystem,
    metrics: Metrics,
}

impl Simulation {
    /// Validates `config` and builds a populated world.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let mut sim = Self::bare(config);
        sim.populate();
        Ok(sim)
    }

    /// Validates `config` and builds a world with no entities, ignoring the
    /// initial population settings.
    pub fn empty(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let mut sim = Self::bare(config);
        sim.refresh_stats();
        Ok(sim)
    }

    fn bare(config: AppConfig) -> Self {
        Self {
            rng: SimRng::new(config.world.seed),
            grids: GridManager::new(config.world.size, config.world.cell_size),
            config,
            tick: 0,
            entities: EntityManager::new(),
            factory: OrganismFactory::new(),
            tree: GeneticTree::new(),
            stats: SimulationStats::default(),
            behavior: BehaviorSystem::new(),
            physics: PhysicsSystem::new(),
            metabolism: MetabolismSystem::new(),
            collision: CollisionSystem::new(),
            reproduction: ReproductionSystem::new(),
            metrics: Metrics::new(),
        }
    }

    fn populate(&mut self) {
        let w = self.config.world.clone();

        for _ in 0..w.zone_count {
            let zone_type = *self.rng.choose(&ZoneType::ALL);
            let center = self.rng.point_in_cube(w.size);
            let radius = self.rng.range(w.zone_min_radius, w.zone_max_radius);
            self.entities.add_zone(zone_type, center, radius);
        }

        for _ in 0..w.obstacle_count {
            let position = self.rng.point_in_cube(w.size);
            let radius = self.rng.range(w.obstacle_min_radius, w.obstacle_max_radius);
            let grey = self.rng.range_int(80, 140) as u8;
            let opacity = self.rng.range(0.4, 0.8);
            let wireframe = self.rng.chance(0.2);
            self.entities
                .add_obstacle(position, radius, Color::new(grey, grey, grey), opacity, wireframe);
        }
        self.grids.mark_static_dirty();

        for _ in 0..w.initial_prey {
            let position = self.safe_position();
            self.spawn_organism(OrganismKind::Prey, position);
        }
        for _ in 0..w.initial_predators {
            let position = self.safe_position();
            self.spawn_organism(OrganismKind::Predator, position);
        }
        for _ in 0..w.initial_food.min(self.config.food.max_food) {
            let position = self.safe_position();
            self.entities
                .add_food(position, self.config.food.food_energy, self.tick);
        }

        self.refresh_stats();
        tracing::info!(
            seed = w.seed,
            prey = self.stats.prey_count,
            predators = self.stats.predator_count,
            food = self.stats.food_count,
            obstacles = self.stats.obstacle_count,
            zones = self.entities.zones().len(),
            "World populated"
        );
    }

    /// Uniform point outside every obstacle, or the last draw when none of
    /// the attempts is clear.
    fn safe_position(&mut self) -> Vec3 {
        let size = self.config.world.size;
        let mut position = self.rng.point_in_cube(size);
        for _ in 1..PLACEMENT_ATTEMPTS {
            if !self.inside_obstacle(position) {
                break;
            }
            position = self.rng.point_in_cube(size);
        }
        position
    }

    fn inside_obstacle(&self, position: Vec3) -> bool {
        let size = self.config.world.size;
        self.entities.obstacles().iter().any(|o| {
            toroidal_distance_squared(position, o.position, size) < o.radius * o.radius
        })
    }

    /// Advances the world one step and returns the events it emitted, ending
    /// with `TickUpdated`.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let started = Instant::now();
        self.tick += 1;
        let tick = self.tick;
        let world_size = self.config.world.size;
        let mut events = Vec::new();

        self.grow_food(&mut events);

        self.grids.ensure_static(self.entities.obstacles());
        self.grids
            .rebuild_dynamic(self.entities.organisms(), self.entities.food());

        {
            let (organisms, zones) = self.entities.organisms_and_zones_mut();
            let ctx = BehaviorContext {
                grids: &self.grids,
                zones,
                config: &self.config.behavior,
                world_size,
            };
            self.behavior.update(organisms, &ctx);
        }

        let resets =
            self.physics
                .update(self.entities.organisms_mut(), &self.config.physics, world_size);
        self.metrics.record_velocity_resets(resets);

        self.metabolism
            .update(self.entities.organisms_mut(), &self.config.metabolism);

        let killed = {
            let ctx = CollisionContext {
                grids: &self.grids,
                config: &self.config.collision,
                world_size,
            };
            self.collision.update(&mut self.entities, &ctx, &mut events)
        };

        self.reproduction
            .check_reproduction(self.entities.organisms_mut(), &self.config.reproduction);
        let born = {
            let ctx = ReproductionContext {
                config: &self.config.reproduction,
                evolution: &self.config.evolution,
                world_size,
                tick,
            };
            self.reproduction.create_offspring(
                &mut self.entities,
                &mut self.factory,
                &mut self.tree,
                &mut self.rng,
                &ctx,
                &mut events,
            )
        };
        self.stats.total_births += born as u64;

        let before = (self.stats.prey_count, self.stats.predator_count);
        self.refresh_stats();
        self.log_extinctions(before);

        let deaths = self.process_deaths(&mut events);
        tracing::trace!(tick, born, deaths, killed = killed.len(), "Tick resolved");

        let elapsed = started.elapsed();
        self.metrics.record_births(born);
        self.metrics.record_deaths(deaths);
        self.metrics.record_tick(
            tick,
            elapsed,
            self.stats.population(),
            self.stats.food_count,
        );

        events.push(SimEvent::TickUpdated {
            tick,
            stats: Box::new(self.stats.clone()),
            delta_time: elapsed.as_secs_f64() * 1000.0,
        });
        events
    }

    fn grow_food(&mut self, events: &mut Vec<SimEvent>) {
        let rate = self.config.food.spawn_rate;
        if rate <= 0.0 {
            return;
        }
        let mut count = rate.floor() as usize;
        if self.rng.chance(rate.fract()) {
            count += 1;
        }
        for _ in 0..count {
            if self.entities.food_count() >= self.config.food.max_food {
                break;
            }
            let position = self.safe_position();
            let id = self
                .entities
                .add_food(position, self.config.food.food_energy, self.tick);
            events.push(SimEvent::EntitySpawned {
                entity_type: EntityKind::Food,
                id,
                position,
            });
        }
    }

    fn refresh_stats(&mut self) {
        update_population_stats(StatsContext {
            stats: &mut self.stats,
            organisms: self.entities.organisms(),
            food_count: self.entities.food_count(),
            obstacle_count: self.entities.obstacles().len(),
            max_population: self.config.reproduction.max_population,
            tick: self.tick,
        });
    }

    fn log_extinctions(&self, (prey_before, predators_before): (usize, usize)) {
        if prey_before > 0 && self.stats.prey_count == 0 {
            tracing::info!(tick = self.tick, "Prey went extinct");
        }
        if predators_before > 0 && self.stats.predator_count == 0 {
            tracing::info!(tick = self.tick, "Predators went extinct");
        }
    }

    /// Stamps the tree, tallies causes and removes dead organisms. Returns
    /// how many were removed.
    fn process_deaths(&mut self, events: &mut Vec<SimEvent>) -> usize {
        let dead = self.entities.remove_dead();
        for o in &dead {
            update_genetic_tree_on_death(&mut self.tree, o, self.tick);
            let cause = o.cause_of_death.unwrap_or(DeathCause::Starvation);
            match cause {
                DeathCause::Starvation => self.stats.starvation_deaths += 1,
                DeathCause::Predation => self.stats.predation_deaths += 1,
                DeathCause::OldAge => self.stats.old_age_deaths += 1,
                DeathCause::Consumed => {}
            }
            events.push(SimEvent::EntityDied {
                entity_type: o.kind().into(),
                id: o.id,
                position: o.position,
                cause_of_death: cause,
            });
        }
        self.stats.total_deaths += dead.len() as u64;
        dead.len()
    }

    // Mutation between ticks

    /// Creates a founder organism at `position` and registers its genome.
    pub fn spawn_organism(&mut self, kind: OrganismKind, position: Vec3) -> u64 {
        let position = crate::math::wrap_vec(position, self.config.world.size);
        let organism = self.factory.create(
            kind,
            position,
            &self.config.evolution,
            &mut self.rng,
            self.tick,
        );
        self.tree.register(&organism.genome, self.tick);
        let id = organism.id;
        self.entities.add_organism(organism);
        id
    }

    pub fn spawn_food(&mut self, position: Vec3) -> u64 {
        let position = crate::math::wrap_vec(position, self.config.world.size);
        self.entities
            .add_food(position, self.config.food.food_energy, self.tick)
    }

    /// Adds a static obstacle; the static grid is rebuilt on the next tick.
    pub fn add_obstacle(&mut self, position: Vec3, radius: f64) -> u64 {
        let position = crate::math::wrap_vec(position, self.config.world.size);
        let id = self
            .entities
            .add_obstacle(position, radius, Color::new(110, 110, 110), 0.6, false);
        self.grids.mark_static_dirty();
        id
    }

    pub fn remove_obstacle(&mut self, id: u64) -> bool {
        let removed = self.entities.remove_obstacle(id).is_some();
        if removed {
            self.grids.mark_static_dirty();
        }
        removed
    }

    pub fn add_zone(&mut self, zone_type: ZoneType, center: Vec3, radius: f64) -> u32 {
        self.entities.add_zone(zone_type, center, radius)
    }

    /// Direct access for tooling and tests.
    pub fn organism_mut(&mut self, id: u64) -> Option<&mut Organism> {
        self.entities.organism_mut(id)
    }

    /// Replaces the configuration between ticks. World size, cell size and
    /// seed are fixed for the lifetime of a simulation.
    pub fn update_config(&mut self, config: AppConfig) -> anyhow::Result<()> {
        config.validate()?;
        anyhow::ensure!(
            self.config.same_geometry(&config),
            "World size, cell size and seed cannot change on a running simulation"
        );
        tracing::info!(
            tick = self.tick,
            fingerprint = %config.fingerprint(),
            "Configuration updated"
        );
        self.config = config;
        Ok(())
    }

    // Read-only views

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn organisms(&self) -> &[Organism] {
        self.entities.organisms()
    }

    pub fn organism(&self, id: u64) -> Option<&Organism> {
        self.entities.organism(id)
    }

    pub fn food(&self) -> &[Food] {
        self.entities.food()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.entities.obstacles()
    }

    pub fn zones(&self) -> &BTreeMap<u32, EcologicalZone> {
        self.entities.zones()
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn grids(&self) -> &GridManager {
        &self.grids
    }

    pub fn genetic_tree(&self) -> &GeneticTree {
        &self.tree
    }

    pub fn genetic_roots(&self) -> &[u64] {
        self.tree.roots()
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn render_buffers(&self) -> RenderBuffers {
        RenderBuffers::build(&self.entities)
    }

    /// Refills caller-owned buffers, reusing their allocations.
    pub fn fill_render_buffers(&self, buffers: &mut RenderBuffers) {
        buffers.fill(&self.entities);
    }

    pub fn instance_index(&self) -> InstanceIndex {
        InstanceIndex::build(&self.entities)
    }

    /// SHA-256 over the live organisms and food. Equal digests mean
    /// bit-identical kinematic and energetic state.
    pub fn state_digest(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.tick.to_le_bytes());
        for o in self.entities.organisms() {
            hasher.update(format!("{o:?}").as_bytes());
        }
        for f in self.entities.food() {
            hasher.update(format!("{f:?}").as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    // Save / restore

    pub fn save_state(&self) -> SimulationState {
        SimulationState {
            version: STATE_VERSION,
            config: self.config.clone(),
            rng: self.rng.state(),
            tick: self.tick,
            factory: self.factory.counters(),
            counters: self.entities.counters(),
            organisms: self.entities.organisms().to_vec(),
            food: self.entities.food().to_vec(),
            obstacles: self.entities.obstacles().to_vec(),
            zones: self.entities.zones().values().cloned().collect(),
            tree_nodes: self.tree.nodes().cloned().collect::<Vec<GeneticTreeNode>>(),
            tree_roots: self.tree.roots().to_vec(),
            stats: self.stats.clone(),
        }
    }

    /// Rebuilds a simulation that continues exactly where `state` was taken.
    pub fn from_state(state: SimulationState) -> anyhow::Result<Self> {
        state.validate()?;
        let tree = GeneticTree::restore(state.tree_nodes, state.tree_roots);
        tree.validate()?;
        let mut sim = Self::bare(state.config);
        sim.rng = SimRng::from_state(state.rng);
        sim.tick = state.tick;
        sim.factory.restore_counters(state.factory);
        sim.entities = EntityManager::restore(
            state.organisms,
            state.food,
            state.obstacles,
            state.zones,
            state.counters,
        );
        sim.tree = tree;
        sim.stats = state.stats;
        sim.grids.mark_static_dirty();
        tracing::info!(tick = sim.tick, organisms = sim.organisms().len(), "State restored");
        Ok(sim)
    }
}
