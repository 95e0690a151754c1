mod common;

use biotorus_core::config::{BehaviorConfig, CollisionConfig, EvolutionConfig};
use biotorus_core::entity_manager::EntityManager;
use biotorus_core::grid_manager::GridManager;
use biotorus_core::lifecycle::OrganismFactory;
use biotorus_core::rng::SimRng;
use biotorus_core::systems::{BehaviorContext, BehaviorSystem, CollisionContext, CollisionSystem};
use biotorus_data::{Activity, Color, DeathCause, EntityKind, OrganismKind, SimEvent, Vec3};
use common::{OrganismSpec, SimulationBuilder};
use std::collections::BTreeMap;

const WORLD: f64 = 100.0;

struct Bench {
    entities: EntityManager,
    grids: GridManager,
    factory: OrganismFactory,
    rng: SimRng,
}

impl Bench {
    fn new() -> Self {
        Self {
            entities: EntityManager::new(),
            grids: GridManager::new(WORLD, 20.0),
            factory: OrganismFactory::new(),
            rng: SimRng::new(42),
        }
    }

    fn spawn(&mut self, kind: OrganismKind, at: Vec3) -> u64 {
        let o = self
            .factory
            .create(kind, at, &EvolutionConfig::default(), &mut self.rng, 0);
        let id = o.id;
        self.entities.add_organism(o);
        id
    }

    fn rebuild(&mut self) {
        self.grids.rebuild_static(self.entities.obstacles());
        self.grids
            .rebuild_dynamic(self.entities.organisms(), self.entities.food());
    }

    fn collide(&mut self) -> (Vec<u64>, Vec<SimEvent>) {
        self.rebuild();
        let config = CollisionConfig::default();
        let ctx = CollisionContext {
            grids: &self.grids,
            config: &config,
            world_size: WORLD,
        };
        let mut events = Vec::new();
        let killed = CollisionSystem::new().update(&mut self.entities, &ctx, &mut events);
        (killed, events)
    }
}

#[test]
fn test_prey_seeks_visible_food() {
    let mut bench = Bench::new();
    let prey = bench.spawn(OrganismKind::Prey, Vec3::new(50.0, 50.0, 50.0));
    if let Some(o) = bench.entities.organism_mut(prey) {
        o.genome.traits.sense_radius = 90.0;
    }
    bench.entities.add_food(Vec3::new(55.0, 50.0, 50.0), 40.0, 0);
    bench.rebuild();

    let zones = BTreeMap::new();
    let config = BehaviorConfig::default();
    let ctx = BehaviorContext {
        grids: &bench.grids,
        zones: &zones,
        config: &config,
        world_size: WORLD,
    };
    BehaviorSystem::new().update(bench.entities.organisms_mut(), &ctx);

    let o = bench.entities.organism(prey).expect("prey");
    assert!(o.acceleration.x > 0.0, "acceleration {:?}", o.acceleration);
    assert_eq!(o.activity, Activity::Seeking);
}

#[test]
fn test_overlapping_predator_kills_prey() {
    let mut bench = Bench::new();
    let predator = bench.spawn(OrganismKind::Predator, Vec3::new(30.0, 30.0, 30.0));
    let prey = bench.spawn(OrganismKind::Prey, Vec3::new(31.0, 30.0, 30.0));
    let before = bench.entities.organism(predator).map(|o| o.energy);

    let (killed, _) = bench.collide();

    assert_eq!(killed, vec![prey]);
    let after = bench.entities.organism(predator).map(|o| o.energy);
    assert!(after > before, "predator energy {:?} -> {:?}", before, after);
}

#[test]
fn test_obstacle_contact_reflects_velocity() {
    let mut bench = Bench::new();
    let id = bench.spawn(OrganismKind::Prey, Vec3::new(20.0, 50.0, 50.0));
    let radius = bench.entities.organism(id).map(|o| o.radius).unwrap_or(1.0);
    if let Some(o) = bench.entities.organism_mut(id) {
        o.velocity = Vec3::new(5.0, 0.0, 0.0);
    }
    // Obstacle surface sits inside the organism's radius.
    bench.entities.add_obstacle(
        Vec3::new(20.0 + radius + 2.0, 50.0, 50.0),
        3.0,
        Color::new(100, 100, 100),
        0.5,
        false,
    );

    bench.collide();

    let o = bench.entities.organism(id).expect("organism");
    assert!(o.velocity.x.abs() < 5.0, "velocity {:?}", o.velocity);
}

#[test]
fn test_simulation_predation_reported() {
    let (mut sim, ids) = SimulationBuilder::new()
        .with_seed(42)
        .with_world_size(WORLD, 20.0)
        .with_organism(OrganismSpec::predator().at(60.0, 60.0, 60.0).energy(80.0))
        .with_organism(OrganismSpec::prey().at(60.3, 60.0, 60.0).energy(100.0))
        .build_with_ids();
    let (predator, prey) = (ids[0], ids[1]);

    let events = sim.tick();

    assert_entity_dead!(sim, prey);
    assert_population!(sim, 0, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::EntityDied {
            entity_type: EntityKind::Prey,
            cause_of_death: DeathCause::Predation,
            id,
            ..
        } if *id == prey
    )));
    let hunter = sim.organism(predator).expect("predator survives");
    assert!(hunter.energy > 80.0);
    assert_eq!(hunter.hunt_successes, 1);
    assert_eq!(sim.stats().predation_deaths, 1);
    assert_eq!(sim.stats().total_deaths, 1);
}

#[test]
fn test_simulation_grazing_consumes_food() {
    let (mut sim, ids) = SimulationBuilder::new()
        .with_world_size(WORLD, 20.0)
        .with_food(40.2, 40.0, 40.0)
        .with_organism(OrganismSpec::prey().at(40.0, 40.0, 40.0).energy(60.0))
        .build_with_ids();

    let events = sim.tick();

    assert!(sim.food().is_empty());
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::EntityDied {
            entity_type: EntityKind::Food,
            cause_of_death: DeathCause::Consumed,
            ..
        }
    )));
    let o = sim.organism(ids[0]).expect("prey");
    assert!(o.energy > 60.0);
    assert_energy_in_bounds!(sim);
}

#[test]
fn test_starving_organism_removed() {
    let (mut sim, ids) = SimulationBuilder::new()
        .with_organism(OrganismSpec::prey().at(10.0, 10.0, 10.0).energy(0.001))
        .with_organism(OrganismSpec::prey().at(90.0, 90.0, 90.0))
        .build_with_ids();

    sim.tick();

    assert_entity_dead!(sim, ids[0]);
    assert!(sim.organism(ids[1]).is_some());
    assert_eq!(sim.stats().starvation_deaths, 1);
    let node = sim
        .genetic_tree()
        .nodes()
        .find(|n| n.died.is_some())
        .expect("dead genome stamped");
    assert_eq!(node.died, Some(1));
}
