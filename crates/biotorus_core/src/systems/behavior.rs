//! Steering: separation, seek, flee and obstacle avoidance.
//!
//! The activity label is recomputed from scratch every tick. Within one
//! neighbor scan the last category that touches the label wins, so a prey
//! that sees food after a predator ends the scan `Seeking`, and the reverse
//! ends it `Fleeing`.

use crate::config::BehaviorConfig;
use crate::grid_manager::GridManager;
use crate::math::{toroidal_distance_squared, toroidal_vector, EPSILON};
use crate::spatial_hash::GridEntity;
use biotorus_data::{Activity, EcologicalZone, EntityKind, Organism, OrganismKind, Vec3};
use std::collections::BTreeMap;

pub struct BehaviorContext<'a> {
    pub grids: &'a GridManager,
    pub zones: &'a BTreeMap<u32, EcologicalZone>,
    pub config: &'a BehaviorConfig,
    pub world_size: f64,
}

/// Compounded zone multipliers at one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneModifiers {
    pub seek: f64,
    pub danger: f64,
}

impl Default for ZoneModifiers {
    fn default() -> Self {
        Self {
            seek: 1.0,
            danger: 1.0,
        }
    }
}

/// Multiplies the modifiers of every zone whose sphere contains `position`.
pub fn zone_modifiers(
    position: Vec3,
    zones: &BTreeMap<u32, EcologicalZone>,
    world_size: f64,
) -> ZoneModifiers {
    let mut m = ZoneModifiers::default();
    for zone in zones.values() {
        if toroidal_distance_squared(position, zone.center, world_size) <= zone.radius * zone.radius
        {
            m.seek *= zone.food_multiplier;
            m.danger *= zone.danger_multiplier;
        }
    }
    m
}

/// Raw force categories gathered during one neighbor scan.
#[derive(Debug, Clone, Copy, Default)]
struct Forces {
    separation: Vec3,
    flee: Vec3,
    obstacle: Vec3,
    target: Option<(Vec3, f64)>,
}

#[derive(Debug, Default)]
pub struct BehaviorSystem {
    neighbors: Vec<GridEntity>,
}

impl BehaviorSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds each live organism's steering force to its acceleration and
    /// relabels its activity.
    pub fn update(&mut self, organisms: &mut [Organism], ctx: &BehaviorContext) {
        for organism in organisms.iter_mut().filter(|o| o.is_alive()) {
            ctx.grids.get_nearby(
                organism.position,
                organism.genome.traits.sense_radius,
                &mut self.neighbors,
            );
            let (force, activity) = steer(organism, &self.neighbors, ctx);
            organism.acceleration += force;
            organism.activity = activity;
        }
    }
}

fn steer(organism: &Organism, neighbors: &[GridEntity], ctx: &BehaviorContext) -> (Vec3, Activity) {
    let cfg = ctx.config;
    let kind = organism.kind();
    let self_kind = EntityKind::from(kind);
    let sense = organism.genome.traits.sense_radius;
    let sense_sq = sense * sense;

    let mut forces = Forces::default();
    let mut activity = Activity::Idle;

    for n in neighbors {
        if n.kind == self_kind && n.id == organism.id {
            continue;
        }
        let delta = toroidal_vector(organism.position, n.position, ctx.world_size);
        let dist_sq = delta.length_squared();
        if dist_sq > sense_sq {
            continue;
        }
        let dist = dist_sq.sqrt();
        if dist < EPSILON {
            continue;
        }
        let away = -delta / dist;

        match n.kind {
            EntityKind::Obstacle => {
                let gap = dist - n.radius - organism.radius;
                if gap > cfg.obstacle_margin {
                    forces.obstacle += away / dist_sq;
                }
            }
            EntityKind::Prey | EntityKind::Predator => {
                if dist < cfg.separation_radius {
                    forces.separation += away * (1.0 - dist / cfg.separation_radius);
                }
                match (kind, n.kind) {
                    (OrganismKind::Prey, EntityKind::Predator) => {
                        forces.flee += away / dist_sq;
                        activity = Activity::Fleeing;
                    }
                    (OrganismKind::Predator, EntityKind::Prey) => {
                        track_nearest(&mut forces.target, delta, dist);
                        activity = Activity::Hunting;
                    }
                    _ => {}
                }
            }
            EntityKind::Food => {
                if kind == OrganismKind::Prey {
                    track_nearest(&mut forces.target, delta, dist);
                    activity = Activity::Seeking;
                }
            }
        }
    }

    let zone = zone_modifiers(organism.position, ctx.zones, ctx.world_size);
    let mut seek = Vec3::ZERO;
    if let Some((delta, _)) = forces.target {
        seek = delta.normalize() * (cfg.seek_weight * zone.seek);
        if kind == OrganismKind::Predator {
            seek *= zone.danger;
        }
    }

    let force = forces.separation.normalize() * cfg.separation_weight
        + seek
        + forces.flee.normalize() * cfg.avoid_weight
        + forces.obstacle.normalize() * cfg.obstacle_weight;
    (force, activity)
}

#[inline]
fn track_nearest(target: &mut Option<(Vec3, f64)>, delta: Vec3, dist: f64) {
    if target.map_or(true, |(_, best)| dist < best) {
        *target = Some((delta, dist));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvolutionConfig;
    use crate::lifecycle::OrganismFactory;
    use crate::rng::SimRng;
    use biotorus_data::{Color, Food, Obstacle, ZoneType};

    struct Fixture {
        grids: GridManager,
        zones: BTreeMap<u32, EcologicalZone>,
        config: BehaviorConfig,
        factory: OrganismFactory,
        rng: SimRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                grids: GridManager::new(100.0, 20.0),
                zones: BTreeMap::new(),
                config: BehaviorConfig::default(),
                factory: OrganismFactory::new(),
                rng: SimRng::new(42),
            }
        }

        fn organism(&mut self, kind: OrganismKind, at: Vec3) -> Organism {
            self.factory
                .create(kind, at, &EvolutionConfig::default(), &mut self.rng, 0)
        }

        fn run(&mut self, organisms: &mut [Organism], food: &[Food]) {
            self.run_with(organisms, food, &[]);
        }

        fn run_with(&mut self, organisms: &mut [Organism], food: &[Food], obstacles: &[Obstacle]) {
            self.grids.rebuild_static(obstacles);
            self.grids.rebuild_dynamic(organisms, food);
            let ctx = BehaviorContext {
                grids: &self.grids,
                zones: &self.zones,
                config: &self.config,
                world_size: 100.0,
            };
            BehaviorSystem::new().update(organisms, &ctx);
        }
    }

    fn food(id: u64, at: Vec3) -> Food {
        Food {
            id,
            position: at,
            energy: 40.0,
            spawn_tick: 0,
            consumed: false,
        }
    }

    #[test]
    fn test_prey_seeks_food() {
        let mut fx = Fixture::new();
        let mut prey = fx.organism(OrganismKind::Prey, Vec3::splat(50.0));
        prey.genome.traits.sense_radius = 30.0;
        let mut organisms = vec![prey];
        fx.run(&mut organisms, &[food(1, Vec3::new(55.0, 50.0, 50.0))]);
        assert!(organisms[0].acceleration.x > 0.0);
        assert_eq!(organisms[0].activity, Activity::Seeking);
    }

    #[test]
    fn test_prey_flees_predator_across_seam() {
        let mut fx = Fixture::new();
        let mut prey = fx.organism(OrganismKind::Prey, Vec3::new(1.0, 50.0, 50.0));
        prey.genome.traits.sense_radius = 20.0;
        let predator = fx.organism(OrganismKind::Predator, Vec3::new(95.0, 50.0, 50.0));
        let mut organisms = vec![prey, predator];
        fx.run(&mut organisms, &[]);
        assert_eq!(organisms[0].activity, Activity::Fleeing);
        assert!(organisms[0].acceleration.x > 0.0);
        assert_eq!(organisms[1].activity, Activity::Hunting);
        assert!(organisms[1].acceleration.x > 0.0);
    }

    #[test]
    fn test_idle_without_neighbors() {
        let mut fx = Fixture::new();
        let mut organisms = vec![fx.organism(OrganismKind::Prey, Vec3::splat(10.0))];
        organisms[0].activity = Activity::Reproducing;
        fx.run(&mut organisms, &[]);
        assert_eq!(organisms[0].activity, Activity::Idle);
        assert_eq!(organisms[0].acceleration, Vec3::ZERO);
    }

    fn obstacle(at: Vec3, radius: f64) -> Obstacle {
        Obstacle {
            id: 1,
            position: at,
            radius,
            color: Color::new(110, 110, 110),
            opacity: 0.6,
            wireframe: false,
        }
    }

    #[test]
    fn test_separation_pushes_apart() {
        let mut fx = Fixture::new();
        let mut a = fx.organism(OrganismKind::Prey, Vec3::splat(50.0));
        let mut b = fx.organism(OrganismKind::Prey, Vec3::new(52.0, 50.0, 50.0));
        a.genome.traits.sense_radius = 10.0;
        b.genome.traits.sense_radius = 10.0;
        let mut organisms = vec![a, b];
        fx.run(&mut organisms, &[]);

        let weight = fx.config.separation_weight;
        assert!(organisms[0].acceleration.x < 0.0);
        assert!(organisms[1].acceleration.x > 0.0);
        for o in &organisms {
            assert!((o.acceleration.length() - weight).abs() < 1e-9);
            assert_eq!(o.activity, Activity::Idle);
        }
    }

    #[test]
    fn test_obstacle_avoidance_outside_margin_only() {
        let mut fx = Fixture::new();
        let mut prey = fx.organism(OrganismKind::Prey, Vec3::splat(50.0));
        prey.genome.traits.sense_radius = 20.0;
        let r = prey.radius;

        let mut organisms = vec![prey.clone()];
        fx.run_with(&mut organisms, &[], &[obstacle(Vec3::new(60.0, 50.0, 50.0), 3.0)]);
        let accel = organisms[0].acceleration;
        assert!(accel.x < 0.0, "acceleration {accel:?}");
        assert!((accel.length() - fx.config.obstacle_weight).abs() < 1e-9);

        let touching = 50.0 + r + 3.0 + fx.config.obstacle_margin * 0.5;
        let mut organisms = vec![prey];
        fx.run_with(&mut organisms, &[], &[obstacle(Vec3::new(touching, 50.0, 50.0), 3.0)]);
        assert_eq!(organisms[0].acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_hunting_ground_scales_predator_seek_only() {
        let hunting = EcologicalZone::new(1, ZoneType::HuntingGround, Vec3::splat(50.0), 10.0);
        let danger = hunting.danger_multiplier;

        let chase = |zoned: bool| {
            let mut fx = Fixture::new();
            if zoned {
                fx.zones.insert(1, hunting.clone());
            }
            let mut predator = fx.organism(OrganismKind::Predator, Vec3::splat(50.0));
            predator.genome.traits.sense_radius = 20.0;
            let prey = fx.organism(OrganismKind::Prey, Vec3::new(55.0, 50.0, 50.0));
            let mut organisms = vec![predator, prey];
            fx.run(&mut organisms, &[]);
            organisms[0].acceleration.length()
        };
        let graze = |zoned: bool| {
            let mut fx = Fixture::new();
            if zoned {
                fx.zones.insert(1, hunting.clone());
            }
            let mut prey = fx.organism(OrganismKind::Prey, Vec3::splat(50.0));
            prey.genome.traits.sense_radius = 20.0;
            let mut organisms = vec![prey];
            fx.run(&mut organisms, &[food(1, Vec3::new(55.0, 50.0, 50.0))]);
            organisms[0].acceleration.length()
        };

        assert!((chase(true) - chase(false) * danger).abs() < 1e-9);
        assert!(chase(true) > chase(false));
        assert!((graze(true) - graze(false)).abs() < 1e-9);
    }

    #[test]
    fn test_last_category_scanned_sets_label() {
        // Same cell: organisms are inserted before food, so food is seen last.
        let mut fx = Fixture::new();
        let mut prey = fx.organism(OrganismKind::Prey, Vec3::splat(50.0));
        prey.genome.traits.sense_radius = 15.0;
        let predator = fx.organism(OrganismKind::Predator, Vec3::new(50.0, 50.0, 56.0));
        let mut organisms = vec![prey.clone(), predator.clone()];
        fx.run(&mut organisms, &[food(1, Vec3::new(50.0, 50.0, 45.0))]);
        assert_eq!(organisms[0].activity, Activity::Seeking);

        // Food one z-layer below is visited before the predator's cell.
        let mut organisms = vec![prey, predator];
        fx.run(&mut organisms, &[food(1, Vec3::new(50.0, 50.0, 38.0))]);
        assert_eq!(organisms[0].activity, Activity::Fleeing);
    }

    #[test]
    fn test_zone_modifiers_compound() {
        let mut zones = BTreeMap::new();
        zones.insert(1, EcologicalZone::new(1, ZoneType::Oasis, Vec3::splat(50.0), 10.0));
        zones.insert(2, EcologicalZone::new(2, ZoneType::HuntingGround, Vec3::splat(52.0), 10.0));
        zones.insert(3, EcologicalZone::new(3, ZoneType::Desert, Vec3::splat(10.0), 5.0));
        let m = zone_modifiers(Vec3::splat(51.0), &zones, 100.0);
        assert!((m.seek - 2.0).abs() < 1e-12);
        assert!((m.danger - 1.6).abs() < 1e-12);
    }
}
