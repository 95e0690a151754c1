//! Organism creation: founders placed by the world and offspring spawned
//! next to their parent.

use crate::config::EvolutionConfig;
use crate::genome::GenomeFactory;
use crate::math::wrap_vec;
use crate::rng::SimRng;
use biotorus_data::{Activity, Genome, Organism, OrganismKind, Vec3, MAX_ENERGY};
use serde::{Deserialize, Serialize};

/// Starting energy of founders.
pub const INITIAL_ENERGY: f64 = MAX_ENERGY * 0.5;

/// Radius per unit of genome size.
pub const RADIUS_PER_SIZE: f64 = 1.0;

/// Restorable id counters of an [`OrganismFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryCounters {
    pub next_organism_id: u64,
    pub next_genome_id: u64,
}

#[derive(Debug, Clone)]
pub struct OrganismFactory {
    next_id: u64,
    genomes: GenomeFactory,
}

impl Default for OrganismFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganismFactory {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            genomes: GenomeFactory::new(),
        }
    }

    pub fn counters(&self) -> FactoryCounters {
        FactoryCounters {
            next_organism_id: self.next_id,
            next_genome_id: self.genomes.next_id(),
        }
    }

    pub fn restore_counters(&mut self, counters: FactoryCounters) {
        self.next_id = counters.next_organism_id;
        self.genomes.set_next_id(counters.next_genome_id);
    }

    pub fn reset(&mut self) {
        self.next_id = 1;
        self.genomes.reset();
    }

    pub fn create_prey(
        &mut self,
        position: Vec3,
        evolution: &EvolutionConfig,
        rng: &mut SimRng,
        tick: u64,
    ) -> Organism {
        let genome = self.genomes.create_prey_genome(
            None,
            evolution.mutation_factor,
            evolution.founder_jitter,
            rng,
        );
        self.build(genome, position, INITIAL_ENERGY, tick)
    }

    pub fn create_predator(
        &mut self,
        position: Vec3,
        evolution: &EvolutionConfig,
        rng: &mut SimRng,
        tick: u64,
    ) -> Organism {
        let genome = self.genomes.create_predator_genome(
            None,
            evolution.mutation_factor,
            evolution.founder_jitter,
            evolution.subtype_inheritance,
            rng,
        );
        self.build(genome, position, INITIAL_ENERGY, tick)
    }

    pub fn create(
        &mut self,
        kind: OrganismKind,
        position: Vec3,
        evolution: &EvolutionConfig,
        rng: &mut SimRng,
        tick: u64,
    ) -> Organism {
        match kind {
            OrganismKind::Prey => self.create_prey(position, evolution, rng, tick),
            OrganismKind::Predator => self.create_predator(position, evolution, rng, tick),
        }
    }

    /// Child of `parent` carrying `energy`, placed `offset` parent radii away
    /// in a random direction.
    #[allow(clippy::too_many_arguments)]
    pub fn create_offspring(
        &mut self,
        parent: &Organism,
        energy: f64,
        offset: f64,
        world_size: f64,
        evolution: &EvolutionConfig,
        rng: &mut SimRng,
        tick: u64,
    ) -> Organism {
        let genome = self.genomes.create_from_parent(
            &parent.genome,
            evolution.mutation_factor,
            evolution.subtype_inheritance,
            rng,
        );
        let displacement = rng.unit_vector() * (parent.radius * offset);
        let position = wrap_vec(parent.position + displacement, world_size);
        let mut child = self.build(genome, position, energy, tick);
        child.parent_id = Some(parent.id);
        child
    }

    fn build(&mut self, genome: Genome, position: Vec3, energy: f64, tick: u64) -> Organism {
        let id = self.next_id;
        self.next_id += 1;
        Organism {
            id,
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            radius: genome.traits.size * RADIUS_PER_SIZE,
            energy: energy.clamp(0.0, MAX_ENERGY),
            age: 0,
            activity: Activity::Idle,
            is_dead: false,
            cause_of_death: None,
            genome,
            parent_id: None,
            hunt_successes: 0,
            offspring_count: 0,
            birth_tick: tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::toroidal_distance;

    #[test]
    fn test_ids_increase_across_kinds() {
        let mut factory = OrganismFactory::new();
        let mut rng = SimRng::new(1);
        let evo = EvolutionConfig::default();
        let a = factory.create_prey(Vec3::splat(1.0), &evo, &mut rng, 0);
        let b = factory.create_predator(Vec3::splat(2.0), &evo, &mut rng, 0);
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.energy, INITIAL_ENERGY);
        assert_eq!(a.radius, a.genome.traits.size);
        assert_eq!(b.kind(), OrganismKind::Predator);
    }

    #[test]
    fn test_offspring_placed_near_parent() {
        let mut factory = OrganismFactory::new();
        let mut rng = SimRng::new(2);
        let evo = EvolutionConfig::default();
        let parent = factory.create_prey(Vec3::new(99.5, 0.2, 50.0), &evo, &mut rng, 0);
        let child = factory.create_offspring(&parent, 75.0, 3.0, 100.0, &evo, &mut rng, 10);

        assert_eq!(child.parent_id, Some(parent.id));
        assert_eq!(child.genome.parent_id, Some(parent.genome.id));
        assert_eq!(child.energy, 75.0);
        assert_eq!(child.birth_tick, 10);
        let d = toroidal_distance(parent.position, child.position, 100.0);
        assert!((d - parent.radius * 3.0).abs() < 1e-9);
        for c in child.position.to_array() {
            assert!((0.0..100.0).contains(&c));
        }
    }

    #[test]
    fn test_counters_restore_independently() {
        let mut factory = OrganismFactory::new();
        factory.restore_counters(FactoryCounters {
            next_organism_id: 40,
            next_genome_id: 90,
        });
        let mut rng = SimRng::new(3);
        let o = factory.create_prey(Vec3::ZERO, &EvolutionConfig::default(), &mut rng, 0);
        assert_eq!(o.id, 40);
        assert_eq!(o.genome.id, 90);
        factory.reset();
        assert_eq!(factory.counters().next_organism_id, 1);
    }
}
