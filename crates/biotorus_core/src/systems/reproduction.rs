//! Two-phase asexual reproduction and phylogenetic bookkeeping.
//!
//! `check_reproduction` selects parents and charges them; `create_offspring`
//! materializes the pending births. Splitting the phases keeps newborns out
//! of the scan that produced them.

use crate::config::{EvolutionConfig, ReproductionConfig};
use crate::entity_manager::EntityManager;
use crate::genetic_tree::GeneticTree;
use crate::lifecycle::OrganismFactory;
use crate::rng::SimRng;
use biotorus_data::{Activity, Organism, SimEvent};

/// A parent charged this tick, waiting for its child to be created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingBirth {
    pub parent_id: u64,
    /// Energy taken from the parent; becomes the child's starting energy.
    pub energy: f64,
}

pub struct ReproductionContext<'a> {
    pub config: &'a ReproductionConfig,
    pub evolution: &'a EvolutionConfig,
    pub world_size: f64,
    pub tick: u64,
}

#[derive(Debug, Default)]
pub struct ReproductionSystem {
    pending: Vec<PendingBirth>,
}

impl ReproductionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[PendingBirth] {
        &self.pending
    }

    /// Whether `o` passes the per-organism thresholds. Population headroom
    /// is checked separately.
    pub fn is_eligible(o: &Organism, config: &ReproductionConfig) -> bool {
        o.is_alive() && o.energy >= config.threshold && o.age >= config.min_age
    }

    /// Charges every eligible organism while live + pending population stays
    /// below the cap. Returns the number of pending births.
    pub fn check_reproduction(
        &mut self,
        organisms: &mut [Organism],
        config: &ReproductionConfig,
    ) -> usize {
        self.pending.clear();
        let alive = organisms.iter().filter(|o| o.is_alive()).count();

        for o in organisms.iter_mut() {
            if alive + self.pending.len() >= config.max_population {
                break;
            }
            if !Self::is_eligible(o, config) {
                continue;
            }
            let cost = o.energy * config.cost_fraction;
            o.energy -= cost;
            o.activity = Activity::Reproducing;
            self.pending.push(PendingBirth {
                parent_id: o.id,
                energy: cost,
            });
        }
        self.pending.len()
    }

    /// Creates one child per pending birth, registers it in the tree and
    /// emits `EntityReproduced`. A birth refused by the hard population
    /// ceiling refunds the parent. Returns the number of children added.
    pub fn create_offspring(
        &mut self,
        entities: &mut EntityManager,
        factory: &mut OrganismFactory,
        tree: &mut GeneticTree,
        rng: &mut SimRng,
        ctx: &ReproductionContext,
        events: &mut Vec<SimEvent>,
    ) -> usize {
        let mut alive = entities
            .organisms()
            .iter()
            .filter(|o| o.is_alive())
            .count();
        let mut born = 0;

        for birth in self.pending.drain(..) {
            if alive >= ctx.config.max_population {
                if let Some(parent) = entities.organism_mut(birth.parent_id) {
                    parent.gain_energy(birth.energy);
                }
                continue;
            }
            let Some(parent) = entities.organism(birth.parent_id) else {
                continue;
            };
            let child = factory.create_offspring(
                parent,
                birth.energy,
                ctx.config.offspring_offset,
                ctx.world_size,
                ctx.evolution,
                rng,
                ctx.tick,
            );

            tree.register(&child.genome, ctx.tick);
            events.push(SimEvent::EntityReproduced {
                parent_id: birth.parent_id,
                child_id: child.id,
                generation: child.genome.generation,
            });
            if let Some(parent) = entities.organism_mut(birth.parent_id) {
                parent.offspring_count += 1;
            }
            entities.add_organism(child);
            alive += 1;
            born += 1;
        }
        born
    }
}

/// Stamps the death tick on the organism's genome node.
pub fn update_genetic_tree_on_death(
    tree: &mut GeneticTree,
    organism: &Organism,
    tick: u64,
) -> bool {
    tree.mark_died(organism.genome.id, tick)
}
