//! Contact resolution: obstacle bounce, grazing and predation.
//!
//! Candidates come from the grids built at the start of the tick, so their
//! positions are one integration step stale. Every overlap test is redone
//! against live state looked up by id; ids that no longer resolve, consumed
//! food and already-dead prey are skipped.

use crate::config::CollisionConfig;
use crate::entity_manager::EntityManager;
use crate::grid_manager::GridManager;
use crate::math::{toroidal_vector, wrap_vec, EPSILON};
use crate::spatial_hash::GridEntity;
use biotorus_data::{DeathCause, EntityKind, Organism, OrganismKind, SimEvent, Vec3, FOOD_RADIUS};

pub struct CollisionContext<'a> {
    pub grids: &'a GridManager,
    pub config: &'a CollisionConfig,
    pub world_size: f64,
}

#[derive(Debug, Default)]
pub struct CollisionSystem {
    neighbors: Vec<GridEntity>,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves contacts for every live organism, in collection order.
    /// Returns the ids of prey killed by predators. Consumed food is removed
    /// from the manager before returning.
    pub fn update(
        &mut self,
        entities: &mut EntityManager,
        ctx: &CollisionContext,
        events: &mut Vec<SimEvent>,
    ) -> Vec<u64> {
        let mut killed = Vec::new();

        for slot in 0..entities.organism_count() {
            let organism = &entities.organisms()[slot];
            if !organism.is_alive() {
                continue;
            }
            let kind = organism.kind();
            let search = organism.radius + ctx.config.search_margin;
            ctx.grids
                .get_nearby_exact(organism.position, search, &mut self.neighbors);

            for n in &self.neighbors {
                match (n.kind, kind) {
                    (EntityKind::Obstacle, _) => {
                        bounce(&mut entities.organisms_mut()[slot], n, ctx);
                    }
                    (EntityKind::Food, OrganismKind::Prey) => {
                        if let Some(event) = graze(entities, slot, n.id, ctx.world_size) {
                            events.push(event);
                        }
                    }
                    (EntityKind::Prey, OrganismKind::Predator) => {
                        if let Some(prey_id) = hunt(entities, slot, n.id, ctx) {
                            killed.push(prey_id);
                        }
                    }
                    _ => {}
                }
            }
        }

        entities.remove_consumed_food();
        killed
    }
}

#[inline]
fn overlaps(a: Vec3, ra: f64, b: Vec3, rb: f64, world_size: f64) -> bool {
    let reach = ra + rb;
    toroidal_vector(a, b, world_size).length_squared() < reach * reach
}

/// Reflects an approaching velocity about the contact normal and pushes the
/// organism clear of the obstacle.
fn bounce(o: &mut Organism, obstacle: &GridEntity, ctx: &CollisionContext) {
    let delta = toroidal_vector(obstacle.position, o.position, ctx.world_size);
    let dist = delta.length();
    if dist < EPSILON {
        return;
    }
    let overlap = o.radius + obstacle.radius - dist;
    if overlap <= 0.0 {
        return;
    }
    let normal = delta / dist;
    if o.velocity.dot(normal) < 0.0 {
        o.velocity = o.velocity.reflect(normal) * ctx.config.bounce_damping;
    }
    let push = normal * (overlap * ctx.config.push_multiplier);
    o.position = wrap_vec(o.position + push, ctx.world_size);
}

fn graze(
    entities: &mut EntityManager,
    slot: usize,
    food_id: u64,
    world_size: f64,
) -> Option<SimEvent> {
    let (position, radius) = {
        let o = &entities.organisms()[slot];
        (o.position, o.radius)
    };
    let food = entities.food_item_mut(food_id)?;
    if food.consumed || !overlaps(position, radius, food.position, FOOD_RADIUS, world_size) {
        return None;
    }
    let food_position = food.position;
    let energy = food.consume()?;
    entities.organisms_mut()[slot].gain_energy(energy);
    Some(SimEvent::EntityDied {
        entity_type: EntityKind::Food,
        id: food_id,
        position: food_position,
        cause_of_death: DeathCause::Consumed,
    })
}

fn hunt(
    entities: &mut EntityManager,
    slot: usize,
    prey_id: u64,
    ctx: &CollisionContext,
) -> Option<u64> {
    let prey_slot = entities.organism_slot(prey_id)?;
    let (position, radius) = {
        let o = &entities.organisms()[slot];
        (o.position, o.radius)
    };
    let prey = &mut entities.organisms_mut()[prey_slot];
    if !prey.is_alive()
        || prey.kind() != OrganismKind::Prey
        || !overlaps(position, radius, prey.position, prey.radius, ctx.world_size)
    {
        return None;
    }
    let gain = (prey.energy * ctx.config.predator_energy_efficiency)
        .max(ctx.config.min_energy_gain);
    prey.die(DeathCause::Predation);

    let predator = &mut entities.organisms_mut()[slot];
    predator.gain_energy(gain);
    predator.hunt_successes += 1;
    Some(prey_id)
}
