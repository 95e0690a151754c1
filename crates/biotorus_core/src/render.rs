//! Flat render buffers and the slot ↔ id index that goes with them.
//!
//! Layout is a stable contract with renderers:
//!
//! | Buffer | Stride | Record |
//! |---|---|---|
//! | prey, predators | 12 | `x, y, z, vx, vy, vz, radius, dead, id, energy/MAX_ENERGY, activity, glow` |
//! | food | 5 | `x, y, z, radius, id` |
//!
//! Record `i` of a buffer always describes slot `i` of the matching
//! [`InstanceIndex`] list.

use crate::entity_manager::EntityManager;
use biotorus_data::{Food, Organism, OrganismKind, FOOD_RADIUS, MAX_ENERGY};
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const ORGANISM_STRIDE: usize = 12;
pub const FOOD_STRIDE: usize = 5;

/// Renderer-facing entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceClass {
    Prey,
    Predator,
    Food,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    pub prey: Vec<f32>,
    pub predators: Vec<f32>,
    pub food: Vec<f32>,
}

impl RenderBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(entities: &EntityManager) -> Self {
        let mut buffers = Self::new();
        buffers.fill(entities);
        buffers
    }

    /// Refills every buffer in place, reusing allocations.
    pub fn fill(&mut self, entities: &EntityManager) {
        let (prey, predators): (Vec<&Organism>, Vec<&Organism>) = entities
            .organisms()
            .iter()
            .partition(|o| o.kind() == OrganismKind::Prey);
        fill_organisms(&mut self.prey, &prey);
        fill_organisms(&mut self.predators, &predators);

        let food: Vec<&Food> = entities.food().iter().filter(|f| !f.consumed).collect();
        self.food.clear();
        self.food.resize(food.len() * FOOD_STRIDE, 0.0);
        for_each_record(&mut self.food, FOOD_STRIDE, |i, record| {
            let f = food[i];
            record.copy_from_slice(&[
                f.position.x as f32,
                f.position.y as f32,
                f.position.z as f32,
                FOOD_RADIUS as f32,
                f.id as f32,
            ]);
        });
    }

    pub fn prey_count(&self) -> usize {
        self.prey.len() / ORGANISM_STRIDE
    }

    pub fn predator_count(&self) -> usize {
        self.predators.len() / ORGANISM_STRIDE
    }

    pub fn food_count(&self) -> usize {
        self.food.len() / FOOD_STRIDE
    }
}

fn fill_organisms(buffer: &mut Vec<f32>, organisms: &[&Organism]) {
    buffer.clear();
    buffer.resize(organisms.len() * ORGANISM_STRIDE, 0.0);
    for_each_record(buffer, ORGANISM_STRIDE, |i, record| {
        let o = organisms[i];
        record.copy_from_slice(&[
            o.position.x as f32,
            o.position.y as f32,
            o.position.z as f32,
            o.velocity.x as f32,
            o.velocity.y as f32,
            o.velocity.z as f32,
            o.radius as f32,
            if o.is_dead { 1.0 } else { 0.0 },
            o.id as f32,
            (o.energy / MAX_ENERGY) as f32,
            f32::from(o.activity.code()),
            o.genome.traits.glow_intensity as f32,
        ]);
    });
}

#[cfg(feature = "parallel")]
fn for_each_record<F>(buffer: &mut [f32], stride: usize, fill: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    buffer
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(i, record)| fill(i, record));
}

#[cfg(not(feature = "parallel"))]
fn for_each_record<F>(buffer: &mut [f32], stride: usize, fill: F)
where
    F: Fn(usize, &mut [f32]),
{
    buffer
        .chunks_mut(stride)
        .enumerate()
        .for_each(|(i, record)| fill(i, record));
}

/// Read-only mapping between render-buffer slots and entity ids, built in a
/// pass separate from the tick.
#[derive(Debug, Clone, Default)]
pub struct InstanceIndex {
    prey: Vec<u64>,
    predators: Vec<u64>,
    food: Vec<u64>,
    slots: HashMap<(InstanceClass, u64), usize>,
}

impl InstanceIndex {
    pub fn build(entities: &EntityManager) -> Self {
        let mut index = Self::default();
        for o in entities.organisms() {
            match o.kind() {
                OrganismKind::Prey => index.push(InstanceClass::Prey, o.id),
                OrganismKind::Predator => index.push(InstanceClass::Predator, o.id),
            }
        }
        for f in entities.food().iter().filter(|f| !f.consumed) {
            index.push(InstanceClass::Food, f.id);
        }
        index
    }

    fn push(&mut self, class: InstanceClass, id: u64) {
        let list = self.list_mut(class);
        let slot = list.len();
        list.push(id);
        self.slots.insert((class, id), slot);
    }

    fn list_mut(&mut self, class: InstanceClass) -> &mut Vec<u64> {
        match class {
            InstanceClass::Prey => &mut self.prey,
            InstanceClass::Predator => &mut self.predators,
            InstanceClass::Food => &mut self.food,
        }
    }

    pub fn ids(&self, class: InstanceClass) -> &[u64] {
        match class {
            InstanceClass::Prey => &self.prey,
            InstanceClass::Predator => &self.predators,
            InstanceClass::Food => &self.food,
        }
    }

    /// Entity id rendered at `slot`.
    pub fn id_at(&self, class: InstanceClass, slot: usize) -> Option<u64> {
        self.ids(class).get(slot).copied()
    }

    /// Render slot of entity `id`.
    pub fn slot_of(&self, class: InstanceClass, id: u64) -> Option<usize> {
        self.slots.get(&(class, id)).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
