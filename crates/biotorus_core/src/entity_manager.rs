//! Owned entity collections with id lookup.
//!
//! Every collection is a `Vec` kept in insertion order, because steering and
//! collision outcomes depend on scan order. Organisms and food also carry an
//! id → slot index that is rebuilt whenever a removal shifts slots.

use biotorus_data::{
    Color, EcologicalZone, Food, Obstacle, Organism, OrganismKind, Vec3, ZoneType,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Id counters for entities the manager creates itself. Organism ids come
/// from the organism factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounters {
    pub next_food_id: u64,
    pub next_obstacle_id: u64,
    pub next_zone_id: u32,
}

impl Default for EntityCounters {
    fn default() -> Self {
        Self {
            next_food_id: 1,
            next_obstacle_id: 1,
            next_zone_id: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityManager {
    organisms: Vec<Organism>,
    organism_index: HashMap<u64, usize>,
    food: Vec<Food>,
    food_index: HashMap<u64, usize>,
    obstacles: Vec<Obstacle>,
    zones: BTreeMap<u32, EcologicalZone>,
    counters: EntityCounters,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a manager from saved collections.
    pub fn restore(
        organisms: Vec<Organism>,
        food: Vec<Food>,
        obstacles: Vec<Obstacle>,
        zones: Vec<EcologicalZone>,
        counters: EntityCounters,
    ) -> Self {
        let mut manager = Self {
            organisms,
            food,
            obstacles,
            zones: zones.into_iter().map(|z| (z.id, z)).collect(),
            counters,
            ..Self::default()
        };
        manager.reindex_organisms();
        manager.reindex_food();
        manager
    }

    pub fn counters(&self) -> EntityCounters {
        self.counters
    }

    // Organisms

    pub fn add_organism(&mut self, organism: Organism) {
        self.organism_index.insert(organism.id, self.organisms.len());
        self.organisms.push(organism);
    }

    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    pub fn organisms_mut(&mut self) -> &mut [Organism] {
        &mut self.organisms
    }

    /// Mutable organisms alongside the read-only zone map.
    pub fn organisms_and_zones_mut(
        &mut self,
    ) -> (&mut [Organism], &BTreeMap<u32, EcologicalZone>) {
        (&mut self.organisms, &self.zones)
    }

    /// Slot of an organism in `organisms()`.
    pub fn organism_slot(&self, id: u64) -> Option<usize> {
        self.organism_index.get(&id).copied()
    }

    pub fn organism(&self, id: u64) -> Option<&Organism> {
        self.organism_slot(id).map(|i| &self.organisms[i])
    }

    pub fn organism_mut(&mut self, id: u64) -> Option<&mut Organism> {
        let slot = self.organism_slot(id)?;
        self.organisms.get_mut(slot)
    }

    pub fn organism_count(&self) -> usize {
        self.organisms.len()
    }

    pub fn count_alive(&self, kind: OrganismKind) -> usize {
        self.organisms
            .iter()
            .filter(|o| o.is_alive() && o.kind() == kind)
            .count()
    }

    /// Removes dead organisms and returns them in collection order.
    pub fn remove_dead(&mut self) -> Vec<Organism> {
        if self.organisms.iter().all(Organism::is_alive) {
            return Vec::new();
        }
        let (alive, dead): (Vec<_>, Vec<_>) = std::mem::take(&mut self.organisms)
            .into_iter()
            .partition(Organism::is_alive);
        self.organisms = alive;
        self.reindex_organisms();
        dead
    }

    fn reindex_organisms(&mut self) {
        self.organism_index.clear();
        for (i, o) in self.organisms.iter().enumerate() {
            self.organism_index.insert(o.id, i);
        }
    }

    // Food

    pub fn add_food(&mut self, position: Vec3, energy: f64, tick: u64) -> u64 {
        let id = self.counters.next_food_id;
        self.counters.next_food_id += 1;
        self.food_index.insert(id, self.food.len());
        self.food.push(Food {
            id,
            position,
            energy,
            spawn_tick: tick,
            consumed: false,
        });
        id
    }

    pub fn food(&self) -> &[Food] {
        &self.food
    }

    pub fn food_item(&self, id: u64) -> Option<&Food> {
        self.food_index.get(&id).map(|&i| &self.food[i])
    }

    pub fn food_item_mut(&mut self, id: u64) -> Option<&mut Food> {
        let slot = *self.food_index.get(&id)?;
        self.food.get_mut(slot)
    }

    /// Uneaten pellets.
    pub fn food_count(&self) -> usize {
        self.food.iter().filter(|f| !f.consumed).count()
    }

    /// Drops consumed pellets; returns how many were removed.
    pub fn remove_consumed_food(&mut self) -> usize {
        let before = self.food.len();
        self.food.retain(|f| !f.consumed);
        let removed = before - self.food.len();
        if removed > 0 {
            self.reindex_food();
        }
        removed
    }

    fn reindex_food(&mut self) {
        self.food_index.clear();
        for (i, f) in self.food.iter().enumerate() {
            self.food_index.insert(f.id, i);
        }
    }

    // Obstacles

    pub fn add_obstacle(
        &mut self,
        position: Vec3,
        radius: f64,
        color: Color,
        opacity: f64,
        wireframe: bool,
    ) -> u64 {
        let id = self.counters.next_obstacle_id;
        self.counters.next_obstacle_id += 1;
        self.obstacles.push(Obstacle {
            id,
            position,
            radius,
            color,
            opacity,
            wireframe,
        });
        id
    }

    pub fn remove_obstacle(&mut self, id: u64) -> Option<Obstacle> {
        let slot = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(slot))
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    // Zones

    pub fn add_zone(&mut self, zone_type: ZoneType, center: Vec3, radius: f64) -> u32 {
        let id = self.counters.next_zone_id;
        self.counters.next_zone_id += 1;
        self.zones
            .insert(id, EcologicalZone::new(id, zone_type, center, radius));
        id
    }

    pub fn zones(&self) -> &BTreeMap<u32, EcologicalZone> {
        &self.zones
    }
}
