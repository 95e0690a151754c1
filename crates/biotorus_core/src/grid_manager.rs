//! Static + dynamic spatial grids behind one query facade.
//!
//! Obstacles never move, so they live in a grid that is rebuilt only when the
//! obstacle set changes. Organisms and food are re-inserted every tick.

use crate::math::toroidal_distance_squared;
use crate::spatial_hash::{GridEntity, GridStats, SpatialHashGrid};
use biotorus_data::{EntityKind, Food, Obstacle, Organism, Vec3, FOOD_RADIUS};

#[derive(Debug, Clone)]
pub struct GridManager {
    static_grid: SpatialHashGrid,
    dynamic_grid: SpatialHashGrid,
    static_dirty: bool,
}

impl GridManager {
    pub fn new(world_size: f64, cell_size: f64) -> Self {
        Self {
            static_grid: SpatialHashGrid::new(world_size, cell_size),
            dynamic_grid: SpatialHashGrid::new(world_size, cell_size),
            static_dirty: true,
        }
    }

    pub fn world_size(&self) -> f64 {
        self.dynamic_grid.world_size
    }

    /// Requests a static rebuild before the next query pass.
    pub fn mark_static_dirty(&mut self) {
        self.static_dirty = true;
    }

    pub fn is_static_dirty(&self) -> bool {
        self.static_dirty
    }

    pub fn rebuild_static(&mut self, obstacles: &[Obstacle]) {
        self.static_grid.clear();
        for o in obstacles {
            self.static_grid.insert(GridEntity {
                id: o.id,
                position: o.position,
                kind: EntityKind::Obstacle,
                radius: o.radius,
            });
        }
        self.static_dirty = false;
    }

    /// Rebuilds the static grid only if it was marked dirty.
    pub fn ensure_static(&mut self, obstacles: &[Obstacle]) {
        if self.static_dirty {
            self.rebuild_static(obstacles);
        }
    }

    /// Re-inserts live organisms and uneaten food, in collection order.
    pub fn rebuild_dynamic(&mut self, organisms: &[Organism], food: &[Food]) {
        self.dynamic_grid.clear();
        for o in organisms.iter().filter(|o| o.is_alive()) {
            self.dynamic_grid.insert(GridEntity {
                id: o.id,
                position: o.position,
                kind: o.kind().into(),
                radius: o.radius,
            });
        }
        for f in food.iter().filter(|f| !f.consumed) {
            self.dynamic_grid.insert(GridEntity {
                id: f.id,
                position: f.position,
                kind: EntityKind::Food,
                radius: FOOD_RADIUS,
            });
        }
    }

    /// Visits candidates from both grids, obstacles first.
    pub fn for_each_nearby<F>(&self, center: Vec3, radius: f64, mut visitor: F)
    where
        F: FnMut(&GridEntity),
    {
        self.static_grid.for_each_nearby(center, radius, &mut visitor);
        self.dynamic_grid.for_each_nearby(center, radius, &mut visitor);
    }

    /// Cell-granular candidates from both grids.
    pub fn get_nearby(&self, center: Vec3, radius: f64, out: &mut Vec<GridEntity>) {
        out.clear();
        self.for_each_nearby(center, radius, |e| out.push(*e));
    }

    /// Distance-exact neighbors from both grids.
    pub fn get_nearby_exact(&self, center: Vec3, radius: f64, out: &mut Vec<GridEntity>) {
        out.clear();
        let r_sq = radius * radius;
        let size = self.world_size();
        self.for_each_nearby(center, radius, |e| {
            if toroidal_distance_squared(center, e.position, size) <= r_sq {
                out.push(*e);
            }
        });
    }

    pub fn find_nearest(
        &self,
        center: Vec3,
        radius: f64,
        kind: EntityKind,
        exclude_id: Option<u64>,
    ) -> Option<(GridEntity, f64)> {
        let grid = match kind {
            EntityKind::Obstacle => &self.static_grid,
            _ => &self.dynamic_grid,
        };
        grid.find_nearest(center, radius, kind, exclude_id)
    }

    pub fn count_nearby(&self, center: Vec3, radius: f64, kind: Option<EntityKind>) -> usize {
        match kind {
            Some(EntityKind::Obstacle) => self.static_grid.count_nearby(center, radius, kind),
            Some(_) => self.dynamic_grid.count_nearby(center, radius, kind),
            None => {
                self.static_grid.count_nearby(center, radius, None)
                    + self.dynamic_grid.count_nearby(center, radius, None)
            }
        }
    }

    /// `(static, dynamic)` occupancy.
    pub fn stats(&self) -> (GridStats, GridStats) {
        (self.static_grid.stats(), self.dynamic_grid.stats())
    }
}
