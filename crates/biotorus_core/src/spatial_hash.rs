use crate::math::{toroidal_distance_squared, wrap};
use biotorus_data::{EntityKind, Vec3};
use std::collections::HashMap;

/// Lightweight descriptor stored in grid cells.
///
/// Descriptors are copies taken when the grid is built. They go stale as
/// soon as the owning entity moves; callers that need live state look the
/// id up in the entity manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridEntity {
    pub id: u64,
    pub position: Vec3,
    pub kind: EntityKind,
    pub radius: f64,
}

/// Occupancy summary returned by [`SpatialHashGrid::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridStats {
    pub dimension: usize,
    pub cell_size: f64,
    pub occupied_cells: usize,
    pub pooled_cells: usize,
    pub entity_count: usize,
    pub max_cell_occupancy: usize,
    pub avg_cell_occupancy: f64,
}

#[derive(Clone, Debug)]
/// Uniform 3D spatial hash over a toroidal cube.
///
/// The world is cut into `dim³` cubic cells of edge `cell_size`. A point's
/// cell is `floor(wrap(coord) / cell_size)` per axis, and the three indices
/// are folded into one key with mixed-radix encoding
/// (`gx + gy·dim + gz·dim²`).
///
/// # Performance Characteristics
/// - Insert: O(1) amortized
/// - Range queries: proportional to the entities in the visited cells, not
///   to the total population
/// - `clear()` keeps every cell buffer in a free pool, so a grid rebuilt
///   each tick stops allocating once it reaches steady state
///
/// # Toroidal queries
/// A query visits `ceil(radius / cell_size)` cells either side of the
/// center cell on each axis, wrapping indices modulo `dim`. When that window
/// would cover the whole axis it is clamped to each cell exactly once, so
/// oversized radii never report the same entity twice.
///
/// # Examples
/// ```
/// use biotorus_core::spatial_hash::{GridEntity, SpatialHashGrid};
/// use biotorus_data::{EntityKind, Vec3};
///
/// let mut grid = SpatialHashGrid::new(100.0, 20.0);
/// grid.insert(GridEntity {
///     id: 1,
///     position: Vec3::new(99.0, 50.0, 50.0),
///     kind: EntityKind::Food,
///     radius: 0.5,
/// });
///
/// // Found across the x = 0 seam.
/// let mut nearby = Vec::new();
/// grid.get_nearby_exact(Vec3::new(1.0, 50.0, 50.0), 3.0, &mut nearby);
/// assert_eq!(nearby.len(), 1);
/// ```
pub struct SpatialHashGrid {
    pub cell_size: f64,
    pub world_size: f64,
    pub dim: usize,
    cells: HashMap<usize, Vec<GridEntity>>,
    pool: Vec<Vec<GridEntity>>,
    len: usize,
}

impl SpatialHashGrid {
    /// Creates an empty grid.
    ///
    /// # Panics
    /// Panics if `world_size` or `cell_size` is not a positive finite number.
    /// Configuration validation rejects such values before a grid is built.
    pub fn new(world_size: f64, cell_size: f64) -> Self {
        assert!(
            world_size.is_finite() && world_size > 0.0,
            "world size must be positive and finite"
        );
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell size must be positive and finite"
        );
        let dim = ((world_size / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            world_size,
            dim,
            cells: HashMap::new(),
            pool: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    fn axis_index(&self, coord: f64) -> usize {
        let c = (wrap(coord, self.world_size) / self.cell_size).floor() as usize;
        c.min(self.dim - 1)
    }

    #[inline]
    fn encode(&self, gx: usize, gy: usize, gz: usize) -> usize {
        gx + gy * self.dim + gz * self.dim * self.dim
    }

    /// Cell key for a world position, or `None` for non-finite input.
    #[inline]
    pub fn cell_key(&self, position: Vec3) -> Option<usize> {
        if !position.is_finite() {
            return None;
        }
        Some(self.encode(
            self.axis_index(position.x),
            self.axis_index(position.y),
            self.axis_index(position.z),
        ))
    }

    /// Adds an entity. Entities with non-finite positions are rejected.
    pub fn insert(&mut self, entity: GridEntity) -> bool {
        let Some(key) = self.cell_key(entity.position) else {
            return false;
        };
        let pool = &mut self.pool;
        self.cells
            .entry(key)
            .or_insert_with(|| pool.pop().unwrap_or_default())
            .push(entity);
        self.len += 1;
        true
    }

    /// Empties the grid, returning every cell buffer to the pool.
    pub fn clear(&mut self) {
        for (_, mut cell) in self.cells.drain() {
            cell.clear();
            self.pool.push(cell);
        }
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `(first_offset, count, full_axis)` for a query window.
    #[inline]
    fn window(&self, radius: f64) -> (i64, usize, bool) {
        let dim = self.dim as i64;
        if !radius.is_finite() {
            return (0, self.dim, true);
        }
        let mut reach = (radius.max(0.0) / self.cell_size).ceil() as i64;
        // The last cell on each axis is narrower when cell_size does not
        // divide world_size; crossing it covers less distance.
        if self.dim as f64 * self.cell_size > self.world_size {
            reach += 1;
        }
        let span = 2 * reach + 1;
        if span >= dim {
            (0, self.dim, true)
        } else {
            (-reach, span as usize, false)
        }
    }

    /// Visits every entity stored in the cells overlapping the query cube.
    ///
    /// Cell-granular: the visitor sees a superset of the entities within
    /// `radius`. Visit order is deterministic (z, then y, then x, then
    /// insertion order within a cell).
    pub fn for_each_nearby<F>(&self, center: Vec3, radius: f64, mut visitor: F)
    where
        F: FnMut(&GridEntity),
    {
        if self.len == 0 || !center.is_finite() {
            return;
        }
        let dim = self.dim as i64;
        let (offset, count, full) = self.window(radius);
        let cx = self.axis_index(center.x) as i64;
        let cy = self.axis_index(center.y) as i64;
        let cz = self.axis_index(center.z) as i64;
        let axis = |c: i64, i: usize| -> usize {
            if full {
                i
            } else {
                (c + offset + i as i64).rem_euclid(dim) as usize
            }
        };

        for iz in 0..count {
            let gz = axis(cz, iz);
            for iy in 0..count {
                let gy = axis(cy, iy);
                for ix in 0..count {
                    let gx = axis(cx, ix);
                    if let Some(cell) = self.cells.get(&self.encode(gx, gy, gz)) {
                        for entity in cell {
                            visitor(entity);
                        }
                    }
                }
            }
        }
    }

    /// Collects candidate neighbors (cell-granular superset) into `out`.
    pub fn get_nearby(&self, center: Vec3, radius: f64, out: &mut Vec<GridEntity>) {
        out.clear();
        self.for_each_nearby(center, radius, |e| out.push(*e));
    }

    /// Collects entities whose toroidal distance to `center` is ≤ `radius`.
    pub fn get_nearby_exact(&self, center: Vec3, radius: f64, out: &mut Vec<GridEntity>) {
        out.clear();
        let r_sq = radius * radius;
        let size = self.world_size;
        self.for_each_nearby(center, radius, |e| {
            if toroidal_distance_squared(center, e.position, size) <= r_sq {
                out.push(*e);
            }
        });
    }

    /// Closest entity of `kind` within `radius`, skipping `exclude_id`.
    /// Ties keep the first entity in visit order.
    pub fn find_nearest(
        &self,
        center: Vec3,
        radius: f64,
        kind: EntityKind,
        exclude_id: Option<u64>,
    ) -> Option<(GridEntity, f64)> {
        let r_sq = radius * radius;
        let size = self.world_size;
        let mut best: Option<(GridEntity, f64)> = None;
        self.for_each_nearby(center, radius, |e| {
            if e.kind != kind || Some(e.id) == exclude_id {
                return;
            }
            let d_sq = toroidal_distance_squared(center, e.position, size);
            if d_sq <= r_sq && best.map_or(true, |(_, b)| d_sq < b) {
                best = Some((*e, d_sq));
            }
        });
        best.map(|(e, d_sq)| (e, d_sq.sqrt()))
    }

    /// Number of entities (optionally of one kind) within `radius`.
    pub fn count_nearby(&self, center: Vec3, radius: f64, kind: Option<EntityKind>) -> usize {
        let r_sq = radius * radius;
        let size = self.world_size;
        let mut count = 0;
        self.for_each_nearby(center, radius, |e| {
            if kind.map_or(true, |k| k == e.kind)
                && toroidal_distance_squared(center, e.position, size) <= r_sq
            {
                count += 1;
            }
        });
        count
    }

    pub fn stats(&self) -> GridStats {
        let occupied_cells = self.cells.len();
        let max_cell_occupancy = self.cells.values().map(Vec::len).max().unwrap_or(0);
        GridStats {
            dimension: self.dim,
            cell_size: self.cell_size,
            occupied_cells,
            pooled_cells: self.pool.len(),
            entity_count: self.len,
            max_cell_occupancy,
            avg_cell_occupancy: if occupied_cells > 0 {
                self.len as f64 / occupied_cells as f64
            } else {
                0.0
            },
        }
    }
}
