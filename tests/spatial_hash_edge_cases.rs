use biotorus_core::math::toroidal_distance_squared;
use biotorus_core::spatial_hash::{GridEntity, SpatialHashGrid};
use biotorus_data::{EntityKind, Vec3};
use proptest::prelude::*;

const WORLD: f64 = 100.0;

fn entity(id: u64, position: Vec3) -> GridEntity {
    GridEntity {
        id,
        position,
        kind: EntityKind::Food,
        radius: 0.5,
    }
}

prop_compose! {
    fn arb_point()(
        x in 0.0f64..WORLD,
        y in 0.0f64..WORLD,
        z in 0.0f64..WORLD
    ) -> Vec3 {
        Vec3::new(x, y, z)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_exact_query_matches_brute_force(
        points in prop::collection::vec(arb_point(), 1..60),
        center in arb_point(),
        radius in 0.0f64..49.0,
        cell_size in prop::sample::select(vec![7.0, 10.0, 20.0, 30.0, 45.0])
    ) {
        let mut grid = SpatialHashGrid::new(WORLD, cell_size);
        for (i, p) in points.iter().enumerate() {
            grid.insert(entity(i as u64, *p));
        }

        let mut out = Vec::new();
        grid.get_nearby_exact(center, radius, &mut out);
        let mut found: Vec<u64> = out.iter().map(|e| e.id).collect();
        found.sort_unstable();

        let expected: Vec<u64> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| toroidal_distance_squared(center, **p, WORLD) <= radius * radius)
            .map(|(i, _)| i as u64)
            .collect();

        prop_assert_eq!(found, expected);
    }

    #[test]
    fn test_candidates_never_duplicate(
        points in prop::collection::vec(arb_point(), 1..40),
        center in arb_point(),
        radius in 0.0f64..200.0
    ) {
        let mut grid = SpatialHashGrid::new(WORLD, 20.0);
        for (i, p) in points.iter().enumerate() {
            grid.insert(entity(i as u64, *p));
        }
        let mut out = Vec::new();
        grid.get_nearby(center, radius, &mut out);
        let mut ids: Vec<u64> = out.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        let before = ids.len();
        ids.dedup();
        prop_assert_eq!(before, ids.len());
    }

    #[test]
    fn test_cell_key_in_range(p in arb_point(), cell_size in 5.0f64..50.0) {
        let grid = SpatialHashGrid::new(WORLD, cell_size);
        let key = grid.cell_key(p);
        prop_assert!(key.is_some());
        let key = key.unwrap_or_default();
        prop_assert!(key < grid.dim * grid.dim * grid.dim);
    }
}

#[test]
fn test_spatial_hash_nan_safety() {
    let mut grid = SpatialHashGrid::new(WORLD, 10.0);
    assert!(grid.cell_key(Vec3::new(f64::NAN, 50.0, 50.0)).is_none());
    assert!(grid.cell_key(Vec3::new(50.0, f64::INFINITY, 50.0)).is_none());
    assert!(!grid.insert(entity(1, Vec3::new(f64::NAN, 0.0, 0.0))));
    assert!(grid.is_empty());

    grid.insert(entity(2, Vec3::splat(50.0)));
    let mut out = Vec::new();
    grid.get_nearby(Vec3::new(f64::NAN, 50.0, 50.0), 10.0, &mut out);
    assert!(out.is_empty(), "NaN query center should find nothing");
}

#[test]
fn test_positions_outside_the_cube_wrap() {
    let mut grid = SpatialHashGrid::new(WORLD, 10.0);
    grid.insert(entity(1, Vec3::new(-0.5, 150.0, 250.0)));
    let mut out = Vec::new();
    grid.get_nearby_exact(Vec3::new(99.5, 50.0, 50.0), 0.1, &mut out);
    assert_eq!(out.len(), 1);
}

#[test]
fn test_zero_radius_finds_coincident_only() {
    let mut grid = SpatialHashGrid::new(WORLD, 10.0);
    grid.insert(entity(1, Vec3::splat(5.0)));
    grid.insert(entity(2, Vec3::new(5.0, 5.0, 5.5)));
    let mut out = Vec::new();
    grid.get_nearby_exact(Vec3::splat(5.0), 0.0, &mut out);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, 1);
}
