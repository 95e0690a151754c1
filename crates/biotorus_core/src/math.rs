//! Toroidal geometry helpers.
//!
//! The world is a cube of edge `world_size` whose opposite faces are
//! identified. All functions here are pure.

use biotorus_data::Vec3;

/// Distances below this are treated as coincident.
pub const EPSILON: f64 = 1e-6;

/// Wraps a scalar into `[0, size)`.
#[inline]
pub fn wrap(value: f64, size: f64) -> f64 {
    let w = value.rem_euclid(size);
    // rem_euclid can return `size` for tiny negative inputs due to rounding
    if w >= size {
        0.0
    } else {
        w
    }
}

/// Wraps every component of a point into `[0, size)`.
#[inline]
pub fn wrap_vec(v: Vec3, size: f64) -> Vec3 {
    Vec3::new(wrap(v.x, size), wrap(v.y, size), wrap(v.z, size))
}

/// Shortest signed offset from `from` to `to` along one periodic axis.
#[inline]
pub fn toroidal_delta_axis(from: f64, to: f64, size: f64) -> f64 {
    let mut d = (to - from).rem_euclid(size);
    if d > size * 0.5 {
        d -= size;
    }
    d
}

/// Shortest displacement vector pointing from `from` to `to`.
#[inline]
pub fn toroidal_vector(from: Vec3, to: Vec3, size: f64) -> Vec3 {
    Vec3::new(
        toroidal_delta_axis(from.x, to.x, size),
        toroidal_delta_axis(from.y, to.y, size),
        toroidal_delta_axis(from.z, to.z, size),
    )
}

#[inline]
pub fn toroidal_distance_squared(a: Vec3, b: Vec3, size: f64) -> f64 {
    toroidal_vector(a, b, size).length_squared()
}

#[inline]
pub fn toroidal_distance(a: Vec3, b: Vec3, size: f64) -> f64 {
    toroidal_distance_squared(a, b, size).sqrt()
}
