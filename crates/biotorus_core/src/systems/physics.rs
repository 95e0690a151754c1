//! Explicit Euler integration with clamping, drag and toroidal wrap.

use crate::config::PhysicsConfig;
use crate::genome::bounds_for;
use crate::math::wrap_vec;
use biotorus_data::{Organism, Vec3};

#[derive(Debug, Default)]
pub struct PhysicsSystem;

impl PhysicsSystem {
    pub fn new() -> Self {
        Self
    }

    /// Integrates every live organism one step. Returns how many non-finite
    /// velocities were reset to zero.
    pub fn update(
        &mut self,
        organisms: &mut [Organism],
        config: &PhysicsConfig,
        world_size: f64,
    ) -> usize {
        let mut resets = 0;
        for o in organisms.iter_mut().filter(|o| o.is_alive()) {
            if !integrate(o, config, world_size) {
                resets += 1;
            }
        }
        resets
    }
}

/// One integration step. Returns `false` if the velocity had to be reset.
pub fn integrate(o: &mut Organism, config: &PhysicsConfig, world_size: f64) -> bool {
    let accel = o.acceleration.limit(config.max_force);
    o.velocity += accel;

    let cap = o.genome.traits.max_speed.min(bounds_for(o.kind()).speed_cap);
    o.velocity = o.velocity.limit(cap);

    let finite = o.velocity.is_finite();
    if !finite {
        tracing::warn!(
            id = o.id,
            kind = %o.kind(),
            "Non-finite velocity reset to zero"
        );
        o.velocity = Vec3::ZERO;
    }

    o.position = wrap_vec(o.position + o.velocity, world_size);
    o.velocity *= config.drag;
    o.acceleration = Vec3::ZERO;
    finite
}
