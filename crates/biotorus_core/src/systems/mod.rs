//! Per-tick simulation systems, run strictly in this order:
//! behavior, physics, metabolism, collision, reproduction, stats.
//!
//! Each system owns its scratch storage and borrows world state through a
//! context struct for the duration of one call.

pub mod behavior;
pub mod collision;
pub mod metabolism;
pub mod physics;
pub mod reproduction;
pub mod stats;

pub use behavior::{BehaviorContext, BehaviorSystem};
pub use collision::{CollisionContext, CollisionSystem};
pub use metabolism::MetabolismSystem;
pub use physics::PhysicsSystem;
pub use reproduction::{PendingBirth, ReproductionContext, ReproductionSystem};
pub use stats::{extinction_risk, update_population_stats, StatsContext};
