//! # Biotorus Core
//!
//! The deterministic simulation engine for Biotorus, a predator/prey
//! ecosystem living on a toroidal 3D domain.
//!
//! This crate contains:
//! - A seeded random source, the only entropy in the engine
//! - Toroidal vector math
//! - A pooled 3D spatial hash, split into static and dynamic grids
//! - Genome and organism factories with mutation
//! - The per-tick systems: behavior, physics, metabolism, collision,
//!   reproduction and statistics
//! - Phylogenetic bookkeeping, render buffers and save/restore state
//!
//! ## Example
//!
//! ```
//! use biotorus_core::config::AppConfig;
//! use biotorus_core::world::Simulation;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = 42;
//! let mut sim = Simulation::new(config).unwrap();
//! let events = sim.tick();
//! assert!(!events.is_empty());
//! ```

/// Configuration management for simulation parameters
pub mod config;
/// Owned entity collections with id lookup
pub mod entity_manager;
/// Phylogenetic forest of every genome ever created
pub mod genetic_tree;
/// Genome creation and mutation
pub mod genome;
/// Static + dynamic spatial grids behind one query facade
pub mod grid_manager;
/// Organism creation (founders and offspring)
pub mod lifecycle;
/// Toroidal vector helpers
pub mod math;
/// Counters and structured logging
pub mod metrics;
/// Flat render buffers and instance indexing
pub mod render;
/// Seeded pseudo-random source
pub mod rng;
/// Save/restore state
pub mod snapshot;
/// Spatial hashing for proximity queries on a torus
pub mod spatial_hash;
/// Per-tick simulation systems
pub mod systems;
/// The simulation orchestrator
pub mod world;

pub use metrics::{init_logging, Metrics};
pub use rng::{RngState, SimRng};
pub use world::Simulation;
