//! Core data structures for the Biotorus simulation.
//!
//! Everything in this crate is plain, serializable state. Simulation logic
//! lives in `biotorus_core`.

pub mod data;

pub use data::entity::{
    Activity, DeathCause, EntityKind, Food, Obstacle, Organism, FOOD_RADIUS, MAX_ENERGY,
};
pub use data::environment::{EcologicalZone, ZoneType};
pub use data::events::SimEvent;
pub use data::genome::{Color, Genome, OrganismKind, PredatorSubtype, SpeciesTraits, Traits};
pub use data::lineage::{GeneticTreeNode, TraitSnapshot};
pub use data::stats::SimulationStats;
pub use data::vector::Vec3;
