pub mod entity;
pub mod environment;
pub mod events;
pub mod genome;
pub mod lineage;
pub mod stats;
pub mod vector;
