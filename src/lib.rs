//! # Biotorus
//!
//! Headless runner for the Biotorus ecosystem simulation. The engine lives in
//! `biotorus_core`; persistence in `biotorus_io`.

pub mod app;

pub use biotorus_core::config::AppConfig;
pub use biotorus_core::world::Simulation;
