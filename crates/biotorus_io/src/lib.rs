//! # Biotorus IO
//!
//! Persistence layer for the Biotorus simulation: versioned, checksummed
//! save files (optionally gzip-compressed) and typed I/O errors.

/// Error types and result aliases for I/O operations
pub mod error;
/// Save-file envelope, compression and integrity checks
pub mod persistence;
/// JSON helpers and hashing
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{load_simulation, load_state, save_simulation, save_state, SaveInfo};
pub use serialization::{from_json, sha256_hex, to_json, to_json_pretty};
