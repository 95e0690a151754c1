//! Versioned save files for [`SimulationState`].
//!
//! A save file is a JSON envelope:
//!
//! ```text
//! { "version": 1, "saved_at": "<RFC 3339>", "checksum": "<sha256 hex>", "state": { ... } }
//! ```
//!
//! The checksum covers the compact JSON of `state`. Paths ending in `.gz`
//! are gzip-compressed.

use crate::error::{IoError, Result};
use crate::serialization::{sha256_hex, to_json};
use biotorus_core::snapshot::{SimulationState, STATE_VERSION};
use biotorus_core::world::Simulation;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<S> {
    version: u32,
    saved_at: String,
    checksum: String,
    state: S,
}

/// Header fields of a save file, returned alongside the loaded state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInfo {
    pub version: u32,
    pub saved_at: String,
    pub checksum: String,
}

pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Writes `state` to `path`, gzip-compressed when the path ends in `.gz`.
/// Returns the checksum recorded in the file.
pub fn save_state<P: AsRef<Path>>(path: P, state: &SimulationState) -> Result<String> {
    let path = path.as_ref();
    let checksum = sha256_hex(to_json(state)?.as_bytes());
    let envelope = Envelope {
        version: STATE_VERSION,
        saved_at: chrono::Utc::now().to_rfc3339(),
        checksum: checksum.clone(),
        state,
    };
    let json = to_json(&envelope)?;

    let file = File::create(path)
        .map_err(|e| IoError::from(e).with_context(format!("creating {}", path.display())))?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| IoError::compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| IoError::compression(e.to_string()))?
            .flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
    }

    tracing::info!(
        path = %path.display(),
        tick = state.tick,
        checksum = %checksum,
        "State saved"
    );
    Ok(checksum)
}

/// Reads and verifies a save file.
///
/// Fails with [`IoError::Validation`] when the file version is newer than
/// this build supports, the checksum does not match, or the state is
/// internally inconsistent.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<(SimulationState, SaveInfo)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }
    let json = read_text(path)?;
    let envelope: Envelope<SimulationState> = serde_json::from_str(&json)
        .map_err(|e| IoError::from(e).with_context(format!("parsing {}", path.display())))?;

    if envelope.version > STATE_VERSION {
        return Err(IoError::validation(format!(
            "save file version {} is newer than supported version {}",
            envelope.version, STATE_VERSION
        )));
    }
    let actual = sha256_hex(to_json(&envelope.state)?.as_bytes());
    if actual != envelope.checksum {
        return Err(IoError::validation(format!(
            "checksum mismatch: file records {}, state hashes to {}",
            envelope.checksum, actual
        )));
    }
    envelope
        .state
        .validate()
        .map_err(|e| IoError::validation(format!("{e:#}")))?;

    tracing::info!(
        path = %path.display(),
        tick = envelope.state.tick,
        saved_at = %envelope.saved_at,
        "State loaded"
    );
    let info = SaveInfo {
        version: envelope.version,
        saved_at: envelope.saved_at,
        checksum: envelope.checksum,
    };
    Ok((envelope.state, info))
}

fn read_text(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| IoError::from(e).with_context(format!("opening {}", path.display())))?;
    let mut text = String::new();
    if is_gzip(path) {
        GzDecoder::new(file)
            .read_to_string(&mut text)
            .map_err(|e| IoError::compression(e.to_string()))?;
    } else {
        file.read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Saves a running simulation.
pub fn save_simulation<P: AsRef<Path>>(path: P, sim: &Simulation) -> Result<String> {
    save_state(path, &sim.save_state())
}

/// Loads a save file and rebuilds the simulation it describes.
pub fn load_simulation<P: AsRef<Path>>(path: P) -> Result<Simulation> {
    let (state, _) = load_state(path)?;
    Simulation::from_state(state).map_err(|e| IoError::validation(format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotorus_core::config::AppConfig;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("biotorus_io_{}_{name}", std::process::id()))
    }

    fn sample() -> SimulationState {
        let mut config = AppConfig::default();
        config.world.size = 80.0;
        config.world.seed = 5;
        config.world.initial_prey = 20;
        config.world.initial_predators = 3;
        config.world.initial_food = 30;
        let mut sim = Simulation::new(config).unwrap();
        for _ in 0..10 {
            sim.tick();
        }
        sim.save_state()
    }

    #[test]
    fn test_plain_and_gzip_round_trip() {
        let state = sample();
        for name in ["plain.json", "packed.json.gz"] {
            let path = scratch(name);
            let checksum = save_state(&path, &state).unwrap();
            let (loaded, info) = load_state(&path).unwrap();
            assert_eq!(loaded, state);
            assert_eq!(info.checksum, checksum);
            assert_eq!(info.version, STATE_VERSION);
            assert!(chrono::DateTime::parse_from_rfc3339(&info.saved_at).is_ok());
            let _ = std::fs::remove_file(&path);
        }
    }

    #[test]
    fn test_gzip_is_compressed() {
        let state = sample();
        let plain = scratch("size.json");
        let packed = scratch("size.json.gz");
        save_state(&plain, &state).unwrap();
        save_state(&packed, &state).unwrap();
        let plain_len = std::fs::metadata(&plain).unwrap().len();
        let packed_len = std::fs::metadata(&packed).unwrap().len();
        assert!(packed_len < plain_len);
        let _ = std::fs::remove_file(&plain);
        let _ = std::fs::remove_file(&packed);
    }

    #[test]
    fn test_tampered_state_rejected() {
        let path = scratch("tampered.json");
        save_state(&path, &sample()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let tampered = text.replacen("\"tick\":10", "\"tick\":11", 1);
        assert_ne!(text, tampered);
        std::fs::write(&path, tampered).unwrap();
        assert!(matches!(load_state(&path), Err(IoError::Validation(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_newer_version_rejected() {
        let path = scratch("future.json");
        save_state(&path, &sample()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let future = text.replacen(
            &format!("\"version\":{STATE_VERSION}"),
            &format!("\"version\":{}", STATE_VERSION + 1),
            1,
        );
        std::fs::write(&path, future).unwrap();
        assert!(matches!(load_state(&path), Err(IoError::Validation(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let result = load_state(scratch("does_not_exist.json"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }
}
