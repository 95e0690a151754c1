//! JSON helpers with typed errors.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};

pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {e}")))
}

pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {e}")))
}

/// Deserializes `json`, rejecting blank input up front.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }
    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {e}")))
}

/// SHA-256 hex digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotorus_core::config::AppConfig;

    #[test]
    fn test_config_through_json() {
        let mut config = AppConfig::default();
        config.world.seed = 99;
        let json = to_json_pretty(&config).unwrap();
        let restored: AppConfig = from_json(&json).unwrap();
        assert_eq!(restored.world.seed, 99);
        assert_eq!(restored.fingerprint(), config.fingerprint());
    }

    #[test]
    fn test_blank_and_invalid_json_fail() {
        assert!(matches!(
            from_json::<AppConfig>("   "),
            Err(IoError::Validation(_))
        ));
        assert!(matches!(
            from_json::<AppConfig>("{ invalid"),
            Err(IoError::Serialization(_))
        ));
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
