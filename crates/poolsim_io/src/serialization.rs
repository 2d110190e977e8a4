//! JSON helpers for reports and particle snapshots.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializes data to pretty-printed JSON.
pub fn to_json_pretty<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    Ok(serde_json::from_str(json)?)
}

/// Writes `data` as pretty JSON, creating parent directories as needed.
pub fn write_json_file<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let json = to_json_pretty(data)?;
    if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            IoError::FileSystem(e).with_context(format!("creating directory {:?}", parent))
        })?;
    }
    std::fs::write(&path, json).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("writing JSON to {:?}", path.as_ref()))
    })?;
    Ok(())
}

pub fn read_json_file<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let json = std::fs::read_to_string(&path).map_err(|e| {
        IoError::FileSystem(e).with_context(format!("reading JSON from {:?}", path.as_ref()))
    })?;
    from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolsim_data::{Particle, ParticleClass, Vector2};

    #[test]
    fn test_snapshot_file_roundtrip() {
        let snapshot = vec![vec![Particle::new(
            3,
            0,
            ParticleClass::Large,
            10.0,
            2.0,
            Vector2::new(1.0, 2.0),
        )]];
        let path = std::env::temp_dir()
            .join(format!("poolsim_json_{}", std::process::id()))
            .join("snapshot.json");

        write_json_file(&snapshot, &path).unwrap();
        let back: Vec<Vec<Particle>> = read_json_file(&path).unwrap();
        assert_eq!(back, snapshot);

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_malformed_snapshot_file_is_json_error() {
        let path = std::env::temp_dir().join(format!("poolsim_badjson_{}.json", std::process::id()));
        std::fs::write(&path, "[[{\"id\": 1}]]").unwrap();

        let result: Result<Vec<Vec<Particle>>> = read_json_file(&path);
        assert!(matches!(result, Err(IoError::Json(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_json_fails() {
        let result: Result<Vec<u64>> = from_json("  ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result: Result<Vec<u64>> = from_json("{not json");
        assert!(matches!(result, Err(IoError::Json(_))));
        assert!(result.unwrap_err().to_string().starts_with("JSON error"));
    }
}
