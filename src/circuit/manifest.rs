use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Downloadable artifacts of one compiled circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitEntry {
    /// Circuit name, see [`CircuitName`](super::CircuitName).
    pub name: String,
    /// Location of the circuit archive.
    pub url: String,
}

/// Registry of the circuits a verifier deployment supports.
///
/// ```
/// use emrtd_zk::circuit::CircuitManifest;
///
/// let manifest = CircuitManifest::from_json(
///     r#"[{ "name": "registerIdentity_1_256_3_6_576_248_NA", "url": "https://example.com/c.zip" }]"#,
/// ).unwrap();
/// assert!(manifest.find("registerIdentity_1_256_3_6_576_248_NA").is_ok());
/// assert!(manifest.find("registerIdentity_2_256_3_6_576_248_NA").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircuitManifest {
    entries: Vec<CircuitEntry>,
}

impl CircuitManifest {
    /// Parses a JSON array of `{ name, url }` entries.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All entries.
    pub fn entries(&self) -> &[CircuitEntry] {
        &self.entries
    }

    /// Entry registered under `name`.
    pub fn find(&self, name: &str) -> Result<&CircuitEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| Error::CircuitNotFound { name: name.into() })
    }
}

impl From<Vec<CircuitEntry>> for CircuitManifest {
    fn from(entries: Vec<CircuitEntry>) -> Self {
        Self { entries }
    }
}
