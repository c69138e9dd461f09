//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration:
//!
//! ```
//! use emrtd_zk::config::{Config, TrustMode};
//!
//! let config = Config::from_json(r#"{ "trust": { "mode": "key_identifier" } }"#).unwrap();
//! assert_eq!(config.trust.mode, TrustMode::KeyIdentifier);
//! assert_eq!(config.merkle.depth, 80);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Top level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Issuer resolution.
    pub trust: TrustConfig,
    /// Active Authentication handling.
    pub aa: AaConfig,
    /// CSCA tree parameters.
    pub merkle: MerkleConfig,
}

impl Config {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// How a CSCA candidate is matched against the document signer certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustMode {
    /// Key identifier and issuer name match, plus a valid signature.
    #[default]
    Strict,
    /// Key identifier and issuer name match only.
    KeyIdentifier,
    /// Issuer name match only.
    DistinguishedName,
}

/// Issuer resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Matching mode.
    pub mode: TrustMode,
    /// Skip CSCAs lacking a SubjectKeyIdentifier instead of failing.
    pub skip_candidates_without_ski: bool,
}

/// What to do with an unknown ISO/IEC 9796-2 hash identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashFlagPolicy {
    /// Fall back to SHA-256.
    #[default]
    Compatible,
    /// Reject the signature.
    Strict,
}

/// Active Authentication settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AaConfig {
    /// Handling of unknown hash identifiers.
    pub hash_flag_policy: HashFlagPolicy,
    /// Lower bound of the bit length in RSA dispatcher tags.
    pub ec_max_size_bits: usize,
}

impl Default for AaConfig {
    fn default() -> Self {
        Self {
            hash_flag_policy: HashFlagPolicy::default(),
            ec_max_size_bits: 2688,
        }
    }
}

/// Hash used for the nodes of the CSCA tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HasherKind {
    /// Poseidon over the BN254 scalar field.
    #[default]
    Poseidon,
    /// Keccak-256.
    Keccak,
}

/// CSCA tree settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerkleConfig {
    /// Depth of the sparse Merkle tree.
    pub depth: usize,
    /// Node hash.
    pub hasher: HasherKind,
}

impl Default for MerkleConfig {
    fn default() -> Self {
        Self {
            depth: 80,
            hasher: HasherKind::default(),
        }
    }
}
