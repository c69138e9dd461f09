use alloc::string::{String, ToString};
use alloc::vec::Vec;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::merkle::Proof;
use crate::poseidon::scalar_field_modulus;

/// Private inputs of the registration circuit.
///
/// Field order is the order the witness calculator expects. Byte strings
/// serialize as arrays of numbers, field elements as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationInputs {
    /// Raw DG1.
    pub dg1: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Raw DG15 of documents with Active Authentication.
    pub dg15: Option<Vec<u8>>,
    /// DER signed attributes of the SOD signer.
    pub signed_attributes: Vec<u8>,
    /// DER `LDSSecurityObject`.
    pub encapsulated_content: Vec<u8>,
    /// Document signer key limbs.
    pub pubkey: Vec<String>,
    /// SOD signature limbs.
    pub signature: Vec<String>,
    /// Identity secret key.
    pub sk_identity: String,
    /// Root of the CSCA tree.
    pub slave_merkle_root: String,
    /// Sibling path of the issuing CSCA.
    pub slave_merkle_inclusion_branches: Vec<String>,
}

impl RegistrationInputs {
    /// Checks that `sk_identity` is a scalar field element and renders it in
    /// decimal.
    pub fn sk_identity_decimal(sk_identity: &[u8]) -> Result<String> {
        let sk = BigUint::from_bytes_be(sk_identity);
        if sk >= scalar_field_modulus() {
            return Err(Error::malformed("identity key exceeds the scalar field"));
        }
        Ok(sk.to_string())
    }

    /// Root and sibling path of a CSCA tree proof, siblings padded to
    /// `depth`.
    pub fn merkle_fields(proof: &Proof, depth: usize) -> (String, Vec<String>) {
        let decimal = |node: &[u8; 32]| BigUint::from_bytes_be(node).to_string();
        let branches = proof.padded_siblings(depth).iter().map(decimal).collect();
        (decimal(&proof.root), branches)
    }

    /// JSON handed to the witness calculator.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
