//! Merkle trees over CSCA public keys.
//!
//! Two trees are provided:
//!
//! - [`SparseMerkleTree`], a sparse tree with Poseidon or Keccak-256 nodes
//!   whose root and proofs feed the registration circuit;
//! - [`Treap`], a Keccak-256 treap with sorted-pair hashing whose root is
//!   published by the certificate registry.

mod smt;
mod treap;

pub use self::{
    smt::{verify_inclusion, Proof, SparseMerkleTree},
    treap::{verify_path, CertificateTree, Treap},
};

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use x509_cert::Certificate;

use crate::algorithms::pad::pad_be;
use crate::config::HasherKind;
use crate::errors::{Error, Result};
use crate::hash::keccak256;
use crate::poseidon::{poseidon_hash, scalar_field_modulus};
use crate::trust::CscaSet;

/// A 32-byte node, key or value.
pub type Hash = [u8; 32];

/// Hash of an empty subtree.
pub const EMPTY: Hash = [0u8; 32];

/// Node hash of a tree.
pub trait MerkleHasher {
    /// Hash of an inner node.
    fn hash_node(&self, left: &Hash, right: &Hash) -> Result<Hash>;

    /// Hash of a leaf, `H(key, value, 1)`.
    fn hash_leaf(&self, key: &Hash, value: &Hash) -> Result<Hash>;
}

/// Poseidon over the BN254 scalar field. Keys and values must be canonical
/// field elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoseidonHasher;

impl MerkleHasher for PoseidonHasher {
    fn hash_node(&self, left: &Hash, right: &Hash) -> Result<Hash> {
        poseidon_hash(&[BigUint::from_bytes_be(left), BigUint::from_bytes_be(right)])
    }

    fn hash_leaf(&self, key: &Hash, value: &Hash) -> Result<Hash> {
        poseidon_hash(&[
            BigUint::from_bytes_be(key),
            BigUint::from_bytes_be(value),
            BigUint::from(1u8),
        ])
    }
}

/// Keccak-256 over the concatenated 32-byte words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeccakHasher;

impl MerkleHasher for KeccakHasher {
    fn hash_node(&self, left: &Hash, right: &Hash) -> Result<Hash> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(left);
        buf.extend_from_slice(right);
        Ok(keccak256(&buf))
    }

    fn hash_leaf(&self, key: &Hash, value: &Hash) -> Result<Hash> {
        let mut one = EMPTY;
        one[31] = 1;
        let mut buf = Vec::with_capacity(96);
        buf.extend_from_slice(key);
        buf.extend_from_slice(value);
        buf.extend_from_slice(&one);
        Ok(keccak256(&buf))
    }
}

impl MerkleHasher for HasherKind {
    fn hash_node(&self, left: &Hash, right: &Hash) -> Result<Hash> {
        match self {
            HasherKind::Poseidon => PoseidonHasher.hash_node(left, right),
            HasherKind::Keccak => KeccakHasher.hash_node(left, right),
        }
    }

    fn hash_leaf(&self, key: &Hash, value: &Hash) -> Result<Hash> {
        match self {
            HasherKind::Poseidon => PoseidonHasher.hash_leaf(key, value),
            HasherKind::Keccak => KeccakHasher.hash_leaf(key, value),
        }
    }
}

impl<H: MerkleHasher + ?Sized> MerkleHasher for &H {
    fn hash_node(&self, left: &Hash, right: &Hash) -> Result<Hash> {
        (**self).hash_node(left, right)
    }

    fn hash_leaf(&self, key: &Hash, value: &Hash) -> Result<Hash> {
        (**self).hash_leaf(key, value)
    }
}

/// Keccak-256 of `bytes` reduced into the BN254 scalar field.
pub fn field_key(bytes: &[u8]) -> Hash {
    let reduced = BigUint::from_bytes_be(&keccak256(bytes)) % scalar_field_modulus();
    to_hash(&reduced)
}

/// Keccak-256 of `bytes` reduced modulo `2^64 - 1`.
pub fn priority_key(bytes: &[u8]) -> u64 {
    let modulus = BigUint::from(u64::MAX);
    let reduced = BigUint::from_bytes_be(&keccak256(bytes)) % modulus;
    reduced.to_u64().unwrap_or_default()
}

/// Leaf of a CSCA: the key is the [`field_key`] and the value the
/// [`priority_key`] of the raw `subjectPublicKey` bits.
pub fn csca_leaf(cert: &Certificate) -> (Hash, Hash) {
    let raw = cert
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .raw_bytes();
    let mut value = EMPTY;
    value[24..].copy_from_slice(&priority_key(raw).to_be_bytes());
    (field_key(raw), value)
}

/// Sparse tree over every certificate of a CSCA pool.
pub fn csca_tree<H: MerkleHasher>(
    cscas: &CscaSet,
    depth: usize,
    hasher: H,
) -> Result<SparseMerkleTree<H>> {
    let leaves = cscas.iter().map(csca_leaf).collect();
    SparseMerkleTree::build(leaves, depth, hasher)
}

fn to_hash(value: &BigUint) -> Hash {
    let mut out = EMPTY;
    let bytes = pad_be(&value.to_bytes_be(), out.len());
    let start = bytes.len() - out.len();
    out.copy_from_slice(&bytes[start..]);
    out
}

pub(crate) fn hash_from_slice(bytes: &[u8]) -> Result<Hash> {
    Hash::try_from(bytes).map_err(|_| Error::malformed("merkle node is not 32 bytes"))
}
