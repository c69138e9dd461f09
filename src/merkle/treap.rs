//! Keccak-256 treap of certificate keys.
//!
//! Nodes are ordered by their 32-byte hash and heap-ordered by priority.
//! The Merkle hash of a node combines its children and its own hash with a
//! sorted-pair Keccak-256, so a path can be folded without direction bits.

use alloc::boxed::Box;
use alloc::vec::Vec;
use log::debug;
use x509_cert::Certificate;

use super::{priority_key, Hash};
use crate::errors::{Error, Result};
use crate::hash::keccak256;
use crate::tbs;
use crate::trust::CscaSet;

type Link = Option<Box<Node>>;

#[derive(Clone, Debug)]
struct Node {
    hash: Hash,
    priority: u64,
    merkle_hash: Hash,
    left: Link,
    right: Link,
}

impl Node {
    fn new(hash: Hash, priority: u64) -> Box<Self> {
        Box::new(Self {
            hash,
            priority,
            merkle_hash: hash,
            left: None,
            right: None,
        })
    }

    fn children_hash(&self) -> Option<Hash> {
        hash_pair(
            self.left.as_ref().map(|n| n.merkle_hash),
            self.right.as_ref().map(|n| n.merkle_hash),
        )
    }

    fn update(&mut self) {
        self.merkle_hash = match self.children_hash() {
            Some(children) => sorted_keccak(&children, &self.hash),
            None => self.hash,
        };
    }
}

fn sorted_keccak(a: &Hash, b: &Hash) -> Hash {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo);
    buf[32..].copy_from_slice(hi);
    keccak256(&buf)
}

fn hash_pair(a: Option<Hash>, b: Option<Hash>) -> Option<Hash> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => Some(sorted_keccak(&a, &b)),
    }
}

/// Splits `root` into nodes that go left (`hash < key`, or `<=` when
/// `inclusive`) and the rest.
fn split(root: Link, key: &Hash, inclusive: bool) -> (Link, Link) {
    let mut node = match root {
        Some(node) => node,
        None => return (None, None),
    };

    let goes_left = if inclusive {
        node.hash <= *key
    } else {
        node.hash < *key
    };

    if goes_left {
        let (left, right) = split(node.right.take(), key, inclusive);
        node.right = left;
        node.update();
        (Some(node), right)
    } else {
        let (left, right) = split(node.left.take(), key, inclusive);
        node.left = right;
        node.update();
        (left, Some(node))
    }
}

fn merge(left: Link, right: Link) -> Link {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(mut left), Some(mut right)) => {
            if left.priority > right.priority {
                left.right = merge(left.right.take(), Some(right));
                left.update();
                Some(left)
            } else {
                right.left = merge(Some(left), right.left.take());
                right.update();
                Some(right)
            }
        }
    }
}

/// Treap with Merkle hashes.
#[derive(Clone, Debug, Default)]
pub struct Treap {
    root: Link,
}

impl Treap {
    /// Empty treap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key` with the given heap priority.
    pub fn insert(&mut self, key: Hash, priority: u64) {
        let (left, right) = split(self.root.take(), &key, true);
        self.root = merge(merge(left, Some(Node::new(key, priority))), right);
    }

    /// Removes every node equal to `key`.
    pub fn remove(&mut self, key: &Hash) {
        let (left, right) = split(self.root.take(), key, false);
        let (_, right) = split(right, key, true);
        self.root = merge(left, right);
    }

    /// Merkle hash of the root, `None` when empty.
    pub fn merkle_root(&self) -> Option<Hash> {
        self.root.as_ref().map(|node| node.merkle_hash)
    }

    /// Hashes to fold, from the node of `key` up to the root.
    ///
    /// A treap whose only node is `key` yields no path and fails with
    /// [`Error::ProofGenerationFailed`], like a missing key.
    pub fn merkle_path(&self, key: &Hash) -> Result<Vec<Hash>> {
        let mut node = self.root.as_deref();
        let mut path = Vec::new();

        while let Some(current) = node {
            if current.hash == *key {
                if let Some(children) = current.children_hash() {
                    path.push(children);
                }
                if path.is_empty() {
                    return Err(Error::ProofGenerationFailed);
                }
                path.reverse();
                return Ok(path);
            }

            path.push(current.hash);
            if current.hash > *key {
                if let Some(right) = &current.right {
                    path.push(right.merkle_hash);
                }
                node = current.left.as_deref();
            } else {
                if let Some(left) = &current.left {
                    path.push(left.merkle_hash);
                }
                node = current.right.as_deref();
            }
        }

        Err(Error::ProofGenerationFailed)
    }
}

/// Folds `path` onto `key` with the sorted-pair hash and compares the result
/// to `root`.
pub fn verify_path(root: &Hash, key: &Hash, path: &[Hash]) -> bool {
    let folded = path
        .iter()
        .fold(*key, |acc, sibling| sorted_keccak(&acc, sibling));
    folded == *root
}

/// Treap of CSCA keys, each leaf being `Keccak256(canonical key)`.
#[derive(Clone, Debug, Default)]
pub struct CertificateTree {
    treap: Treap,
}

impl CertificateTree {
    /// Leaf hash of a certificate.
    pub fn leaf(cert: &Certificate) -> Result<Hash> {
        Ok(keccak256(&tbs::certificate_public_key(cert)?.canonical_bytes()))
    }

    /// Inserts every certificate of the pool.
    pub fn from_cscas(cscas: &CscaSet) -> Result<Self> {
        let mut treap = Treap::new();
        for cert in cscas {
            let leaf = Self::leaf(cert)?;
            treap.insert(leaf, priority_key(&leaf));
        }
        debug!("built certificate treap over {} CSCAs", cscas.len());
        Ok(Self { treap })
    }

    /// The treap.
    pub fn treap(&self) -> &Treap {
        &self.treap
    }

    /// Root of the tree.
    pub fn root(&self) -> Option<Hash> {
        self.treap.merkle_root()
    }

    /// Inclusion path of `cert`.
    pub fn inclusion_proof(&self, cert: &Certificate) -> Result<Vec<Hash>> {
        self.treap.merkle_path(&Self::leaf(cert)?)
    }
}
