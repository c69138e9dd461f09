//! Sparse Merkle tree.
//!
//! A leaf sits at the shallowest level where its path, the bits of its key
//! read from the least significant one, is no longer shared with another
//! leaf. Subtrees without leaves hash to [`EMPTY`].

use alloc::vec::Vec;
use core::fmt;
use log::{debug, trace};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::{hash_from_slice, Hash, MerkleHasher, EMPTY};
use crate::errors::{Error, Result};

/// Deepest supported tree: every bit of a 32-byte key.
pub const MAX_DEPTH: usize = 256;

type Leaf = (Hash, Hash);

/// Bit `level` of a big-endian key, counting from the least significant bit.
fn path_bit(key: &Hash, level: usize) -> bool {
    let byte = key[key.len() - 1 - level / 8];
    (byte >> (level % 8)) & 1 == 1
}

/// Sparse Merkle tree with a fixed maximum depth.
#[derive(Clone)]
pub struct SparseMerkleTree<H> {
    depth: usize,
    hasher: H,
    leaves: Vec<Leaf>,
    root: Hash,
}

impl<H: MerkleHasher> SparseMerkleTree<H> {
    /// Builds the tree over `(key, value)` leaves.
    ///
    /// `depth` must be in `1..=256` and `2^depth` must exceed the number of
    /// leaves. Keys whose low `depth` bits coincide collide.
    pub fn build(leaves: Vec<Leaf>, depth: usize, hasher: H) -> Result<Self> {
        let too_many = leaves
            .len()
            .checked_shr(depth as u32)
            .map_or(false, |rest| rest != 0);
        if depth == 0 || depth > MAX_DEPTH || too_many {
            return Err(Error::InvalidTreeDepth {
                depth,
                leaves: leaves.len(),
            });
        }

        let all: Vec<&Leaf> = leaves.iter().collect();
        let root = subtree_root(&hasher, depth, 0, &all)?;
        debug!("built sparse tree of depth {depth} over {} leaves", leaves.len());

        Ok(Self {
            depth,
            hasher,
            leaves,
            root,
        })
    }

    /// Root hash.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Maximum depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The node hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Inclusion proof of `key`, siblings ordered from the root down.
    pub fn prove_inclusion(&self, key: &Hash) -> Result<Proof> {
        let mut subset: Vec<&Leaf> = self.leaves.iter().collect();
        let mut siblings = Vec::new();
        let mut level = 0;

        let value = loop {
            let leaf = subset
                .iter()
                .find(|(k, _)| k == key)
                .ok_or(Error::ProofGenerationFailed)?;
            if subset.len() == 1 {
                break leaf.1;
            }
            if level == self.depth {
                return Err(Error::LeafCollision { depth: self.depth });
            }

            let bit = path_bit(key, level);
            let (same, other): (Vec<&Leaf>, Vec<&Leaf>) = subset
                .into_iter()
                .partition(|(k, _)| path_bit(k, level) == bit);
            siblings.push(subtree_root(&self.hasher, self.depth, level + 1, &other)?);
            subset = same;
            level += 1;
        };

        trace!("inclusion proof with {} siblings", siblings.len());
        Ok(Proof {
            root: self.root,
            siblings,
            existence: true,
            key: *key,
            value,
        })
    }
}

impl<H> fmt::Debug for SparseMerkleTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMerkleTree")
            .field("depth", &self.depth)
            .field("leaves", &self.leaves.len())
            .field("root", &HexNode(&self.root))
            .finish()
    }
}

fn subtree_root<H: MerkleHasher>(
    hasher: &H,
    depth: usize,
    level: usize,
    leaves: &[&Leaf],
) -> Result<Hash> {
    match leaves {
        [] => Ok(EMPTY),
        [(key, value)] => hasher.hash_leaf(key, value),
        _ if level == depth => Err(Error::LeafCollision { depth }),
        _ => {
            let (right, left): (Vec<&Leaf>, Vec<&Leaf>) =
                leaves.iter().copied().partition(|(key, _)| path_bit(key, level));
            let left = subtree_root(hasher, depth, level + 1, &left)?;
            let right = subtree_root(hasher, depth, level + 1, &right)?;
            hasher.hash_node(&left, &right)
        }
    }
}

/// Inclusion proof of a sparse tree leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Root the proof was made against.
    #[serde(with = "hex_node")]
    pub root: Hash,
    /// Sibling hashes from the root down to the leaf.
    #[serde(with = "hex_nodes")]
    pub siblings: Vec<Hash>,
    /// Whether the key is a member.
    pub existence: bool,
    /// Leaf key.
    #[serde(with = "hex_node")]
    pub key: Hash,
    /// Leaf value.
    #[serde(with = "hex_node")]
    pub value: Hash,
}

impl Proof {
    /// Siblings padded with [`EMPTY`] to `depth` entries.
    pub fn padded_siblings(&self, depth: usize) -> Vec<Hash> {
        let mut out = self.siblings.clone();
        if out.len() < depth {
            out.resize(depth, EMPTY);
        }
        out
    }
}

/// Recomputes the root from the leaf of `proof` and compares it to `root`.
pub fn verify_inclusion<H: MerkleHasher>(hasher: &H, root: &Hash, proof: &Proof) -> bool {
    if !proof.existence || proof.siblings.len() > MAX_DEPTH {
        return false;
    }

    let mut acc = match hasher.hash_leaf(&proof.key, &proof.value) {
        Ok(leaf) => leaf,
        Err(_) => return false,
    };
    for (level, sibling) in proof.siblings.iter().enumerate().rev() {
        let node = if path_bit(&proof.key, level) {
            hasher.hash_node(sibling, &acc)
        } else {
            hasher.hash_node(&acc, sibling)
        };
        acc = match node {
            Ok(node) => node,
            Err(_) => return false,
        };
    }
    acc == *root
}

struct HexNode<'a>(&'a Hash);

impl fmt::Debug for HexNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for HexNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serdect::slice::serialize_hex_lower_or_bin(self.0, serializer)
    }
}

struct OwnedNode(Hash);

impl<'de> Deserialize<'de> for OwnedNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let bytes = serdect::slice::deserialize_hex_or_bin_vec(deserializer)?;
        hash_from_slice(&bytes)
            .map(OwnedNode)
            .map_err(de::Error::custom)
    }
}

mod hex_node {
    use super::*;

    pub(super) fn serialize<S: Serializer>(
        node: &Hash,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        HexNode(node).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Hash, D::Error> {
        OwnedNode::deserialize(deserializer).map(|node| node.0)
    }
}

mod hex_nodes {
    use super::*;

    pub(super) fn serialize<S: Serializer>(
        nodes: &[Hash],
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(nodes.iter().map(HexNode))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Vec<Hash>, D::Error> {
        let nodes = Vec::<OwnedNode>::deserialize(deserializer)?;
        if nodes.len() > MAX_DEPTH {
            return Err(de::Error::invalid_length(nodes.len(), &"at most 256 siblings"));
        }
        Ok(nodes.into_iter().map(|node| node.0).collect())
    }
}
