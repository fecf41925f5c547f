//! Merkle Tree Commitments
//!
//! Binary Merkle tree over the catalog's leaf commitments.
//!
//! The tree is built once and never mutated. Two rules decide the root and
//! must match the on-chain verifier exactly:
//!
//! - [`PairOrdering`]: whether children are hashed in sorted byte order
//!   (commutative, no direction bits in the proof) or positionally.
//! - [`OddNodePolicy`]: what a lone node at the end of a level is paired with.
//!
//! Both policies give every level a sibling, so a proof always has
//! `ceil(log2(leaf_count))` entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::hash::{hex_hashes, to_hex, HashAlgorithm, NodeHash, ZERO_HASH};

/// Sibling used for the last node of an odd-length level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddNodePolicy {
    /// Pair with [`ZERO_HASH`].
    #[default]
    PairWithZero,
    /// Pair with a copy of itself.
    Duplicate,
}

/// How two children are ordered before hashing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairOrdering {
    /// Smaller hash first (big-endian byte order).
    #[default]
    Sorted,
    /// Left child first.
    Positional,
}

/// Unrecognised policy name.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownPolicy {
    /// Which setting was being parsed.
    pub kind: &'static str,
    /// The rejected value.
    pub value: String,
}

impl FromStr for OddNodePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pair_with_zero" | "zero" => Ok(Self::PairWithZero),
            "duplicate" | "dup" => Ok(Self::Duplicate),
            other => Err(UnknownPolicy { kind: "odd node policy", value: other.to_string() }),
        }
    }
}

impl FromStr for PairOrdering {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" => Ok(Self::Sorted),
            "positional" => Ok(Self::Positional),
            other => Err(UnknownPolicy { kind: "pair ordering", value: other.to_string() }),
        }
    }
}

/// Everything that determines the tree's shape and hashes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Hash for leaves and nodes.
    pub hash: HashAlgorithm,
    /// Lone-node rule.
    pub odd_node: OddNodePolicy,
    /// Child ordering rule.
    pub pair_ordering: PairOrdering,
}

impl fmt::Display for TreeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {:?} / {:?}", self.hash, self.odd_node, self.pair_ordering)
    }
}

impl TreeSettings {
    /// Hash two siblings, `left` being the one at the even position.
    pub fn combine(&self, left: &NodeHash, right: &NodeHash) -> NodeHash {
        match self.pair_ordering {
            PairOrdering::Sorted if right < left => self.hash.hash_pair(right, left),
            _ => self.hash.hash_pair(left, right),
        }
    }

    fn lone_sibling(&self, node: &NodeHash) -> NodeHash {
        match self.odd_node {
            OddNodePolicy::PairWithZero => ZERO_HASH,
            OddNodePolicy::Duplicate => *node,
        }
    }
}

/// Merkle construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// No leaves to commit to.
    #[error("cannot build a Merkle tree with no leaves")]
    NoLeaves,
}

/// Immutable binary Merkle tree.
///
/// Only obtainable through [`MerkleTree::build`]; there are no mutators, so a
/// built tree can never be silently rebuilt from different leaves.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    settings: TreeSettings,
    /// All tree levels (leaves at index 0, root level last)
    levels: Vec<Vec<NodeHash>>,
    root: NodeHash,
}

impl MerkleTree {
    /// Build the tree bottom-up from ordered leaf commitments.
    ///
    /// A single leaf is its own root.
    pub fn build(leaves: Vec<NodeHash>, settings: TreeSettings) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::NoLeaves);
        }

        let leaf_count = leaves.len();
        let mut levels = vec![leaves];

        loop {
            let current = &levels[levels.len() - 1];
            if current.len() == 1 {
                break;
            }
            let next: Vec<NodeHash> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => settings.combine(left, right),
                    [lone] => settings.combine(lone, &settings.lone_sibling(lone)),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }

        let root = levels[levels.len() - 1][0];
        debug!(
            "Merkle tree built: {} leaves, depth {}, root {}",
            leaf_count,
            levels.len() - 1,
            to_hex(&root)
        );

        Ok(Self { settings, levels, root })
    }

    /// Root hash.
    #[inline]
    pub fn root(&self) -> NodeHash {
        self.root
    }

    /// Settings the tree was built with.
    pub fn settings(&self) -> TreeSettings {
        self.settings
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing levels above the leaves (= proof length).
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Leaf hash at an index.
    pub fn leaf(&self, index: usize) -> Option<NodeHash> {
        self.levels[0].get(index).copied()
    }

    /// Generate an inclusion proof for the leaf at `index`.
    ///
    /// Returns None if index is out of bounds.
    pub fn proof_for(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut current_index = index;

        // Walk up the tree, collecting sibling hashes
        for level in &self.levels[..self.depth()] {
            let sibling = match level.get(current_index ^ 1) {
                Some(hash) => *hash,
                None => self.settings.lone_sibling(&level[current_index]),
            };
            siblings.push(sibling);
            current_index /= 2;
        }

        Some(MerkleProof { leaf_index: index, siblings })
    }
}

/// Merkle inclusion proof.
///
/// Sibling hashes from the leaf level up to just below the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Index of the leaf this proof is for.
    pub leaf_index: usize,
    /// Sibling hashes, bottom to top.
    #[serde(with = "hex_hashes")]
    pub siblings: Vec<NodeHash>,
}

impl MerkleProof {
    /// Number of sibling hashes.
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// True for the proof of a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Fold the siblings into a root, starting from `leaf`.
    ///
    /// Under positional ordering the leaf index bits give the side of each
    /// sibling; under sorted ordering the index is not consulted.
    pub fn compute_root(&self, leaf: &NodeHash, settings: &TreeSettings) -> NodeHash {
        let mut current_hash = *leaf;
        let mut index = self.leaf_index;

        for sibling in &self.siblings {
            current_hash = if index % 2 == 0 {
                settings.combine(&current_hash, sibling)
            } else {
                settings.combine(sibling, &current_hash)
            };
            index /= 2;
        }

        current_hash
    }

    /// Verify this proof against a root hash.
    pub fn verify(&self, root: &NodeHash, leaf: &NodeHash, settings: &TreeSettings) -> bool {
        self.compute_root(leaf, settings) == *root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::{encode_word, parse_hex};

    fn leaves(n: u64) -> Vec<NodeHash> {
        (0..n).map(|i| HashAlgorithm::Sha256.hash_words(&[encode_word(i)])).collect()
    }

    fn all_settings() -> Vec<TreeSettings> {
        let mut out = Vec::new();
        for hash in [HashAlgorithm::Sha256, HashAlgorithm::Keccak256] {
            for odd_node in [OddNodePolicy::PairWithZero, OddNodePolicy::Duplicate] {
                for pair_ordering in [PairOrdering::Sorted, PairOrdering::Positional] {
                    out.push(TreeSettings { hash, odd_node, pair_ordering });
                }
            }
        }
        out
    }

    #[test]
    fn test_empty_tree_rejected() {
        assert_eq!(
            MerkleTree::build(Vec::new(), TreeSettings::default()).unwrap_err(),
            MerkleError::NoLeaves
        );
    }

    #[test]
    fn test_single_leaf() {
        let leaf = leaves(1);
        let tree = MerkleTree::build(leaf.clone(), TreeSettings::default()).unwrap();
        assert_eq!(tree.root(), leaf[0]);
        assert_eq!(tree.depth(), 0);

        let proof = tree.proof_for(0).unwrap();
        assert!(proof.is_empty());
        assert!(proof.verify(&tree.root(), &leaf[0], &tree.settings()));
    }

    #[test]
    fn test_merkle_root_determinism() {
        for settings in all_settings() {
            let tree1 = MerkleTree::build(leaves(7), settings).unwrap();
            let tree2 = MerkleTree::build(leaves(7), settings).unwrap();
            assert_eq!(tree1.root(), tree2.root());
        }
    }

    #[test]
    fn test_different_leaves_different_root() {
        let mut other = leaves(4);
        other[3] = encode_word(99);
        let tree1 = MerkleTree::build(leaves(4), TreeSettings::default()).unwrap();
        let tree2 = MerkleTree::build(other, TreeSettings::default()).unwrap();
        assert_ne!(tree1.root(), tree2.root());
    }

    #[test]
    fn test_policies_change_root() {
        let zero = MerkleTree::build(leaves(3), TreeSettings::default()).unwrap();
        let dup = MerkleTree::build(
            leaves(3),
            TreeSettings { odd_node: OddNodePolicy::Duplicate, ..Default::default() },
        )
        .unwrap();
        assert_ne!(zero.root(), dup.root());
    }

    #[test]
    fn test_every_proof_verifies() {
        for settings in all_settings() {
            for n in [1u64, 2, 3, 4, 5, 8, 13, 25, 100] {
                let leaves = leaves(n);
                let tree = MerkleTree::build(leaves.clone(), settings).unwrap();
                let expected_depth = (n as usize).next_power_of_two().trailing_zeros() as usize;
                assert_eq!(tree.depth(), expected_depth);

                for (i, leaf) in leaves.iter().enumerate() {
                    let proof = tree.proof_for(i).unwrap();
                    assert_eq!(proof.len(), expected_depth);
                    assert!(
                        proof.verify(&tree.root(), leaf, &settings),
                        "leaf {} of {} failed under {}",
                        i,
                        n,
                        settings
                    );
                }
            }
        }
    }

    #[test]
    fn test_invalid_proof_fails() {
        let leaves = leaves(4);
        let tree = MerkleTree::build(leaves.clone(), TreeSettings::default()).unwrap();
        let proof = tree.proof_for(0).unwrap();

        // Proof for wrong data should fail
        assert!(!proof.verify(&tree.root(), &encode_word(12345), &tree.settings()));
        // Proof against the wrong root should fail
        assert!(!proof.verify(&leaves[1], &leaves[0], &tree.settings()));
    }

    #[test]
    fn test_positional_proof_needs_index() {
        let settings =
            TreeSettings { pair_ordering: PairOrdering::Positional, ..Default::default() };
        let leaves = leaves(4);
        let tree = MerkleTree::build(leaves.clone(), settings).unwrap();

        let mut proof = tree.proof_for(1).unwrap();
        assert!(proof.verify(&tree.root(), &leaves[1], &settings));
        proof.leaf_index = 0;
        assert!(!proof.verify(&tree.root(), &leaves[1], &settings));
    }

    #[test]
    fn test_sorted_proof_ignores_index() {
        let leaves = leaves(4);
        let tree = MerkleTree::build(leaves.clone(), TreeSettings::default()).unwrap();

        let mut proof = tree.proof_for(1).unwrap();
        proof.leaf_index = 0;
        assert!(proof.verify(&tree.root(), &leaves[1], &tree.settings()));
    }

    #[test]
    fn test_lone_node_sibling() {
        let leaves = leaves(3);
        let zero = MerkleTree::build(leaves.clone(), TreeSettings::default()).unwrap();
        assert_eq!(zero.proof_for(2).unwrap().siblings[0], ZERO_HASH);

        let settings = TreeSettings { odd_node: OddNodePolicy::Duplicate, ..Default::default() };
        let dup = MerkleTree::build(leaves.clone(), settings).unwrap();
        assert_eq!(dup.proof_for(2).unwrap().siblings[0], leaves[2]);
    }

    #[test]
    fn test_proof_out_of_bounds() {
        let tree = MerkleTree::build(leaves(2), TreeSettings::default()).unwrap();
        assert!(tree.proof_for(10).is_none());
    }

    #[test]
    fn test_known_answer_three_leaves() {
        // Leaves for the three-record scenario catalog (sha256)
        let leaves: Vec<NodeHash> = [
            "bcb499c60df12cc2398b4065955cf583e9b8afc218f7e87b7af5872450d0b75c",
            "8f94eaf2e04263cb0e48404f818df6bb98d50aebffe62a3975c0dc5b802c86ca",
            "8f70c9023e85975dfa34008c7a584929b6a71cfa5c6fa2d386d107626d626685",
        ]
        .iter()
        .map(|s| parse_hex(s).unwrap())
        .collect();

        let expected = [
            (
                OddNodePolicy::PairWithZero,
                PairOrdering::Sorted,
                "44e7b38d5079f625b2dadee84bca57846d5d4ad5acb7a2482f817d46f58a356b",
            ),
            (
                OddNodePolicy::PairWithZero,
                PairOrdering::Positional,
                "a5af6794d16dfe96940accfa3392756019b6bb6a5da6f436b08e6141178084a8",
            ),
            (
                OddNodePolicy::Duplicate,
                PairOrdering::Sorted,
                "be375e837ad2add388bd4e52b40e3eb12b1948aa66f4aca9405da94e7822cf1b",
            ),
            (
                OddNodePolicy::Duplicate,
                PairOrdering::Positional,
                "7dbc93e394cfd2ecd5c389af3eae837041f1fc9c9f90754595d349b49b7bd7d2",
            ),
        ];

        for (odd_node, pair_ordering, root) in expected {
            let settings = TreeSettings { hash: HashAlgorithm::Sha256, odd_node, pair_ordering };
            let tree = MerkleTree::build(leaves.clone(), settings).unwrap();
            assert_eq!(tree.root(), parse_hex(root).unwrap(), "root mismatch under {}", settings);
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("duplicate".parse::<OddNodePolicy>().unwrap(), OddNodePolicy::Duplicate);
        assert_eq!("pair_with_zero".parse::<OddNodePolicy>().unwrap(), OddNodePolicy::PairWithZero);
        assert_eq!("Positional".parse::<PairOrdering>().unwrap(), PairOrdering::Positional);
        assert!("promote".parse::<OddNodePolicy>().is_err());
    }
}
