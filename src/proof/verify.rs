//! Verification API
//!
//! Recompute a treasure proof the way the settlement contract does: rebuild
//! the leaf from the claimed tile, nonce and prize, then fold the sibling
//! path up to a root.

use thiserror::Error;

use crate::core::hash::{to_hex, NodeHash};
use crate::proof::leaf::LeafCommitter;
use crate::proof::merkle::{PairOrdering, TreeSettings};
use crate::proof::service::TreasureProof;

/// Errors that can occur during proof verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofVerificationError {
    /// Folded root differs from the published root.
    #[error("root mismatch: expected {}, computed {}", to_hex(.expected), to_hex(.computed))]
    RootMismatch {
        /// Published root.
        expected: NodeHash,
        /// Root recomputed from the proof.
        computed: NodeHash,
    },

    /// Positional proof whose leaf index does not fit in its depth.
    #[error("leaf index {leaf_index} out of range for proof depth {depth}")]
    LeafIndexOutOfRange {
        /// Claimed leaf index.
        leaf_index: usize,
        /// Proof length.
        depth: usize,
    },
}

/// Verify a treasure proof against a published root.
pub fn verify_treasure_proof(
    root: &NodeHash,
    proof: &TreasureProof,
    settings: &TreeSettings,
) -> Result<(), ProofVerificationError> {
    let depth = proof.proof.len();
    if settings.pair_ordering == PairOrdering::Positional
        && depth < usize::BITS as usize
        && proof.leaf_index >> depth != 0
    {
        let leaf_index = proof.leaf_index;
        return Err(ProofVerificationError::LeafIndexOutOfRange { leaf_index, depth });
    }

    let leaf = LeafCommitter::new(settings.hash).commit(proof.tile_id, proof.nonce, proof.prize);
    let computed = proof.merkle_proof().compute_root(&leaf, settings);

    if computed != *root {
        return Err(ProofVerificationError::RootMismatch { expected: *root, computed });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reference_catalog;
    use crate::core::hash::HashAlgorithm;
    use crate::proof::merkle::OddNodePolicy;
    use crate::proof::service::ProofService;

    fn first_tile(service: &ProofService) -> u64 {
        service.catalog().tile_id_at(0).unwrap()
    }

    #[test]
    fn test_valid_proof_passes() {
        for pair_ordering in [PairOrdering::Sorted, PairOrdering::Positional] {
            let settings = TreeSettings {
                hash: HashAlgorithm::Keccak256,
                odd_node: OddNodePolicy::Duplicate,
                pair_ordering,
            };
            let service = ProofService::ready(reference_catalog().unwrap(), settings).unwrap();
            let root = service.root().unwrap();

            for (tile_id, _) in service.catalog().iter() {
                let proof = service.proof_for_tile(tile_id).unwrap().unwrap();
                assert_eq!(verify_treasure_proof(&root, &proof, &settings), Ok(()));
            }
        }
    }

    #[test]
    fn test_tampered_prize_fails() {
        let settings = TreeSettings::default();
        let service = ProofService::ready(reference_catalog().unwrap(), settings).unwrap();
        let root = service.root().unwrap();

        let mut proof = service.proof_for_tile(first_tile(&service)).unwrap().unwrap();
        proof.prize = 1_000_000;

        let err = verify_treasure_proof(&root, &proof, &settings).unwrap_err();
        assert!(matches!(
            err,
            ProofVerificationError::RootMismatch { expected, .. } if expected == root
        ));
        let prefix = format!("root mismatch: expected {}", to_hex(&root));
        assert!(err.to_string().starts_with(&prefix));
    }

    #[test]
    fn test_wrong_settings_fail() {
        let service =
            ProofService::ready(reference_catalog().unwrap(), TreeSettings::default()).unwrap();
        let root = service.root().unwrap();
        let proof = service.proof_for_tile(first_tile(&service)).unwrap().unwrap();

        let keccak = TreeSettings { hash: HashAlgorithm::Keccak256, ..Default::default() };
        assert!(verify_treasure_proof(&root, &proof, &keccak).is_err());
    }

    #[test]
    fn test_positional_index_out_of_range() {
        let settings =
            TreeSettings { pair_ordering: PairOrdering::Positional, ..Default::default() };
        let service = ProofService::ready(reference_catalog().unwrap(), settings).unwrap();
        let root = service.root().unwrap();

        let mut proof = service.proof_for_tile(first_tile(&service)).unwrap().unwrap();
        proof.leaf_index = 32;
        let err = verify_treasure_proof(&root, &proof, &settings).unwrap_err();
        assert_eq!(err, ProofVerificationError::LeafIndexOutOfRange { leaf_index: 32, depth: 5 });
        assert_eq!(err.to_string(), "leaf index 32 out of range for proof depth 5");
    }
}
