//! Treasure Proof System
//!
//! Commits the catalog to a Merkle root and serves membership proofs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PROOF SYSTEM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  leaf.rs     - H(tile_id, nonce, prize) per record          │
//! │  merkle.rs   - Immutable binary Merkle tree + policies      │
//! │  service.rs  - One-time setup, proof lookup by tile id      │
//! │  verify.rs   - Settlement-side proof recomputation          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod leaf;
pub mod merkle;
pub mod service;
pub mod verify;

// Re-export key types
pub use leaf::LeafCommitter;
pub use merkle::{
    MerkleError, MerkleProof, MerkleTree, OddNodePolicy, PairOrdering, TreeSettings, UnknownPolicy,
};
pub use service::{ProofService, ServiceError, ServicePhase, TreasureIndex, TreasureProof};
pub use verify::{verify_treasure_proof, ProofVerificationError};
