//! # Treasure Proofs
//!
//! Fixed catalog of treasure tiles in a 3D grid, committed to a Merkle root,
//! with per-tile membership proofs for on-chain settlement.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TREASURE PROOFS                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── grid.rs     - Coordinate <-> tile id codec              │
//! │  └── hash.rs     - SHA-256 / Keccak-256 over 32-byte words   │
//! │                                                              │
//! │  catalog/        - Treasure records (immutable, ordered)     │
//! │  ├── record.rs   - TreasureRecord                            │
//! │  ├── reference.rs- Built-in reference catalog                │
//! │  └── config.rs   - Catalog file + env settings               │
//! │                                                              │
//! │  proof/          - Commitments and proofs                    │
//! │  ├── leaf.rs     - Leaf commitment                           │
//! │  ├── merkle.rs   - Merkle tree                               │
//! │  ├── service.rs  - Proof lookup service                      │
//! │  └── verify.rs   - Proof verification                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data flow
//!
//! Setup: catalog → leaves → tree (once). Query: tile id → coordinate →
//! catalog index → sibling path.
//!
//! ## Compatibility
//!
//! The tile id formula, leaf layout, hash function, odd-node policy and pair
//! ordering together fix the root. Any of them differing from the settlement
//! contract makes every proof fail, so each is pinned by known-answer tests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod core;
pub mod proof;

// Re-export commonly used types
pub use catalog::{CatalogError, ConfigError, ServiceSettings, TreasureCatalog, TreasureRecord};
pub use crate::core::grid::{Coordinate, CoordinateCodec, LogicalCoordinate, TileId};
pub use crate::core::hash::{HashAlgorithm, NodeHash};
pub use proof::{
    verify_treasure_proof, MerkleProof, MerkleTree, ProofService, ServiceError, TreasureProof,
    TreeSettings,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
