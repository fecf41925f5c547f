//! Proof Service
//!
//! Answers "is this tile a treasure, and what is its proof?".
//!
//! ## Lifecycle
//!
//! ```text
//! ┌───────────────┐ initialize() ┌──────────┐   ok    ┌───────┐
//! │ Uninitialized │ ───────────▶ │ Building │ ──────▶ │ Ready │
//! └───────────────┘              └──────────┘         └───────┘
//!                                      │ err
//!                                      ▼
//!                                 ┌────────┐
//!                                 │ Failed │ (terminal)
//!                                 └────────┘
//! ```
//!
//! Concurrent `initialize()` calls are coalesced into a single build. Until
//! Ready, the fail-fast queries return [`ServiceError::NotReady`]; the
//! `*_when_ready` variants wait for (and if needed trigger) the build.
//! Once Ready the index is immutable and every query is a lock-free read.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::catalog::TreasureCatalog;
use crate::core::grid::TileId;
use crate::core::hash::{hex_hashes, to_hex, NodeHash};
use crate::proof::leaf::LeafCommitter;
use crate::proof::merkle::{MerkleError, MerkleProof, MerkleTree, TreeSettings};

/// Service lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServicePhase {
    /// Catalog loaded, tree not built.
    Uninitialized = 0,
    /// Tree build in progress.
    Building = 1,
    /// Tree built; queries are served.
    Ready = 2,
    /// Tree build failed. Terminal.
    Failed = 3,
}

impl ServicePhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Building,
            2 => Self::Ready,
            _ => Self::Failed,
        }
    }
}

/// Proof service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Tree not built yet. Retry once Ready.
    #[error("proof service not ready")]
    NotReady,

    /// Tree build failed; the service will never become Ready.
    #[error("proof service setup failed: {0}")]
    SetupFailed(#[from] MerkleError),
}

/// Proof payload for a treasure tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureProof {
    /// Tile the proof is for.
    pub tile_id: TileId,
    /// Leaf position (catalog index).
    pub leaf_index: usize,
    /// Sibling hashes, bottom to top.
    #[serde(with = "hex_hashes")]
    pub proof: Vec<NodeHash>,
    /// Record nonce bound into the leaf.
    pub nonce: u64,
    /// Record prize bound into the leaf.
    pub prize: u64,
}

impl TreasureProof {
    /// The sibling path as a [`MerkleProof`].
    pub fn merkle_proof(&self) -> MerkleProof {
        MerkleProof { leaf_index: self.leaf_index, siblings: self.proof.clone() }
    }
}

/// Catalog plus the tree built over it. Immutable.
#[derive(Debug)]
pub struct TreasureIndex {
    catalog: Arc<TreasureCatalog>,
    committer: LeafCommitter,
    tree: MerkleTree,
}

impl TreasureIndex {
    /// Commit every record and build the tree.
    pub fn build(
        catalog: Arc<TreasureCatalog>,
        settings: TreeSettings,
    ) -> Result<Self, MerkleError> {
        let committer = LeafCommitter::new(settings.hash);
        let leaves = committer.commit_catalog(&catalog);
        let tree = MerkleTree::build(leaves, settings)?;
        Ok(Self { catalog, committer, tree })
    }

    /// Tree root.
    pub fn root(&self) -> NodeHash {
        self.tree.root()
    }

    /// The catalog the tree commits to.
    pub fn catalog(&self) -> &TreasureCatalog {
        &self.catalog
    }

    /// The built tree.
    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Leaf committer matching the tree's hash.
    pub fn committer(&self) -> LeafCommitter {
        self.committer
    }

    /// Proof for a tile, or None if it holds no treasure.
    pub fn proof_for_tile(&self, tile_id: TileId) -> Option<TreasureProof> {
        let (leaf_index, record) = self.catalog.find_by_tile(tile_id)?;
        let proof = self.tree.proof_for(leaf_index)?;
        Some(TreasureProof {
            tile_id,
            leaf_index,
            proof: proof.siblings,
            nonce: record.nonce,
            prize: record.prize,
        })
    }

    /// Leaf hash for a tile, or None if it holds no treasure.
    pub fn leaf_for_tile(&self, tile_id: TileId) -> Option<NodeHash> {
        let (leaf_index, _) = self.catalog.find_by_tile(tile_id)?;
        self.tree.leaf(leaf_index)
    }
}

/// Treasure membership and proof lookup.
pub struct ProofService {
    catalog: Arc<TreasureCatalog>,
    settings: TreeSettings,
    index: OnceCell<Arc<TreasureIndex>>,
    phase: AtomicU8,
    failure: OnceLock<MerkleError>,
}

impl ProofService {
    /// Create an uninitialized service over a loaded catalog.
    pub fn new(catalog: TreasureCatalog, settings: TreeSettings) -> Self {
        Self {
            catalog: Arc::new(catalog),
            settings,
            index: OnceCell::new(),
            phase: AtomicU8::new(ServicePhase::Uninitialized as u8),
            failure: OnceLock::new(),
        }
    }

    /// Build synchronously and return a service that is already Ready.
    pub fn ready(catalog: TreasureCatalog, settings: TreeSettings) -> Result<Self, ServiceError> {
        let catalog = Arc::new(catalog);
        let index = build_index(Arc::clone(&catalog), settings)?;
        Ok(Self {
            catalog,
            settings,
            index: OnceCell::new_with(Some(Arc::new(index))),
            phase: AtomicU8::new(ServicePhase::Ready as u8),
            failure: OnceLock::new(),
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ServicePhase {
        ServicePhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Tree settings in use.
    pub fn settings(&self) -> TreeSettings {
        self.settings
    }

    /// The catalog served.
    pub fn catalog(&self) -> &TreasureCatalog {
        &self.catalog
    }

    /// Build the tree exactly once.
    ///
    /// Concurrent callers wait on the same build and receive the same index.
    /// After a failed build every call returns `SetupFailed`.
    pub async fn initialize(&self) -> Result<Arc<TreasureIndex>, ServiceError> {
        let index = self
            .index
            .get_or_try_init(|| async {
                if let Some(err) = self.failure.get() {
                    return Err(ServiceError::SetupFailed(err.clone()));
                }
                self.phase.store(ServicePhase::Building as u8, Ordering::Release);

                match build_index(Arc::clone(&self.catalog), self.settings) {
                    Ok(index) => Ok(Arc::new(index)),
                    Err(ServiceError::SetupFailed(err)) => {
                        let _ = self.failure.set(err.clone());
                        self.phase.store(ServicePhase::Failed as u8, Ordering::Release);
                        Err(ServiceError::SetupFailed(err))
                    }
                    Err(other) => Err(other),
                }
            })
            .await?;

        self.phase.store(ServicePhase::Ready as u8, Ordering::Release);
        Ok(Arc::clone(index))
    }

    /// The built index, without waiting.
    pub fn index(&self) -> Result<&Arc<TreasureIndex>, ServiceError> {
        self.index.get().ok_or_else(|| match self.failure.get() {
            Some(err) => ServiceError::SetupFailed(err.clone()),
            None => {
                debug!("Query rejected: proof service is {:?}", self.phase());
                ServiceError::NotReady
            }
        })
    }

    /// Whether a tile holds a treasure. Does not need the tree.
    pub fn is_treasure_tile(&self, tile_id: TileId) -> bool {
        self.catalog.contains_tile(tile_id)
    }

    /// Keep only the tiles that hold treasures, preserving input order.
    pub fn treasure_tiles<I>(&self, tile_ids: I) -> Vec<TileId>
    where
        I: IntoIterator<Item = TileId>,
    {
        tile_ids
            .into_iter()
            .filter(|tile_id| self.is_treasure_tile(*tile_id))
            .collect()
    }

    /// Proof for a tile. `Ok(None)` means the tile holds no treasure.
    pub fn proof_for_tile(&self, tile_id: TileId) -> Result<Option<TreasureProof>, ServiceError> {
        Ok(self.index()?.proof_for_tile(tile_id))
    }

    /// Leaf hash for a tile. `Ok(None)` means the tile holds no treasure.
    pub fn leaf_for_tile(&self, tile_id: TileId) -> Result<Option<NodeHash>, ServiceError> {
        Ok(self.index()?.leaf_for_tile(tile_id))
    }

    /// Tree root for publication.
    pub fn root(&self) -> Result<NodeHash, ServiceError> {
        Ok(self.index()?.root())
    }

    /// Like [`proof_for_tile`](Self::proof_for_tile), but waits for Ready.
    pub async fn proof_for_tile_when_ready(
        &self,
        tile_id: TileId,
    ) -> Result<Option<TreasureProof>, ServiceError> {
        Ok(self.initialize().await?.proof_for_tile(tile_id))
    }

    /// Like [`root`](Self::root), but waits for Ready.
    pub async fn root_when_ready(&self) -> Result<NodeHash, ServiceError> {
        Ok(self.initialize().await?.root())
    }
}

fn build_index(
    catalog: Arc<TreasureCatalog>,
    settings: TreeSettings,
) -> Result<TreasureIndex, ServiceError> {
    info!("Building treasure tree: {} leaves, {}", catalog.len(), settings);

    match TreasureIndex::build(catalog, settings) {
        Ok(index) => {
            info!(
                "Treasure tree ready: depth {}, root {}",
                index.tree().depth(),
                to_hex(&index.root())
            );
            Ok(index)
        }
        Err(err) => {
            error!("Treasure tree build failed: {}", err);
            Err(ServiceError::SetupFailed(err))
        }
    }
}
