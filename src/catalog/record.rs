//! Treasure records.

use serde::{Deserialize, Serialize};

use crate::core::grid::Coordinate;

/// One rewarded tile.
///
/// The coordinate is in shifted (non-negative) space. `nonce` and `prize`
/// are bound into the leaf commitment together with the tile id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureRecord {
    /// Shifted grid coordinate.
    pub coordinate: Coordinate,
    /// Per-record salt, hides the catalog from leaf-guessing.
    pub nonce: u64,
    /// Payout amount.
    pub prize: u64,
}

impl TreasureRecord {
    /// Create a new record.
    pub const fn new(coordinate: Coordinate, nonce: u64, prize: u64) -> Self {
        Self { coordinate, nonce, prize }
    }
}
