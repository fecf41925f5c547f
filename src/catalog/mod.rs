//! Treasure Catalog
//!
//! The closed, ordered list of rewarded tiles. Order is significant: a
//! record's position is its leaf index in the Merkle tree, so the same file
//! must produce the same order on every restart.

pub mod config;
pub mod record;
pub mod reference;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

use crate::core::grid::{CodecError, Coordinate, CoordinateCodec, TileId};

pub use config::{CatalogFile, ConfigError, RecordEntry, ServiceSettings};
pub use record::TreasureRecord;
pub use reference::{reference_catalog, REFERENCE_RECORDS};

/// Fatal catalog load errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No records at all; there would be no root to publish.
    #[error("catalog is empty")]
    Empty,

    /// A record lies outside the codec's grid.
    #[error("record {index}: {source}")]
    CoordinateOutOfRange {
        /// Position of the offending record.
        index: usize,
        /// Underlying range error.
        #[source]
        source: CodecError,
    },

    /// Two records share a coordinate, so the tile would bind two leaves.
    #[error("records {first} and {second} share coordinate ({}, {}, {})", .coordinate.x, .coordinate.y, .coordinate.z)]
    DuplicateCoordinate {
        /// The shared coordinate.
        coordinate: Coordinate,
        /// Earlier record index.
        first: usize,
        /// Later record index.
        second: usize,
    },
}

/// Immutable ordered catalog of treasure records.
#[derive(Clone, Debug)]
pub struct TreasureCatalog {
    codec: CoordinateCodec,
    records: Vec<TreasureRecord>,
    /// Tile id of each record, same order as `records`.
    tile_ids: Vec<TileId>,
    by_coordinate: BTreeMap<Coordinate, usize>,
}

impl TreasureCatalog {
    /// Validate and index an ordered list of records.
    ///
    /// Every coordinate must be inside the codec's grid and unique.
    pub fn new(codec: CoordinateCodec, records: Vec<TreasureRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut tile_ids = Vec::with_capacity(records.len());
        let mut by_coordinate = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let tile_id = codec
                .encode(record.coordinate)
                .map_err(|source| CatalogError::CoordinateOutOfRange { index, source })?;

            if let Some(first) = by_coordinate.insert(record.coordinate, index) {
                return Err(CatalogError::DuplicateCoordinate {
                    coordinate: record.coordinate,
                    first,
                    second: index,
                });
            }
            tile_ids.push(tile_id);
        }

        info!("Treasure catalog loaded: {} records, grid base {}", records.len(), codec.base());

        Ok(Self { codec, records, tile_ids, by_coordinate })
    }

    /// Catalog with no records, bypassing validation.
    #[cfg(test)]
    pub(crate) fn unvalidated_empty(codec: CoordinateCodec) -> Self {
        Self { codec, records: Vec::new(), tile_ids: Vec::new(), by_coordinate: BTreeMap::new() }
    }

    /// Codec the catalog was validated against.
    pub fn codec(&self) -> CoordinateCodec {
        self.codec
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in leaf order.
    pub fn records(&self) -> &[TreasureRecord] {
        &self.records
    }

    /// Records paired with their tile ids, in leaf order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &TreasureRecord)> {
        self.tile_ids.iter().copied().zip(self.records.iter())
    }

    /// Record at a leaf index.
    pub fn record_at(&self, index: usize) -> Option<&TreasureRecord> {
        self.records.get(index)
    }

    /// Tile id of the record at a leaf index.
    pub fn tile_id_at(&self, index: usize) -> Option<TileId> {
        self.tile_ids.get(index).copied()
    }

    /// Exact coordinate lookup.
    pub fn find_by_coordinate(&self, coordinate: Coordinate) -> Option<(usize, &TreasureRecord)> {
        let index = *self.by_coordinate.get(&coordinate)?;
        Some((index, &self.records[index]))
    }

    /// Decode a tile id and look it up.
    ///
    /// Ids outside the grid cannot be treasures and return `None`.
    pub fn find_by_tile(&self, tile_id: TileId) -> Option<(usize, &TreasureRecord)> {
        let coordinate = self.codec.decode(tile_id).ok()?;
        self.find_by_coordinate(coordinate)
    }

    /// Whether a tile id holds a treasure.
    pub fn contains_tile(&self, tile_id: TileId) -> bool {
        self.find_by_tile(tile_id).is_some()
    }
}
