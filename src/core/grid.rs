//! Tile Grid Encoding
//!
//! Bijective mapping between 3D grid coordinates and scalar tile ids.
//!
//! ## Encoding
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  tile_id = x + y * B + z * B^2        (0 <= x, y, z < B)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reference grid: B = 1024, ids in [0, 2^30)                 │
//! │  Logical x/y in [-5, 1019) shifted by +5; z unshifted       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding extracts digits from the most significant (z) down to x.
//! Settlement contracts compute the same mapping independently, so the
//! formula must not change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Radix of the reference grid.
pub const REFERENCE_BASE: u32 = 1024;

/// Smallest usable radix.
pub const MIN_BASE: u32 = 2;

/// Largest radix for which `B^3` still fits in a u64 tile id.
pub const MAX_BASE: u32 = 1 << 21;

/// Offset added to logical x and y to move them into `[0, B)`.
///
/// The reference grid is centred on the origin, so logical x/y range over
/// `[-REFERENCE_AXIS_OFFSET, B - REFERENCE_AXIS_OFFSET)`. z is the layer
/// index and is never shifted.
pub const REFERENCE_AXIS_OFFSET: u32 = 5;

/// Scalar tile identifier.
pub type TileId = u64;

/// Grid coordinate in non-negative (shifted) space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// Layer.
    pub z: u32,
}

impl Coordinate {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Coordinate in the origin-centred logical space used by level designers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalCoordinate {
    /// Column relative to the origin.
    pub x: i32,
    /// Row relative to the origin.
    pub y: i32,
    /// Layer.
    pub z: i32,
}

impl LogicalCoordinate {
    /// Create a new logical coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Shift into non-negative space with the given x/y offset.
    ///
    /// Fails if any component would be negative after shifting. The upper
    /// bound is checked by the codec, not here.
    pub fn shift(self, offset: u32) -> Result<Coordinate, CodecError> {
        let axis = |value: i32| -> Result<u32, CodecError> {
            let shifted = i64::from(value) + i64::from(offset);
            u32::try_from(shifted).map_err(|_| CodecError::NegativeAfterShift { logical: self })
        };
        let z =
            u32::try_from(self.z).map_err(|_| CodecError::NegativeAfterShift { logical: self })?;
        Ok(Coordinate::new(axis(self.x)?, axis(self.y)?, z))
    }
}

/// Grid encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Radix outside `MIN_BASE..=MAX_BASE`.
    #[error("grid base {} outside supported range {}..={}", .0, MIN_BASE, MAX_BASE)]
    InvalidBase(u32),

    /// A coordinate component is `>= base`.
    #[error("coordinate ({}, {}, {}) outside grid of base {base}", .coordinate.x, .coordinate.y, .coordinate.z)]
    CoordinateOutOfRange {
        /// Offending coordinate.
        coordinate: Coordinate,
        /// Grid base.
        base: u32,
    },

    /// Tile id is `>= base^3`.
    #[error("tile id {tile_id} outside grid of base {base}")]
    TileIdOutOfRange {
        /// Offending tile id.
        tile_id: TileId,
        /// Grid base.
        base: u32,
    },

    /// Logical coordinate still negative after the axis offset.
    #[error("logical coordinate ({}, {}, {}) is negative after shifting", .logical.x, .logical.y, .logical.z)]
    NegativeAfterShift {
        /// Offending logical coordinate.
        logical: LogicalCoordinate,
    },
}

/// Mixed-radix codec for a grid of side `base`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinateCodec {
    base: u32,
}

impl Default for CoordinateCodec {
    fn default() -> Self {
        Self { base: REFERENCE_BASE }
    }
}

impl CoordinateCodec {
    /// Create a codec for the given radix.
    pub fn new(base: u32) -> Result<Self, CodecError> {
        if !(MIN_BASE..=MAX_BASE).contains(&base) {
            return Err(CodecError::InvalidBase(base));
        }
        Ok(Self { base })
    }

    /// Grid radix.
    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of addressable tiles (`base^3`).
    #[inline]
    pub fn tile_count(&self) -> u64 {
        let b = u64::from(self.base);
        b * b * b
    }

    /// Check that every component is inside the grid.
    pub fn validate(&self, coordinate: Coordinate) -> Result<(), CodecError> {
        if coordinate.x >= self.base || coordinate.y >= self.base || coordinate.z >= self.base {
            return Err(CodecError::CoordinateOutOfRange { coordinate, base: self.base });
        }
        Ok(())
    }

    /// Encode a coordinate to its tile id.
    pub fn encode(&self, coordinate: Coordinate) -> Result<TileId, CodecError> {
        self.validate(coordinate)?;
        let b = u64::from(self.base);
        Ok(u64::from(coordinate.x) + u64::from(coordinate.y) * b + u64::from(coordinate.z) * b * b)
    }

    /// Decode a tile id back to its coordinate.
    pub fn decode(&self, tile_id: TileId) -> Result<Coordinate, CodecError> {
        if tile_id >= self.tile_count() {
            return Err(CodecError::TileIdOutOfRange { tile_id, base: self.base });
        }
        let b = u64::from(self.base);
        let plane = b * b;

        let z = tile_id / plane;
        let rest = tile_id % plane;
        let y = rest / b;
        let x = rest % b;

        // Each digit is < base <= MAX_BASE, so the narrowing is lossless
        Ok(Coordinate::new(x as u32, y as u32, z as u32))
    }

    /// Shift a logical coordinate by `offset` and encode it.
    pub fn encode_logical(
        &self,
        logical: LogicalCoordinate,
        offset: u32,
    ) -> Result<TileId, CodecError> {
        self.encode(logical.shift(offset)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
