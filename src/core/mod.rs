//! Core deterministic primitives.
//!
//! Everything here must agree bit-for-bit with the settlement-side verifier:
//! the tile id encoding and the hash functions.

pub mod grid;
pub mod hash;

// Re-export core types
pub use grid::{
    CodecError, Coordinate, CoordinateCodec, LogicalCoordinate, TileId, REFERENCE_AXIS_OFFSET,
    REFERENCE_BASE,
};
pub use hash::{encode_word, to_hex, HashAlgorithm, NodeHash, ZERO_HASH};
