//! Reference catalog.
//!
//! Test locations for the reference grid, in logical (origin-centred)
//! coordinates. NOT for production rewards: the nonces are public.

use crate::core::grid::{CoordinateCodec, LogicalCoordinate, REFERENCE_AXIS_OFFSET};

use super::{CatalogError, TreasureCatalog, TreasureRecord};

/// `(x, y, z, nonce, prize)` in logical coordinates, leaf order.
pub const REFERENCE_RECORDS: [(i32, i32, i32, u64, u64); 25] = [
    // Layer 0
    (4, 0, 0, 2748127, 25),
    (-1, 3, 0, 4928354, 25),
    (5, -4, 0, 8573629, 25),
    (-3, -1, 0, 1387241, 25),
    (2, 4, 0, 9857316, 25),
    (-5, -3, 0, 2649187, 25),
    (0, 1, 0, 7124839, 25),
    // Layer 1
    (1, 2, 1, 7841623, 25),
    (-4, 5, 1, 9342765, 25),
    (-2, 1, 1, 1983742, 25),
    (4, -3, 1, 9328471, 25),
    (5, 1, 1, 7812345, 25),
    (0, 4, 1, 7623918, 25),
    // Layer 2
    (-3, 2, 2, 2746395, 25),
    (1, -5, 2, 9174823, 25),
    (3, -1, 2, 6384729, 25),
    (-1, 3, 2, 9374621, 25),
    (4, 1, 2, 1759328, 25),
    // Layer 3
    (0, -3, 3, 7328946, 25),
    (2, 5, 3, 9182736, 25),
    (-5, -4, 3, 6847312, 25),
    (-2, 0, 3, 4819263, 25),
    // Layer 4
    (1, -2, 4, 8473621, 25),
    (-4, -1, 4, 2648123, 25),
    (3, 2, 4, 1392847, 25),
];

/// Build the reference catalog on the reference grid.
pub fn reference_catalog() -> Result<TreasureCatalog, CatalogError> {
    let records = REFERENCE_RECORDS
        .iter()
        .enumerate()
        .map(|(index, &(x, y, z, nonce, prize))| {
            LogicalCoordinate::new(x, y, z)
                .shift(REFERENCE_AXIS_OFFSET)
                .map(|coordinate| TreasureRecord::new(coordinate, nonce, prize))
                .map_err(|source| CatalogError::CoordinateOutOfRange { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    TreasureCatalog::new(CoordinateCodec::default(), records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::Coordinate;

    #[test]
    fn test_reference_catalog_loads() {
        let catalog = reference_catalog().unwrap();
        assert_eq!(catalog.len(), 25);
        // First three records are the shifted form of the first three entries
        assert_eq!(catalog.record_at(0).unwrap().coordinate, Coordinate::new(9, 5, 0));
        assert_eq!(catalog.record_at(1).unwrap().coordinate, Coordinate::new(4, 8, 0));
        assert_eq!(catalog.record_at(2).unwrap().coordinate, Coordinate::new(10, 1, 0));
    }

    #[test]
    fn test_same_xy_on_different_layers() {
        // (-1, 3) appears on layers 0 and 2; only z tells them apart
        let catalog = reference_catalog().unwrap();
        let (a, _) = catalog.find_by_coordinate(Coordinate::new(4, 8, 0)).unwrap();
        let (b, _) = catalog.find_by_coordinate(Coordinate::new(4, 8, 2)).unwrap();
        assert_eq!((a, b), (1, 16));
    }
}
