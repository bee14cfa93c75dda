//! Tile grid planning: deterministic decomposition of a bounding box into a
//! row-major grid of sub-boxes, the unit of acquisition.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{MosaicError, MosaicResult};

/// A rows x columns decomposition of a bounding box.
///
/// Tiles are ordered row-major, north-to-south rows and west-to-east
/// columns, so the tile-to-file mapping downstream is reproducible and
/// retry-safe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    bbox: BoundingBox,
    rows: usize,
    cols: usize,
}

impl TileGrid {
    /// Create a grid plan. Both split counts must be at least 1.
    pub fn new(bbox: BoundingBox, rows: usize, cols: usize) -> MosaicResult<Self> {
        bbox.validate()?;
        if rows < 1 || cols < 1 {
            return Err(MosaicError::InvalidSplit { rows, cols });
        }
        Ok(Self { bbox, rows, cols })
    }

    /// The parent bounding box.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// The sub-boxes in row-major order.
    ///
    /// Edges are computed by linear subdivision; shared edges between
    /// neighboring tiles are bit-identical, and the outer edges are exactly
    /// the parent's corners, so the union reconstructs the parent extent.
    pub fn tiles(&self) -> Vec<BoundingBox> {
        let lon_edges = edges(self.bbox.min_lon, self.bbox.max_lon, self.cols);
        let lat_edges = edges(self.bbox.min_lat, self.bbox.max_lat, self.rows);

        let mut tiles = Vec::with_capacity(self.len());
        for row in 0..self.rows {
            // row 0 is the northernmost strip
            let max_lat = lat_edges[self.rows - row];
            let min_lat = lat_edges[self.rows - row - 1];
            for col in 0..self.cols {
                tiles.push(BoundingBox::new(
                    lon_edges[col],
                    min_lat,
                    lon_edges[col + 1],
                    max_lat,
                ));
            }
        }
        tiles
    }
}

/// n+1 monotonically increasing edge coordinates from min to max.
///
/// The first and last edges are the exact input bounds.
fn edges(min: f64, max: f64, n: usize) -> Vec<f64> {
    let span = max - min;
    let mut edges: Vec<f64> = (0..=n).map(|i| min + span * i as f64 / n as f64).collect();
    edges[0] = min;
    edges[n] = max;
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_grid_is_parent() {
        let bbox = BoundingBox::new(46.00, -16.15, 46.05, -16.01);
        let grid = TileGrid::new(bbox, 1, 1).unwrap();
        assert_eq!(grid.tiles(), vec![bbox]);
    }

    #[test]
    fn test_row_major_order() {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let grid = TileGrid::new(bbox, 2, 2).unwrap();
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), 4);

        // First tile is the north-west corner, second its eastern neighbor.
        assert_eq!(tiles[0].min_lon, 0.0);
        assert_eq!(tiles[0].max_lat, 2.0);
        assert_eq!(tiles[1].min_lon, 1.0);
        assert_eq!(tiles[1].max_lat, 2.0);
        // Second row is the southern strip.
        assert_eq!(tiles[2].min_lat, 0.0);
        assert_eq!(tiles[2].min_lon, 0.0);
        assert_eq!(tiles[3].min_lon, 1.0);
    }

    #[test]
    fn test_zero_split_rejected() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(TileGrid::new(bbox, 0, 3).is_err());
        assert!(TileGrid::new(bbox, 3, 0).is_err());
    }
}
