//! Property-style tests for grid and slot planning.

use chrono::NaiveDate;
use mosaic_common::{split_interval, BoundingBox, TileGrid};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn grid_union_reconstructs_parent_extent() {
    let bbox = BoundingBox::new(46.00, -16.15, 46.05, -16.01);

    for (rows, cols) in [(1, 1), (2, 2), (3, 5), (10, 10), (7, 1)] {
        let grid = TileGrid::new(bbox, rows, cols).unwrap();
        let tiles = grid.tiles();
        assert_eq!(tiles.len(), rows * cols);

        let min_lon = tiles.iter().map(|t| t.min_lon).fold(f64::INFINITY, f64::min);
        let max_lon = tiles.iter().map(|t| t.max_lon).fold(f64::NEG_INFINITY, f64::max);
        let min_lat = tiles.iter().map(|t| t.min_lat).fold(f64::INFINITY, f64::min);
        let max_lat = tiles.iter().map(|t| t.max_lat).fold(f64::NEG_INFINITY, f64::max);

        assert_eq!(min_lon, bbox.min_lon);
        assert_eq!(max_lon, bbox.max_lon);
        assert_eq!(min_lat, bbox.min_lat);
        assert_eq!(max_lat, bbox.max_lat);
    }
}

#[test]
fn grid_neighbors_share_edges() {
    let bbox = BoundingBox::new(-3.5, 40.0, 1.5, 44.0);
    let grid = TileGrid::new(bbox, 3, 4).unwrap();
    let tiles = grid.tiles();

    for row in 0..3 {
        for col in 0..3 {
            let here = tiles[row * 4 + col];
            let east = tiles[row * 4 + col + 1];
            assert_eq!(here.max_lon, east.min_lon);
        }
    }
    for row in 0..2 {
        for col in 0..4 {
            let here = tiles[row * 4 + col];
            let south = tiles[(row + 1) * 4 + col];
            assert_eq!(here.min_lat, south.max_lat);
        }
    }
}

#[test]
fn slots_cover_interval_exactly() {
    let start = date(2020, 10, 5);
    let end = date(2021, 12, 7);

    for n in 1..=8 {
        let slots = split_interval(start, end, n).unwrap();
        assert_eq!(slots.len(), n);
        assert_eq!(slots[0].start, start);
        assert_eq!(slots[n - 1].end, end);
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }
}
