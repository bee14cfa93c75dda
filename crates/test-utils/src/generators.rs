//! Deterministic synthetic raster generators.
//!
//! Values follow simple closed-form patterns so tests can verify exactly
//! what every pipeline stage did to every pixel.

use mosaic_common::BoundingBox;
use raster::{DType, Raster, RasterProfile};

/// A tile raster: data bands at a constant value plus a trailing
/// availability band that is 1 everywhere except an optional masked row.
pub fn tile_with_mask(
    bbox: BoundingBox,
    width: usize,
    height: usize,
    value: f32,
    data_bands: usize,
    masked_row: Option<usize>,
    nodata: f64,
) -> Raster {
    let profile = RasterProfile::from_bbox(
        bbox,
        width,
        height,
        data_bands + 1,
        DType::Int16,
        Some(nodata),
    );

    let mut mask = vec![1.0f32; width * height];
    if let Some(row) = masked_row {
        for col in 0..width {
            mask[row * width + col] = 0.0;
        }
    }

    let mut bands: Vec<Vec<f32>> = (0..data_bands)
        .map(|_| vec![value; width * height])
        .collect();
    bands.push(mask);
    Raster::new(profile, bands).expect("generator shapes are consistent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_with_masked_row() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let tile = tile_with_mask(bbox, 4, 4, 7.0, 2, Some(1), -9999.0);

        assert_eq!(tile.band_count(), 3);
        let mask = tile.band(2);
        assert_eq!(&mask[4..8], &[0.0; 4]);
        assert_eq!(&mask[0..4], &[1.0; 4]);
    }
}
