//! Raster profiles: the georeferencing and encoding metadata that travels
//! with every raster through the pipeline.

use mosaic_common::BoundingBox;
use serde::{Deserialize, Serialize};

/// Storage precision of a raster product.
///
/// In-memory computation is always `f32`; the dtype records the precision
/// the product is stored and delivered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    UInt8,
    Int16,
    Float32,
}

/// Affine georeferencing for a north-up raster.
///
/// `pixel_width` and `pixel_height` are positive degrees per pixel; rows run
/// from `origin_lat` southwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_lon: f64,
    pub origin_lat: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

/// Metadata describing a raster's grid, georeferencing and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterProfile {
    pub width: usize,
    pub height: usize,
    pub bands: usize,
    pub crs: String,
    pub transform: GeoTransform,
    pub dtype: DType,
    pub nodata: Option<f64>,
}

impl RasterProfile {
    /// Profile for a raster covering `bbox` with the given pixel grid.
    pub fn from_bbox(
        bbox: BoundingBox,
        width: usize,
        height: usize,
        bands: usize,
        dtype: DType,
        nodata: Option<f64>,
    ) -> Self {
        Self {
            width,
            height,
            bands,
            crs: "EPSG:4326".to_string(),
            transform: GeoTransform {
                origin_lon: bbox.min_lon,
                origin_lat: bbox.max_lat,
                pixel_width: bbox.width() / width as f64,
                pixel_height: bbox.height() / height as f64,
            },
            dtype,
            nodata,
        }
    }

    /// Number of pixels in one band plane.
    pub fn pixels(&self) -> usize {
        self.width * self.height
    }

    /// The geographic extent this profile covers.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(
            self.transform.origin_lon,
            self.transform.origin_lat - self.transform.pixel_height * self.height as f64,
            self.transform.origin_lon + self.transform.pixel_width * self.width as f64,
            self.transform.origin_lat,
        )
    }

    /// A copy of this profile with a different band count.
    pub fn with_bands(&self, bands: usize) -> Self {
        Self {
            bands,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bbox_roundtrip() {
        let bbox = BoundingBox::new(46.00, -16.15, 46.05, -16.01);
        let profile = RasterProfile::from_bbox(bbox, 50, 140, 3, DType::Int16, Some(-9999.0));

        assert_eq!(profile.pixels(), 7000);
        let back = profile.bbox();
        assert!((back.min_lon - bbox.min_lon).abs() < 1e-9);
        assert!((back.max_lat - bbox.max_lat).abs() < 1e-9);
        assert!((back.max_lon - bbox.max_lon).abs() < 1e-9);
        assert!((back.min_lat - bbox.min_lat).abs() < 1e-9);
    }

    #[test]
    fn test_with_bands() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let profile = RasterProfile::from_bbox(bbox, 10, 10, 5, DType::Float32, None);
        let trimmed = profile.with_bands(4);
        assert_eq!(trimmed.bands, 4);
        assert_eq!(trimmed.width, profile.width);
    }
}
