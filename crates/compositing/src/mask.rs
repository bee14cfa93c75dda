//! Per-slot validity masking.
//!
//! Combines the provider's availability mask with an optional
//! cloud-probability threshold, then writes the product's NoData sentinel
//! onto every invalid pixel so that downstream stages can treat
//! "pixel == NoData" and "pixel is invalid" as interchangeable.

use async_trait::async_trait;
use tracing::debug;

use raster::Raster;

use crate::error::{CompositingError, CompositingResult};
use crate::product::{ProductProfile, CLOUD_PROBABILITY_THRESHOLD, REFLECTANCE_SCALE};

/// External cloud-probability model.
///
/// Input is reflectance normalized to [0, 1]; output is one probability in
/// [0, 1] per pixel, row-major.
#[async_trait]
pub trait CloudClassifier: Send + Sync {
    async fn cloud_probability(
        &self,
        normalized_bands: &[Vec<f32>],
        width: usize,
        height: usize,
    ) -> CompositingResult<Vec<f32>>;
}

/// A masked slot raster plus the availability mask it was masked with.
///
/// The mask is kept because the discrete remapper needs the original
/// availability again after gap filling.
#[derive(Debug, Clone)]
pub struct MaskedRaster {
    pub raster: Raster,
    pub availability: Vec<f32>,
}

/// Produce the validity-masked raster for one slot's merged acquisition.
///
/// The trailing availability band is detached; for cloud-masked products
/// the classifier is consulted on scale-normalized reflectance (NoData
/// pixels zeroed first so they do not corrupt the normalization) and any
/// pixel above [`CLOUD_PROBABILITY_THRESHOLD`] is invalidated; finally the
/// availability mask is ANDed in and every invalid pixel is set to NoData.
pub async fn apply_validity(
    merged: Raster,
    product: &ProductProfile,
    classifier: Option<&dyn CloudClassifier>,
) -> CompositingResult<MaskedRaster> {
    let (mut data, availability) = merged.split_availability()?;
    let sentinel = product.nodata as f32;
    let pixels = data.profile().pixels();

    if product.cloud_mask {
        if let Some(classifier) = classifier {
            let normalized: Vec<Vec<f32>> = data
                .bands()
                .iter()
                .map(|band| {
                    band.iter()
                        .map(|&v| if v == sentinel { 0.0 } else { v } / REFLECTANCE_SCALE)
                        .collect()
                })
                .collect();

            let probability = classifier
                .cloud_probability(&normalized, data.width(), data.height())
                .await?;
            if probability.len() != pixels {
                return Err(CompositingError::ShapeMismatch {
                    expected: pixels,
                    got: probability.len(),
                });
            }

            let cloudy = probability
                .iter()
                .filter(|&&p| p > CLOUD_PROBABILITY_THRESHOLD)
                .count();
            debug!(cloudy_pixels = cloudy, total = pixels, "cloud mask applied");

            for band_index in 0..data.band_count() {
                let band = data.band_mut(band_index);
                for (value, &p) in band.iter_mut().zip(&probability) {
                    if p > CLOUD_PROBABILITY_THRESHOLD {
                        *value = sentinel;
                    }
                }
            }
        }
    }

    if availability.len() != pixels {
        return Err(CompositingError::ShapeMismatch {
            expected: pixels,
            got: availability.len(),
        });
    }
    for band_index in 0..data.band_count() {
        let band = data.band_mut(band_index);
        for (value, &covered) in band.iter_mut().zip(&availability) {
            if covered == 0.0 {
                *value = sentinel;
            }
        }
    }

    data.set_nodata(Some(product.nodata));
    data.set_dtype(product.dtype);

    Ok(MaskedRaster {
        raster: data,
        availability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_common::BoundingBox;
    use raster::{DType, RasterProfile};

    use crate::product::ProductKind;

    struct FixedClassifier(Vec<f32>);

    #[async_trait]
    impl CloudClassifier for FixedClassifier {
        async fn cloud_probability(
            &self,
            _normalized_bands: &[Vec<f32>],
            _width: usize,
            _height: usize,
        ) -> CompositingResult<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    /// Classifier that asserts the normalization contract.
    struct RangeCheckingClassifier;

    #[async_trait]
    impl CloudClassifier for RangeCheckingClassifier {
        async fn cloud_probability(
            &self,
            normalized_bands: &[Vec<f32>],
            _width: usize,
            _height: usize,
        ) -> CompositingResult<Vec<f32>> {
            for band in normalized_bands {
                assert!(band.iter().all(|v| (0.0..=1.0).contains(v)));
            }
            Ok(vec![0.0; normalized_bands[0].len()])
        }
    }

    fn merged_2x2(band: [f32; 4], mask: [f32; 4]) -> Raster {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let profile = RasterProfile::from_bbox(bbox, 2, 2, 2, DType::Int16, Some(-9999.0));
        Raster::new(profile, vec![band.to_vec(), mask.to_vec()]).unwrap()
    }

    #[tokio::test]
    async fn test_availability_mask_applied() {
        let merged = merged_2x2([100.0, 200.0, 300.0, 400.0], [1.0, 0.0, 1.0, 0.0]);
        let product = ProductKind::Radar.profile();

        let masked = apply_validity(merged, &product, None).await.unwrap();
        assert_eq!(masked.raster.band(0), &[100.0, -9999.0, 300.0, -9999.0]);
        assert_eq!(masked.availability, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_cloud_threshold_combined_with_availability() {
        let merged = merged_2x2([100.0, 200.0, 300.0, 400.0], [1.0, 1.0, 1.0, 0.0]);
        let product = ProductKind::Optical.profile();
        // pixel 1 above threshold, pixel 2 exactly at it (kept)
        let classifier = FixedClassifier(vec![0.0, 0.9, 0.4, 0.0]);

        let masked = apply_validity(merged, &product, Some(&classifier))
            .await
            .unwrap();
        assert_eq!(masked.raster.band(0), &[100.0, -9999.0, 300.0, -9999.0]);
    }

    #[tokio::test]
    async fn test_nodata_zeroed_before_normalization() {
        let merged = merged_2x2([-9999.0, 5000.0, 10000.0, 0.0], [1.0, 1.0, 1.0, 1.0]);
        let product = ProductKind::Optical.profile();

        let masked = apply_validity(merged, &product, Some(&RangeCheckingClassifier))
            .await
            .unwrap();
        // NoData pixel survives untouched (still invalid).
        assert_eq!(masked.raster.band(0)[0], -9999.0);
    }

    #[tokio::test]
    async fn test_non_optical_skips_classifier() {
        let merged = merged_2x2([1.0, 2.0, 3.0, 4.0], [1.0, 1.0, 1.0, 1.0]);
        let product = ProductKind::Radar.profile();
        // all-cloudy classifier must be ignored for radar
        let classifier = FixedClassifier(vec![1.0; 4]);

        let masked = apply_validity(merged, &product, Some(&classifier))
            .await
            .unwrap();
        assert_eq!(masked.raster.band(0), &[1.0, 2.0, 3.0, 4.0]);
    }
}
