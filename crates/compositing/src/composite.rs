//! Temporal compositing: per-pixel sum/count accumulation across time
//! slots and the final mean composite.

use raster::{DType, Raster, RasterProfile};
use tracing::debug;

use crate::error::{CompositingError, CompositingResult};

/// Running per-band, per-pixel sums and observation counts.
///
/// Lifecycle: created empty, folded once per slot, consumed exactly once by
/// [`Accumulator::finish`]. Accumulation is commutative, so the slot order
/// folded in does not affect the composite.
#[derive(Debug, Default)]
pub struct Accumulator {
    template: Option<RasterProfile>,
    sums: Vec<Vec<f64>>,
    counts: Vec<Vec<u32>>,
    slots: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots folded so far.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Fold one masked slot raster into the running totals.
    ///
    /// NoData pixels contribute 0 to both sum and count. The first folded
    /// raster fixes the shape and becomes the metadata template for the
    /// composite; later rasters must match it.
    pub fn fold(&mut self, slot: &Raster, nodata: f64) -> CompositingResult<()> {
        let sentinel = nodata as f32;
        let pixels = slot.profile().pixels();

        match &self.template {
            None => {
                self.template = Some(slot.profile().clone());
                self.sums = vec![vec![0.0; pixels]; slot.band_count()];
                self.counts = vec![vec![0; pixels]; slot.band_count()];
            }
            Some(template) => {
                if template.pixels() != pixels || self.sums.len() != slot.band_count() {
                    return Err(CompositingError::ShapeMismatch {
                        expected: template.pixels() * self.sums.len(),
                        got: pixels * slot.band_count(),
                    });
                }
            }
        }

        for (band_index, band) in slot.bands().iter().enumerate() {
            let sums = &mut self.sums[band_index];
            let counts = &mut self.counts[band_index];
            for (px, &value) in band.iter().enumerate() {
                if value != sentinel {
                    sums[px] += value as f64;
                    counts[px] += 1;
                }
            }
        }

        self.slots += 1;
        debug!(slots = self.slots, "slot folded into accumulator");
        Ok(())
    }

    /// Consume the accumulator and produce the mean composite.
    ///
    /// Pixels with zero observations across every slot become NoData. The
    /// result is cast back to the template's storage precision: integer
    /// dtypes truncate toward zero, matching integer storage semantics.
    pub fn finish(self, nodata: f64) -> CompositingResult<Raster> {
        let template = self.template.ok_or(CompositingError::EmptyAccumulator)?;
        let truncate = template.dtype != DType::Float32;

        let bands: Vec<Vec<f32>> = self
            .sums
            .into_iter()
            .zip(self.counts)
            .map(|(sums, counts)| {
                sums.into_iter()
                    .zip(counts)
                    .map(|(sum, count)| {
                        if count == 0 {
                            nodata as f32
                        } else {
                            let mean = (sum / count as f64) as f32;
                            if truncate {
                                mean.trunc()
                            } else {
                                mean
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        let mut composite = Raster::new(template, bands)?;
        composite.set_nodata(Some(nodata));
        Ok(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_common::BoundingBox;

    const ND: f64 = -9999.0;

    fn slot_raster(bands: Vec<Vec<f32>>) -> Raster {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let profile =
            RasterProfile::from_bbox(bbox, 2, 2, bands.len(), DType::Float32, Some(ND));
        Raster::new(profile, bands).unwrap()
    }

    #[test]
    fn test_single_slot_composite_is_identity() {
        let slot = slot_raster(vec![vec![1.0, -9999.0, 3.0, 4.0]]);

        let mut acc = Accumulator::new();
        acc.fold(&slot, ND).unwrap();
        let composite = acc.finish(ND).unwrap();

        assert_eq!(composite.band(0), slot.band(0));
    }

    #[test]
    fn test_mean_over_valid_observations_only() {
        let a = slot_raster(vec![vec![2.0, -9999.0, 6.0, -9999.0]]);
        let b = slot_raster(vec![vec![4.0, 10.0, -9999.0, -9999.0]]);

        let mut acc = Accumulator::new();
        acc.fold(&a, ND).unwrap();
        acc.fold(&b, ND).unwrap();
        let composite = acc.finish(ND).unwrap();

        // both valid -> mean, one valid -> that value, none -> NoData
        assert_eq!(composite.band(0), &[3.0, 10.0, 6.0, -9999.0]);
    }

    #[test]
    fn test_accumulation_is_commutative() {
        let slots = [
            slot_raster(vec![vec![2.0, -9999.0, 6.0, 1.0]]),
            slot_raster(vec![vec![4.0, 10.0, -9999.0, 5.0]]),
            slot_raster(vec![vec![6.0, 14.0, 9.0, -9999.0]]),
        ];

        let mut forward = Accumulator::new();
        for slot in &slots {
            forward.fold(slot, ND).unwrap();
        }
        let forward = forward.finish(ND).unwrap();

        let mut reversed = Accumulator::new();
        for slot in slots.iter().rev() {
            reversed.fold(slot, ND).unwrap();
        }
        let reversed = reversed.finish(ND).unwrap();

        let mut shuffled = Accumulator::new();
        for index in [1, 0, 2] {
            shuffled.fold(&slots[index], ND).unwrap();
        }
        let shuffled = shuffled.finish(ND).unwrap();

        assert_eq!(forward.band(0), reversed.band(0));
        assert_eq!(forward.band(0), shuffled.band(0));
    }

    #[test]
    fn test_integer_dtype_truncates() {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let profile = RasterProfile::from_bbox(bbox, 2, 2, 1, DType::Int16, Some(ND));
        let a = Raster::new(profile.clone(), vec![vec![1.0, 1.0, 1.0, 1.0]]).unwrap();
        let b = Raster::new(profile, vec![vec![2.0, 2.0, 2.0, 2.0]]).unwrap();

        let mut acc = Accumulator::new();
        acc.fold(&a, ND).unwrap();
        acc.fold(&b, ND).unwrap();
        let composite = acc.finish(ND).unwrap();

        // mean 1.5 truncates to 1 at Int16 storage precision
        assert_eq!(composite.band(0), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_accumulator_is_an_error() {
        let acc = Accumulator::new();
        assert!(matches!(
            acc.finish(ND),
            Err(CompositingError::EmptyAccumulator)
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let slot = slot_raster(vec![vec![1.0; 4]]);
        let other = slot_raster(vec![vec![1.0; 4], vec![2.0; 4]]);

        let mut acc = Accumulator::new();
        acc.fold(&slot, ND).unwrap();
        assert!(acc.fold(&other, ND).is_err());
    }
}
