//! Discrete-class remapping for categorical products.
//!
//! Raw source class codes are translated to a dense zero-based index via a
//! closed lookup table. Raw code 0 is the source's "no data in this
//! category" marker and maps to the discrete NoData sentinel; any nonzero
//! code missing from the table is a hard error.

use std::collections::BTreeMap;

use raster::Raster;

use crate::error::{CompositingError, CompositingResult};

/// Whether the original availability mask overrides gap-filled values at
/// the final output stage.
///
/// The evidence for which ordering the source product intended is
/// ambiguous, so both are supported. `OverrideFill` forces NoData onto
/// every originally-unavailable pixel after remapping; `KeepFill` lets the
/// gap-filled class survive there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskPrecedence {
    #[default]
    OverrideFill,
    KeepFill,
}

/// Closed raw-code to dense-index lookup table.
#[derive(Debug, Clone)]
pub struct RemapTable {
    entries: BTreeMap<i64, i64>,
}

impl RemapTable {
    pub fn new(pairs: &[(i64, i64)]) -> Self {
        Self {
            entries: pairs.iter().copied().collect(),
        }
    }

    /// ESA WorldCover-style classes: {10, 20, ..., 90, 95, 100} -> {0..=10}.
    pub fn worldcover() -> Self {
        Self::new(&[
            (10, 0),
            (20, 1),
            (30, 2),
            (40, 3),
            (50, 4),
            (60, 5),
            (70, 6),
            (80, 7),
            (90, 8),
            (95, 9),
            (100, 10),
        ])
    }

    /// Alternate land-cover taxonomy: nine classes {1..=9} -> {0..=8}.
    pub fn landcover_alt() -> Self {
        Self::new(&[
            (1, 0),
            (2, 1),
            (3, 2),
            (4, 3),
            (5, 4),
            (6, 5),
            (7, 6),
            (8, 7),
            (9, 8),
        ])
    }

    pub fn lookup(&self, code: i64) -> Option<i64> {
        self.entries.get(&code).copied()
    }

    /// The raw codes the table accepts, ascending.
    pub fn raw_codes(&self) -> Vec<i64> {
        self.entries.keys().copied().collect()
    }
}

/// Remap every band of a categorical raster.
///
/// `availability` is the provider mask detached before gap filling; with
/// [`MaskPrecedence::OverrideFill`] its zero pixels are forced to NoData
/// after the lookup.
pub fn remap(
    raster: Raster,
    table: &RemapTable,
    availability: &[f32],
    nodata: f64,
    precedence: MaskPrecedence,
) -> CompositingResult<Raster> {
    let pixels = raster.profile().pixels();
    if availability.len() != pixels {
        return Err(CompositingError::ShapeMismatch {
            expected: pixels,
            got: availability.len(),
        });
    }

    let sentinel = nodata as f32;
    let (profile, bands) = raster.into_parts();

    let mut remapped = Vec::with_capacity(bands.len());
    for band in bands {
        let mut out = Vec::with_capacity(band.len());
        for (px, &value) in band.iter().enumerate() {
            let mapped = if value == sentinel {
                sentinel
            } else {
                let code = value.round() as i64;
                if code == 0 {
                    sentinel
                } else {
                    table
                        .lookup(code)
                        .ok_or(CompositingError::UnmappedClassCode { code })?
                        as f32
                }
            };

            let forced = if precedence == MaskPrecedence::OverrideFill && availability[px] == 0.0 {
                sentinel
            } else {
                mapped
            };
            out.push(forced);
        }
        remapped.push(out);
    }

    let mut result = Raster::new(profile, remapped)?;
    result.set_nodata(Some(nodata));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_common::BoundingBox;
    use raster::{DType, RasterProfile};

    use crate::product::NO_DATA_DISCRETE;

    fn raster_1x5(values: [f32; 5]) -> Raster {
        let bbox = BoundingBox::new(0.0, 0.0, 5.0, 1.0);
        let profile = RasterProfile::from_bbox(bbox, 5, 1, 1, DType::UInt8, None);
        Raster::new(profile, vec![values.to_vec()]).unwrap()
    }

    #[test]
    fn test_worldcover_mapping() {
        let raster = raster_1x5([0.0, 10.0, 20.0, 95.0, 100.0]);
        let remapped = remap(
            raster,
            &RemapTable::worldcover(),
            &[1.0; 5],
            NO_DATA_DISCRETE,
            MaskPrecedence::OverrideFill,
        )
        .unwrap();

        assert_eq!(remapped.band(0), &[255.0, 0.0, 1.0, 9.0, 10.0]);
    }

    #[test]
    fn test_unmapped_code_is_fatal() {
        let raster = raster_1x5([10.0, 42.0, 20.0, 30.0, 40.0]);
        let result = remap(
            raster,
            &RemapTable::worldcover(),
            &[1.0; 5],
            NO_DATA_DISCRETE,
            MaskPrecedence::OverrideFill,
        );
        assert!(matches!(
            result,
            Err(CompositingError::UnmappedClassCode { code: 42 })
        ));
    }

    #[test]
    fn test_mask_overrides_filled_value() {
        let raster = raster_1x5([10.0, 10.0, 10.0, 10.0, 10.0]);
        let availability = [1.0, 0.0, 1.0, 0.0, 1.0];

        let overridden = remap(
            raster.clone(),
            &RemapTable::worldcover(),
            &availability,
            NO_DATA_DISCRETE,
            MaskPrecedence::OverrideFill,
        )
        .unwrap();
        assert_eq!(overridden.band(0), &[0.0, 255.0, 0.0, 255.0, 0.0]);

        let kept = remap(
            raster,
            &RemapTable::worldcover(),
            &availability,
            NO_DATA_DISCRETE,
            MaskPrecedence::KeepFill,
        )
        .unwrap();
        assert_eq!(kept.band(0), &[0.0; 5]);
    }

    #[test]
    fn test_full_table_maps_to_dense_indices() {
        let table = RemapTable::worldcover();
        let codes = table.raw_codes();
        assert_eq!(codes.len(), 11);
        for (expected, code) in codes.iter().enumerate() {
            assert_eq!(table.lookup(*code), Some(expected as i64));
        }
    }
}
