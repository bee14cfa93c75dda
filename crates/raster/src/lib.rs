//! In-memory raster model and georeferenced multi-band TIFF I/O.
//!
//! A [`Raster`] is a set of equally-shaped band planes plus the
//! [`RasterProfile`] describing their grid, georeferencing and encoding.
//! Acquired tiles carry one extra trailing band: the provider's 0/1
//! "data available" mask, detached with [`Raster::split_availability`].

pub mod error;
pub mod geotiff;
pub mod profile;

pub use error::{RasterError, RasterResult};
pub use profile::{DType, GeoTransform, RasterProfile};

/// A multi-band raster held in memory.
///
/// Band planes are row-major, top row first, `f32` regardless of the
/// profile's storage dtype.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    profile: RasterProfile,
    bands: Vec<Vec<f32>>,
}

impl Raster {
    /// Build a raster from band planes, checking every plane against the
    /// profile dimensions.
    pub fn new(profile: RasterProfile, bands: Vec<Vec<f32>>) -> RasterResult<Self> {
        if bands.is_empty() {
            return Err(RasterError::NoBands);
        }
        let expected = profile.pixels();
        for (i, band) in bands.iter().enumerate() {
            if band.len() != expected {
                return Err(RasterError::BandShape {
                    band: i,
                    got: band.len(),
                    expected,
                });
            }
        }
        let profile = profile.with_bands(bands.len());
        Ok(Self { profile, bands })
    }

    /// A raster with every pixel of every band set to `value`.
    pub fn filled(profile: RasterProfile, value: f32) -> Self {
        let bands = (0..profile.bands.max(1))
            .map(|_| vec![value; profile.pixels()])
            .collect();
        Self {
            profile: profile.with_bands(profile.bands.max(1)),
            bands,
        }
    }

    pub fn profile(&self) -> &RasterProfile {
        &self.profile
    }

    pub fn width(&self) -> usize {
        self.profile.width
    }

    pub fn height(&self) -> usize {
        self.profile.height
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// One band plane, row-major.
    pub fn band(&self, index: usize) -> &[f32] {
        &self.bands[index]
    }

    pub fn band_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.bands[index]
    }

    pub fn bands(&self) -> &[Vec<f32>] {
        &self.bands
    }

    /// Consume the raster, returning the band planes.
    pub fn into_bands(self) -> Vec<Vec<f32>> {
        self.bands
    }

    /// Consume the raster, returning profile and band planes.
    pub fn into_parts(self) -> (RasterProfile, Vec<Vec<f32>>) {
        (self.profile, self.bands)
    }

    /// Detach the trailing availability-mask band.
    ///
    /// Returns the raster without it and the mask plane (nonzero = covered
    /// at the source). Fails if there is no data band left.
    pub fn split_availability(mut self) -> RasterResult<(Raster, Vec<f32>)> {
        if self.bands.len() < 2 {
            return Err(RasterError::NoBands);
        }
        let mask = self.bands.pop().unwrap_or_default();
        self.profile.bands = self.bands.len();
        Ok((self, mask))
    }

    /// Replace every band plane, keeping the profile (band count adjusted).
    pub fn with_bands(self, bands: Vec<Vec<f32>>) -> RasterResult<Self> {
        Self::new(self.profile, bands)
    }

    /// Record the nodata sentinel in the profile.
    pub fn set_nodata(&mut self, nodata: Option<f64>) {
        self.profile.nodata = nodata;
    }

    /// Record the storage dtype in the profile.
    pub fn set_dtype(&mut self, dtype: DType) {
        self.profile.dtype = dtype;
    }
}
