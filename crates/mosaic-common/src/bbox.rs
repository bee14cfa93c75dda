//! Geographic bounding box type and operations.

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, MosaicResult};

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check world-range and ordering invariants.
    ///
    /// Longitudes must lie in [-180, 180], latitudes in [-90, 90], and min
    /// must be strictly below max on both axes.
    pub fn validate(&self) -> MosaicResult<()> {
        if !(-180.0..180.0).contains(&self.min_lon) {
            return Err(MosaicError::InvalidBounds(format!(
                "min_lon must be in [-180, 180), got {}",
                self.min_lon
            )));
        }
        if !(self.max_lon > -180.0 && self.max_lon <= 180.0) {
            return Err(MosaicError::InvalidBounds(format!(
                "max_lon must be in (-180, 180], got {}",
                self.max_lon
            )));
        }
        if !(-90.0..90.0).contains(&self.min_lat) {
            return Err(MosaicError::InvalidBounds(format!(
                "min_lat must be in [-90, 90), got {}",
                self.min_lat
            )));
        }
        if !(self.max_lat > -90.0 && self.max_lat <= 90.0) {
            return Err(MosaicError::InvalidBounds(format!(
                "max_lat must be in (-90, 90], got {}",
                self.max_lat
            )));
        }
        if self.min_lon >= self.max_lon {
            return Err(MosaicError::InvalidBounds(format!(
                "min_lon {} must be lower than max_lon {}",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat >= self.max_lat {
            return Err(MosaicError::InvalidBounds(format!(
                "min_lat {} must be lower than max_lat {}",
                self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bbox() {
        let bbox = BoundingBox::new(46.00, -16.15, 46.05, -16.01);
        assert!(bbox.validate().is_ok());
        assert!((bbox.width() - 0.05).abs() < 1e-12);
        assert!((bbox.height() - 0.14).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_corners_rejected() {
        let bbox = BoundingBox::new(46.05, -16.15, 46.00, -16.01);
        assert!(bbox.validate().is_err());

        let bbox = BoundingBox::new(46.00, -16.01, 46.05, -16.15);
        assert!(bbox.validate().is_err());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(BoundingBox::new(-181.0, 0.0, 10.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(0.0, -91.0, 10.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 0.0, 181.0, 1.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 91.0).validate().is_err());
    }
}
