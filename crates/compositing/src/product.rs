//! Product profiles: the capability set that parameterizes one pipeline
//! over every product family instead of duplicating it per product.

use raster::DType;
use serde::{Deserialize, Serialize};

use crate::remap::RemapTable;

/// NoData sentinel for continuous products. Out of range for any real
/// reflectance, backscatter or elevation observation.
pub const NO_DATA_CONTINUOUS: f64 = -9999.0;

/// NoData sentinel for discrete/categorical products. Class codes are all
/// at or below 100, so 255 is never a real observation.
pub const NO_DATA_DISCRETE: f64 = 255.0;

/// Pixels whose cloud probability exceeds this are invalid.
pub const CLOUD_PROBABILITY_THRESHOLD: f32 = 0.4;

/// Divisor normalizing raw optical reflectance counts into [0, 1] before
/// cloud classification.
pub const REFLECTANCE_SCALE: f32 = 10000.0;

/// The product families this pipeline can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    /// Multi-temporal optical reflectance, cloud-masked.
    Optical,
    /// Multi-temporal radar backscatter; clouds are transparent to radar.
    Radar,
    /// Static elevation model snapshot.
    Elevation,
    /// Static categorical land cover, 11-class table.
    LandCover,
    /// Static categorical land cover, alternate 9-class table.
    LandCoverAlt,
}

/// Everything the pipeline needs to know about one product family.
#[derive(Debug, Clone)]
pub struct ProductProfile {
    /// Short product name, used in logs and temp file names.
    pub name: &'static str,
    /// Processing recipe identifier sent to the acquisition service.
    pub recipe: &'static str,
    /// Ground resolution in meters per pixel.
    pub resolution: f64,
    /// Storage precision of the delivered product.
    pub dtype: DType,
    /// NoData sentinel for this product family.
    pub nodata: f64,
    /// Fill value for a band with zero valid pixels.
    pub default_fill: f32,
    /// Whether the product is composited over time slots.
    pub temporal: bool,
    /// Whether optical cloud masking applies.
    pub cloud_mask: bool,
    /// Lookup table for categorical products.
    pub remap: Option<RemapTable>,
}

impl ProductKind {
    pub fn profile(self) -> ProductProfile {
        match self {
            ProductKind::Optical => ProductProfile {
                name: "optical",
                recipe: "optical-l1c",
                resolution: 10.0,
                dtype: DType::Int16,
                nodata: NO_DATA_CONTINUOUS,
                default_fill: 0.0,
                temporal: true,
                cloud_mask: true,
                remap: None,
            },
            ProductKind::Radar => ProductProfile {
                name: "radar",
                recipe: "radar-grd",
                resolution: 10.0,
                dtype: DType::Float32,
                nodata: NO_DATA_CONTINUOUS,
                default_fill: 0.0,
                temporal: true,
                cloud_mask: false,
                remap: None,
            },
            ProductKind::Elevation => ProductProfile {
                name: "elevation",
                recipe: "dem-30",
                resolution: 10.0,
                dtype: DType::Int16,
                nodata: NO_DATA_CONTINUOUS,
                // sea level
                default_fill: 0.0,
                temporal: false,
                cloud_mask: false,
                remap: None,
            },
            ProductKind::LandCover => ProductProfile {
                name: "landcover",
                recipe: "worldcover",
                resolution: 10.0,
                dtype: DType::UInt8,
                nodata: NO_DATA_DISCRETE,
                // open water class
                default_fill: 80.0,
                temporal: false,
                cloud_mask: false,
                remap: Some(RemapTable::worldcover()),
            },
            ProductKind::LandCoverAlt => ProductProfile {
                name: "landcover-alt",
                recipe: "landcover-alt",
                resolution: 10.0,
                dtype: DType::UInt8,
                nodata: NO_DATA_DISCRETE,
                // water class
                default_fill: 1.0,
                temporal: false,
                cloud_mask: false,
                remap: Some(RemapTable::landcover_alt()),
            },
        }
    }
}
