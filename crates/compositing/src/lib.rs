//! Compositing stages for the geomosaic pipeline: per-slot validity
//! masking, temporal sum/count accumulation, nearest-valid gap filling and
//! discrete-class remapping, all parameterized by a [`ProductProfile`].

pub mod composite;
pub mod error;
pub mod gapfill;
pub mod mask;
pub mod product;
pub mod remap;

pub use composite::Accumulator;
pub use error::{CompositingError, CompositingResult};
pub use gapfill::fill_gaps;
pub use mask::{apply_validity, CloudClassifier, MaskedRaster};
pub use product::{
    ProductKind, ProductProfile, CLOUD_PROBABILITY_THRESHOLD, NO_DATA_CONTINUOUS,
    NO_DATA_DISCRETE, REFLECTANCE_SCALE,
};
pub use remap::{remap, MaskPrecedence, RemapTable};
