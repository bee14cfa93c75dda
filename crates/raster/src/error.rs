//! Error types for raster handling.

use thiserror::Error;

/// Errors raised while building or serializing rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Band plane length does not match the profile dimensions.
    #[error("band {band} has {got} pixels, profile expects {expected}")]
    BandShape {
        band: usize,
        got: usize,
        expected: usize,
    },

    /// A raster must carry at least one band.
    #[error("raster has no bands")]
    NoBands,

    /// File lacks the georeferencing tags the profile requires.
    #[error("missing georeferencing in {0}")]
    MissingGeoref(String),

    /// TIFF layout this reader does not handle.
    #[error("unsupported raster format: {0}")]
    Unsupported(String),

    /// Underlying TIFF codec error.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for raster operations.
pub type RasterResult<T> = std::result::Result<T, RasterError>;
