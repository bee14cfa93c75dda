//! Error types for compositing stages.

use thiserror::Error;

/// Errors raised while masking, accumulating, filling or remapping.
#[derive(Error, Debug)]
pub enum CompositingError {
    /// Two planes that must share a shape do not.
    #[error("shape mismatch: expected {expected} pixels, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// A categorical code with no entry in the remap table. Indicates a
    /// data or lookup-table defect; never silently passed through.
    #[error("unmapped class code {code} in categorical raster")]
    UnmappedClassCode { code: i64 },

    /// The accumulator was consumed without folding any slot.
    #[error("composite requested before any time slot was folded")]
    EmptyAccumulator,

    /// The cloud classifier collaborator failed.
    #[error("cloud classifier failed: {0}")]
    Classifier(String),

    /// Underlying raster error.
    #[error(transparent)]
    Raster(#[from] raster::RasterError),
}

/// Result type for compositing operations.
pub type CompositingResult<T> = std::result::Result<T, CompositingError>;
