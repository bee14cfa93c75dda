//! Error types for region and interval planning.

use thiserror::Error;

/// Errors raised while planning a mosaic run.
///
/// All of these indicate invalid input parameters and are fatal at the
/// boundary, before any acquisition begins.
#[derive(Error, Debug)]
pub enum MosaicError {
    /// Bounding box corners are out of range or out of order.
    #[error("invalid bounding box: {0}")]
    InvalidBounds(String),

    /// Tile grid split counts must both be at least 1.
    #[error("invalid split shape: {rows} rows x {cols} columns (both must be >= 1)")]
    InvalidSplit { rows: usize, cols: usize },

    /// Date interval is empty or reversed.
    #[error("invalid time interval: start {start} is not before end {end}")]
    InvalidInterval { start: String, end: String },

    /// Number of temporal periods must be at least 1.
    #[error("invalid period count: {0} (must be >= 1)")]
    InvalidPeriods(usize),
}

/// Result type for planning operations.
pub type MosaicResult<T> = std::result::Result<T, MosaicError>;
