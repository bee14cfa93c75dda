//! Error types for tile acquisition and merging.

use thiserror::Error;

/// Errors raised while acquiring and merging tiles.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// A required credential environment value is absent.
    #[error("missing credential: {0} is not set")]
    MissingCredentials(String),

    /// Token request rejected by the provider.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A tile request came back with a non-success status.
    #[error("tile request failed with status {status}: {body}")]
    TileStatus { status: u16, body: String },

    /// Transport-level HTTP failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The external merge tool exited unsuccessfully.
    #[error("merge tool failed ({status}): {stderr}")]
    MergeFailed { status: String, stderr: String },

    /// Every attempt of the fetch-and-merge operation failed.
    ///
    /// This aborts the whole mosaic build; no partial composite survives.
    #[error("acquisition failed after {attempts} attempts, last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Underlying raster error while loading a merged file.
    #[error(transparent)]
    Raster(#[from] raster::RasterError),

    /// IO error on temp files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for acquisition operations.
pub type AcquisitionResult<T> = std::result::Result<T, AcquisitionError>;
