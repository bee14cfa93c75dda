//! Acquisition of merged full-extent rasters from a tiled remote provider:
//! credentials, inter-request pacing, the process-API client, the external
//! merge tool wrapper and the bounded-retry acquirer.

pub mod acquirer;
pub mod client;
pub mod credentials;
pub mod error;
pub mod merge;
pub mod pacer;

pub use acquirer::{Acquirer, AcquirerConfig};
pub use client::{pixel_dimensions, ProcessApiClient, TileRequest, TileSource};
pub use credentials::{ProviderCredentials, CLIENT_ID_VAR, CLIENT_SECRET_VAR};
pub use error::{AcquisitionError, AcquisitionResult};
pub use merge::{GdalWarp, MergeTool};
pub use pacer::RequestPacer;
