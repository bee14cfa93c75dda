//! Bounded-retry acquisition of one full-extent merged raster.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use mosaic_common::{TileGrid, TimeSlot};
use raster::{geotiff, Raster};

use crate::client::{TileRequest, TileSource};
use crate::error::{AcquisitionError, AcquisitionResult};
use crate::merge::MergeTool;
use crate::pacer::RequestPacer;

/// Settings for one acquisition campaign.
#[derive(Debug, Clone)]
pub struct AcquirerConfig {
    /// Maximum attempts of the whole fetch-and-merge operation.
    pub max_retry: u32,
    /// Pause enforced between successive tile requests.
    pub pacer: RequestPacer,
    /// Processing recipe identifier for the product.
    pub recipe: String,
    /// Ground resolution in meters per pixel.
    pub resolution: f64,
    /// NoData value the merge tool writes into uncovered pixels.
    pub nodata: f64,
}

/// Obtains one merged raster per (grid, slot), tolerating transient
/// provider failures.
///
/// Tile requests within an attempt are issued strictly one at a time, with
/// the pacer's pause between them, to stay inside the remote throttling
/// policy. Per-tile files live in a scratch directory owned by the attempt
/// and are removed once the merged raster is loaded.
pub struct Acquirer {
    source: Arc<dyn TileSource>,
    merge: Arc<dyn MergeTool>,
    config: AcquirerConfig,
}

impl Acquirer {
    pub fn new(
        source: Arc<dyn TileSource>,
        merge: Arc<dyn MergeTool>,
        config: AcquirerConfig,
    ) -> Self {
        Self {
            source,
            merge,
            config,
        }
    }

    /// Fetch every tile of the grid for `slot` and merge them into one
    /// raster covering the grid's bounding box.
    ///
    /// Each failed attempt is logged and retried immediately, up to
    /// `max_retry` attempts; exhaustion is fatal for the whole build.
    pub async fn acquire(&self, grid: &TileGrid, slot: TimeSlot) -> AcquisitionResult<Raster> {
        let mut last_error = String::new();

        for attempt in 1..=self.config.max_retry.max(1) {
            match self.attempt(grid, slot).await {
                Ok(raster) => {
                    info!(
                        slot = %slot,
                        tiles = grid.len(),
                        attempt,
                        "acquisition complete"
                    );
                    return Ok(raster);
                }
                Err(error) => {
                    warn!(
                        attempt,
                        max_retry = self.config.max_retry,
                        error = %error,
                        "acquisition attempt failed"
                    );
                    last_error = error.to_string();
                }
            }
        }

        Err(AcquisitionError::RetriesExhausted {
            attempts: self.config.max_retry.max(1),
            last_error,
        })
    }

    async fn attempt(&self, grid: &TileGrid, slot: TimeSlot) -> AcquisitionResult<Raster> {
        let scratch = tempfile::tempdir()?;
        let mut tile_paths: Vec<PathBuf> = Vec::with_capacity(grid.len());

        for (index, tile_bbox) in grid.tiles().into_iter().enumerate() {
            if index > 0 {
                self.config.pacer.pause().await;
            }
            let request = TileRequest {
                bbox: tile_bbox,
                slot,
                recipe: self.config.recipe.clone(),
                resolution: self.config.resolution,
            };
            let path = scratch.path().join(format!("tile-{}.tif", Uuid::new_v4()));
            self.source.fetch_tile(&request, &path).await?;
            tile_paths.push(path);
        }

        let merged_path = scratch.path().join("merged.tif");
        self.merge
            .merge(&tile_paths, &grid.bbox(), self.config.nodata, &merged_path)
            .await?;

        // Scratch dir (tile files included) is dropped on return.
        Ok(geotiff::read(&merged_path)?)
    }
}
