//! In-process stand-ins for the external collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use acquisition::{AcquisitionError, AcquisitionResult, MergeTool, TileRequest, TileSource};
use compositing::{CloudClassifier, CompositingResult};
use mosaic_common::{BoundingBox, TimeSlot};
use raster::{geotiff, DType, Raster, RasterProfile};

use crate::generators::tile_with_mask;

/// What the scripted source serves for one time slot.
#[derive(Debug, Clone, Copy)]
pub struct SlotScript {
    /// Constant value for every data band of every tile.
    pub value: f32,
    /// Row index whose availability mask is zeroed in every tile.
    pub masked_row: Option<usize>,
}

/// Tile source serving deterministic synthetic tiles per slot.
pub struct ScriptedTileSource {
    scripts: HashMap<TimeSlot, SlotScript>,
    tile_width: usize,
    tile_height: usize,
    data_bands: usize,
    nodata: f64,
}

impl ScriptedTileSource {
    pub fn new(
        scripts: HashMap<TimeSlot, SlotScript>,
        tile_width: usize,
        tile_height: usize,
        data_bands: usize,
        nodata: f64,
    ) -> Self {
        Self {
            scripts,
            tile_width,
            tile_height,
            data_bands,
            nodata,
        }
    }
}

#[async_trait]
impl TileSource for ScriptedTileSource {
    async fn fetch_tile(&self, request: &TileRequest, dest: &Path) -> AcquisitionResult<()> {
        let script = self.scripts.get(&request.slot).ok_or_else(|| {
            AcquisitionError::TileStatus {
                status: 404,
                body: format!("no script for slot {}", request.slot),
            }
        })?;

        let tile = tile_with_mask(
            request.bbox,
            self.tile_width,
            self.tile_height,
            script.value,
            self.data_bands,
            script.masked_row,
            self.nodata,
        );
        geotiff::write(dest, &tile)?;
        Ok(())
    }
}

/// Merge-tool stand-in that stitches tile files in memory.
///
/// Tiles are pasted into the target extent by their georeferencing, at the
/// pixel size of the first tile; uncovered pixels stay at the nodata value,
/// matching the external tool's contract.
pub struct StitchMerge;

#[async_trait]
impl MergeTool for StitchMerge {
    async fn merge(
        &self,
        tiles: &[PathBuf],
        target: &BoundingBox,
        nodata: f64,
        output: &Path,
    ) -> AcquisitionResult<()> {
        let first = geotiff::read(&tiles[0])?;
        let pixel_width = first.profile().transform.pixel_width;
        let pixel_height = first.profile().transform.pixel_height;
        let bands = first.band_count();

        let out_width = (target.width() / pixel_width).round() as usize;
        let out_height = (target.height() / pixel_height).round() as usize;
        let profile = RasterProfile::from_bbox(
            *target,
            out_width,
            out_height,
            bands,
            DType::Int16,
            Some(nodata),
        );
        let mut merged = Raster::filled(profile, nodata as f32);

        for path in tiles {
            let tile = geotiff::read(path)?;
            let t = tile.profile().transform;
            let col_off = ((t.origin_lon - target.min_lon) / pixel_width).round() as usize;
            let row_off = ((target.max_lat - t.origin_lat) / pixel_height).round() as usize;

            for band in 0..bands {
                let plane = merged.band_mut(band);
                let source = tile.band(band);
                for row in 0..tile.height() {
                    for col in 0..tile.width() {
                        let out_row = row_off + row;
                        let out_col = col_off + col;
                        if out_row < out_height && out_col < out_width {
                            plane[out_row * out_width + out_col] =
                                source[row * tile.width() + col];
                        }
                    }
                }
            }
        }

        geotiff::write(output, &merged)?;
        Ok(())
    }
}

/// Cloud classifier producing one constant probability everywhere.
pub struct ConstantCloudClassifier(pub f32);

#[async_trait]
impl CloudClassifier for ConstantCloudClassifier {
    async fn cloud_probability(
        &self,
        normalized_bands: &[Vec<f32>],
        _width: usize,
        _height: usize,
    ) -> CompositingResult<Vec<f32>> {
        Ok(vec![self.0; normalized_bands[0].len()])
    }
}
