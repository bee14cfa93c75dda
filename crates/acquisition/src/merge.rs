//! External merge/warp tool contract and the gdalwarp wrapper.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use mosaic_common::BoundingBox;

use crate::error::{AcquisitionError, AcquisitionResult};

/// The external raster merge tool, at its interface.
///
/// Stitches georeferenced tile files into one raster aligned to the target
/// bounding box, filling uncovered area with the nodata value.
#[async_trait]
pub trait MergeTool: Send + Sync {
    async fn merge(
        &self,
        tiles: &[PathBuf],
        target: &BoundingBox,
        nodata: f64,
        output: &Path,
    ) -> AcquisitionResult<()>;
}

/// `gdalwarp` invocation. The tile list is passed through an `--optfile`
/// so the argument list stays short for large grids.
#[derive(Debug, Clone)]
pub struct GdalWarp {
    executable: String,
}

impl Default for GdalWarp {
    fn default() -> Self {
        Self {
            executable: "gdalwarp".to_string(),
        }
    }
}

impl GdalWarp {
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

/// Arguments for one warp run, minus the `--optfile` tile list.
fn warp_args(target: &BoundingBox, nodata: f64, output: &Path) -> Vec<String> {
    vec![
        "-overwrite".to_string(),
        "-s_srs".to_string(),
        "EPSG:4326".to_string(),
        "-t_srs".to_string(),
        "EPSG:4326".to_string(),
        "-dstnodata".to_string(),
        format!("{nodata}"),
        "-te".to_string(),
        format!("{}", target.min_lon),
        format!("{}", target.min_lat),
        format!("{}", target.max_lon),
        format!("{}", target.max_lat),
        output.display().to_string(),
    ]
}

#[async_trait]
impl MergeTool for GdalWarp {
    async fn merge(
        &self,
        tiles: &[PathBuf],
        target: &BoundingBox,
        nodata: f64,
        output: &Path,
    ) -> AcquisitionResult<()> {
        // gdalwarp reads the input list from an option file.
        let list = tempfile::NamedTempFile::new()?;
        {
            let mut file = tokio::fs::File::create(list.path()).await?;
            for tile in tiles {
                file.write_all(tile.display().to_string().as_bytes()).await?;
                file.write_all(b"\n").await?;
            }
            file.flush().await?;
        }

        let mut args = warp_args(target, nodata, output);
        args.insert(args.len() - 1, "--optfile".to_string());
        args.insert(args.len() - 1, list.path().display().to_string());

        debug!(tool = %self.executable, tiles = tiles.len(), "running merge tool");
        let result = tokio::process::Command::new(&self.executable)
            .args(&args)
            .output()
            .await?;

        if !result.status.success() {
            return Err(AcquisitionError::MergeFailed {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }
        Ok(())
    }
}
