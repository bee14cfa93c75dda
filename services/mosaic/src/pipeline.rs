//! Product pipeline: acquisition, validity masking, temporal compositing,
//! gap filling and categorical remapping, ending in one output file.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use acquisition::Acquirer;
use compositing::{
    apply_validity, fill_gaps, remap, Accumulator, CloudClassifier, MaskPrecedence, ProductProfile,
};
use mosaic_common::{TileGrid, TimeSlot};
use raster::{geotiff, Raster};

/// One configured mosaic build.
pub struct Pipeline {
    acquirer: Acquirer,
    product: ProductProfile,
    classifier: Option<Arc<dyn CloudClassifier>>,
    precedence: MaskPrecedence,
}

impl Pipeline {
    pub fn new(
        acquirer: Acquirer,
        product: ProductProfile,
        classifier: Option<Arc<dyn CloudClassifier>>,
    ) -> Self {
        Self {
            acquirer,
            product,
            classifier,
            precedence: MaskPrecedence::default(),
        }
    }

    pub fn with_precedence(mut self, precedence: MaskPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Build the product over `grid` and `slots` and write it to `output`.
    ///
    /// Nothing is written until every stage has succeeded, so a failed build
    /// never leaves a partial output file behind.
    pub async fn run(&self, grid: &TileGrid, slots: &[TimeSlot], output: &Path) -> Result<()> {
        let raster = if self.product.temporal {
            self.build_temporal(grid, slots).await?
        } else {
            self.build_static(grid, slots).await?
        };

        geotiff::write(output, &raster)
            .with_context(|| format!("writing output to {}", output.display()))?;
        info!(
            product = self.product.name,
            output = %output.display(),
            "mosaic written"
        );
        Ok(())
    }

    /// Per-slot acquisition folded into a mean composite, then gap-filled.
    async fn build_temporal(&self, grid: &TileGrid, slots: &[TimeSlot]) -> Result<Raster> {
        let classifier = self.classifier.as_deref();
        let mut accumulator = Accumulator::new();

        for (index, slot) in slots.iter().enumerate() {
            info!(
                product = self.product.name,
                slot = %slot,
                index = index + 1,
                total = slots.len(),
                "building slot"
            );
            let merged = self
                .acquirer
                .acquire(grid, *slot)
                .await
                .with_context(|| format!("acquiring slot {slot}"))?;
            let masked = apply_validity(merged, &self.product, classifier)
                .await
                .with_context(|| format!("masking slot {slot}"))?;
            accumulator.fold(&masked.raster, self.product.nodata)?;
        }

        let composite = accumulator.finish(self.product.nodata)?;
        // Multi-slot coverage varies per slot, so gaps are wherever the
        // composite itself reports NoData.
        let filled = fill_gaps(
            composite,
            None,
            self.product.nodata,
            self.product.default_fill,
        )?;
        Ok(filled)
    }

    /// Single acquisition over the whole interval, gap-filled and, for
    /// categorical products, remapped to dense class indices.
    async fn build_static(&self, grid: &TileGrid, slots: &[TimeSlot]) -> Result<Raster> {
        let slot = *slots.first().context("no time slot for static product")?;

        let merged = self
            .acquirer
            .acquire(grid, slot)
            .await
            .with_context(|| format!("acquiring interval {slot}"))?;
        let masked = apply_validity(merged, &self.product, None)
            .await
            .context("masking acquisition")?;

        let filled = fill_gaps(
            masked.raster,
            Some(&masked.availability),
            self.product.nodata,
            self.product.default_fill,
        )?;

        match &self.product.remap {
            Some(table) => Ok(remap(
                filled,
                table,
                &masked.availability,
                self.product.nodata,
                self.precedence,
            )?),
            None => Ok(filled),
        }
    }
}
