//! Gap filling: nearest-valid-pixel spatial substitution.
//!
//! Every remaining invalid pixel takes the value of the nearest valid pixel
//! under Euclidean distance in pixel-index space. Values are copied, never
//! blended. A band with no invalid pixels passes through unchanged; a band
//! with no valid pixels is filled with the product default, since there is
//! nothing to interpolate from.

use rayon::prelude::*;
use tracing::debug;

use raster::Raster;

use crate::error::{CompositingError, CompositingResult};

/// Fill every invalid pixel of every band, independently per band.
///
/// A pixel is invalid when it equals `nodata` or, if `availability` is
/// given, when the provider mask is zero there. Exact-equality tie breaks
/// between equidistant sources follow the internal scan order; callers must
/// not depend on a particular tie-break.
pub fn fill_gaps(
    raster: Raster,
    availability: Option<&[f32]>,
    nodata: f64,
    default_fill: f32,
) -> CompositingResult<Raster> {
    let pixels = raster.profile().pixels();
    if let Some(mask) = availability {
        if mask.len() != pixels {
            return Err(CompositingError::ShapeMismatch {
                expected: pixels,
                got: mask.len(),
            });
        }
    }

    let width = raster.width();
    let height = raster.height();
    let sentinel = nodata as f32;
    let (profile, bands) = raster.into_parts();

    let filled: Vec<Vec<f32>> = bands
        .into_par_iter()
        .map(|band| fill_band(band, availability, sentinel, default_fill, width, height))
        .collect();

    Ok(Raster::new(profile, filled)?)
}

fn fill_band(
    band: Vec<f32>,
    availability: Option<&[f32]>,
    sentinel: f32,
    default_fill: f32,
    width: usize,
    height: usize,
) -> Vec<f32> {
    let valid: Vec<bool> = band
        .iter()
        .enumerate()
        .map(|(px, &v)| v != sentinel && availability.map_or(true, |m| m[px] != 0.0))
        .collect();

    let invalid_count = valid.iter().filter(|&&v| !v).count();
    if invalid_count == 0 {
        // Idempotence: a clean band is returned as-is.
        return band;
    }
    if invalid_count == band.len() {
        debug!(default = default_fill, "band has no valid pixels, using default fill");
        return vec![default_fill; band.len()];
    }

    debug!(invalid = invalid_count, total = band.len(), "filling gaps");
    nearest_fill(band, &valid, width, height)
}

/// Exact Euclidean nearest-valid assignment via a two-pass distance
/// transform: a per-column scan records the nearest valid row in each
/// column, then a per-row lower-envelope pass (Felzenszwalb & Huttenlocher)
/// picks the globally nearest source column for every pixel.
fn nearest_fill(band: Vec<f32>, valid: &[bool], width: usize, height: usize) -> Vec<f32> {
    let pixels = width * height;

    // Column pass: distance in rows to the nearest valid pixel in the same
    // column, and which row it is.
    let mut col_dist = vec![f64::INFINITY; pixels];
    let mut src_row = vec![0usize; pixels];

    for x in 0..width {
        let mut last: Option<usize> = None;
        for y in 0..height {
            let i = y * width + x;
            if valid[i] {
                last = Some(y);
            }
            if let Some(ly) = last {
                col_dist[i] = (y - ly) as f64;
                src_row[i] = ly;
            }
        }
        last = None;
        for y in (0..height).rev() {
            let i = y * width + x;
            if valid[i] {
                last = Some(y);
            }
            if let Some(ly) = last {
                let d = (ly - y) as f64;
                if d < col_dist[i] {
                    col_dist[i] = d;
                    src_row[i] = ly;
                }
            }
        }
    }

    // Row pass: lower envelope of the parabolas rooted at each column's
    // squared column-distance.
    let mut out = band.clone();
    let mut sites: Vec<usize> = Vec::with_capacity(width);
    let mut bounds: Vec<f64> = Vec::with_capacity(width);

    for y in 0..height {
        let row = y * width;
        let f = |col: usize| {
            let d = col_dist[row + col];
            d * d + (col * col) as f64
        };

        sites.clear();
        bounds.clear();
        for q in 0..width {
            if !col_dist[row + q].is_finite() {
                continue;
            }
            let mut s = f64::NEG_INFINITY;
            while let Some(&p) = sites.last() {
                s = (f(q) - f(p)) / (2.0 * (q as f64 - p as f64));
                if s <= bounds[sites.len() - 1] {
                    sites.pop();
                    bounds.pop();
                } else {
                    break;
                }
            }
            if sites.is_empty() {
                s = f64::NEG_INFINITY;
            }
            sites.push(q);
            bounds.push(s);
        }

        // Columns with at least one valid pixel always exist once the band
        // is known to contain a valid pixel.
        debug_assert!(!sites.is_empty());

        let mut k = 0;
        for x in 0..width {
            while k + 1 < sites.len() && bounds[k + 1] < x as f64 {
                k += 1;
            }
            let i = row + x;
            if !valid[i] {
                let source_col = sites[k];
                let source_row = src_row[row + source_col];
                out[i] = band[source_row * width + source_col];
            }
        }
    }

    out
}
