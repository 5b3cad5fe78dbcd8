//! Alpha compositing of a candidate raster onto a probe raster.
//!
//! The probe raster is the canvas. Every candidate pixel is forward mapped
//! through the transform to the nearest canvas pixel and blended over it.
//! Writes are applied in candidate row-major order; when several candidate
//! pixels land on the same canvas pixel, each blends over the result of the
//! previous one.

use crate::image::{RgbaImage, RgbaView, CHANNELS};
use crate::trace::{trace_event, trace_span};
use crate::transform::Transform;
use crate::util::math::round_half_up;
use crate::util::{MosaicError, Result};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Compositing configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendOptions {
    /// Overlay opacity, clamped into `[0, 1]`.
    pub alpha: f64,
    /// Candidate pixels whose R, G and B are all at or above this value are
    /// treated as scanner background and skipped.
    pub background_threshold: Option<u8>,
    /// Compute pixel mappings in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for BlendOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            background_threshold: None,
            parallel: false,
        }
    }
}

/// A candidate pixel ready to be blended at a canvas offset.
#[derive(Clone, Copy, Debug)]
struct Splat {
    offset: usize,
    rgb: [u8; 3],
    alpha: f64,
}

/// Blends `candidate` onto a copy of `probe` under `transform`.
///
/// The output has the probe's dimensions. Colour channels are blended with
/// the effective source alpha and the alpha channel of every blended pixel
/// becomes 255.
///
/// # Errors
/// Returns [`MosaicError::InvalidInput`] when `options.alpha` is NaN.
pub fn composite_images(
    probe: RgbaView<'_>,
    candidate: RgbaView<'_>,
    transform: &Transform,
    options: &BlendOptions,
) -> Result<RgbaImage> {
    if options.alpha.is_nan() {
        return Err(MosaicError::InvalidInput("blend alpha must be a number"));
    }
    let _span = trace_span!(
        "composite_images",
        width = candidate.width(),
        height = candidate.height()
    )
    .entered();

    let mut output = probe.to_owned_image();
    let alpha_scale = options.alpha.clamp(0.0, 1.0);
    let mapper = PixelMapper {
        transform,
        threshold: options.background_threshold,
        alpha_scale,
        out_width: output.width(),
        out_height: output.height(),
    };

    let blended = if options.parallel {
        composite_rows_par(&mapper, candidate, &mut output)
    } else {
        composite_rows(&mapper, candidate, &mut output)
    };

    trace_event!("pixels_blended", count = blended);
    Ok(output)
}

/// Decodes two encoded images, composites them and encodes the result as PNG.
///
/// Available when the `image-io` feature is enabled.
#[cfg(feature = "image-io")]
pub fn composite_png(
    probe: &[u8],
    candidate: &[u8],
    transform: &Transform,
    options: &BlendOptions,
) -> Result<Vec<u8>> {
    let probe = crate::image::io::decode_rgba(probe)?;
    let candidate = crate::image::io::decode_rgba(candidate)?;
    let output = composite_images(probe.view(), candidate.view(), transform, options)?;
    crate::image::io::encode_png(&output)
}

fn composite_rows(
    mapper: &PixelMapper<'_>,
    candidate: RgbaView<'_>,
    output: &mut RgbaImage,
) -> usize {
    let mut blended = 0usize;
    let mut splats = Vec::with_capacity(candidate.width());
    for y in 0..candidate.height() {
        let Some(row) = candidate.row(y) else {
            continue;
        };
        splats.clear();
        mapper.map_row(y, row, &mut splats);
        blended += apply_splats(output.data_mut(), &splats);
    }
    blended
}

#[cfg(feature = "rayon")]
fn composite_rows_par(
    mapper: &PixelMapper<'_>,
    candidate: RgbaView<'_>,
    output: &mut RgbaImage,
) -> usize {
    // Mapping is independent per row; blending stays sequential so overlapping
    // writes resolve in the same order as the scalar path.
    let rows: Vec<Vec<Splat>> = (0..candidate.height())
        .into_par_iter()
        .map(|y| {
            let mut splats = Vec::new();
            if let Some(row) = candidate.row(y) {
                mapper.map_row(y, row, &mut splats);
            }
            splats
        })
        .collect();
    rows.iter()
        .map(|splats| apply_splats(output.data_mut(), splats))
        .sum()
}

#[cfg(not(feature = "rayon"))]
fn composite_rows_par(
    mapper: &PixelMapper<'_>,
    candidate: RgbaView<'_>,
    output: &mut RgbaImage,
) -> usize {
    composite_rows(mapper, candidate, output)
}

struct PixelMapper<'t> {
    transform: &'t Transform,
    threshold: Option<u8>,
    alpha_scale: f64,
    out_width: usize,
    out_height: usize,
}

impl PixelMapper<'_> {
    fn map_row(&self, y: usize, row: &[u8], out: &mut Vec<Splat>) {
        for (x, px) in row.chunks_exact(CHANNELS).enumerate() {
            if let Some(splat) = self.map_pixel(x, y, [px[0], px[1], px[2], px[3]]) {
                out.push(splat);
            }
        }
    }

    fn map_pixel(&self, x: usize, y: usize, px: [u8; CHANNELS]) -> Option<Splat> {
        let [r, g, b, a] = px;
        if a == 0 {
            return None;
        }
        if let Some(threshold) = self.threshold {
            if r >= threshold && g >= threshold && b >= threshold {
                return None;
            }
        }

        let (fx, fy) = self.transform.apply(x as f64, y as f64);
        let out_x = round_half_up(fx);
        let out_y = round_half_up(fy);
        if !(out_x >= 0.0
            && out_y >= 0.0
            && out_x < self.out_width as f64
            && out_y < self.out_height as f64)
        {
            return None;
        }

        let alpha = (a as f64 / 255.0) * self.alpha_scale;
        if alpha <= 0.0 {
            return None;
        }
        let offset = (out_y as usize * self.out_width + out_x as usize) * CHANNELS;
        Some(Splat {
            offset,
            rgb: [r, g, b],
            alpha,
        })
    }
}

fn apply_splats(canvas: &mut [u8], splats: &[Splat]) -> usize {
    for splat in splats {
        let dst = &mut canvas[splat.offset..splat.offset + CHANNELS];
        let keep = 1.0 - splat.alpha;
        for (channel, &src) in dst.iter_mut().zip(splat.rgb.iter()) {
            let value = src as f64 * splat.alpha + *channel as f64 * keep;
            *channel = round_half_up(value).clamp(0.0, 255.0) as u8;
        }
        dst[3] = 255;
    }
    splats.len()
}
