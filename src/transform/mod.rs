//! Rigid transform estimation between matched minutia sets.
//!
//! Rotation is the closed-form least-squares fit over all matched points
//! after removing their centroids. With a single pair there is no point
//! geometry to fit, so the minutia directions decide the rotation.
//! Translation then pins the first usable pair exactly.

use crate::pairing::MatchedPair;
use crate::template::{MinutiaPoint, TemplateSource};
use crate::trace::{trace_event, trace_span};
use crate::util::{MosaicError, Result};

/// Rotation plus translation mapping candidate space into probe space.
///
/// `cos` and `sin` are cached from `rotation`; construct through
/// [`Transform::new`] to keep them consistent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Rotation angle in radians.
    pub rotation: f64,
    /// Cosine of `rotation`.
    pub cos: f64,
    /// Sine of `rotation`.
    pub sin: f64,
    /// Translation along x, applied after rotation.
    pub tx: f64,
    /// Translation along y, applied after rotation.
    pub ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Creates a transform from a rotation angle and a translation.
    pub fn new(rotation: f64, tx: f64, ty: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            rotation,
            cos,
            sin,
            tx,
            ty,
        }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Maps a candidate-space point into probe space.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.cos * x - self.sin * y + self.tx,
            self.sin * x + self.cos * y + self.ty,
        )
    }

    /// Rotates a vector without translating it.
    #[inline]
    pub fn rotate(&self, x: f64, y: f64) -> (f64, f64) {
        (self.cos * x - self.sin * y, self.sin * x + self.cos * y)
    }

    /// Maps a minutia into probe space; the type is unchanged.
    pub fn apply_minutia(&self, minutia: &MinutiaPoint) -> MinutiaPoint {
        let (x, y) = self.apply(minutia.x, minutia.y);
        MinutiaPoint {
            x,
            y,
            direction: minutia.direction + self.rotation,
            kind: minutia.kind,
        }
    }
}

/// Estimates the transform aligning `candidate` onto `probe`.
///
/// Pairs whose indices do not resolve in their template are ignored. The
/// first resolving pair anchors the translation.
///
/// # Errors
/// Returns [`MosaicError::InsufficientPairs`] when no pair resolves.
pub fn estimate_transform<P, C>(
    pairs: &[MatchedPair],
    probe: &P,
    candidate: &C,
) -> Result<Transform>
where
    P: TemplateSource + ?Sized,
    C: TemplateSource + ?Sized,
{
    let _span = trace_span!("estimate_transform", pairs = pairs.len()).entered();

    let probe_minutiae = probe.minutiae();
    let candidate_minutiae = candidate.minutiae();
    let matched: Vec<(&MinutiaPoint, &MinutiaPoint)> = pairs
        .iter()
        .filter_map(|pair| {
            Some((
                probe_minutiae.get(pair.probe)?,
                candidate_minutiae.get(pair.candidate)?,
            ))
        })
        .collect();

    let (anchor_probe, anchor_candidate) = match matched.first() {
        Some(&anchor) => anchor,
        None => {
            return Err(MosaicError::InsufficientPairs { pairs: pairs.len() });
        }
    };

    let rotation = if matched.len() == 1 {
        anchor_probe.direction - anchor_candidate.direction
    } else {
        fit_rotation(&matched)
    };

    let (sin, cos) = rotation.sin_cos();
    let tx = anchor_probe.x - (cos * anchor_candidate.x - sin * anchor_candidate.y);
    let ty = anchor_probe.y - (sin * anchor_candidate.x + cos * anchor_candidate.y);

    trace_event!(
        "transform_estimated",
        matched = matched.len(),
        rotation = rotation,
        tx = tx,
        ty = ty
    );
    Ok(Transform {
        rotation,
        cos,
        sin,
        tx,
        ty,
    })
}

/// Least-squares rotation of centred candidate points onto centred probe
/// points (rotation-only orthogonal Procrustes).
fn fit_rotation(matched: &[(&MinutiaPoint, &MinutiaPoint)]) -> f64 {
    let n = matched.len() as f64;
    let (mut sum_px, mut sum_py, mut sum_cx, mut sum_cy) = (0.0, 0.0, 0.0, 0.0);
    for (p, c) in matched {
        sum_px += p.x;
        sum_py += p.y;
        sum_cx += c.x;
        sum_cy += c.y;
    }
    let (mean_px, mean_py) = (sum_px / n, sum_py / n);
    let (mean_cx, mean_cy) = (sum_cx / n, sum_cy / n);

    let mut dot = 0.0;
    let mut cross = 0.0;
    for (p, c) in matched {
        let (px, py) = (p.x - mean_px, p.y - mean_py);
        let (cx, cy) = (c.x - mean_cx, c.y - mean_cy);
        dot += cx * px + cy * py;
        cross += cx * py - cy * px;
    }
    cross.atan2(dot)
}
