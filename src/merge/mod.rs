//! Merging two minutia templates under an estimated transform.
//!
//! The probe template is the base: its minutiae keep their indices, matched
//! slots are resolved by [`MergeMatched`], and unmatched candidate minutiae
//! are appended after them in probe space. The result is shifted so that no
//! coordinate is negative and sized so that it never shrinks below the probe.

use std::collections::HashSet;

use crate::pairing::MatchedPair;
use crate::template::{validate_source, MinutiaPoint, Template, TemplateSource};
use crate::trace::{trace_event, trace_span};
use crate::transform::Transform;
use crate::util::math::midpoint;
use crate::util::Result;

/// Policy for a probe slot that has a matched candidate minutia.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeMatched {
    /// Keep the probe minutia.
    #[default]
    Probe,
    /// Replace it with the transformed candidate minutia.
    Candidate,
    /// Replace it with the mean of both; the probe's type is kept.
    Average,
}

/// Template merge configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    /// How matched slots are resolved.
    pub merge_matched: MergeMatched,
    /// Append candidate minutiae that are not part of any pair.
    pub include_unmatched: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            merge_matched: MergeMatched::Probe,
            include_unmatched: true,
        }
    }
}

/// Builds the merged template in probe space.
///
/// Pairs referencing minutiae missing from either template are skipped.
///
/// # Errors
/// Returns [`MosaicError::InvalidDimensions`](crate::MosaicError::InvalidDimensions)
/// when either source reports a zero width or height.
pub fn merge_templates<P, C>(
    probe: &P,
    candidate: &C,
    pairs: &[MatchedPair],
    transform: &Transform,
    options: &MergeOptions,
) -> Result<Template>
where
    P: TemplateSource + ?Sized,
    C: TemplateSource + ?Sized,
{
    validate_source(probe)?;
    validate_source(candidate)?;
    let _span = trace_span!("merge_templates", pairs = pairs.len()).entered();

    let probe_minutiae = probe.minutiae();
    let candidate_minutiae = candidate.minutiae();
    let mut merged: Vec<MinutiaPoint> = probe_minutiae.to_vec();

    for pair in pairs {
        let (Some(probe_minutia), Some(candidate_minutia)) = (
            probe_minutiae.get(pair.probe),
            candidate_minutiae.get(pair.candidate),
        ) else {
            continue;
        };
        let moved = transform.apply_minutia(candidate_minutia);
        match options.merge_matched {
            MergeMatched::Probe => {}
            MergeMatched::Candidate => merged[pair.probe] = moved,
            MergeMatched::Average => {
                merged[pair.probe] = MinutiaPoint {
                    x: midpoint(probe_minutia.x, moved.x),
                    y: midpoint(probe_minutia.y, moved.y),
                    direction: midpoint(probe_minutia.direction, moved.direction),
                    kind: probe_minutia.kind,
                };
            }
        }
    }

    let mut appended = 0usize;
    if options.include_unmatched {
        let paired: HashSet<usize> = pairs.iter().map(|pair| pair.candidate).collect();
        for (idx, minutia) in candidate_minutiae.iter().enumerate() {
            if paired.contains(&idx) {
                continue;
            }
            merged.push(transform.apply_minutia(minutia));
            appended += 1;
        }
    }
    trace_event!(
        "templates_merged",
        minutiae = merged.len(),
        appended = appended
    );

    Ok(normalize_minutiae(probe.width(), probe.height(), merged))
}

/// Shifts a template so that all coordinates are non-negative and grows its
/// dimensions to cover every minutia.
///
/// Width and height never shrink below the template's own. An empty template
/// is returned unchanged.
pub fn normalize_bounds(template: Template) -> Template {
    let (width, height) = (template.width(), template.height());
    normalize_minutiae(width, height, template.into_minutiae())
}

fn normalize_minutiae(width: usize, height: usize, mut minutiae: Vec<MinutiaPoint>) -> Template {
    let Some(bounds) = Bounds::of(&minutiae) else {
        return Template::from_parts(width, height, minutiae);
    };

    let shift_x = if bounds.min_x < 0.0 { -bounds.min_x } else { 0.0 };
    let shift_y = if bounds.min_y < 0.0 { -bounds.min_y } else { 0.0 };
    if shift_x != 0.0 || shift_y != 0.0 {
        for minutia in &mut minutiae {
            minutia.x += shift_x;
            minutia.y += shift_y;
        }
    }

    let width = width.max(extent(bounds.max_x + shift_x));
    let height = height.max(extent(bounds.max_y + shift_y));
    Template::from_parts(width, height, minutiae)
}

/// Pixel extent needed to hold a coordinate: `ceil(max + 1)`.
fn extent(max: f64) -> usize {
    let needed = (max + 1.0).ceil();
    if needed.is_finite() && needed > 0.0 {
        needed as usize
    } else {
        0
    }
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn of(minutiae: &[MinutiaPoint]) -> Option<Self> {
        let first = minutiae.first()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(minutiae.iter().skip(1).fold(init, |b, m| Bounds {
            min_x: b.min_x.min(m.x),
            min_y: b.min_y.min(m.y),
            max_x: b.max_x.max(m.x),
            max_y: b.max_y.max(m.y),
        }))
    }
}
