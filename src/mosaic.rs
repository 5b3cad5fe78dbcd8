//! End-to-end mosaicking of two matched templates.
//!
//! `Mosaicker` drives the external matcher in capture mode, extracts the
//! matched pairs, estimates the transform and merges the templates.
//! `mosaic_from_pairs` runs the same pure steps for callers that already hold
//! a pair list.

use crate::capture::{capture, Matcher};
use crate::merge::{merge_templates, MergeOptions};
use crate::pairing::MatchedPair;
use crate::template::{validate_source, Template, TemplateCodec, TemplateRef, TemplateSource};
use crate::trace::{trace_event, trace_span};
use crate::transform::{estimate_transform, Transform};
use crate::util::Result;

/// Merged template together with the alignment that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct MosaicResult {
    /// Merged template in probe space.
    pub template: Template,
    /// Transform mapping candidate space onto probe space.
    pub transform: Transform,
    /// Deduplicated matched pairs, anchor pair first.
    pub pairs: Vec<MatchedPair>,
    /// Match score reported by the matcher.
    pub score: f64,
}

/// Estimates the transform from `pairs` and merges the two templates.
///
/// # Errors
/// Returns `InvalidDimensions` when either template reports a zero width or
/// height, and `InsufficientPairs` when no pair resolves to minutiae.
pub fn mosaic_from_pairs<P, C>(
    probe: &P,
    candidate: &C,
    pairs: Vec<MatchedPair>,
    score: f64,
    options: &MergeOptions,
) -> Result<MosaicResult>
where
    P: TemplateSource + ?Sized,
    C: TemplateSource + ?Sized,
{
    validate_source(probe)?;
    validate_source(candidate)?;
    let transform = estimate_transform(&pairs, probe, candidate)?;
    let template = merge_templates(probe, candidate, &pairs, &transform, options)?;
    Ok(MosaicResult {
        template,
        transform,
        pairs,
        score,
    })
}

/// Mosaic pipeline bound to a matcher and a template codec.
pub struct Mosaicker<M, C> {
    matcher: M,
    codec: C,
    options: MergeOptions,
}

impl<M: Matcher, C: TemplateCodec> Mosaicker<M, C> {
    /// Creates a pipeline with default merge options.
    pub fn new(matcher: M, codec: C) -> Self {
        Self {
            matcher,
            codec,
            options: MergeOptions::default(),
        }
    }

    /// Replaces the merge options.
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the merge options in use.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Returns the wrapped matcher.
    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Matches `candidate` against `probe` in capture mode and merges them.
    ///
    /// Serialized templates are decoded once up front. Templates recorded by
    /// the matcher take precedence over the resolved inputs when merging.
    ///
    /// # Errors
    /// Propagates decode and capture failures, `NoPairingData` when the
    /// matcher recorded no pairing, and `InsufficientPairs` when no pair
    /// resolves to minutiae.
    pub fn mosaic(
        &self,
        probe: impl Into<TemplateRef>,
        candidate: impl Into<TemplateRef>,
    ) -> Result<MosaicResult> {
        let _span = trace_span!("mosaic").entered();

        let probe = probe.into().resolve(&self.codec)?;
        let candidate = candidate.into().resolve(&self.codec)?;

        let captured = capture(&self.matcher, &probe, &candidate)?;
        let pairs = captured.archive.pairs()?;
        trace_event!("pairs_extracted", count = pairs.len());

        let probe = captured.archive.probe_template.unwrap_or(probe);
        let candidate = captured.archive.candidate_template.unwrap_or(candidate);
        mosaic_from_pairs(&probe, &candidate, pairs, captured.score, &self.options)
    }
}
