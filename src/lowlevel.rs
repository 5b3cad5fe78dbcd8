//! Low-level building blocks for custom mosaic pipelines.
//!
//! These expose the individual stages behind `Mosaicker` for callers that
//! obtain pairings or templates some other way. Most users should prefer
//! `Mosaicker` or `mosaic_from_pairs`.

pub use crate::capture::{capture, Capture};
pub use crate::merge::{merge_templates, normalize_bounds};
pub use crate::pairing::dedup_pairs;
pub use crate::transform::estimate_transform;
