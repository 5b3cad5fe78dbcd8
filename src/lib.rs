//! fpmosaic merges two matched fingerprint captures into one composite.
//!
//! Given the pairing an external matcher found between a probe and a
//! candidate template, the crate estimates the rigid transform that aligns
//! the candidate onto the probe, merges both minutia sets under it, and can
//! alpha-blend the two capture images with the same transform. PNG support is
//! available through the `image-io` feature, tracing through `tracing`, and a
//! parallel compositor mapping pass through `rayon`.

pub mod capture;
pub mod composite;
pub mod image;
pub mod lowlevel;
pub mod merge;
pub mod mosaic;
pub mod pairing;
pub mod template;
mod trace;
pub mod transform;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use capture::{CaptureArchive, CaptureSession, Matcher};
pub use composite::{composite_images, BlendOptions};
pub use crate::image::{RgbaImage, RgbaView};
pub use merge::{MergeMatched, MergeOptions};
pub use mosaic::{mosaic_from_pairs, MosaicResult, Mosaicker};
pub use pairing::{extract_pairs, MatchedPair, PairingEdge, PairingGraph};
pub use template::{
    MinutiaPoint, MinutiaType, Template, TemplateCodec, TemplateRef, TemplateSource,
};
pub use transform::{estimate_transform, Transform};
pub use util::{MosaicError, Result};

#[cfg(feature = "image-io")]
pub use composite::composite_png;
