//! Error types for fpmosaic.

use thiserror::Error;

/// Result alias for fpmosaic operations.
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Errors that can occur while building a mosaic.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MosaicError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image or template dimensions must be non-zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than the row width.
    #[error("invalid stride: width {width}, stride {stride}")]
    InvalidStride { width: usize, stride: usize },
    /// The pixel buffer does not hold enough bytes for its dimensions.
    #[error("buffer too small: needed {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The matcher recorded no pairing graph or root pairs.
    #[error("capture archive has no pairing data (keys: {keys:?})")]
    NoPairingData { keys: Vec<String> },
    /// None of the pairs reference minutiae present in both templates.
    #[error("no usable matched pairs: {pairs} pairs, none resolve to minutiae")]
    InsufficientPairs { pairs: usize },
    /// A serialized template could not be decoded.
    #[error("template decode failed: {reason}")]
    TemplateDecode { reason: String },
    /// The external matcher failed while capturing.
    #[error("matcher capture failed: {reason}")]
    Capture { reason: String },
    /// Image decoding or encoding failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
