//! Minutia templates and the boundary types that produce them.
//!
//! A `Template` is an image-space minutia set. Minutia order is identity:
//! matched pairs reference minutiae by their index in `minutiae()`.
//! Serialized templates enter through `TemplateRef::Bytes` and are decoded
//! once at the boundary by a caller supplied `TemplateCodec`.

use crate::util::{MosaicError, Result};

/// Ridge feature kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MinutiaType {
    /// Ridge ending.
    #[default]
    Ending,
    /// Ridge bifurcation.
    Bifurcation,
}

impl MinutiaType {
    /// Maps a single-letter type code (`'E'` or `'B'`) to a minutia type.
    ///
    /// Any code other than `'B'` (in either case) is treated as an ending.
    pub fn from_code(code: char) -> Self {
        match code {
            'B' | 'b' => MinutiaType::Bifurcation,
            _ => MinutiaType::Ending,
        }
    }

    /// Returns the single-letter type code.
    pub fn code(self) -> char {
        match self {
            MinutiaType::Ending => 'E',
            MinutiaType::Bifurcation => 'B',
        }
    }
}

/// Minutia in pixel coordinates of its owning template.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MinutiaPoint {
    /// Column coordinate in pixels.
    pub x: f64,
    /// Row coordinate in pixels.
    pub y: f64,
    /// Ridge direction in radians.
    pub direction: f64,
    /// Ridge feature kind.
    pub kind: MinutiaType,
}

impl MinutiaPoint {
    /// Creates a minutia.
    pub fn new(x: f64, y: f64, direction: f64, kind: MinutiaType) -> Self {
        Self {
            x,
            y,
            direction,
            kind,
        }
    }
}

/// Read access to a decoded template.
///
/// This is the only view of a matcher template the mosaic core relies on;
/// foreign template representations implement it at the boundary.
pub trait TemplateSource {
    /// Image width in pixels, non-zero.
    fn width(&self) -> usize;
    /// Image height in pixels, non-zero.
    fn height(&self) -> usize;
    /// Minutiae in index order.
    fn minutiae(&self) -> &[MinutiaPoint];
}

/// Rejects a template source that reports a zero width or height.
pub(crate) fn validate_source<S: TemplateSource + ?Sized>(source: &S) -> Result<()> {
    check_dimensions(source.width(), source.height())
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(MosaicError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Owned minutia template with validated dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    width: usize,
    height: usize,
    minutiae: Vec<MinutiaPoint>,
}

impl Template {
    /// Creates a template, rejecting zero width or height.
    pub fn new(width: usize, height: usize, minutiae: Vec<MinutiaPoint>) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            minutiae,
        })
    }

    /// Builds a template from parallel per-minutia columns.
    ///
    /// `types` holds one type code per minutia (see [`MinutiaType::from_code`]).
    /// All columns must have the same length.
    pub fn from_columns(
        width: usize,
        height: usize,
        xs: &[f64],
        ys: &[f64],
        directions: &[f64],
        types: &str,
    ) -> Result<Self> {
        let count = types.chars().count();
        if xs.len() != count || ys.len() != count || directions.len() != count {
            return Err(MosaicError::InvalidInput(
                "minutia columns must have equal lengths",
            ));
        }
        let minutiae = types
            .chars()
            .enumerate()
            .map(|(i, code)| {
                MinutiaPoint::new(xs[i], ys[i], directions[i], MinutiaType::from_code(code))
            })
            .collect();
        Self::new(width, height, minutiae)
    }

    /// Assembles a template from dimensions taken from a validated source.
    pub(crate) fn from_parts(width: usize, height: usize, minutiae: Vec<MinutiaPoint>) -> Self {
        Self {
            width,
            height,
            minutiae,
        }
    }

    /// Copies any template source into an owned template.
    pub fn from_source<S: TemplateSource + ?Sized>(source: &S) -> Result<Self> {
        Self::new(source.width(), source.height(), source.minutiae().to_vec())
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the minutiae in index order.
    pub fn minutiae(&self) -> &[MinutiaPoint] {
        &self.minutiae
    }

    /// Returns the minutia at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&MinutiaPoint> {
        self.minutiae.get(index)
    }

    /// Number of minutiae.
    pub fn len(&self) -> usize {
        self.minutiae.len()
    }

    /// Returns true when the template holds no minutiae.
    pub fn is_empty(&self) -> bool {
        self.minutiae.is_empty()
    }

    /// Consumes the template and returns its minutiae.
    pub fn into_minutiae(self) -> Vec<MinutiaPoint> {
        self.minutiae
    }
}

impl TemplateSource for Template {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn minutiae(&self) -> &[MinutiaPoint] {
        &self.minutiae
    }
}

/// Decoder for the matcher's serialized template format.
pub trait TemplateCodec {
    /// Decodes a serialized template.
    fn decode(&self, bytes: &[u8]) -> Result<Template>;
}

/// A template supplied either serialized or already decoded.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateRef {
    /// Serialized template bytes, decoded through a [`TemplateCodec`].
    Bytes(Vec<u8>),
    /// Decoded template.
    Decoded(Template),
}

impl TemplateRef {
    /// Resolves to a decoded template.
    pub fn resolve<C: TemplateCodec + ?Sized>(self, codec: &C) -> Result<Template> {
        match self {
            TemplateRef::Bytes(bytes) => codec.decode(&bytes),
            TemplateRef::Decoded(template) => Ok(template),
        }
    }
}

impl From<Template> for TemplateRef {
    fn from(value: Template) -> Self {
        TemplateRef::Decoded(value)
    }
}

impl From<Vec<u8>> for TemplateRef {
    fn from(value: Vec<u8>) -> Self {
        TemplateRef::Bytes(value)
    }
}
