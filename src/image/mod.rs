//! RGBA8 raster views and owned buffers.
//!
//! `RgbaView` is a borrowed 2D view into a byte buffer holding four bytes per
//! pixel in R, G, B, A order. The stride counts pixels between the starts of
//! consecutive rows, so a stride larger than the width represents padded
//! rows. `RgbaImage` owns a contiguous buffer with `stride == width`.

use crate::util::{MosaicError, Result};

#[cfg(feature = "image-io")]
pub mod io;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Borrowed RGBA8 image view with an explicit stride in pixels.
#[derive(Copy, Clone, Debug)]
pub struct RgbaView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> RgbaView<'a> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride in pixels.
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> Result<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(MosaicError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in pixels between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; CHANNELS]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let start = x * CHANNELS;
        let px = row.get(start..start + CHANNELS)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Returns the `width * 4` bytes of row `y`.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?.checked_mul(CHANNELS)?;
        let end = start.checked_add(self.width * CHANNELS)?;
        self.data.get(start..end)
    }

    /// Copies the view into a contiguous owned image.
    pub fn to_owned_image(&self) -> RgbaImage {
        let mut data = Vec::with_capacity(self.width * self.height * CHANNELS);
        for y in 0..self.height {
            if let Some(row) = self.row(y) {
                data.extend_from_slice(row);
            }
        }
        RgbaImage {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Owned contiguous RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl RgbaImage {
    /// Wraps a contiguous buffer of exactly `width * height * 4` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        let needed = required_len(width, height, width)?;
        if data.len() < needed {
            return Err(MosaicError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(MosaicError::InvalidInput(
                "rgba buffer is larger than width * height * 4",
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates an image filled with one pixel value.
    pub fn filled(width: usize, height: usize, pixel: [u8; CHANNELS]) -> Result<Self> {
        let needed = required_len(width, height, width)?;
        let data = pixel.iter().copied().cycle().take(needed).collect();
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel bytes in row-major RGBA order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns mutable pixel bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image and returns its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> RgbaView<'_> {
        RgbaView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Overwrites the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: [u8; CHANNELS]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let start = (y * self.width + x) * CHANNELS;
        self.data[start..start + CHANNELS].copy_from_slice(&pixel);
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(MosaicError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(MosaicError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or(MosaicError::InvalidDimensions { width, height })
}
