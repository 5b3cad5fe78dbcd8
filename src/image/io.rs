//! PNG and file helpers built on the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use std::io::Cursor;
use std::path::Path;

use crate::image::RgbaImage;
use crate::util::{MosaicError, Result};

fn io_err(err: image::ImageError) -> MosaicError {
    MosaicError::ImageIo {
        reason: err.to_string(),
    }
}

/// Converts a decoded image of any pixel format to RGBA8.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> Result<RgbaImage> {
    let rgba = img.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    RgbaImage::new(rgba.into_raw(), width, height)
}

/// Decodes an encoded image (PNG or JPEG) held in memory.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(io_err)?;
    owned_from_dynamic_image(&img)
}

/// Loads an image from disk as RGBA8.
pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let img = image::open(path).map_err(io_err)?;
    owned_from_dynamic_image(&img)
}

/// Encodes an RGBA8 image as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let buffer = to_image_buffer(img)?;
    let mut out = Cursor::new(Vec::new());
    buffer
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(io_err)?;
    Ok(out.into_inner())
}

/// Writes an RGBA8 image to disk; the format follows the file extension.
pub fn save_rgba_image<P: AsRef<Path>>(img: &RgbaImage, path: P) -> Result<()> {
    to_image_buffer(img)?.save(path).map_err(io_err)
}

fn to_image_buffer(img: &RgbaImage) -> Result<image::RgbaImage> {
    let width = u32::try_from(img.width())
        .map_err(|_| MosaicError::InvalidInput("image width exceeds u32"))?;
    let height = u32::try_from(img.height())
        .map_err(|_| MosaicError::InvalidInput("image height exceeds u32"))?;
    image::RgbaImage::from_raw(width, height, img.data().to_vec())
        .ok_or(MosaicError::InvalidInput("rgba buffer does not match dimensions"))
}
