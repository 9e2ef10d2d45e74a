//! Encoding between the canonical PNG and derived formats.

use anyhow::Context;
use image::{
    ExtendedColorType, ImageEncoder, ImageFormat, Rgb, RgbImage, RgbaImage,
    codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder},
};

use crate::foundation::{error::BackdropResult, format::OutputFormat};

/// Quality used for JPEG output.
pub const JPEG_QUALITY: u8 = 90;

/// Encode `image` in `format`.
///
/// PNG keeps alpha. Derived formats drop the alpha channel without
/// compositing it onto a background.
pub fn encode(image: &RgbaImage, format: OutputFormat) -> BackdropResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => PngEncoder::new(&mut buf)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
            .context("encode png")?,
        OutputFormat::Jpg | OutputFormat::Jpeg => {
            let rgb = drop_alpha(image);
            JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .context("encode jpeg")?
        }
        OutputFormat::Webp => {
            let rgb = drop_alpha(image);
            WebPEncoder::new_lossless(&mut buf)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .context("encode webp")?
        }
    }
    Ok(buf)
}

/// Re-encode canonical PNG bytes as `format`.
pub fn transcode(canonical: &[u8], format: OutputFormat) -> BackdropResult<Vec<u8>> {
    if format.is_canonical() {
        return Ok(canonical.to_vec());
    }
    let decoded = image::load_from_memory_with_format(canonical, ImageFormat::Png)
        .context("decode canonical png")?;
    encode(&decoded.to_rgba8(), format)
}

fn drop_alpha(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Rgb([r, g, b])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/cache/codec.rs"]
mod tests;
