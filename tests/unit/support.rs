//! In-memory template fixtures shared by unit tests.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

use crate::assets::bundle::{AssetBundle, AssetBytes};

pub(crate) const BASE_RGBA: [u8; 4] = [128, 128, 128, 255];

pub(crate) fn png(img: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Gray base, fully white silhouette mask, side mask open outside the
/// near-card columns, transparent overlay.
pub(crate) fn template_bytes(width: u32, height: u32, mask_height: u32) -> AssetBytes {
    let base = RgbaImage::from_pixel(width, height, Rgba(BASE_RGBA));
    let mask = GrayImage::from_pixel(width, mask_height, Luma([255]));
    let side = RgbaImage::from_fn(width, height, |x, _| {
        if !(247..1087).contains(&x) {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let overlay = RgbaImage::new(width, height);
    AssetBytes {
        base: png(DynamicImage::ImageRgba8(base)),
        luminance_mask: png(DynamicImage::ImageLuma8(mask)),
        side_mask: png(DynamicImage::ImageRgba8(side)),
        overlay: png(DynamicImage::ImageRgba8(overlay)),
    }
}

pub(crate) fn bundle(width: u32, height: u32, mask_height: u32) -> AssetBundle {
    AssetBundle::from_bytes(&template_bytes(width, height, mask_height)).unwrap()
}

pub(crate) fn solid_source(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}
