use std::collections::HashMap;

use image::{
    DynamicImage, RgbaImage,
    imageops::{self, FilterType},
};

use crate::{
    assets::bundle::AssetBundle,
    compose::{
        blend::{
            alpha_composite, paste_masked_alpha, paste_masked_luma, paste_over, set_uniform_alpha,
        },
        placement::{Layer, QuadShape, placements_on},
    },
    foundation::{
        error::{BackdropError, BackdropResult},
        math::opacity_to_u8,
    },
    warp::quad::warp,
};

/// Build the final background for `source` on the templates in `bundle`.
///
/// Pure and deterministic: identical inputs give byte-identical pixels. The
/// result always has the luminance mask's dimensions.
#[tracing::instrument(skip_all, fields(src_w = source.width(), src_h = source.height(), fingerprint = %bundle.short_fingerprint()))]
pub fn compose(source: &DynamicImage, bundle: &AssetBundle) -> BackdropResult<RgbaImage> {
    if source.width() == 0 || source.height() == 0 {
        return Err(BackdropError::decode("source image has no pixels"));
    }
    let source = source.to_rgba8();
    let base = bundle.base();
    let (base_w, base_h) = base.dimensions();

    let mut tiles = TileCache::new(&source);
    let near = build_layer(&mut tiles, Layer::Near, base_w, base_h)?;
    let far = build_layer(&mut tiles, Layer::Far, base_w, base_h)?;

    let mut buffer = base.clone();
    alpha_composite(&mut buffer, &near)?;
    paste_masked_alpha(&mut buffer, &far, bundle.side_mask())?;
    alpha_composite(&mut buffer, bundle.overlay())?;

    let (mask_w, mask_h) = bundle.output_dimensions();
    let (top, bottom) = crop_band(base_h, mask_h);
    let base_band = imageops::crop_imm(base, 0, top, base_w, bottom - top).to_image();
    let buffer_band = imageops::crop_imm(&buffer, 0, top, base_w, bottom - top).to_image();

    let mut result = RgbaImage::new(mask_w, mask_h);
    imageops::replace(&mut result, &base_band, 0, 0);
    paste_masked_luma(&mut result, &buffer_band, bundle.luminance_mask());
    Ok(result)
}

/// Rows `[top, bottom)` kept when re-centering a `height`-tall buffer on the mask.
///
/// The band stops one row short of the symmetric crop; with a mask whose
/// height parity differs from the base this yields exactly the mask height.
pub fn crop_band(height: u32, mask_height: u32) -> (u32, u32) {
    let diff = height.saturating_sub(mask_height) / 2;
    let top = diff.min(height);
    let bottom = height.saturating_sub(diff + 1).max(top);
    (top, bottom)
}

fn build_layer(
    tiles: &mut TileCache<'_>,
    layer: Layer,
    width: u32,
    height: u32,
) -> BackdropResult<RgbaImage> {
    let mut canvas = RgbaImage::new(width, height);
    for placement in placements_on(layer) {
        let mut tile = tiles.get(placement.shape, placement.resize_to)?.clone();
        set_uniform_alpha(&mut tile, opacity_to_u8(placement.opacity));
        paste_over(&mut canvas, &tile, placement.paste_origin);
    }
    Ok(canvas)
}

/// Warped and resized copies keyed by shape and size, so placements sharing
/// both only pay for one warp.
struct TileCache<'a> {
    source: &'a RgbaImage,
    tiles: HashMap<(QuadShape, (u32, u32)), RgbaImage>,
}

impl<'a> TileCache<'a> {
    fn new(source: &'a RgbaImage) -> Self {
        Self {
            source,
            tiles: HashMap::new(),
        }
    }

    fn get(&mut self, shape: QuadShape, size: (u32, u32)) -> BackdropResult<&RgbaImage> {
        let key = (shape, size);
        if !self.tiles.contains_key(&key) {
            let (w, h) = self.source.dimensions();
            let warped = warp(self.source, &shape.quad(w, h))?;
            let resized = imageops::resize(&warped, size.0, size.1, FilterType::CatmullRom);
            self.tiles.insert(key, resized);
        }
        Ok(&self.tiles[&key])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
