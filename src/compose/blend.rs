//! Straight-alpha RGBA8 blending primitives.
//!
//! All arithmetic is integer so identical inputs always give identical bytes.

use image::{GrayImage, RgbaImage};

use crate::foundation::{
    error::{BackdropError, BackdropResult},
    math::lerp_u8,
};

/// Non-premultiplied RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Porter-Duff "over" for straight (non-premultiplied) alpha.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }

    // Alpha and weights kept at ×255 scale to avoid early rounding.
    let dst_w = u32::from(dst[3]) * (255 - sa);
    let a255 = sa * 255 + dst_w;
    if a255 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * dst_w;
        out[i] = ((num + a255 / 2) / a255).min(255) as u8;
    }
    out[3] = ((a255 + 127) / 255).min(255) as u8;
    out
}

/// Blend every channel (alpha included) towards `src` by `t / 255`.
pub fn lerp(dst: Rgba8, src: Rgba8, t: u8) -> Rgba8 {
    match t {
        0 => dst,
        255 => src,
        _ => [
            lerp_u8(dst[0], src[0], t),
            lerp_u8(dst[1], src[1], t),
            lerp_u8(dst[2], src[2], t),
            lerp_u8(dst[3], src[3], t),
        ],
    }
}

/// Composite `src` over `dst` in place; both must share dimensions.
pub fn alpha_composite(dst: &mut RgbaImage, src: &RgbaImage) -> BackdropResult<()> {
    ensure_same_size("alpha_composite", dst.dimensions(), src.dimensions())?;
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        d.0 = over(d.0, s.0);
    }
    Ok(())
}

/// Composite `src` over `dst` with its top-left at `origin`, clipped to `dst`.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, origin: (i64, i64)) {
    let Some(region) = Overlap::new(dst.dimensions(), src.dimensions(), origin) else {
        return;
    };
    for y in 0..region.height {
        for x in 0..region.width {
            let s = src.get_pixel(region.src_x + x, region.src_y + y).0;
            let d = dst.get_pixel_mut(region.dst_x + x, region.dst_y + y);
            d.0 = over(d.0, s);
        }
    }
}

/// Write `src` into `dst` weighted by the alpha channel of `mask`.
///
/// All three images must share dimensions. Every channel of `dst`, alpha
/// included, moves towards `src`.
pub fn paste_masked_alpha(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    mask: &RgbaImage,
) -> BackdropResult<()> {
    ensure_same_size("paste_masked_alpha", dst.dimensions(), src.dimensions())?;
    ensure_same_size("paste_masked_alpha mask", dst.dimensions(), mask.dimensions())?;
    for ((d, s), m) in dst.pixels_mut().zip(src.pixels()).zip(mask.pixels()) {
        d.0 = lerp(d.0, s.0, m[3]);
    }
    Ok(())
}

/// Write `src` into `dst` at `(0, 0)` weighted by a grayscale `mask`.
///
/// Only the region covered by all three images is touched.
pub fn paste_masked_luma(dst: &mut RgbaImage, src: &RgbaImage, mask: &GrayImage) {
    let width = dst.width().min(src.width()).min(mask.width());
    let height = dst.height().min(src.height()).min(mask.height());
    for y in 0..height {
        for x in 0..width {
            let t = mask.get_pixel(x, y)[0];
            let s = src.get_pixel(x, y).0;
            let d = dst.get_pixel_mut(x, y);
            d.0 = lerp(d.0, s, t);
        }
    }
}

/// Replace every pixel's alpha with `alpha`, discarding existing transparency.
pub fn set_uniform_alpha(image: &mut RgbaImage, alpha: u8) {
    for px in image.pixels_mut() {
        px[3] = alpha;
    }
}

fn ensure_same_size(op: &str, a: (u32, u32), b: (u32, u32)) -> BackdropResult<()> {
    if a != b {
        return Err(BackdropError::validation(format!(
            "{op} expects equal image sizes, got {}x{} and {}x{}",
            a.0, a.1, b.0, b.1
        )));
    }
    Ok(())
}

/// Intersection of a source image placed at `origin` with a destination canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Overlap {
    dst_x: u32,
    dst_y: u32,
    src_x: u32,
    src_y: u32,
    width: u32,
    height: u32,
}

impl Overlap {
    fn new(dst: (u32, u32), src: (u32, u32), origin: (i64, i64)) -> Option<Self> {
        let (ox, oy) = origin;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (ox + i64::from(src.0)).min(i64::from(dst.0));
        let y1 = (oy + i64::from(src.1)).min(i64::from(dst.1));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            dst_x: x0 as u32,
            dst_y: y0 as u32,
            src_x: (x0 - ox) as u32,
            src_y: (y0 - oy) as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
