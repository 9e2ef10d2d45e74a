//! Destination quads and the single-patch perspective warp.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::{foundation::error::BackdropResult, warp::homography::Homography};

/// Four destination corners in TL, TR, BR, BL order, in the input's pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Corner points `[x, y]`.
    pub corners: [[f64; 2]; 4],
}

impl Quad {
    /// Build a quad from its corners.
    pub fn new(tl: [f64; 2], tr: [f64; 2], br: [f64; 2], bl: [f64; 2]) -> Self {
        Self {
            corners: [tl, tr, br, bl],
        }
    }

    /// The untouched `w × h` rectangle.
    pub fn identity(width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self::new([0.0, 0.0], [w, 0.0], [w, h], [0.0, h])
    }

    /// Card leaning away from the viewer: the left edge shrinks by `shift` at both ends.
    pub fn far_skew(width: u32, height: u32, shift: f64) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self::new([0.0, shift], [w, 0.0], [w, h], [0.0, h - shift])
    }

    /// Horizontal shear: the top edge moves right and the bottom edge left by `shift`.
    pub fn near_skew(width: u32, height: u32, shift: f64) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self::new([shift, 0.0], [w, 0.0], [w - shift, h], [0.0, h])
    }

    /// Reflect about the horizontal centre line of a `height`-tall canvas.
    pub fn mirrored_vertically(&self, height: u32) -> Self {
        let h = f64::from(height);
        let flip = |p: [f64; 2]| [p[0], h - p[1]];
        let [tl, tr, br, bl] = self.corners;
        Self::new(flip(bl), flip(br), flip(tr), flip(tl))
    }
}

/// Resample `image` so its corners land on `quad`, keeping the input's dimensions.
///
/// Every output pixel centre is inverse-mapped into the source and sampled
/// bilinearly. Centres that map outside the source are fully transparent.
pub fn warp(image: &RgbaImage, quad: &Quad) -> BackdropResult<RgbaImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image.clone());
    }

    let forward = Homography::from_rect_to_quad(f64::from(width), f64::from(height), quad)?;
    let inverse = forward.inverse()?;

    let mut out = RgbaImage::new(width, height);
    let row_len = width as usize * 4;
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let cy = y as f64 + 0.5;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let cx = x as f64 + 0.5;
                let sampled = inverse
                    .apply(cx, cy)
                    .and_then(|(u, v)| sample_bilinear(image, u, v));
                if let Some(Rgba(rgba)) = sampled {
                    px.copy_from_slice(&rgba);
                }
            }
        });
    Ok(out)
}

/// Bilinear sample at continuous coordinate `(u, v)` where pixel `i` spans `[i, i+1)`.
///
/// Colour is weighted by alpha so transparent neighbours do not darken edges.
fn sample_bilinear(image: &RgbaImage, u: f64, v: f64) -> Option<Rgba<u8>> {
    let (width, height) = image.dimensions();
    if !(u >= 0.0 && v >= 0.0 && u < f64::from(width) && v < f64::from(height)) {
        return None;
    }

    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0f = fx.floor();
    let y0f = fy.floor();
    let tx = fx - x0f;
    let ty = fy - y0f;

    let max_x = i64::from(width) - 1;
    let max_y = i64::from(height) - 1;
    let x0 = (x0f as i64).clamp(0, max_x) as u32;
    let x1 = (x0f as i64 + 1).clamp(0, max_x) as u32;
    let y0 = (y0f as i64).clamp(0, max_y) as u32;
    let y1 = (y0f as i64 + 1).clamp(0, max_y) as u32;

    let taps = [
        (image.get_pixel(x0, y0), (1.0 - tx) * (1.0 - ty)),
        (image.get_pixel(x1, y0), tx * (1.0 - ty)),
        (image.get_pixel(x0, y1), (1.0 - tx) * ty),
        (image.get_pixel(x1, y1), tx * ty),
    ];

    let mut alpha = 0.0f64;
    let mut color = [0.0f64; 3];
    for (px, w) in taps {
        let a = f64::from(px[3]) * w;
        alpha += a;
        for c in 0..3 {
            color[c] += f64::from(px[c]) * a;
        }
    }

    if alpha <= 0.0 {
        return Some(Rgba([0, 0, 0, 0]));
    }
    let quantize = |v: f64| (v + 0.5).floor().clamp(0.0, 255.0) as u8;
    Some(Rgba([
        quantize(color[0] / alpha),
        quantize(color[1] / alpha),
        quantize(color[2] / alpha),
        quantize(alpha),
    ]))
}

#[cfg(test)]
#[path = "../../tests/unit/warp/quad.rs"]
mod tests;
