use image::{GrayImage, Luma};

use super::*;
use crate::{
    assets::bundle::AssetBytes,
    test_support::{BASE_RGBA, bundle, png, solid_source, template_bytes},
};

#[test]
fn output_matches_mask_for_square_wide_and_tall_sources() {
    let b = bundle(200, 120, 115);
    for (w, h) in [(64, 64), (96, 32), (32, 96)] {
        let out = compose(&solid_source(w, h, [255, 0, 0, 255]), &b).unwrap();
        assert_eq!(out.dimensions(), (200, 115), "source {w}x{h}");
    }
}

#[test]
fn compose_is_deterministic() {
    let b = bundle(300, 200, 195);
    let src = DynamicImage::ImageRgba8(RgbaImage::from_fn(50, 40, |x, y| {
        image::Rgba([(x * 5) as u8, (y * 6) as u8, 77, 255])
    }));
    let a = compose(&src, &b).unwrap();
    let c = compose(&src, &b).unwrap();
    assert_eq!(a.as_raw(), c.as_raw());
}

#[test]
fn crop_band_matches_mask_height_when_parity_differs() {
    assert_eq!(crop_band(750, 745), (2, 747));
    assert_eq!(crop_band(750, 749), (0, 749));
    assert_eq!(crop_band(120, 115), (2, 117));
}

#[test]
fn crop_band_drops_one_row_when_heights_match() {
    assert_eq!(crop_band(750, 750), (0, 749));
    assert_eq!(crop_band(10, 8), (1, 8));
}

#[test]
fn black_silhouette_mask_shows_only_the_base() {
    let mut bytes: AssetBytes = template_bytes(200, 120, 115);
    bytes.luminance_mask = png(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        200,
        115,
        Luma([0]),
    )));
    let b = AssetBundle::from_bytes(&bytes).unwrap();
    let out = compose(&solid_source(64, 64, [0, 255, 0, 255]), &b).unwrap();
    assert!(out.pixels().all(|p| p.0 == BASE_RGBA));
}

#[test]
fn shorter_band_than_mask_leaves_last_row_transparent() {
    let mut bytes = template_bytes(40, 30, 30);
    bytes.side_mask = png(DynamicImage::ImageRgba8(RgbaImage::new(40, 30)));
    let b = AssetBundle::from_bytes(&bytes).unwrap();
    let out = compose(&solid_source(8, 8, [0, 0, 255, 255]), &b).unwrap();
    assert_eq!(out.dimensions(), (40, 30));
    assert_eq!(out.get_pixel(0, 29).0, [0, 0, 0, 0]);
    assert_eq!(out.get_pixel(0, 28).0, BASE_RGBA);
}

#[test]
fn open_side_mask_replaces_buffer_with_far_layer_even_where_transparent() {
    // 40px wide template: the side mask is open everywhere and no card lands
    // on the canvas, so the far layer's transparent pixels win.
    let b = bundle(40, 30, 29);
    let out = compose(&solid_source(8, 8, [0, 0, 255, 255]), &b).unwrap();
    assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

#[test]
fn empty_source_is_rejected() {
    let b = bundle(40, 30, 29);
    let err = compose(&DynamicImage::new_rgba8(0, 0), &b).unwrap_err();
    assert!(matches!(err, BackdropError::Decode(_)));
}
