use image::Rgba;

use super::*;

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(over([1, 2, 3, 255], [200, 0, 0, 255]), [200, 0, 0, 255]);
}

#[test]
fn over_transparent_src_is_noop() {
    assert_eq!(over([10, 20, 30, 40], [255, 255, 255, 0]), [10, 20, 30, 40]);
}

#[test]
fn over_onto_transparent_dst_keeps_src() {
    let src = [100, 110, 120, 200];
    assert_eq!(over([0, 0, 0, 0], src), src);
}

#[test]
fn over_half_alpha_mixes_evenly_on_opaque_dst() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 128]);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]));
}

#[test]
fn lerp_endpoints() {
    let a = [1, 2, 3, 4];
    let b = [200, 210, 220, 230];
    assert_eq!(lerp(a, b, 0), a);
    assert_eq!(lerp(a, b, 255), b);
}

#[test]
fn alpha_composite_rejects_mismatched_sizes() {
    let mut dst = RgbaImage::new(4, 4);
    let src = RgbaImage::new(4, 5);
    assert!(alpha_composite(&mut dst, &src).is_err());
}

#[test]
fn paste_over_clips_negative_origin() {
    let mut dst = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
    let src = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
    paste_over(&mut dst, &src, (-1, -1));
    assert_eq!(dst.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(dst.get_pixel(1, 1).0, [255, 0, 0, 255]);
    assert_eq!(dst.get_pixel(2, 2).0, [0, 0, 0, 255]);
}

#[test]
fn paste_over_outside_canvas_is_noop() {
    let mut dst = RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255]));
    let before = dst.clone();
    let src = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
    paste_over(&mut dst, &src, (10, 0));
    paste_over(&mut dst, &src, (0, -3));
    assert_eq!(dst, before);
}

#[test]
fn masked_alpha_paste_overwrites_alpha_where_mask_is_opaque() {
    let mut dst = RgbaImage::from_pixel(2, 1, Rgba([50, 50, 50, 255]));
    let src = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
    let mut mask = RgbaImage::new(2, 1);
    mask.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
    paste_masked_alpha(&mut dst, &src, &mask).unwrap();
    assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(dst.get_pixel(1, 0).0, [50, 50, 50, 255]);
}

#[test]
fn masked_luma_paste_blends_gradients_and_clips() {
    let mut dst = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
    let src = RgbaImage::from_pixel(3, 1, Rgba([255, 255, 255, 255]));
    let mask = GrayImage::from_fn(3, 2, |x, _| image::Luma([[0u8, 128, 255][x as usize]]));
    paste_masked_luma(&mut dst, &src, &mask);
    assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(dst.get_pixel(1, 0).0, [128, 128, 128, 255]);
    assert_eq!(dst.get_pixel(2, 0).0, [255, 255, 255, 255]);
    // Row 1 lies outside `src`.
    assert_eq!(dst.get_pixel(2, 1).0, [0, 0, 0, 255]);
}

#[test]
fn uniform_alpha_discards_existing_transparency() {
    let mut img = RgbaImage::from_fn(2, 1, |x, _| Rgba([10, 10, 10, if x == 0 { 0 } else { 255 }]));
    set_uniform_alpha(&mut img, 77);
    assert!(img.pixels().all(|p| p[3] == 77));
}
