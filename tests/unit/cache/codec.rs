use image::{GenericImageView, Rgba};

use super::*;

fn sample() -> RgbaImage {
    RgbaImage::from_fn(33, 17, |x, y| Rgba([(x * 7) as u8, (y * 13) as u8, 200, 128]))
}

#[test]
fn png_keeps_alpha_losslessly() {
    let img = sample();
    let bytes = encode(&img, OutputFormat::Png).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(back, img);
}

#[test]
fn every_format_decodes_to_the_same_dimensions() {
    let canonical = encode(&sample(), OutputFormat::Png).unwrap();
    for format in OutputFormat::ALL {
        let bytes = transcode(&canonical, format).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (33, 17), "{format}");
    }
}

#[test]
fn derived_formats_have_no_alpha_channel() {
    let canonical = encode(&sample(), OutputFormat::Png).unwrap();
    for format in [OutputFormat::Jpg, OutputFormat::Jpeg] {
        let decoded = image::load_from_memory(&transcode(&canonical, format).unwrap()).unwrap();
        assert!(!decoded.color().has_alpha(), "{format}");
    }
}

#[test]
fn webp_is_lossless_on_color_channels() {
    let img = sample();
    let canonical = encode(&img, OutputFormat::Png).unwrap();
    let webp = transcode(&canonical, OutputFormat::Webp).unwrap();
    let back = image::load_from_memory(&webp).unwrap().to_rgb8();
    assert_eq!(back, drop_alpha(&img));
}

#[test]
fn canonical_transcode_is_identity() {
    let canonical = encode(&sample(), OutputFormat::Png).unwrap();
    assert_eq!(transcode(&canonical, OutputFormat::Png).unwrap(), canonical);
}

#[test]
fn corrupt_canonical_bytes_fail() {
    assert!(transcode(b"not a png", OutputFormat::Jpeg).is_err());
}
