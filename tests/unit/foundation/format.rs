use super::*;

#[test]
fn parses_every_supported_extension() {
    for f in OutputFormat::ALL {
        assert_eq!(f.extension().parse::<OutputFormat>().unwrap(), f);
    }
    assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
    assert_eq!(".webp".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
}

#[test]
fn rejects_unknown_extensions() {
    for bad in ["bmp", "gif", "", "png8", "tiff"] {
        let err = bad.parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, BackdropError::UnsupportedFormat { .. }), "{bad}");
    }
}

#[test]
fn jpeg_spellings_share_content_type_but_not_extension() {
    assert_eq!(
        OutputFormat::Jpg.content_type(),
        OutputFormat::Jpeg.content_type()
    );
    assert_ne!(OutputFormat::Jpg.extension(), OutputFormat::Jpeg.extension());
}

#[test]
fn only_png_is_canonical() {
    let canonical = OutputFormat::ALL
        .into_iter()
        .filter(|f| f.is_canonical())
        .collect::<Vec<_>>();
    assert_eq!(canonical, vec![OutputFormat::Png]);
}
