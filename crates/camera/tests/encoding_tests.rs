use {
    camera::{
        CameraConfig, CameraError, EncodingFormat, EncodingParam, Frame, FrameEncoder,
        ImageEncoder, PixelFormat,
    },
    std::sync::Arc,
};

fn gradient(width: u32, height: u32) -> Frame {
    let data = (0..width * height)
        .flat_map(|i| {
            let v = (i * 255 / (width * height)) as u8;
            [v, 255 - v, v / 2]
        })
        .collect();
    Frame::new(data, width, height, PixelFormat::Rgb8)
}

#[test]
fn test_extension_table() {
    let expected = [
        (EncodingFormat::Png, ".png"),
        (EncodingFormat::Jpeg, ".jpg"),
        (EncodingFormat::Tiff, ".tif"),
        (EncodingFormat::WebP, ".webp"),
        (EncodingFormat::Bitmap, ".bmp"),
        (EncodingFormat::Jpeg2000, ".jp2"),
        (EncodingFormat::Pbm, ".pbm"),
        (EncodingFormat::Raster, ".ras"),
    ];
    for (format, extension) in expected {
        assert_eq!(format.extension(), extension);
        assert_eq!(EncodingFormat::from_extension(extension).unwrap(), format);
    }
    assert_eq!(EncodingFormat::default(), EncodingFormat::Png);
}

#[test]
fn test_parse_aliases() {
    assert_eq!("JPEG".parse::<EncodingFormat>().unwrap(), EncodingFormat::Jpeg);
    assert_eq!("jpg".parse::<EncodingFormat>().unwrap(), EncodingFormat::Jpeg);
    assert_eq!("tiff".parse::<EncodingFormat>().unwrap(), EncodingFormat::Tiff);
    assert_eq!("Raster".parse::<EncodingFormat>().unwrap(), EncodingFormat::Raster);
    assert_eq!(EncodingFormat::WebP.to_string(), "webp");
}

#[test]
fn test_unknown_format_rejected() {
    let err = EncodingFormat::from_extension(".gifv").unwrap_err();
    assert!(matches!(err, CameraError::InvalidFormat(_)));
    assert!(err.to_string().contains(".gifv"));
    assert!("".parse::<EncodingFormat>().is_err());
}

#[test]
fn test_container_signatures() {
    let frame = gradient(8, 6);
    let encoder = ImageEncoder;
    let signature = |format: EncodingFormat| encoder.encode(&frame, format, &[]).unwrap();

    assert_eq!(&signature(EncodingFormat::Png)[..4], b"\x89PNG");
    assert_eq!(&signature(EncodingFormat::Jpeg)[..2], &[0xFF, 0xD8]);
    assert_eq!(&signature(EncodingFormat::Bitmap)[..2], b"BM");
    assert_eq!(&signature(EncodingFormat::Pbm)[..2], b"P4");

    let tiff = signature(EncodingFormat::Tiff);
    assert!(tiff.starts_with(b"II*\0") || tiff.starts_with(b"MM\0*"));

    let webp = signature(EncodingFormat::WebP);
    assert_eq!(&webp[..4], b"RIFF");
    assert_eq!(&webp[8..12], b"WEBP");
}

#[test]
fn test_png_round_trip_is_lossless() {
    let frame = gradient(5, 3);
    let png = ImageEncoder
        .encode(&frame, EncodingFormat::Png, &[EncodingParam::PngCompression(9)])
        .unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (5, 3));
    assert_eq!(decoded.as_raw(), &frame.data);
}

#[test]
fn test_jpeg_quality_changes_size() {
    let frame = gradient(64, 64);
    let low = ImageEncoder
        .encode(&frame, EncodingFormat::Jpeg, &[EncodingParam::JpegQuality(5)])
        .unwrap();
    let high = ImageEncoder
        .encode(&frame, EncodingFormat::Jpeg, &[EncodingParam::JpegQuality(100)])
        .unwrap();
    assert!(low.len() < high.len());
}

#[test]
fn test_bgr_and_gray_sources_encode() {
    let bgr = Frame::new(vec![255, 0, 0], 1, 1, PixelFormat::Bgr8);
    let png = ImageEncoder.encode(&bgr, EncodingFormat::Png, &[]).unwrap();
    let pixel = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(pixel.as_raw(), &[0, 0, 255]);

    let gray = Frame::new(vec![7, 9], 2, 1, PixelFormat::Gray8);
    let png = ImageEncoder.encode(&gray, EncodingFormat::Png, &[]).unwrap();
    let pixels = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(pixels.as_raw(), &[7, 7, 7, 9, 9, 9]);
}

#[test]
fn test_formats_outside_image_encoder() {
    let encoder = ImageEncoder;
    assert!(!encoder.supports(EncodingFormat::Jpeg2000));
    assert!(!encoder.supports(EncodingFormat::Raster));
    assert!(encoder.supports(EncodingFormat::Pbm));

    let err = encoder
        .encode(&gradient(2, 2), EncodingFormat::Raster, &[])
        .unwrap_err();
    assert!(matches!(err, CameraError::InvalidFormat(_)));
}

#[test]
fn test_pbm_thresholds_to_black_and_white() {
    let frame = Frame::new(vec![10, 200, 127, 128], 2, 2, PixelFormat::Gray8);
    let pbm = ImageEncoder
        .encode(&frame, EncodingFormat::Pbm, &[])
        .unwrap();
    assert_eq!(&pbm[..2], b"P4");

    let decoded = image::load_from_memory(&pbm).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.as_raw(), &[0, 255, 0, 255]);
}

#[test]
fn test_all_white_frame_encodes_as_pbm() {
    let frame = Frame::new(vec![255; 3 * 9 * 4], 9, 4, PixelFormat::Rgb8);
    let pbm = ImageEncoder
        .encode(&frame, EncodingFormat::Pbm, &[])
        .unwrap();
    let decoded = image::load_from_memory(&pbm).unwrap().to_luma8();
    assert!(decoded.pixels().all(|pixel| pixel.0[0] == 255));
}

/// Writes the raw bytes and accepts every format and parameter.
struct PassThrough;

impl FrameEncoder for PassThrough {
    fn supports(&self, _format: EncodingFormat) -> bool {
        true
    }

    fn encode(
        &self,
        frame: &Frame,
        _format: EncodingFormat,
        _params: &[EncodingParam],
    ) -> Result<Vec<u8>, CameraError> {
        Ok(frame.data.clone())
    }
}

#[test]
fn test_unhonored_params_rejected_by_config() {
    let optimize = CameraConfig::default()
        .with_format(EncodingFormat::Jpeg)
        .with_param(EncodingParam::JpegOptimize(true));
    let err = optimize.encoder().err().unwrap();
    assert!(matches!(err, CameraError::InvalidFormat(_)));
    assert!(err.to_string().contains("JpegOptimize"));

    let lossy_webp = CameraConfig::default()
        .with_format(EncodingFormat::WebP)
        .with_param(EncodingParam::WebpQuality(75));
    assert!(matches!(
        lossy_webp.encoder(),
        Err(CameraError::InvalidFormat(_))
    ));

    let honored = CameraConfig::default()
        .with_format(EncodingFormat::WebP)
        .with_params([
            EncodingParam::WebpQuality(100),
            EncodingParam::JpegOptimize(false),
            EncodingParam::JpegQuality(80),
        ]);
    assert!(honored.encoder().is_ok());
}

#[test]
fn test_custom_encoder_takes_any_param() {
    let config = CameraConfig::default()
        .with_format(EncodingFormat::Raster)
        .with_params([
            EncodingParam::JpegOptimize(true),
            EncodingParam::WebpQuality(10),
        ])
        .with_encoder(Arc::new(PassThrough));
    let encoder = config.encoder().unwrap();
    let frame = Frame::new(vec![1, 2, 3], 1, 1, PixelFormat::Rgb8);
    assert_eq!(
        encoder
            .encode(&frame, config.format(), config.params())
            .unwrap(),
        vec![1, 2, 3]
    );
}
