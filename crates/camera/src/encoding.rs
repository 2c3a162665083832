use {
    crate::{CameraError, Frame, convert},
    image::{
        ExtendedColorType, ImageEncoder as _,
        codecs::{
            bmp::BmpEncoder,
            jpeg::JpegEncoder,
            png::{CompressionType, FilterType, PngEncoder},
            pnm::{PnmEncoder, PnmSubtype, SampleEncoding},
            tiff::TiffEncoder,
            webp::WebPEncoder,
        },
    },
    std::{fmt, io::Cursor, str::FromStr},
};

/// Container format each grabbed frame is encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
    WebP,
    Bitmap,
    Jpeg2000,
    Pbm,
    Raster,
}

impl EncodingFormat {
    pub const ALL: [EncodingFormat; 8] = [
        EncodingFormat::Png,
        EncodingFormat::Jpeg,
        EncodingFormat::Tiff,
        EncodingFormat::WebP,
        EncodingFormat::Bitmap,
        EncodingFormat::Jpeg2000,
        EncodingFormat::Pbm,
        EncodingFormat::Raster,
    ];

    /// File extension (with leading dot) this format is written with.
    pub fn extension(self) -> &'static str {
        match self {
            EncodingFormat::Png => ".png",
            EncodingFormat::Jpeg => ".jpg",
            EncodingFormat::Tiff => ".tif",
            EncodingFormat::WebP => ".webp",
            EncodingFormat::Bitmap => ".bmp",
            EncodingFormat::Jpeg2000 => ".jp2",
            EncodingFormat::Pbm => ".pbm",
            EncodingFormat::Raster => ".ras",
        }
    }

    /// Look a format up by extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Result<Self, CameraError> {
        let wanted = extension.trim_start_matches('.').to_ascii_lowercase();
        match wanted.as_str() {
            "jpeg" => Ok(EncodingFormat::Jpeg),
            "tiff" => Ok(EncodingFormat::Tiff),
            _ => Self::ALL
                .into_iter()
                .find(|format| format.extension()[1..] == wanted)
                .ok_or_else(|| {
                    CameraError::InvalidFormat(format!("\"{extension}\" is not a valid export format"))
                }),
        }
    }
}

impl FromStr for EncodingFormat {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(EncodingFormat::Png),
            "webp" => Ok(EncodingFormat::WebP),
            "bitmap" => Ok(EncodingFormat::Bitmap),
            "jpeg2000" => Ok(EncodingFormat::Jpeg2000),
            "raster" => Ok(EncodingFormat::Raster),
            _ => Self::from_extension(s),
        }
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension()[1..])
    }
}

/// Encoder tuning applied to every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodingParam {
    /// 0–100, higher is better.
    JpegQuality(u8),
    /// Optimized Huffman tables. [`ImageEncoder`] cannot produce them.
    JpegOptimize(bool),
    /// 0–9, higher is smaller and slower.
    PngCompression(u8),
    /// 1–100. [`ImageEncoder`] only writes lossless WebP, i.e. quality 100.
    WebpQuality(u8),
}

/// Turns raw frames into encoded container bytes.
pub trait FrameEncoder: Send + Sync {
    fn supports(&self, format: EncodingFormat) -> bool;

    /// Whether `param` is honored. Cameras refuse configurations carrying a
    /// parameter their encoder would silently drop.
    fn supports_param(&self, _param: EncodingParam) -> bool {
        true
    }

    fn encode(
        &self,
        frame: &Frame,
        format: EncodingFormat,
        params: &[EncodingParam],
    ) -> Result<Vec<u8>, CameraError>;
}

/// Default encoder on top of the `image` crate.
///
/// Produces PNG, JPEG, TIFF, lossless WebP, BMP and binary PBM.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageEncoder;

impl FrameEncoder for ImageEncoder {
    fn supports(&self, format: EncodingFormat) -> bool {
        !matches!(format, EncodingFormat::Jpeg2000 | EncodingFormat::Raster)
    }

    fn supports_param(&self, param: EncodingParam) -> bool {
        match param {
            EncodingParam::JpegQuality(_) | EncodingParam::PngCompression(_) => true,
            EncodingParam::JpegOptimize(optimize) => !optimize,
            EncodingParam::WebpQuality(quality) => quality >= 100,
        }
    }

    fn encode(
        &self,
        frame: &Frame,
        format: EncodingFormat,
        params: &[EncodingParam],
    ) -> Result<Vec<u8>, CameraError> {
        let rgb = convert::to_rgb(frame)?;
        let (width, height) = rgb.dimensions();
        let mut out = Vec::new();

        match format {
            EncodingFormat::Png => {
                let compression = match png_compression(params) {
                    0..=3 => CompressionType::Fast,
                    4..=6 => CompressionType::Default,
                    _ => CompressionType::Best,
                };
                PngEncoder::new_with_quality(&mut out, compression, FilterType::Adaptive)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
            EncodingFormat::Jpeg => {
                JpegEncoder::new_with_quality(&mut out, jpeg_quality(params))
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
            EncodingFormat::Tiff => {
                TiffEncoder::new(Cursor::new(&mut out))
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
            EncodingFormat::WebP => {
                WebPEncoder::new_lossless(&mut out)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
            EncodingFormat::Bitmap => {
                BmpEncoder::new(&mut out)
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?;
            }
            EncodingFormat::Pbm => {
                // PBM samples are bits and 1 is black
                let bits: Vec<u8> = image::DynamicImage::ImageRgb8(rgb)
                    .to_luma8()
                    .into_raw()
                    .into_iter()
                    .map(|l| if l < 128 { 1 } else { 0 })
                    .collect();
                PnmEncoder::new(&mut out)
                    .with_subtype(PnmSubtype::Bitmap(SampleEncoding::Binary))
                    .write_image(&bits, width, height, ExtendedColorType::L8)?;
            }
            EncodingFormat::Jpeg2000 | EncodingFormat::Raster => {
                return Err(CameraError::InvalidFormat(format!(
                    "{format} is not supported by the image encoder"
                )));
            }
        }
        Ok(out)
    }
}

fn jpeg_quality(params: &[EncodingParam]) -> u8 {
    params
        .iter()
        .rev()
        .find_map(|param| match param {
            EncodingParam::JpegQuality(quality) => Some((*quality).clamp(1, 100)),
            _ => None,
        })
        .unwrap_or(95)
}

fn png_compression(params: &[EncodingParam]) -> u8 {
    params
        .iter()
        .rev()
        .find_map(|param| match param {
            EncodingParam::PngCompression(level) => Some((*level).min(9)),
            _ => None,
        })
        .unwrap_or(3)
}
