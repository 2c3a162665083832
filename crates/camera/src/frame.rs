use crate::encoding::EncodingFormat;

/// Pixel layout of a raw frame as delivered by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Bgr8,
    Gray8,
    /// Packed YUV 4:2:2, `[Y0, U, Y1, V]` per pixel pair.
    Yuyv,
    /// Compressed MJPEG payload; `data` holds one JPEG image.
    Mjpeg,
}

/// One raw frame retrieved from a [`FrameSource`](crate::FrameSource).
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.width == 0 || self.height == 0
    }
}

/// The product of one successful grab: encoded bytes plus the container they are in.
///
/// Only the latest encoded frame is kept; each grab replaces it.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
    /// Playback position of this frame, for file-backed cameras.
    pub position: Option<usize>,
}
