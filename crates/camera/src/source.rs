use {
    crate::{CameraError, Frame, GifSource},
    std::{fs::File, io::Read, path::Path},
};

/// Adjustable capture properties, in the units the backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Saturation,
    Contrast,
    Exposure,
    Gain,
    Hue,
    Focus,
    /// Continuous by backend convention: about 0.25 means on, 0.75 means off.
    AutoExposure,
    AutoFocus,
}

/// An open device or file that yields raw frames.
///
/// A source is driven by exactly one camera thread at a time; grabbing and
/// repositioning must never interleave, which the owning camera guarantees by
/// keeping the source behind a lock.
pub trait FrameSource: Send {
    /// Advance to the next frame. `Ok(false)` means no frame is available right
    /// now (end of stream, device hiccup) and is not an error.
    fn grab(&mut self) -> Result<bool, CameraError>;

    /// Decode the most recently grabbed frame, if any.
    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn fps(&self) -> f64;

    /// Number of frames in a pre-recorded source, 0 for live devices.
    fn frame_count(&self) -> usize {
        0
    }

    /// Index of the next frame [`grab`](FrameSource::grab) will return.
    fn position(&self) -> usize {
        0
    }

    fn set_position(&mut self, _frame: usize) -> Result<(), CameraError> {
        Err(CameraError::Unsupported("source is not seekable".to_string()))
    }

    fn property(&self, property: Property) -> Result<f64, CameraError> {
        Err(CameraError::Unsupported(format!("{property:?} is not readable on this source")))
    }

    fn set_property(&mut self, property: Property, _value: f64) -> Result<(), CameraError> {
        Err(CameraError::Unsupported(format!("{property:?} is not writable on this source")))
    }

    /// Give the underlying device or file handle back. Called exactly once, by
    /// the owning camera, after its decode thread can no longer touch the source.
    fn release(&mut self);
}

/// Opens sources by device identifier or file path.
pub trait Backend {
    fn open_device(&self, device: &str) -> Result<Box<dyn FrameSource>, CameraError>;

    fn open_file(&self, path: &Path) -> Result<Box<dyn FrameSource>, CameraError>;
}

/// Dispatches to the backends compiled into this build.
///
/// Animated GIF clips are always readable. Devices need the `v4l2` or
/// `opencv` feature; other video containers need `opencv`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl Backend for NativeBackend {
    #[allow(unreachable_code)]
    fn open_device(&self, device: &str) -> Result<Box<dyn FrameSource>, CameraError> {
        #[cfg(feature = "opencv")]
        if let Ok(index) = device.parse::<i32>() {
            return Ok(Box::new(crate::cv::OpenCvSource::open_device(index)?));
        }

        #[cfg(feature = "v4l2")]
        return Ok(Box::new(crate::v4l2::V4l2Source::open(device)?));

        #[cfg(feature = "opencv")]
        if let Some(index) = device.strip_prefix("/dev/video").and_then(|n| n.parse::<i32>().ok()) {
            return Ok(Box::new(crate::cv::OpenCvSource::open_device(index)?));
        }

        Err(CameraError::OpenFailure(format!(
            "no device backend available for \"{device}\""
        )))
    }

    #[allow(unreachable_code)]
    fn open_file(&self, path: &Path) -> Result<Box<dyn FrameSource>, CameraError> {
        let mut header = [0u8; 16];
        let read = File::open(path)
            .and_then(|mut file| file.read(&mut header))
            .map_err(|err| CameraError::OpenFailure(format!("{}: {err}", path.display())))?;

        if matches!(image::guess_format(&header[..read]), Ok(image::ImageFormat::Gif)) {
            return Ok(Box::new(GifSource::open(path)?));
        }

        #[cfg(feature = "opencv")]
        return Ok(Box::new(crate::cv::OpenCvSource::open_file(path)?));

        Err(CameraError::OpenFailure(format!(
            "{}: unrecognized container (build with the opencv feature for video files)",
            path.display()
        )))
    }
}
