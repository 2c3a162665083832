use {
    crate::{CameraError, Frame, FrameSource, PixelFormat, Property},
    opencv::{
        core::{Mat, MatTraitConst, MatTraitConstManual},
        videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst},
    },
    std::path::Path,
};

fn backend_error(err: opencv::Error) -> CameraError {
    CameraError::Backend(err.to_string())
}

fn prop_id(property: Property) -> i32 {
    match property {
        Property::Saturation => videoio::CAP_PROP_SATURATION,
        Property::Contrast => videoio::CAP_PROP_CONTRAST,
        Property::Exposure => videoio::CAP_PROP_EXPOSURE,
        Property::Gain => videoio::CAP_PROP_GAIN,
        Property::Hue => videoio::CAP_PROP_HUE,
        Property::Focus => videoio::CAP_PROP_FOCUS,
        Property::AutoExposure => videoio::CAP_PROP_AUTO_EXPOSURE,
        Property::AutoFocus => videoio::CAP_PROP_AUTOFOCUS,
    }
}

/// Device or video file opened through OpenCV's `VideoCapture`.
pub struct OpenCvSource {
    capture: VideoCapture,
    frame: Mat,
}

impl std::fmt::Debug for OpenCvSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCvSource")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("fps", &self.fps())
            .finish()
    }
}

impl OpenCvSource {
    pub fn open_device(index: i32) -> Result<Self, CameraError> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|err| CameraError::OpenFailure(format!("device #{index}: {err}")))?;
        Self::from_capture(capture, &format!("device #{index}"))
    }

    pub fn open_file(path: &Path) -> Result<Self, CameraError> {
        let name = path.to_string_lossy();
        let capture = VideoCapture::from_file(&name, videoio::CAP_ANY)
            .map_err(|err| CameraError::OpenFailure(format!("{name}: {err}")))?;
        Self::from_capture(capture, &name)
    }

    fn from_capture(capture: VideoCapture, name: &str) -> Result<Self, CameraError> {
        if !capture.is_opened().map_err(backend_error)? {
            return Err(CameraError::OpenFailure(format!("{name}: not opened")));
        }
        Ok(Self {
            capture,
            frame: Mat::default(),
        })
    }

    fn get(&self, prop: i32) -> f64 {
        self.capture.get(prop).unwrap_or(0.0)
    }
}

impl FrameSource for OpenCvSource {
    fn grab(&mut self) -> Result<bool, CameraError> {
        self.capture.grab().map_err(backend_error)
    }

    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError> {
        if !self
            .capture
            .retrieve(&mut self.frame, 0)
            .map_err(backend_error)?
            || self.frame.empty()
        {
            return Ok(None);
        }

        let format = match self.frame.channels() {
            1 => PixelFormat::Gray8,
            3 => PixelFormat::Bgr8,
            channels => {
                return Err(CameraError::Backend(format!(
                    "unexpected {channels}-channel frame"
                )));
            }
        };
        let data = if self.frame.is_continuous() {
            self.frame.data_bytes().map_err(backend_error)?.to_vec()
        } else {
            // row padding: copy into a packed Mat first
            let packed = self.frame.try_clone().map_err(backend_error)?;
            packed.data_bytes().map_err(backend_error)?.to_vec()
        };
        Ok(Some(Frame::new(
            data,
            self.frame.cols() as u32,
            self.frame.rows() as u32,
            format,
        )))
    }

    fn width(&self) -> u32 {
        self.get(videoio::CAP_PROP_FRAME_WIDTH) as u32
    }

    fn height(&self) -> u32 {
        self.get(videoio::CAP_PROP_FRAME_HEIGHT) as u32
    }

    fn fps(&self) -> f64 {
        self.get(videoio::CAP_PROP_FPS)
    }

    fn frame_count(&self) -> usize {
        self.get(videoio::CAP_PROP_FRAME_COUNT).max(0.0) as usize
    }

    fn position(&self) -> usize {
        self.get(videoio::CAP_PROP_POS_FRAMES).max(0.0) as usize
    }

    fn set_position(&mut self, frame: usize) -> Result<(), CameraError> {
        self.capture
            .set(videoio::CAP_PROP_POS_FRAMES, frame as f64)
            .map_err(backend_error)?;
        Ok(())
    }

    fn property(&self, property: Property) -> Result<f64, CameraError> {
        self.capture.get(prop_id(property)).map_err(backend_error)
    }

    fn set_property(&mut self, property: Property, value: f64) -> Result<(), CameraError> {
        if !self
            .capture
            .set(prop_id(property), value)
            .map_err(backend_error)?
        {
            return Err(CameraError::Unsupported(format!(
                "{property:?} rejected by the capture backend"
            )));
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Err(err) = self.capture.release() {
            log::warn!("failed to release capture: {err}");
        }
    }
}
