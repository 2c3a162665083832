use {
    crate::{CameraError, Frame, FrameSource, PixelFormat, Property},
    v4l::{
        Device, FourCC,
        buffer::Type,
        control::{Control, Value},
        io::{mmap::Stream as MmapStream, traits::CaptureStream},
        video::Capture,
    },
};

const BUFFER_COUNT: u32 = 4;

// V4L2_CID_BASE and V4L2_CID_CAMERA_CLASS_BASE offsets
const CID_CONTRAST: u32 = 0x0098_0901;
const CID_SATURATION: u32 = 0x0098_0902;
const CID_HUE: u32 = 0x0098_0903;
const CID_GAIN: u32 = 0x0098_0913;
const CID_EXPOSURE_AUTO: u32 = 0x009a_0901;
const CID_EXPOSURE_ABSOLUTE: u32 = 0x009a_0902;
const CID_FOCUS_ABSOLUTE: u32 = 0x009a_090a;
const CID_FOCUS_AUTO: u32 = 0x009a_090c;

// V4L2_EXPOSURE_MANUAL and V4L2_EXPOSURE_APERTURE_PRIORITY
const EXPOSURE_MANUAL: i64 = 1;
const EXPOSURE_APERTURE_PRIORITY: i64 = 3;

fn control_id(property: Property) -> u32 {
    match property {
        Property::Saturation => CID_SATURATION,
        Property::Contrast => CID_CONTRAST,
        Property::Exposure => CID_EXPOSURE_ABSOLUTE,
        Property::Gain => CID_GAIN,
        Property::Hue => CID_HUE,
        Property::Focus => CID_FOCUS_ABSOLUTE,
        Property::AutoExposure => CID_EXPOSURE_AUTO,
        Property::AutoFocus => CID_FOCUS_AUTO,
    }
}

/// Live capture from a V4L2 device node, streamed through mmap buffers.
pub struct V4l2Source {
    device: Device,
    stream: Option<MmapStream<'static>>,
    width: u32,
    height: u32,
    format: PixelFormat,
    fps: f64,
    pending: Vec<u8>,
}

impl std::fmt::Debug for V4l2Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Source")
            .field("device", &"<v4l::Device>")
            .field("streaming", &self.stream.is_some())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("fps", &self.fps)
            .finish()
    }
}

impl V4l2Source {
    /// Open `path` (for example `/dev/video0`) in its current format.
    pub fn open(path: &str) -> Result<Self, CameraError> {
        let open_failure = |err: std::io::Error| CameraError::OpenFailure(format!("{path}: {err}"));

        let device = Device::with_path(path).map_err(open_failure)?;
        let format = Capture::format(&device).map_err(open_failure)?;
        let pixel_format = match &format.fourcc.repr {
            b"YUYV" => PixelFormat::Yuyv,
            b"MJPG" => PixelFormat::Mjpeg,
            _ => {
                // ask for YUYV, which every UVC device offers
                let yuyv = v4l::Format::new(format.width, format.height, FourCC::new(b"YUYV"));
                let actual = Capture::set_format(&device, &yuyv).map_err(open_failure)?;
                if actual.fourcc != FourCC::new(b"YUYV") {
                    return Err(CameraError::OpenFailure(format!(
                        "{path}: unsupported pixel format {}",
                        actual.fourcc
                    )));
                }
                PixelFormat::Yuyv
            }
        };

        let params = Capture::params(&device).map_err(open_failure)?;
        let fps = if params.interval.numerator > 0 {
            params.interval.denominator as f64 / params.interval.numerator as f64
        } else {
            0.0
        };

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(open_failure)?;

        log::debug!(
            "{path}: {}x{} {pixel_format:?} at {fps:.1} fps",
            format.width,
            format.height
        );
        Ok(Self {
            device,
            stream: Some(stream),
            width: format.width,
            height: format.height,
            format: pixel_format,
            fps,
            pending: Vec::new(),
        })
    }
}

impl FrameSource for V4l2Source {
    fn grab(&mut self) -> Result<bool, CameraError> {
        self.pending.clear();
        let Some(stream) = self.stream.as_mut() else {
            return Ok(false);
        };
        match CaptureStream::next(stream) {
            Ok((data, metadata)) => {
                let used = (metadata.bytesused as usize).min(data.len());
                let used = if used == 0 { data.len() } else { used };
                self.pending.extend_from_slice(&data[..used]);
                Ok(!self.pending.is_empty())
            }
            Err(err) => {
                log::debug!("v4l2 dequeue failed: {err}");
                Ok(false)
            }
        }
    }

    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        Ok(Some(Frame::new(
            std::mem::take(&mut self.pending),
            self.width,
            self.height,
            self.format,
        )))
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn property(&self, property: Property) -> Result<f64, CameraError> {
        let control = self.device.control(control_id(property))?;
        let raw = match control.value {
            Value::Integer(value) => value as f64,
            Value::Boolean(value) => f64::from(u8::from(value)),
            _ => {
                return Err(CameraError::Unsupported(format!(
                    "{property:?} has a non-numeric control"
                )));
            }
        };
        Ok(match property {
            Property::AutoExposure if raw as i64 == EXPOSURE_MANUAL => 0.75,
            Property::AutoExposure => 0.25,
            _ => raw,
        })
    }

    fn set_property(&mut self, property: Property, value: f64) -> Result<(), CameraError> {
        let raw = match property {
            Property::AutoExposure if value < 0.5 => EXPOSURE_APERTURE_PRIORITY,
            Property::AutoExposure => EXPOSURE_MANUAL,
            _ => value.round() as i64,
        };
        self.device.set_control(Control {
            id: control_id(property),
            value: Value::Integer(raw),
        })?;
        Ok(())
    }

    fn release(&mut self) {
        self.stream.take();
        self.pending = Vec::new();
    }
}
