use {
    crate::{CameraError, Frame, FrameSource, PixelFormat},
    image::{AnimationDecoder, DynamicImage, RgbImage, codecs::gif::GifDecoder},
    std::{fs::File, io::BufReader, path::Path},
};

// browsers play zero-delay GIF frames at 10 fps
const DEFAULT_FPS: f64 = 10.0;

/// Pre-recorded clip backed by an animated GIF, fully decoded at open.
///
/// Behaves like a seekable video file: [`position`](FrameSource::position) is
/// the index of the next frame to grab and `grab` fails softly at the end.
pub struct GifSource {
    frames: Vec<RgbImage>,
    fps: f64,
    width: u32,
    height: u32,
    position: usize,
    current: Option<usize>,
}

impl GifSource {
    pub fn open(path: &Path) -> Result<Self, CameraError> {
        let open_failure = |err: &dyn std::fmt::Display| {
            CameraError::OpenFailure(format!("{}: {err}", path.display()))
        };

        let file = File::open(path).map_err(|e| open_failure(&e))?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| open_failure(&e))?;
        let decoded = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| open_failure(&e))?;

        let total_ms: f64 = decoded
            .iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                numer as f64 / denom.max(1) as f64
            })
            .sum();
        let fps = if total_ms > 0.0 {
            decoded.len() as f64 * 1000.0 / total_ms
        } else {
            DEFAULT_FPS
        };

        let frames = decoded
            .into_iter()
            .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8())
            .collect();
        Self::from_frames(frames, fps).map_err(|e| open_failure(&e))
    }

    /// Build a clip from already-decoded frames. All frames must share one size.
    pub fn from_frames(frames: Vec<RgbImage>, fps: f64) -> Result<Self, CameraError> {
        let (width, height) = frames
            .first()
            .map(|frame| frame.dimensions())
            .ok_or_else(|| CameraError::OpenFailure("clip has no frames".to_string()))?;
        if frames.iter().any(|frame| frame.dimensions() != (width, height)) {
            return Err(CameraError::OpenFailure(
                "clip frames differ in size".to_string(),
            ));
        }
        Ok(Self {
            frames,
            fps,
            width,
            height,
            position: 0,
            current: None,
        })
    }
}

impl FrameSource for GifSource {
    fn grab(&mut self) -> Result<bool, CameraError> {
        if self.position >= self.frames.len() {
            self.current = None;
            return Ok(false);
        }
        self.current = Some(self.position);
        self.position += 1;
        Ok(true)
    }

    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError> {
        Ok(self.current.and_then(|index| self.frames.get(index)).map(|image| {
            Frame::new(image.as_raw().clone(), self.width, self.height, PixelFormat::Rgb8)
        }))
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

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, frame: usize) -> Result<(), CameraError> {
        self.position = frame.min(self.frames.len());
        self.current = None;
        Ok(())
    }

    fn release(&mut self) {
        self.frames = Vec::new();
        self.position = 0;
        self.current = None;
    }
}
