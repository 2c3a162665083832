#![allow(dead_code)]

use {
    camera::{Backend, CameraError, Frame, FrameSource, PixelFormat, Property},
    std::{
        collections::{HashMap, HashSet},
        path::{Path, PathBuf},
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::{Duration, Instant},
    },
};

/// What a scripted source observed, shared with the test.
#[derive(Default)]
pub struct Probe {
    pub grabs: AtomicUsize,
    pub releases: AtomicUsize,
    pub property_writes: Mutex<Vec<(Property, f64)>>,
}

impl Probe {
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<(Property, f64)> {
        self.property_writes.lock().unwrap().clone()
    }
}

/// In-memory source. Every frame is a 2x2 RGB image whose first byte is the
/// index of the grab that produced it.
pub struct ScriptedSource {
    probe: Arc<Probe>,
    frame_count: usize,
    position: usize,
    fps: f64,
    misses: HashSet<usize>,
    failures: HashSet<usize>,
    properties: HashMap<Property, f64>,
    current: Option<usize>,
}

impl ScriptedSource {
    /// A live device: endless, not seekable.
    pub fn live(probe: &Arc<Probe>) -> Self {
        Self::clip(probe, 0)
    }

    /// A pre-recorded clip of `frame_count` frames.
    pub fn clip(probe: &Arc<Probe>, frame_count: usize) -> Self {
        Self {
            probe: Arc::clone(probe),
            frame_count,
            position: 0,
            fps: 200.0,
            misses: HashSet::new(),
            failures: HashSet::new(),
            properties: HashMap::new(),
            current: None,
        }
    }

    /// Report "no frame" for the given grab indices.
    pub fn missing_at(mut self, grabs: &[usize]) -> Self {
        self.misses.extend(grabs);
        self
    }

    /// Fail retrieval with a backend error for the given grab indices.
    pub fn failing_at(mut self, grabs: &[usize]) -> Self {
        self.failures.extend(grabs);
        self
    }

    pub fn boxed(self) -> Box<dyn FrameSource> {
        Box::new(self)
    }
}

impl FrameSource for ScriptedSource {
    fn grab(&mut self) -> Result<bool, CameraError> {
        let index = self.probe.grabs.fetch_add(1, Ordering::SeqCst);
        self.current = None;
        if self.misses.contains(&index) {
            return Ok(false);
        }
        if self.frame_count > 0 {
            if self.position >= self.frame_count {
                return Ok(false);
            }
            self.position += 1;
        }
        self.current = Some(index);
        Ok(true)
    }

    fn retrieve(&mut self) -> Result<Option<Frame>, CameraError> {
        let Some(index) = self.current.take() else {
            return Ok(None);
        };
        if self.failures.contains(&index) {
            return Err(CameraError::Backend(format!("corrupt frame {index}")));
        }
        let mut data = vec![0u8; 2 * 2 * 3];
        data[0] = index as u8;
        Ok(Some(Frame::new(data, 2, 2, PixelFormat::Rgb8)))
    }

    fn width(&self) -> u32 {
        2
    }

    fn height(&self) -> u32 {
        2
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, frame: usize) -> Result<(), CameraError> {
        if self.frame_count == 0 {
            return Err(CameraError::Unsupported("live source".to_string()));
        }
        self.position = frame.min(self.frame_count);
        Ok(())
    }

    fn property(&self, property: Property) -> Result<f64, CameraError> {
        Ok(self.properties.get(&property).copied().unwrap_or(0.0))
    }

    fn set_property(&mut self, property: Property, value: f64) -> Result<(), CameraError> {
        self.probe
            .property_writes
            .lock()
            .unwrap()
            .push((property, value));
        self.properties.insert(property, value);
        Ok(())
    }

    fn release(&mut self) {
        self.probe.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend that hands out scripted clips and records what it was asked to open.
#[derive(Default)]
pub struct ScriptedBackend {
    pub probe: Arc<Probe>,
    pub frame_count: usize,
    pub opened: Mutex<Vec<PathBuf>>,
    pub opened_contents: Mutex<Vec<Vec<u8>>>,
}

impl ScriptedBackend {
    pub fn with_frames(frame_count: usize) -> Self {
        Self {
            frame_count,
            ..Self::default()
        }
    }
}

impl Backend for ScriptedBackend {
    fn open_device(&self, device: &str) -> Result<Box<dyn FrameSource>, CameraError> {
        if device.is_empty() {
            return Err(CameraError::OpenFailure("empty device id".to_string()));
        }
        Ok(ScriptedSource::live(&self.probe).boxed())
    }

    fn open_file(&self, path: &Path) -> Result<Box<dyn FrameSource>, CameraError> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        self.opened_contents
            .lock()
            .unwrap()
            .push(std::fs::read(path)?);
        Ok(ScriptedSource::clip(&self.probe, self.frame_count).boxed())
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

pub const TIMEOUT: Duration = Duration::from_secs(5);
