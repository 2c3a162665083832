use {
    crate::{
        Backend, CameraConfig, CameraError, CameraState, DeviceControls, EncodedFrame,
        FrameSource, Playback,
        device::DeviceState,
        engine::{Capability, Engine, lock},
        playback::PlaybackState,
        temp::TempFile,
    },
    base::CancelToken,
    std::{
        io::Read,
        path::{Path, PathBuf},
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
        thread::{self, JoinHandle},
    },
};

static NEXT_CAMERA_ID: AtomicUsize = AtomicUsize::new(0);

/// A frame source driven on its own decode thread.
///
/// Every camera is constructed `Ready`. [`start`](Camera::start) spawns the
/// decode thread, [`pause`](Camera::pause) and [`resume`](Camera::resume)
/// toggle between `Started` and `Paused`, and [`stop`](Camera::stop) ends the
/// thread and releases the source for good. Requests that do not apply to the
/// current state are ignored.
///
/// Dropping a camera stops it and waits for the decode thread.
pub struct Camera {
    name: String,
    engine: Arc<Engine>,
    cancel: CancelToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
    temp_file: Mutex<Option<TempFile>>,
}

impl std::fmt::Debug for Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Camera")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Camera {
    /// Open a live capture device through `backend`.
    pub fn open_device(
        backend: &dyn Backend,
        device: &str,
        config: CameraConfig,
    ) -> Result<Self, CameraError> {
        config.encoder()?;
        let source = backend.open_device(device)?;
        log::info!("opened device {device}");
        Self::with_device_source(source, config)
    }

    /// Open a pre-recorded clip through `backend`.
    pub fn open_file(
        backend: &dyn Backend,
        path: impl AsRef<Path>,
        config: CameraConfig,
    ) -> Result<Self, CameraError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CameraError::SourceNotFound(path.to_path_buf()));
        }
        config.encoder()?;
        let source = backend.open_file(path)?;
        log::info!("opened clip {}", path.display());
        Self::build(source, config, Some(path.to_path_buf()), None)
    }

    /// Copy `reader` to a private temp file and play it as a clip.
    ///
    /// The temp file is deleted when the camera is disposed.
    pub fn open_stream(
        backend: &dyn Backend,
        reader: impl Read,
        config: CameraConfig,
    ) -> Result<Self, CameraError> {
        config.encoder()?;
        let temp_file = TempFile::from_reader(reader)?;
        let source = backend.open_file(temp_file.path())?;
        log::info!("opened stream via {}", temp_file.path().display());
        let path = temp_file.path().to_path_buf();
        Self::build(source, config, Some(path), Some(temp_file))
    }

    /// Wrap an already open live source.
    pub fn with_device_source(
        source: Box<dyn FrameSource>,
        config: CameraConfig,
    ) -> Result<Self, CameraError> {
        Self::assemble(source, config, Capability::Device(DeviceState::default()), None)
    }

    /// Wrap an already open pre-recorded source.
    pub fn with_playback_source(
        source: Box<dyn FrameSource>,
        config: CameraConfig,
    ) -> Result<Self, CameraError> {
        Self::build(source, config, None, None)
    }

    fn build(
        source: Box<dyn FrameSource>,
        config: CameraConfig,
        file_path: Option<PathBuf>,
        temp_file: Option<TempFile>,
    ) -> Result<Self, CameraError> {
        let capability = Capability::Playback(PlaybackState::new(&config, file_path));
        Self::assemble(source, config, capability, temp_file)
    }

    fn assemble(
        mut source: Box<dyn FrameSource>,
        config: CameraConfig,
        capability: Capability,
        temp_file: Option<TempFile>,
    ) -> Result<Self, CameraError> {
        let encoder = match config.encoder() {
            Ok(encoder) => encoder,
            Err(err) => {
                source.release();
                return Err(err);
            }
        };
        let engine = Engine::new(
            source,
            capability,
            encoder,
            config.format(),
            config.params().to_vec(),
        );
        Ok(Self {
            name: format!("camera-{}", NEXT_CAMERA_ID.fetch_add(1, Ordering::Relaxed)),
            engine: Arc::new(engine),
            cancel: CancelToken::new(),
            worker: Mutex::new(None),
            disposed: AtomicBool::new(false),
            temp_file: Mutex::new(temp_file),
        })
    }

    /// Start decoding. Only has an effect on a `Ready` camera.
    pub fn start(&self) -> Result<(), CameraError> {
        let mut worker = lock(&self.worker);
        if !self
            .engine
            .transition(CameraState::Ready, CameraState::Started, || ())
        {
            return Ok(());
        }

        let engine = Arc::clone(&self.engine);
        let cancel = self.cancel.clone();
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || engine.run(&cancel));
        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                log::info!("{}: started", self.name);
                Ok(())
            }
            Err(err) => {
                self.engine
                    .transition(CameraState::Started, CameraState::Ready, || ());
                Err(err.into())
            }
        }
    }

    /// Suspend frame delivery. Only has an effect on a `Started` camera.
    pub fn pause(&self) {
        self.engine.pause();
    }

    /// Continue frame delivery. Only has an effect on a `Paused` camera.
    pub fn resume(&self) {
        self.engine.resume();
    }

    /// Stop decoding and release the source. Idempotent.
    ///
    /// With `wait`, blocks until the decode thread has exited. Called from
    /// the decode thread itself (inside a frame listener) it never waits.
    pub fn stop(&self, wait: bool) {
        let previous = self.engine.mark_stopped();
        if previous == CameraState::Stopped {
            return;
        }
        self.cancel.cancel();

        let worker = lock(&self.worker).take();
        if let Some(handle) = worker {
            if wait && handle.thread().id() != thread::current().id() {
                if handle.join().is_err() {
                    log::error!("{}: decode thread panicked", self.name);
                }
            }
        }

        self.engine.clear_listeners();
        self.engine.release_source();
        log::info!("{}: stopped (was {previous})", self.name);
    }

    /// Stop, wait for the decode thread and delete any temp clip. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop(true);
        drop(lock(&self.temp_file).take());
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Register a listener for every encoded frame.
    ///
    /// Listeners run on the decode thread, in registration order, and are
    /// dropped when the camera stops.
    pub fn on_frame(&self, listener: impl FnMut(&EncodedFrame) + Send + 'static) {
        if self.state() == CameraState::Stopped {
            return;
        }
        self.engine.add_listener(Box::new(listener));
    }

    /// The most recently encoded frame.
    pub fn latest_frame(&self) -> Option<Arc<EncodedFrame>> {
        self.engine.latest()
    }

    /// Controls for device-backed cameras, `None` for clips.
    pub fn device(&self) -> Option<DeviceControls<'_>> {
        match self.engine.capability() {
            Capability::Device(state) => Some(DeviceControls::new(&self.engine, state)),
            Capability::Playback(_) => None,
        }
    }

    /// Controls for file-backed cameras, `None` for devices.
    pub fn playback(&self) -> Option<Playback<'_>> {
        match self.engine.capability() {
            Capability::Playback(state) => Some(Playback::new(&self.engine, state)),
            Capability::Device(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CameraState {
        self.engine.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == CameraState::Ready
    }

    pub fn is_started(&self) -> bool {
        self.state() == CameraState::Started
    }

    pub fn is_paused(&self) -> bool {
        self.state() == CameraState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == CameraState::Stopped
    }

    /// Frame width, 0 once the source is released.
    pub fn width(&self) -> u32 {
        self.engine.with_source(|source| source.width()).unwrap_or(0)
    }

    /// Frame height, 0 once the source is released.
    pub fn height(&self) -> u32 {
        self.engine.with_source(|source| source.height()).unwrap_or(0)
    }

    pub fn size(&self) -> (u32, u32) {
        self.engine
            .with_source(|source| (source.width(), source.height()))
            .unwrap_or((0, 0))
    }

    /// Source frame rate, 0 once the source is released.
    pub fn frames_per_second(&self) -> f64 {
        self.engine.with_source(|source| source.fps()).unwrap_or(0.0)
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.dispose();
    }
}
