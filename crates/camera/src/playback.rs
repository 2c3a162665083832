use {
    crate::{CameraConfig, CameraError, CameraState, engine::Engine},
    std::{
        path::{Path, PathBuf},
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Loop and pause-emulation bookkeeping for a file-backed camera.
pub(crate) struct PlaybackState {
    looping: AtomicBool,
    emulate_device_pause: AtomicBool,
    dropped: AtomicUsize,
    file_path: Option<PathBuf>,
}

impl PlaybackState {
    pub(crate) fn new(config: &CameraConfig, file_path: Option<PathBuf>) -> Self {
        Self {
            looping: AtomicBool::new(config.looping()),
            emulate_device_pause: AtomicBool::new(config.emulate_device_pause()),
            dropped: AtomicUsize::new(0),
            file_path,
        }
    }

    fn looping(&self) -> bool {
        self.looping.load(Ordering::SeqCst)
    }

    fn emulates_device_pause(&self) -> bool {
        self.emulate_device_pause.load(Ordering::SeqCst)
    }

    pub(crate) fn pause(&self, engine: &Engine) {
        engine.transition(CameraState::Started, CameraState::Paused, || {
            self.dropped.store(0, Ordering::SeqCst)
        });
    }

    pub(crate) fn resume(&self, engine: &Engine) {
        if engine.state() != CameraState::Paused {
            return;
        }
        let dropped = self.dropped.swap(0, Ordering::SeqCst);
        if self.emulates_device_pause() && dropped > 0 {
            if let Err(err) = self.catch_up(engine, dropped) {
                log::warn!("failed to skip {dropped} frames dropped while paused: {err}");
            }
        }
        self.resume_in_place(engine);
    }

    fn resume_in_place(&self, engine: &Engine) {
        engine.transition(CameraState::Paused, CameraState::Started, || {
            self.dropped.store(0, Ordering::SeqCst)
        });
    }

    /// Skip ahead by the frames a live device would have produced while paused.
    ///
    /// The target may land on the end-of-stream sentinel, so this bypasses
    /// the seek range check.
    fn catch_up(&self, engine: &Engine, dropped: usize) -> Result<(), CameraError> {
        let looping = self.looping();
        engine.with_source(|source| {
            let (position, frame_count) = (source.position(), source.frame_count());
            if frame_count == 0 {
                return Ok(());
            }
            let target = if looping {
                (position + dropped) % frame_count
            } else {
                (position + dropped).min(frame_count)
            };
            log::debug!("emulated pause: {position} -> {target} ({dropped} dropped)");
            source.set_position(target)
        })?
    }

    pub(crate) fn seek(&self, engine: &Engine, frame: usize) -> Result<(), CameraError> {
        let (position, frame_count) =
            engine.with_source(|source| (source.position(), source.frame_count()))?;
        if frame_count < 2 || frame > frame_count - 2 {
            return Err(CameraError::InvalidSeek { frame, frame_count });
        }
        if frame == position {
            return Ok(());
        }

        let was_paused = engine.state() == CameraState::Paused;
        self.pause(engine);
        let result = engine
            .with_source(|source| source.set_position(frame))
            .and_then(|set| set);
        if !was_paused {
            // frames counted during the seek itself are not playback time
            self.resume_in_place(engine);
        }
        result
    }

    /// Per-iteration bookkeeping, run by the decode loop before each grab.
    pub(crate) fn pre_tick(&self, engine: &Engine) {
        if engine.state() == CameraState::Paused {
            self.dropped.fetch_add(1, Ordering::SeqCst);
        }

        let Ok((position, frame_count)) =
            engine.with_source(|source| (source.position(), source.frame_count()))
        else {
            return;
        };
        if frame_count == 0 || position + 2 < frame_count {
            return;
        }

        if self.looping() {
            if let Err(err) = self.seek(engine, 0) {
                log::debug!("cannot rewind clip: {err}");
            }
            self.resume(engine);
        } else {
            self.pause(engine);
        }
    }
}

/// Playback controls for a camera backed by a pre-recorded clip.
///
/// Obtained from [`Camera::playback`](crate::Camera::playback).
pub struct Playback<'a> {
    engine: &'a Engine,
    state: &'a PlaybackState,
}

impl<'a> Playback<'a> {
    pub(crate) fn new(engine: &'a Engine, state: &'a PlaybackState) -> Self {
        Self { engine, state }
    }

    /// Jump to `frame`, keeping the current paused or started mode.
    ///
    /// Valid targets are `0..=frame_count - 2`; the last frame is reserved as
    /// the end-of-stream marker.
    pub fn seek(&self, frame: usize) -> Result<(), CameraError> {
        self.state.seek(self.engine, frame)
    }

    /// Total frames in the clip, 0 once the camera is stopped.
    pub fn frame_count(&self) -> usize {
        self.engine
            .with_source(|source| source.frame_count())
            .unwrap_or(0)
    }

    /// Index of the next frame to be grabbed.
    pub fn position(&self) -> usize {
        self.engine
            .with_source(|source| source.position())
            .unwrap_or(0)
    }

    pub fn looping(&self) -> bool {
        self.state.looping()
    }

    pub fn set_looping(&self, looping: bool) {
        self.state.looping.store(looping, Ordering::SeqCst);
    }

    pub fn emulates_device_pause(&self) -> bool {
        self.state.emulates_device_pause()
    }

    /// When enabled, resuming skips the frames that played while paused.
    pub fn set_emulate_device_pause(&self, emulate: bool) {
        self.state
            .emulate_device_pause
            .store(emulate, Ordering::SeqCst);
    }

    /// Decode iterations spent paused since the last pause.
    pub fn dropped_frames(&self) -> usize {
        self.state.dropped.load(Ordering::SeqCst)
    }

    /// Path of the clip being played. For stream-backed cameras this is the
    /// private temp copy.
    pub fn file_path(&self) -> Option<&Path> {
        self.state.file_path.as_deref()
    }
}

impl std::fmt::Debug for Playback<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("position", &self.position())
            .field("frame_count", &self.frame_count())
            .field("looping", &self.looping())
            .field("emulate_device_pause", &self.emulates_device_pause())
            .finish()
    }
}
