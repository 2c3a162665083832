use {
    crate::{
        CameraError, CameraState, EncodedFrame, EncodingFormat, EncodingParam, FrameEncoder,
        FrameSource, device::DeviceState, playback::PlaybackState,
    },
    base::CancelToken,
    std::{
        sync::{Arc, Mutex, MutexGuard},
        time::Duration,
    },
};

pub(crate) type FrameListener = Box<dyn FnMut(&EncodedFrame) + Send>;

/// What a camera can do beyond grabbing frames.
pub(crate) enum Capability {
    Device(DeviceState),
    Playback(PlaybackState),
}

/// State shared between a camera handle and its decode thread.
///
/// The state and source locks are never held together. Listeners run with
/// no lock held.
pub(crate) struct Engine {
    state: Mutex<CameraState>,
    source: Mutex<Option<Box<dyn FrameSource>>>,
    encoder: Arc<dyn FrameEncoder>,
    format: EncodingFormat,
    params: Vec<EncodingParam>,
    listeners: Mutex<Vec<FrameListener>>,
    latest: Mutex<Option<Arc<EncodedFrame>>>,
    capability: Capability,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Pacing between decode iterations: one frame period, never below 1 ms.
pub(crate) fn frame_interval(fps: f64) -> Duration {
    let fps = fps.max(1.0);
    Duration::from_millis(((1000.0 / fps).round() as u64).max(1))
}

impl Engine {
    pub(crate) fn new(
        source: Box<dyn FrameSource>,
        capability: Capability,
        encoder: Arc<dyn FrameEncoder>,
        format: EncodingFormat,
        params: Vec<EncodingParam>,
    ) -> Self {
        Self {
            state: Mutex::new(CameraState::Ready),
            source: Mutex::new(Some(source)),
            encoder,
            format,
            params,
            listeners: Mutex::new(Vec::new()),
            latest: Mutex::new(None),
            capability,
        }
    }

    pub(crate) fn capability(&self) -> &Capability {
        &self.capability
    }

    pub(crate) fn state(&self) -> CameraState {
        *lock(&self.state)
    }

    /// Move from `from` to `to`, running `on_change` under the state lock.
    /// Returns `false` and changes nothing if the current state is not `from`.
    pub(crate) fn transition(
        &self,
        from: CameraState,
        to: CameraState,
        on_change: impl FnOnce(),
    ) -> bool {
        let mut state = lock(&self.state);
        if *state != from {
            return false;
        }
        on_change();
        *state = to;
        true
    }

    /// Enter the terminal state, returning the one left behind.
    pub(crate) fn mark_stopped(&self) -> CameraState {
        std::mem::replace(&mut *lock(&self.state), CameraState::Stopped)
    }

    /// Run `f` against the source, or fail with `Stopped` once it is released.
    pub(crate) fn with_source<R>(
        &self,
        f: impl FnOnce(&mut dyn FrameSource) -> R,
    ) -> Result<R, CameraError> {
        let mut source = lock(&self.source);
        match source.as_mut() {
            Some(source) => Ok(f(source.as_mut())),
            None => Err(CameraError::Stopped),
        }
    }

    /// Release the source. Only the first call reaches the backend.
    pub(crate) fn release_source(&self) -> bool {
        let taken = lock(&self.source).take();
        match taken {
            Some(mut source) => {
                source.release();
                true
            }
            None => false,
        }
    }

    pub(crate) fn pause(&self) {
        match &self.capability {
            Capability::Playback(playback) => playback.pause(self),
            Capability::Device(_) => {
                self.transition(CameraState::Started, CameraState::Paused, || ());
            }
        }
    }

    pub(crate) fn resume(&self) {
        match &self.capability {
            Capability::Playback(playback) => playback.resume(self),
            Capability::Device(_) => {
                self.transition(CameraState::Paused, CameraState::Started, || ());
            }
        }
    }

    pub(crate) fn add_listener(&self, listener: FrameListener) {
        lock(&self.listeners).push(listener);
    }

    pub(crate) fn clear_listeners(&self) {
        lock(&self.listeners).clear();
    }

    pub(crate) fn latest(&self) -> Option<Arc<EncodedFrame>> {
        lock(&self.latest).clone()
    }

    /// Decode loop body, run on the camera thread until `cancel` fires.
    pub(crate) fn run(&self, cancel: &CancelToken) {
        while !cancel.is_cancelled() {
            self.iterate();
            let fps = self.with_source(|source| source.fps()).unwrap_or(0.0);
            if cancel.sleep(frame_interval(fps)) {
                break;
            }
        }
    }

    /// One decode iteration: bookkeeping, then a grab unless paused.
    ///
    /// Backend failures are logged and swallowed so one bad frame never ends
    /// the loop.
    pub(crate) fn iterate(&self) {
        if let Capability::Playback(playback) = &self.capability {
            playback.pre_tick(self);
        }
        if self.state() == CameraState::Paused {
            return;
        }
        match self.tick() {
            Ok(()) | Err(CameraError::Stopped) => {}
            Err(err) => log::error!("decode iteration failed: {err}"),
        }
    }

    fn tick(&self) -> Result<(), CameraError> {
        let grabbed = self.with_source(|source| -> Result<_, CameraError> {
            let position = source.position();
            if !source.grab()? {
                return Ok(None);
            }
            Ok(source.retrieve()?.map(|frame| (frame, position)))
        })??;

        let Some((frame, position)) = grabbed else {
            log::trace!("no frame available");
            return Ok(());
        };
        if frame.is_empty() {
            log::trace!("skipping empty frame");
            return Ok(());
        }

        let data = self.encoder.encode(&frame, self.format, &self.params)?;
        let encoded = Arc::new(EncodedFrame {
            data,
            format: self.format,
            width: frame.width,
            height: frame.height,
            position: matches!(self.capability, Capability::Playback(_)).then_some(position),
        });
        *lock(&self.latest) = Some(Arc::clone(&encoded));
        self.notify(&encoded);
        Ok(())
    }

    fn notify(&self, frame: &EncodedFrame) {
        // listeners run unlocked so they may call back into the camera
        let mut listeners = std::mem::take(&mut *lock(&self.listeners));
        for listener in listeners.iter_mut() {
            listener(frame);
        }
        if self.state() == CameraState::Stopped {
            return;
        }
        let mut slot = lock(&self.listeners);
        let added = std::mem::replace(&mut *slot, listeners);
        slot.extend(added);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval(30.0), Duration::from_millis(33));
        assert_eq!(frame_interval(25.0), Duration::from_millis(40));
        assert_eq!(frame_interval(0.0), Duration::from_millis(1000));
        assert_eq!(frame_interval(5000.0), Duration::from_millis(1));
        assert_eq!(frame_interval(f64::NAN), Duration::from_millis(1000));
    }
}
