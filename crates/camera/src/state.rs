/// Lifecycle of a camera's decode loop.
///
/// `Ready` is the only construction state and `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraState {
    #[default]
    Ready,
    Started,
    Paused,
    Stopped,
}

impl std::fmt::Display for CameraState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CameraState::Ready => "ready",
            CameraState::Started => "started",
            CameraState::Paused => "paused",
            CameraState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
