use {
    crate::source::Property,
    std::{fmt, path::PathBuf},
};

#[derive(Debug)]
pub enum CameraError {
    /// File-backed construction was given a path that does not exist.
    SourceNotFound(PathBuf),
    /// The backend could not open the device or file.
    OpenFailure(String),
    /// Seek target outside `[0, frame_count - 2]`.
    InvalidSeek { frame: usize, frame_count: usize },
    InvalidPropertyValue { property: Property, value: f64 },
    /// Unknown container tag, or one the configured encoder cannot produce.
    InvalidFormat(String),
    /// The source or backend does not implement the request.
    Unsupported(String),
    /// Error raised by the decode/encode backend.
    Backend(String),
    /// The camera has been stopped and its source released.
    Stopped,
    Io(std::io::Error),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::SourceNotFound(path) => write!(f, "source not found: {}", path.display()),
            CameraError::OpenFailure(msg) => write!(f, "failed to open source: {msg}"),
            CameraError::InvalidSeek { frame, frame_count } => write!(
                f,
                "cannot seek to frame {frame}: valid range is 0..={} for {frame_count} frames",
                frame_count.saturating_sub(2)
            ),
            CameraError::InvalidPropertyValue { property, value } => {
                write!(f, "invalid value {value} for {property:?}")
            }
            CameraError::InvalidFormat(msg) => write!(f, "invalid encoding format: {msg}"),
            CameraError::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            CameraError::Backend(msg) => write!(f, "backend error: {msg}"),
            CameraError::Stopped => write!(f, "camera is stopped"),
            CameraError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for CameraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CameraError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::Io(err)
    }
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::Backend(err.to_string())
    }
}
