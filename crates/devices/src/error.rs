use std::fmt;

#[derive(Debug)]
pub enum DeviceError {
    /// No enumeration strategy exists for this operating system.
    UnsupportedPlatform(String),
    Enumeration(String),
    Io(std::io::Error),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::UnsupportedPlatform(os) => {
                write!(f, "device enumeration is not supported on {os}")
            }
            DeviceError::Enumeration(msg) => write!(f, "device enumeration failed: {msg}"),
            DeviceError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Io(err)
    }
}
