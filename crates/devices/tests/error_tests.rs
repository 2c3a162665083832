use {
    devices::DeviceError,
    std::{error::Error, io},
};

#[test]
fn test_from_io_error() {
    let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "sysfs locked");
    let err: DeviceError = io_err.into();

    match &err {
        DeviceError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::PermissionDenied),
        _ => panic!("Expected DeviceError::Io variant"),
    }
    assert!(err.source().is_some());
    assert!(err.to_string().contains("sysfs locked"));
}

#[test]
fn test_error_display() {
    let platform = DeviceError::UnsupportedPlatform("plan9".to_string());
    assert!(platform.to_string().contains("plan9"));
    assert!(platform.source().is_none());

    let enumeration = DeviceError::Enumeration("bus reset".to_string());
    assert!(enumeration.to_string().contains("bus reset"));
}
