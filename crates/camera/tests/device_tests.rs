mod common;

use {
    camera::{Camera, CameraConfig, CameraError, Property, device::focus_to_native},
    common::{Probe, ScriptedBackend, ScriptedSource},
    std::sync::Arc,
};

fn device_camera() -> (Camera, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let camera =
        Camera::with_device_source(ScriptedSource::live(&probe).boxed(), CameraConfig::default())
            .unwrap();
    (camera, probe)
}

#[test]
fn test_open_device_through_backend() {
    let backend = ScriptedBackend::default();
    let camera = Camera::open_device(&backend, "/dev/video0", CameraConfig::default()).unwrap();
    assert!(camera.device().is_some());
    assert_eq!(camera.size(), (2, 2));

    let err = Camera::open_device(&backend, "", CameraConfig::default()).unwrap_err();
    assert!(matches!(err, CameraError::OpenFailure(_)));
}

#[test]
fn test_focus_out_of_range_rejected() {
    let (camera, probe) = device_camera();
    let device = camera.device().unwrap();

    let err = device.set_focus(101).unwrap_err();
    assert!(matches!(
        err,
        CameraError::InvalidPropertyValue {
            property: Property::Focus,
            ..
        }
    ));
    assert!(probe.writes().is_empty());
    assert_eq!(device.focus(), None);
}

#[test]
fn test_focus_mapped_and_cached() {
    let (camera, probe) = device_camera();
    let device = camera.device().unwrap();

    device.set_focus(50).unwrap();
    device.set_focus(50).unwrap();
    device.set_focus(100).unwrap();

    assert_eq!(device.focus(), Some(100));
    assert_eq!(
        probe.writes(),
        vec![
            (Property::Focus, focus_to_native(50)),
            (Property::Focus, focus_to_native(100)),
        ]
    );
    assert_eq!(focus_to_native(100), 255.0);
}

#[test]
fn test_auto_exposure_convention() {
    let (camera, probe) = device_camera();
    let device = camera.device().unwrap();

    device.set_auto_exposure(true).unwrap();
    device.set_auto_exposure(true).unwrap();
    device.set_auto_exposure(false).unwrap();

    assert_eq!(device.auto_exposure(), Some(false));
    assert_eq!(
        probe.writes(),
        vec![(Property::AutoExposure, 0.25), (Property::AutoExposure, 0.75)]
    );
}

#[test]
fn test_auto_focus_round_trip() {
    let (camera, probe) = device_camera();
    let device = camera.device().unwrap();

    assert!(!device.auto_focus().unwrap());
    device.set_auto_focus(true).unwrap();
    assert!(device.auto_focus().unwrap());
    assert_eq!(probe.writes(), vec![(Property::AutoFocus, 1.0)]);
}

#[test]
fn test_image_controls_pass_through() {
    let (camera, probe) = device_camera();
    let device = camera.device().unwrap();

    device.set_saturation(64.0).unwrap();
    device.set_contrast(32.0).unwrap();
    device.set_exposure(-6.0).unwrap();
    device.set_gain(10.0).unwrap();
    device.set_hue(5.0).unwrap();

    assert_eq!(device.saturation().unwrap(), 64.0);
    assert_eq!(device.contrast().unwrap(), 32.0);
    assert_eq!(device.exposure().unwrap(), -6.0);
    assert_eq!(device.gain().unwrap(), 10.0);
    assert_eq!(device.hue().unwrap(), 5.0);
    assert_eq!(probe.writes().len(), 5);
}

#[test]
fn test_non_finite_value_rejected() {
    let (camera, probe) = device_camera();
    let device = camera.device().unwrap();

    assert!(matches!(
        device.set_gain(f64::NAN),
        Err(CameraError::InvalidPropertyValue {
            property: Property::Gain,
            ..
        })
    ));
    assert!(probe.writes().is_empty());
}

#[test]
fn test_controls_fail_after_stop() {
    let (camera, _) = device_camera();
    camera.stop(true);
    let device = camera.device().unwrap();

    assert!(matches!(device.saturation(), Err(CameraError::Stopped)));
    assert!(matches!(device.set_focus(10), Err(CameraError::Stopped)));
    assert_eq!(device.focus(), None);
}

#[test]
fn test_clip_has_no_device_controls() {
    let probe = Arc::new(Probe::default());
    let camera = Camera::with_playback_source(
        ScriptedSource::clip(&probe, 10).boxed(),
        CameraConfig::default(),
    )
    .unwrap();
    assert!(camera.device().is_none());
}
