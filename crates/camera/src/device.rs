use {
    crate::{
        CameraError, Property,
        engine::{Engine, lock},
    },
    std::sync::Mutex,
};

// native focus runs 0..=255 in steps of 5
const FOCUS_STEPS: f64 = 51.0;
const FOCUS_STEP_SIZE: f64 = 5.0;

const AUTO_EXPOSURE_ON: f64 = 0.25;
const AUTO_EXPOSURE_OFF: f64 = 0.75;

/// Map a focus percentage onto the backend's native focus scale.
pub fn focus_to_native(percent: u32) -> f64 {
    (FOCUS_STEPS * f64::from(percent) / 100.0).floor() * FOCUS_STEP_SIZE
}

/// Cached controls that the backend cannot report back reliably.
#[derive(Default)]
pub(crate) struct DeviceState {
    focus: Mutex<Option<u32>>,
    auto_exposure: Mutex<Option<bool>>,
}

/// Capture controls for a camera backed by a live device.
///
/// Obtained from [`Camera::device`](crate::Camera::device). Every call goes
/// straight to the backend and fails with [`CameraError::Stopped`] once the
/// camera has released its source.
pub struct DeviceControls<'a> {
    engine: &'a Engine,
    state: &'a DeviceState,
}

impl<'a> DeviceControls<'a> {
    pub(crate) fn new(engine: &'a Engine, state: &'a DeviceState) -> Self {
        Self { engine, state }
    }

    fn get(&self, property: Property) -> Result<f64, CameraError> {
        self.engine.with_source(|source| source.property(property))?
    }

    fn set(&self, property: Property, value: f64) -> Result<(), CameraError> {
        if !value.is_finite() {
            return Err(CameraError::InvalidPropertyValue { property, value });
        }
        log::debug!("setting {property:?} to {value}");
        self.engine
            .with_source(|source| source.set_property(property, value))?
    }

    pub fn saturation(&self) -> Result<f64, CameraError> {
        self.get(Property::Saturation)
    }

    pub fn set_saturation(&self, value: f64) -> Result<(), CameraError> {
        self.set(Property::Saturation, value)
    }

    pub fn contrast(&self) -> Result<f64, CameraError> {
        self.get(Property::Contrast)
    }

    pub fn set_contrast(&self, value: f64) -> Result<(), CameraError> {
        self.set(Property::Contrast, value)
    }

    pub fn exposure(&self) -> Result<f64, CameraError> {
        self.get(Property::Exposure)
    }

    pub fn set_exposure(&self, value: f64) -> Result<(), CameraError> {
        self.set(Property::Exposure, value)
    }

    pub fn gain(&self) -> Result<f64, CameraError> {
        self.get(Property::Gain)
    }

    pub fn set_gain(&self, value: f64) -> Result<(), CameraError> {
        self.set(Property::Gain, value)
    }

    pub fn hue(&self) -> Result<f64, CameraError> {
        self.get(Property::Hue)
    }

    pub fn set_hue(&self, value: f64) -> Result<(), CameraError> {
        self.set(Property::Hue, value)
    }

    /// Last focus percentage applied through this camera, if any.
    pub fn focus(&self) -> Option<u32> {
        *lock(&self.state.focus)
    }

    /// Set focus as a percentage in `0..=100`.
    ///
    /// Repeating the current value does not reach the backend.
    pub fn set_focus(&self, percent: u32) -> Result<(), CameraError> {
        if percent > 100 {
            return Err(CameraError::InvalidPropertyValue {
                property: Property::Focus,
                value: f64::from(percent),
            });
        }
        let mut focus = lock(&self.state.focus);
        if *focus == Some(percent) {
            return Ok(());
        }
        self.set(Property::Focus, focus_to_native(percent))?;
        *focus = Some(percent);
        Ok(())
    }

    /// Last auto-exposure mode applied through this camera, if any.
    pub fn auto_exposure(&self) -> Option<bool> {
        *lock(&self.state.auto_exposure)
    }

    pub fn set_auto_exposure(&self, enabled: bool) -> Result<(), CameraError> {
        let mut auto_exposure = lock(&self.state.auto_exposure);
        if *auto_exposure == Some(enabled) {
            return Ok(());
        }
        let value = if enabled {
            AUTO_EXPOSURE_ON
        } else {
            AUTO_EXPOSURE_OFF
        };
        self.set(Property::AutoExposure, value)?;
        *auto_exposure = Some(enabled);
        Ok(())
    }

    pub fn auto_focus(&self) -> Result<bool, CameraError> {
        Ok(self.get(Property::AutoFocus)? != 0.0)
    }

    pub fn set_auto_focus(&self, enabled: bool) -> Result<(), CameraError> {
        self.set(Property::AutoFocus, if enabled { 1.0 } else { 0.0 })
    }
}

impl std::fmt::Debug for DeviceControls<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceControls")
            .field("focus", &self.focus())
            .field("auto_exposure", &self.auto_exposure())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_mapping() {
        assert_eq!(focus_to_native(0), 0.0);
        assert_eq!(focus_to_native(1), 0.0);
        assert_eq!(focus_to_native(2), 5.0);
        assert_eq!(focus_to_native(50), 125.0);
        assert_eq!(focus_to_native(100), 255.0);
    }
}
