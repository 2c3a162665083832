use {
    crate::{CameraError, EncodingFormat, EncodingParam, FrameEncoder, ImageEncoder},
    std::sync::Arc,
};

/// Configuration for a camera's encode stage and playback behavior.
#[derive(Clone, Default)]
pub struct CameraConfig {
    format: EncodingFormat,
    params: Vec<EncodingParam>,
    looping: bool,
    emulate_device_pause: bool,
    encoder: Option<Arc<dyn FrameEncoder>>,
}

impl std::fmt::Debug for CameraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraConfig")
            .field("format", &self.format)
            .field("params", &self.params)
            .field("looping", &self.looping)
            .field("emulate_device_pause", &self.emulate_device_pause)
            .field("encoder", &self.encoder.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl CameraConfig {
    /// Set the container format frames are encoded into.
    pub fn with_format(mut self, format: EncodingFormat) -> Self {
        self.format = format;
        self
    }

    /// Append one encoder parameter. Later parameters override earlier ones.
    pub fn with_param(mut self, param: EncodingParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = EncodingParam>) -> Self {
        self.params.extend(params);
        self
    }

    /// Initial loop flag for file-backed cameras.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Initial emulated-device-pause flag for file-backed cameras.
    pub fn with_emulate_device_pause(mut self, emulate: bool) -> Self {
        self.emulate_device_pause = emulate;
        self
    }

    /// Replace the default `image`-based encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn FrameEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    // Getters
    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    pub fn params(&self) -> &[EncodingParam] {
        &self.params
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn emulate_device_pause(&self) -> bool {
        self.emulate_device_pause
    }

    /// The configured encoder, checked against the configured format and
    /// parameters.
    pub fn encoder(&self) -> Result<Arc<dyn FrameEncoder>, CameraError> {
        let encoder = self
            .encoder
            .clone()
            .unwrap_or_else(|| Arc::new(ImageEncoder));
        if !encoder.supports(self.format) {
            return Err(CameraError::InvalidFormat(format!(
                "{} is not supported by the configured encoder",
                self.format
            )));
        }
        if let Some(param) = self
            .params
            .iter()
            .find(|param| !encoder.supports_param(**param))
        {
            return Err(CameraError::InvalidFormat(format!(
                "{param:?} is not supported by the configured encoder"
            )));
        }
        Ok(encoder)
    }
}
