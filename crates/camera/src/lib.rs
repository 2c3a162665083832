//! Frame acquisition from live capture devices and pre-recorded clips.
//!
//! A [`Camera`] drives one [`FrameSource`] through the
//! Ready → Started ⇄ Paused → Stopped state machine on its own thread,
//! encoding every grabbed frame and handing it to the registered listeners.
//! Device-backed cameras expose [`DeviceControls`], file-backed cameras expose
//! [`Playback`] (seek, loop and emulated device pause).

pub mod camera;
pub mod config;
pub mod convert;
pub mod device;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod gif;
pub mod playback;
pub mod source;
pub mod state;

mod engine;
mod temp;

#[cfg(feature = "v4l2")]
pub mod v4l2;

#[cfg(feature = "opencv")]
pub mod cv;

pub use camera::Camera;
pub use config::CameraConfig;
pub use device::DeviceControls;
pub use encoding::{EncodingFormat, EncodingParam, FrameEncoder, ImageEncoder};
pub use error::CameraError;
pub use frame::{EncodedFrame, Frame, PixelFormat};
pub use gif::GifSource;
pub use playback::Playback;
pub use source::{Backend, FrameSource, NativeBackend, Property};
pub use state::CameraState;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Source;

#[cfg(feature = "opencv")]
pub use cv::OpenCvSource;
