//! Live view of attached capture devices.
//!
//! A [`DeviceRegistry`] polls a [`DeviceEnumerator`] on a background thread,
//! diffs consecutive [`DeviceSnapshot`]s by stable identifier and marshals
//! added/removed notifications and current-device reconciliation onto a
//! caller-owned [`ExecutionContext`](base::ExecutionContext).

pub mod descriptor;
pub mod enumerate;
pub mod error;
pub mod registry;

pub use descriptor::{DeviceDescriptor, DeviceSnapshot, NO_DEVICE, reconcile};
pub use enumerate::{DeviceEnumerator, SysfsEnumerator, create_suitable_enumerator};
pub use error::DeviceError;
pub use registry::{DeviceRegistry, RegistryConfig};
