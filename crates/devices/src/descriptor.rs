use std::collections::HashSet;

/// Display name of the placeholder entry at the head of every snapshot.
pub const NO_DEVICE: &str = "No Device";

/// One attached capture device.
///
/// `identifier` is the stable identity (device node path or hardware id).
/// Two devices may share a `name`, never an `identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceDescriptor {
    pub name: String,
    pub identifier: String,
}

impl DeviceDescriptor {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
        }
    }

    /// The "no device" placeholder.
    pub fn none() -> Self {
        Self::new(NO_DEVICE, "")
    }

    pub fn is_none(&self) -> bool {
        self.identifier.is_empty()
    }
}

/// The devices seen by one poll, placeholder first.
///
/// Snapshots are immutable; the registry swaps whole snapshots so a reader
/// never sees a half-updated list. Equality compares identifiers only.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    devices: Vec<DeviceDescriptor>,
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self::new(DeviceDescriptor::none(), Vec::new())
    }
}

impl PartialEq for DeviceSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.devices.len() == other.devices.len()
            && self
                .devices
                .iter()
                .zip(&other.devices)
                .all(|(a, b)| a.identifier == b.identifier)
    }
}

impl Eq for DeviceSnapshot {}

impl DeviceSnapshot {
    pub fn new(
        placeholder: DeviceDescriptor,
        devices: impl IntoIterator<Item = DeviceDescriptor>,
    ) -> Self {
        let devices = std::iter::once(placeholder).chain(devices).collect();
        Self { devices }
    }

    /// Snapshot with the default [`NO_DEVICE`] placeholder.
    pub fn from_devices(devices: impl IntoIterator<Item = DeviceDescriptor>) -> Self {
        Self::new(DeviceDescriptor::none(), devices)
    }

    /// Every entry, placeholder included.
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    /// Real devices only.
    pub fn attached(&self) -> &[DeviceDescriptor] {
        &self.devices[1..]
    }

    pub fn placeholder(&self) -> &DeviceDescriptor {
        &self.devices[0]
    }

    pub fn last(&self) -> &DeviceDescriptor {
        // never empty: the placeholder is always present
        &self.devices[self.devices.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached().is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(|device| device.name.as_str())
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<&DeviceDescriptor> {
        self.devices
            .iter()
            .find(|device| device.identifier == identifier)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|device| device.name == name)
    }

    /// Names present here but not in `previous`, then names present in
    /// `previous` but not here. Each list keeps snapshot order, without
    /// repeats.
    pub fn diff_names(&self, previous: &DeviceSnapshot) -> (Vec<String>, Vec<String>) {
        (name_difference(self, previous), name_difference(previous, self))
    }
}

fn name_difference(from: &DeviceSnapshot, without: &DeviceSnapshot) -> Vec<String> {
    let excluded: HashSet<&str> = without.names().collect();
    let mut seen = HashSet::new();
    from.names()
        .filter(|name| !excluded.contains(name) && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Keep `selection` if the snapshot still has a device with its identifier,
/// otherwise fall back to the snapshot's last entry.
///
/// Returns the snapshot's own descriptor so a renamed device picks up its
/// new display name.
pub fn reconcile(
    selection: Option<&DeviceDescriptor>,
    snapshot: &DeviceSnapshot,
) -> DeviceDescriptor {
    selection
        .and_then(|selected| snapshot.find_by_identifier(&selected.identifier))
        .unwrap_or_else(|| snapshot.last())
        .clone()
}
