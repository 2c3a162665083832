use {
    crate::{DeviceDescriptor, DeviceError},
    std::{
        fs, io,
        path::{Path, PathBuf},
    },
};

/// Platform strategy for listing attached capture devices.
///
/// Must be cheap enough to call once per poll and safe to call repeatedly.
/// The placeholder entry is added by the registry, not the enumerator.
pub trait DeviceEnumerator: Send {
    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, DeviceError>;
}

impl<F> DeviceEnumerator for F
where
    F: FnMut() -> Result<Vec<DeviceDescriptor>, DeviceError> + Send,
{
    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        self()
    }
}

/// Lists V4L2 device nodes through sysfs.
///
/// Every `videoN` entry under the sysfs class directory becomes one device,
/// identified by its `/dev/videoN` node and named by the entry's `name` file
/// (or the node path when that file is missing or empty).
#[derive(Debug, Clone)]
pub struct SysfsEnumerator {
    sysfs_root: PathBuf,
    dev_root: PathBuf,
}

impl Default for SysfsEnumerator {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys/class/video4linux"),
            dev_root: PathBuf::from("/dev"),
        }
    }
}

impl SysfsEnumerator {
    /// Point the enumerator at different sysfs and device roots.
    pub fn with_roots(sysfs_root: impl Into<PathBuf>, dev_root: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            dev_root: dev_root.into(),
        }
    }

    pub fn sysfs_root(&self) -> &Path {
        &self.sysfs_root
    }

    pub fn dev_root(&self) -> &Path {
        &self.dev_root
    }

    fn friendly_name(&self, entry: &str) -> Option<String> {
        let name = fs::read_to_string(self.sysfs_root.join(entry).join("name")).ok()?;
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

impl DeviceEnumerator for SysfsEnumerator {
    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, DeviceError> {
        let entries = match fs::read_dir(&self.sysfs_root) {
            Ok(entries) => entries,
            // no video4linux class at all: nothing attached
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut indexed = Vec::new();
        for entry in entries {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(index) = file_name
                .strip_prefix("video")
                .and_then(|n| n.parse::<u32>().ok())
            {
                indexed.push((index, file_name.to_string()));
            }
        }
        indexed.sort_unstable_by_key(|(index, _)| *index);

        Ok(indexed
            .into_iter()
            .map(|(_, entry)| {
                let node = self.dev_root.join(&entry).to_string_lossy().into_owned();
                let name = self.friendly_name(&entry).unwrap_or_else(|| node.clone());
                DeviceDescriptor::new(name, node)
            })
            .collect())
    }
}

/// The enumeration strategy for the running platform.
pub fn create_suitable_enumerator() -> Result<Box<dyn DeviceEnumerator>, DeviceError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(SysfsEnumerator::default()))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(DeviceError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
