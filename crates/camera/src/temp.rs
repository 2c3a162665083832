use {
    crate::CameraError,
    std::{
        fs::{self, OpenOptions},
        io::{self, Read, Write},
        path::{Path, PathBuf},
        sync::atomic::{AtomicUsize, Ordering},
        time::{SystemTime, UNIX_EPOCH},
    },
};

static NEXT_TEMP_ID: AtomicUsize = AtomicUsize::new(0);

/// A privately owned file in the system temp directory, deleted on drop.
pub(crate) struct TempFile {
    path: PathBuf,
}

impl TempFile {
    /// Copy `reader` to a fresh temp file.
    pub(crate) fn from_reader(mut reader: impl Read) -> Result<Self, CameraError> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let temp = Self {
            path: std::env::temp_dir().join(format!(
                "camera-clip-{}-{}-{nanos:08x}",
                std::process::id(),
                NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed)
            )),
        };

        // on any failure below, dropping `temp` removes the partial file
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp.path)?;
        io::copy(&mut reader, &mut file)?;
        file.flush()?;
        Ok(temp)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed temp clip {}", self.path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => log::warn!("failed to remove temp clip {}: {err}", self.path.display()),
        }
    }
}
