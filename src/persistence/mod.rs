//! JSON file persistence for the arcade collaborators
//!
//! Features:
//! - One JSON document per file (high scores, settings)
//! - Atomic-ish writes (tmp → rename)
//! - Missing files read as "nothing stored"

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Environment variable overriding where data files live
pub const DATA_DIR_ENV: &str = "ARCADE_SIM_DATA";

/// Errors that can occur while loading or saving.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Directory for data files: `$ARCADE_SIM_DATA`, else next to the executable
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            return dir.to_path_buf();
        }
    }
    PathBuf::from(".")
}

/// A JSON document stored at a fixed path
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File named `name` inside [`data_dir`]
    pub fn in_data_dir(name: &str) -> Self {
        Self::new(data_dir().join(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the document; `Ok(None)` if the file does not exist
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, PersistenceError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Encode and write the document, replacing any previous version
    pub fn write<T: Serialize>(&self, value: &T) -> Result<(), PersistenceError> {
        let json = serde_json::to_vec_pretty(value)?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read the document, falling back to `T::default()` on any failure
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, what: &str) -> T {
        match self.read() {
            Ok(Some(value)) => {
                log::info!("Loaded {} from {}", what, self.path.display());
                value
            }
            Ok(None) => {
                log::info!("No {} found, starting fresh", what);
                T::default()
            }
            Err(e) => {
                log::warn!("Failed to load {} from {}: {}", what, self.path.display(), e);
                T::default()
            }
        }
    }

    /// Write the document, logging instead of failing
    pub fn save_logged<T: Serialize>(&self, value: &T, what: &str) {
        match self.write(value) {
            Ok(()) => log::info!("{} saved", what),
            Err(e) => log::warn!("Failed to save {} to {}: {}", what, self.path.display(), e),
        }
    }
}

#[cfg(test)]
pub(crate) fn scratch_file(name: &str) -> JsonFile {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("arcade-sim-{}-{}", std::process::id(), n));
    JsonFile::new(dir.join(name))
}
