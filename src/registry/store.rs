use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{AddressRegistry, RegistryError};

/// Durable home of the address registry.
pub trait RegistryStore: Send + Sync {
    /// Read the whole registry.
    fn load(&self) -> Result<AddressRegistry, RegistryError>;

    /// Replace the stored registry. Readers never observe a partial write.
    fn persist(&self, registry: &AddressRegistry) -> Result<(), RegistryError>;
}

/// JSON file store. Writes go to a uniquely named sibling temp file, which is synced
/// and then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = std::ffi::OsString::from(".");
        if let Some(file_name) = self.path.file_name() {
            name.push(file_name);
        }
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> RegistryError {
        RegistryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self) -> Result<AddressRegistry, RegistryError> {
        if !self.path.exists() {
            return Err(RegistryError::NotFound(self.path.clone()));
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(&self.path, e))?;
        AddressRegistry::from_json(&content).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self, registry: &AddressRegistry) -> Result<(), RegistryError> {
        let mut json = registry.to_json_pretty()?;
        json.push('\n');

        let temp = self.temp_path();
        let written = File::create(&temp)
            .and_then(|mut file| {
                file.write_all(json.as_bytes())?;
                file.sync_all()
            })
            .map_err(|e| self.io_error(&temp, e));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp);
            return Err(err);
        }
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            self.io_error(&self.path, e)
        })?;

        debug!(target: "registry", path = %self.path.display(), "Persisted address registry");
        Ok(())
    }
}

/// In-memory store that counts writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    registry: Mutex<AddressRegistry>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(registry: AddressRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
            writes: Mutex::new(0),
        }
    }

    /// Current stored registry.
    pub fn snapshot(&self) -> AddressRegistry {
        self.registry
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of successful persists.
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or_default()
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<AddressRegistry, RegistryError> {
        Ok(self.snapshot())
    }

    fn persist(&self, registry: &AddressRegistry) -> Result<(), RegistryError> {
        if let Ok(mut stored) = self.registry.lock() {
            *stored = registry.clone();
        }
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
