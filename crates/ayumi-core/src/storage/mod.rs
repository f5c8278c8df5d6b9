mod file;
mod memory;
mod sqlite;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use std::path::PathBuf;

use crate::config::AyumiConfig;
use crate::error::{AyumiError, Result};

/// The durable storage contract: one named text slot per key.
///
/// The journal uses a single fixed key holding the entire serialized
/// collection as one JSON blob; `set` replaces the whole blob or fails
/// without leaving a partial write behind.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Enum wrapper for storage backends. Dispatches to the concrete
/// implementation.
pub enum Storage {
    File(FileStorage),
    Sqlite(SqliteStorage),
    Memory(MemoryStorage),
}

impl StorageBackend for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            Storage::File(s) => s.get(key),
            Storage::Sqlite(s) => s.get(key),
            Storage::Memory(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Storage::File(s) => s.set(key, value),
            Storage::Sqlite(s) => s.set(key, value),
            Storage::Memory(s) => s.set(key, value),
        }
    }
}

/// Create a storage backend from the given configuration.
pub fn create_backend(config: &AyumiConfig) -> Result<Storage> {
    let custom_path = config.storage.path.as_ref().map(PathBuf::from);
    match config.storage.backend.as_str() {
        "file" => {
            // For the file backend `path` is the data directory.
            let root = match custom_path {
                Some(p) => p,
                None => default_data_dir()?,
            };
            Ok(Storage::File(FileStorage::new(root)))
        }
        "sqlite" => {
            let path = match custom_path {
                Some(p) => p,
                None => default_data_dir()?.join("ayumi.db"),
            };
            Ok(Storage::Sqlite(SqliteStorage::open(&path)?))
        }
        "memory" => Ok(Storage::Memory(MemoryStorage::new())),
        other => Err(AyumiError::Config(format!(
            "unknown storage backend: {other}"
        ))),
    }
}

/// Default data location: `~/.config/ayumi/`
fn default_data_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("ayumi"))
        .ok_or_else(|| AyumiError::Config("cannot determine config directory".to_string()))
}
