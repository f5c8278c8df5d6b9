use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AyumiError, Result};
use crate::storage::StorageBackend;

/// File-backed storage: each key maps to one UTF-8 text file named
/// `<key>.json` under the root directory.
///
/// The journal only ever uses a single key, so in practice this is one JSON
/// file (default `~/.config/ayumi/childcare-episodes.json`). Writes go to a
/// temporary sibling first and are renamed into place, so a failed write
/// never leaves a truncated blob where the collection used to be.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AyumiError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            AyumiError::Storage(format!("failed to create {}: {e}", self.root.display()))
        })?;

        // Write-then-rename keeps the previous blob intact if the write fails.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp).map_err(|e| {
            AyumiError::Storage(format!("failed to create {}: {e}", tmp.display()))
        })?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| AyumiError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        drop(file);

        std::fs::rename(&tmp, &path).map_err(|e| {
            AyumiError::Storage(format!("failed to replace {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("ayumi-test-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn missing_file_reads_as_absent() {
        let storage = FileStorage::new(temp_root());
        assert!(storage.get("childcare-episodes").unwrap().is_none());
    }

    #[test]
    fn set_then_get_roundtrip() {
        let root = temp_root();
        let storage = FileStorage::new(&root);
        storage.set("childcare-episodes", "[]").unwrap();
        assert_eq!(
            storage.get("childcare-episodes").unwrap().as_deref(),
            Some("[]")
        );
        assert!(root.join("childcare-episodes.json").exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let root = temp_root();
        let storage = FileStorage::new(&root);
        storage.set("childcare-episodes", "old").unwrap();
        storage.set("childcare-episodes", "new").unwrap();
        assert_eq!(
            storage.get("childcare-episodes").unwrap().as_deref(),
            Some("new")
        );

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let root = temp_root();
        let storage = FileStorage::new(&root);
        storage.set("childcare-episodes", "[]").unwrap();
        assert!(!root.join("childcare-episodes.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
