use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{AyumiError, Result};
use crate::storage::StorageBackend;

/// SQLite-backed key-value storage.
///
/// Every operation is synchronous and serialized through a single
/// `Connection` behind a `Mutex`; the slot table holds one row per key.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStorage {
    /// Open (or create) a file-backed SQLite database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AyumiError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(&path)
            .map_err(|e| AyumiError::Storage(format!("failed to open SQLite database: {e}")))?;

        Self::configure_and_init(conn, path)
    }

    /// Open an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AyumiError::Storage(format!("failed to open in-memory SQLite database: {e}"))
        })?;

        Self::configure_and_init(conn, PathBuf::from(":memory:"))
    }

    /// Return the path this database was opened with (`:memory:` for in-memory).
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn configure_and_init(conn: Connection, path: PathBuf) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| AyumiError::Storage(format!("failed to set WAL mode: {e}")))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| AyumiError::Storage(format!("failed to create tables: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| AyumiError::Storage(format!("failed to acquire database lock: {e}")))?;
        f(&conn)
    }
}

impl StorageBackend for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| AyumiError::Storage(format!("failed to read slot '{key}': {e}")))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map_err(|e| AyumiError::Storage(format!("failed to write slot '{key}': {e}")))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_creates_slot_table() {
        let storage = SqliteStorage::open_in_memory().expect("should open in-memory DB");
        assert_eq!(storage.path().to_str().unwrap(), ":memory:");
        assert!(storage.get("childcare-episodes").unwrap().is_none());
    }

    #[test]
    fn set_then_get_roundtrip() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("childcare-episodes", "[]").unwrap();
        assert_eq!(
            storage.get("childcare-episodes").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn set_is_an_upsert() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("childcare-episodes", "old").unwrap();
        storage.set("childcare-episodes", "new").unwrap();
        assert_eq!(
            storage.get("childcare-episodes").unwrap().as_deref(),
            Some("new")
        );
    }

    #[test]
    fn open_file_based_db() {
        let dir = std::env::temp_dir().join(format!("ayumi-test-{}", uuid::Uuid::now_v7()));
        let db_path = dir.join("test.db");

        let storage = SqliteStorage::open(&db_path).expect("should open file DB");
        assert_eq!(storage.path(), db_path);
        storage.set("childcare-episodes", "[]").unwrap();

        drop(storage);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
