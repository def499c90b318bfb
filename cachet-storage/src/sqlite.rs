//! SQLite-backed provider.
//!
//! All namespaces share a single `kv` table keyed by `(namespace, key)`.

use crate::error::{StorageError, StorageResult};
use crate::{check_namespace, KeyValueStore, StorageProvider};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Persistent provider backed by one SQLite database.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Opens (or creates) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        debug!("Opening SQLite storage at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (namespace, key)
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Lists the namespaces that currently hold at least one key.
    pub fn namespaces(&self) -> StorageResult<Vec<String>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT DISTINCT namespace FROM kv ORDER BY namespace")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

impl StorageProvider for SqliteStorage {
    fn open(&self, name: &str) -> StorageResult<Arc<dyn KeyValueStore>> {
        check_namespace(name)?;
        Ok(Arc::new(SqliteNamespace {
            conn: Arc::clone(&self.conn),
            namespace: name.to_string(),
        }))
    }
}

struct SqliteNamespace {
    conn: Arc<Mutex<Connection>>,
    namespace: String,
}

impl KeyValueStore for SqliteNamespace {
    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = lock(&self.conn)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                params![self.namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn delete_string(&self, key: &str) -> StorageResult<bool> {
        let conn = lock(&self.conn)?;
        let removed = conn.execute(
            "DELETE FROM kv WHERE namespace = ?1 AND key = ?2",
            params![self.namespace, key],
        )?;
        Ok(removed > 0)
    }

    fn clear(&self) -> StorageResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute("DELETE FROM kv WHERE namespace = ?1", params![self.namespace])?;
        Ok(())
    }
}

fn lock(conn: &Mutex<Connection>) -> StorageResult<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|_| StorageError::LockPoisoned)
}
