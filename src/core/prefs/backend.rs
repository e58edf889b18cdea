use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};
use redb::{Database, TableDefinition, TableError};

use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::project_dirs;

/// Redb table for preferences. Key: preference key, Value: raw string value.
const PREFS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("preferences");

/// Storage seam for flat string preferences.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// Redb-based storage implementation
pub struct RedbBackend {
    db: Mutex<Database>,
}

impl RedbBackend {
    /// Open `preferences.redb` in the platform data directory.
    pub fn open_default() -> AppResult<Self> {
        let dirs = project_dirs()?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Self::open(&data_dir.join("preferences.redb"))
    }

    pub fn open(path: &Path) -> AppResult<Self> {
        let db = Database::create(path).map_err(redb::Error::from)?;

        let write_txn = db.begin_write().map_err(redb::Error::from)?;
        {
            let _table = write_txn.open_table(PREFS_TABLE).map_err(redb::Error::from)?;
        }
        write_txn.commit().map_err(redb::Error::from)?;

        tracing::debug!(path = %path.display(), "preference database ready");
        Ok(Self { db: Mutex::new(db) })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))
    }
}

impl KeyValueBackend for RedbBackend {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let db = self.lock()?;
        let read_txn = db.begin_read().map_err(redb::Error::from)?;
        let table = match read_txn.open_table(PREFS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb::Error::from(e).into()),
        };

        let value = table.get(key).map_err(redb::Error::from)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let db = self.lock()?;
        let write_txn = db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = write_txn.open_table(PREFS_TABLE).map_err(redb::Error::from)?;
            table.insert(key, value).map_err(redb::Error::from)?;
        }
        write_txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}

/// Process-local storage, used when no database can be opened.
#[derive(Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| AppError::Storage("memory store poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| AppError::Storage("memory store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
