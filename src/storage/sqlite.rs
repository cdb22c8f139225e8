// SQLite 存储实现：单表 tricks，所有语句均使用参数绑定。
use crate::storage::{StorageBackend, TrickFields, TrickRecord};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_DB_PATH: &str = "./tricks.db";

pub struct SqliteStorage {
    db_path: PathBuf,
    initialized: AtomicBool,
    init_guard: Mutex<()>,
}

impl SqliteStorage {
    pub fn new(db_path: String) -> Self {
        let path = if db_path.trim().is_empty() {
            PathBuf::from(DEFAULT_DB_PATH)
        } else {
            PathBuf::from(db_path)
        };
        Self {
            db_path: path,
            initialized: AtomicBool::new(false),
            init_guard: Mutex::new(()),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("create db dir failed: {}", parent.display())
                })?;
            }
        }
        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        self.ensure_db_dir()?;
        let conn = Connection::open(&self.db_path)
            .with_context(|| format!("open sqlite failed: {}", self.db_path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Ok(conn)
    }
}

impl StorageBackend for SqliteStorage {
    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }
        let _guard = self.init_guard.lock();
        if self.initialized.load(Ordering::SeqCst) {
            return Ok(());
        }
        let conn = self.open()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tricks (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              name TEXT,
              translatedName TEXT,
              description TEXT,
              difficulty TEXT,
              progress TEXT
            );
            "#,
        )?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn list_tricks(&self) -> Result<Vec<TrickRecord>> {
        self.ensure_initialized()?;
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, translatedName, description, difficulty, progress \
             FROM tricks ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TrickRecord {
                    id: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    translated_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    description: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    difficulty: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    progress: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_trick(&self, fields: &TrickFields) -> Result<i64> {
        self.ensure_initialized()?;
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO tricks (name, translatedName, description, difficulty, progress) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                fields.name,
                fields.translated_name,
                fields.description,
                fields.difficulty,
                fields.progress
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_trick(&self, id: i64, fields: &TrickFields) -> Result<usize> {
        self.ensure_initialized()?;
        let conn = self.open()?;
        let affected = conn.execute(
            "UPDATE tricks SET name = ?, translatedName = ?, description = ?, \
             difficulty = ?, progress = ? WHERE id = ?",
            params![
                fields.name,
                fields.translated_name,
                fields.description,
                fields.difficulty,
                fields.progress,
                id
            ],
        )?;
        Ok(affected)
    }
}
