use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use fx_core::{RawAssignments, Timestamp};
use fx_storage::{Storage, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let conn = Connection::open(db_path).with_context(|| format!("open sqlite db {}", db_path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        let init_sql = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(init_sql).context("apply schema")?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl Storage for SqliteStorage {
    fn load_assignments(&self) -> Result<Option<RawAssignments>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        let header: Option<(i64, i64)> = conn
            .query_row("SELECT ttl, fetched_at FROM assignments WHERE id = 1", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .optional()?;

        let mut variations = BTreeMap::new();
        {
            let mut stmt = conn.prepare("SELECT experiment, variation FROM assignment_variations")?;
            let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, Option<String>>(1)?)))?;
            for row in rows {
                let (experiment, variation) = row?;
                variations.insert(experiment, variation);
            }
        }

        match header {
            Some((ttl, fetched_at)) => {
                debug!(experiments = variations.len(), ttl, fetched_at, "loaded cached assignments");
                Ok(Some(RawAssignments::new(variations, ttl, Timestamp::from_millis(fetched_at))))
            }
            None if variations.is_empty() => Ok(None),
            None => Err(StorageError::CorruptRecord(format!(
                "{} variation rows without an assignments header",
                variations.len()
            ))
            .into()),
        }
    }

    fn save_assignments(&self, raw: &RawAssignments) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM assignment_variations", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO assignments(id, ttl, fetched_at) VALUES (1, ?1, ?2)",
            params![raw.ttl, raw.fetched_at.as_millis()],
        )?;
        {
            let mut stmt = tx.prepare("INSERT INTO assignment_variations(experiment, variation) VALUES (?1, ?2)")?;
            for (experiment, variation) in &raw.variations {
                stmt.execute(params![experiment, variation])?;
            }
        }
        tx.commit()?;
        debug!(experiments = raw.variations.len(), ttl = raw.ttl, "saved assignments");
        Ok(())
    }

    fn clear_assignments(&self) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM assignment_variations", [])?;
        tx.execute("DELETE FROM assignments", [])?;
        tx.commit()?;
        debug!("cleared assignments");
        Ok(())
    }
}
