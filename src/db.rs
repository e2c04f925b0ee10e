// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "PowerPredict", "powerpredict"));

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn db_path() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("powerpredict.sqlite"))
}

/// Opens `custom` when given, else the platform data dir database.
pub fn open_or_init(custom: Option<&Path>) -> Result<Connection> {
    let path = match custom {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            p.to_path_buf()
        }
        None => db_path()?,
    };
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    -- browser-style key/value storage; values are JSON documents
    CREATE TABLE IF NOT EXISTS kv_store(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}

pub fn kv_get(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key=?1",
        params![key],
        |r| r.get(0),
    )
    .optional()
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO kv_store(key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
        params![key, value, Utc::now()],
    )?;
    Ok(())
}

pub fn kv_remove(conn: &Connection, key: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM kv_store WHERE key=?1", params![key])?;
    Ok(())
}

pub fn kv_keys_with_prefix(conn: &Connection, prefix: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT key FROM kv_store WHERE substr(key, 1, ?2)=?1 ORDER BY key")?;
    let rows = stmt.query_map(params![prefix, prefix.chars().count() as i64], |r| {
        r.get::<_, String>(0)
    })?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip_and_overwrite() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(kv_get(&conn, "a").unwrap(), None);
        kv_set(&conn, "a", "1").unwrap();
        kv_set(&conn, "a", "2").unwrap();
        kv_set(&conn, "b", "3").unwrap();
        assert_eq!(kv_get(&conn, "a").unwrap().as_deref(), Some("2"));
        assert_eq!(kv_keys_with_prefix(&conn, "a").unwrap(), vec!["a".to_string()]);
        kv_remove(&conn, "a").unwrap();
        assert_eq!(kv_get(&conn, "a").unwrap(), None);
    }

    #[test]
    fn open_or_init_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pp.sqlite");
        let conn = open_or_init(Some(&path)).unwrap();
        kv_set(&conn, "k", "v").unwrap();
        assert!(path.exists());
    }
}
