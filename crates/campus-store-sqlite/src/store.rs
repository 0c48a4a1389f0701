//! [`SqliteStore`] — the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use campus_core::snapshot::{Snapshot, SnapshotStore};
use rusqlite::OptionalExtension as _;

use crate::{Error, Result, encode::RawSnapshot, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A snapshot store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Keys of every stored snapshot, sorted.
  #[cfg(test)]
  pub(crate) async fn keys(&self) -> Result<Vec<String>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT key FROM snapshots ORDER BY key")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteStore {
  type Error = Error;

  async fn load(&self, key: &str) -> Result<Option<Snapshot>> {
    let key = key.to_owned();

    let raw: Option<RawSnapshot> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT key, stored_at, payload FROM snapshots WHERE key = ?1",
              rusqlite::params![key],
              |row| {
                Ok(RawSnapshot {
                  key:       row.get(0)?,
                  stored_at: row.get(1)?,
                  payload:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSnapshot::into_snapshot).transpose()
  }

  async fn save(&self, snapshot: Snapshot) -> Result<()> {
    let raw = RawSnapshot::encode(&snapshot)?;
    let RawSnapshot { key, stored_at, payload } = raw;
    let bytes = payload.len();
    let log_key = key.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO snapshots (key, stored_at, payload) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             stored_at = excluded.stored_at,
             payload   = excluded.payload",
          rusqlite::params![key, stored_at, payload],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(key = %log_key, bytes, "saved snapshot");
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM snapshots WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM snapshots", [])?;
        Ok(())
      })
      .await?;
    tracing::debug!("cleared all snapshots");
    Ok(())
  }
}
