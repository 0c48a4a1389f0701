//! The persisted cache tier.
//!
//! A snapshot is a whole-collection JSON payload stored under a global key
//! (e.g. every entity in the directory). Snapshots are best-effort: a store
//! failure is treated as a cache miss by callers, never as a fatal error.

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::Result;

/// Snapshot key for the full entity directory.
pub const ENTITIES_KEY: &str = "entities";
/// Snapshot key for the course-module list.
pub const MODULES_KEY: &str = "modules";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  pub key:       String,
  pub stored_at: DateTime<Utc>,
  pub payload:   serde_json::Value,
}

impl Snapshot {
  pub fn capture<T: Serialize>(
    key: impl Into<String>,
    stored_at: DateTime<Utc>,
    value: &T,
  ) -> Result<Self> {
    Ok(Self { key: key.into(), stored_at, payload: serde_json::to_value(value)? })
  }

  pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
    Ok(serde_json::from_value(self.payload.clone())?)
  }

  /// `true` while younger than `ttl` at `now`.
  pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
    now.signed_duration_since(self.stored_at) < ttl
  }
}

/// Abstraction over a persistent snapshot backend (e.g.
/// `campus-store-sqlite`).
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The snapshot stored under `key`, if any.
  fn load<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Snapshot>, Self::Error>> + Send + 'a;

  /// Insert or replace the snapshot under `snapshot.key`.
  fn save(
    &self,
    snapshot: Snapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Drop the snapshot under `key`. Removing a missing key is not an error.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Drop every snapshot.
  fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
