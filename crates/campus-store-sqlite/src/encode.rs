//! Encoding and decoding helpers between [`Snapshot`] and the plain-text
//! columns stored in SQLite.
//!
//! Timestamps are stored as RFC 3339 strings and payloads as compact JSON.

use campus_core::snapshot::Snapshot;
use chrono::{DateTime, Utc};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Raw strings read directly from a `snapshots` row.
pub struct RawSnapshot {
  pub key:       String,
  pub stored_at: String,
  pub payload:   String,
}

impl RawSnapshot {
  pub fn encode(snapshot: &Snapshot) -> Result<Self> {
    Ok(Self {
      key:       snapshot.key.clone(),
      stored_at: encode_dt(snapshot.stored_at),
      payload:   serde_json::to_string(&snapshot.payload)?,
    })
  }

  pub fn into_snapshot(self) -> Result<Snapshot> {
    Ok(Snapshot {
      key:       self.key,
      stored_at: decode_dt(&self.stored_at)?,
      payload:   serde_json::from_str(&self.payload)?,
    })
  }
}
