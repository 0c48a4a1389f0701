//! Client configuration, loaded from an optional TOML file and `CAMPUS_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use chrono::TimeDelta;
use serde::Deserialize;

use crate::Result;

/// Upper bound on any single request, regardless of configuration.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime client configuration. Every field has a default, so an empty
/// config file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  /// Root of the review backend; endpoints are `entities`, `reviews` and
  /// `vote` under it.
  pub base_url:              String,
  /// Root of the course-catalog API.
  pub modules_url:           String,
  pub request_timeout_secs:  u64,
  /// Freshness window for the entity directory and per-entity reviews.
  pub cache_ttl_secs:        u64,
  /// Freshness window for the course-module list.
  pub module_cache_ttl_secs: u64,
  /// SQLite file for the persisted cache tier. A leading `~/` is expanded by
  /// the caller.
  pub cache_path:            PathBuf,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:              "http://localhost:8080".to_string(),
      modules_url:           "https://api.nusmods.com/v2".to_string(),
      request_timeout_secs:  MAX_REQUEST_TIMEOUT_SECS,
      cache_ttl_secs:        5 * 60,
      module_cache_ttl_secs: 24 * 60 * 60,
      cache_path:            PathBuf::from("~/.cache/campus/cache.sqlite"),
    }
  }
}

impl ClientConfig {
  /// Layer `path` (if it exists) and the environment over the defaults.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    let cfg: Self = builder
      .add_source(config::Environment::with_prefix("CAMPUS").try_parsing(true))
      .build()?
      .try_deserialize()?;
    Ok(cfg)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.clamp(1, MAX_REQUEST_TIMEOUT_SECS))
  }

  pub fn cache_ttl(&self) -> TimeDelta { secs(self.cache_ttl_secs) }

  pub fn module_cache_ttl(&self) -> TimeDelta { secs(self.module_cache_ttl_secs) }
}

fn secs(n: u64) -> TimeDelta {
  TimeDelta::try_seconds(i64::try_from(n).unwrap_or(i64::MAX)).unwrap_or(TimeDelta::MAX)
}
