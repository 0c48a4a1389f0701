//! Course-module lookup for tagging professor reviews.
//!
//! The module list for the current academic year is fetched from the
//! external course catalog and cached in memory and in the snapshot store
//! for a day.

use std::{
  future::Future,
  sync::{Arc, Mutex, MutexGuard},
};

use campus_core::{
  clock::Clock,
  snapshot::{MODULES_KEY, Snapshot, SnapshotStore},
};
use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, cache::Slot};

/// Campus local time is UTC+8; academic-year boundaries follow it.
const CAMPUS_UTC_OFFSET_SECS: i32 = 8 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
  pub module_code: String,
  pub title:       String,
  #[serde(default)]
  pub semesters:   Vec<u8>,
}

/// Where the module list comes from.
pub trait ModuleSource: Send + Sync {
  fn fetch_modules<'a>(
    &'a self,
    acad_year: &'a str,
  ) -> impl Future<Output = Result<Vec<CourseModule>>> + Send + 'a;
}

/// Academic year label such as `"2025-2026"`. The year starts in August.
pub fn academic_year(now: DateTime<Utc>) -> String {
  let local = FixedOffset::east_opt(CAMPUS_UTC_OFFSET_SECS)
    .map_or_else(|| now.naive_utc(), |tz| now.with_timezone(&tz).naive_local());
  let year = local.year();
  if local.month() >= 8 {
    format!("{}-{}", year, year + 1)
  } else {
    format!("{}-{}", year - 1, year)
  }
}

/// Rank modules against `query`: exact code matches first, then code
/// prefixes, then code or title substrings. A blank query matches nothing.
pub fn search_modules(modules: &[CourseModule], query: &str, limit: usize) -> Vec<CourseModule> {
  let q = query.trim().to_lowercase();
  if q.is_empty() {
    return Vec::new();
  }

  let mut exact = Vec::new();
  let mut prefix = Vec::new();
  let mut contains = Vec::new();
  for m in modules {
    let code = m.module_code.to_lowercase();
    if code == q {
      exact.push(m);
    } else if code.starts_with(&q) {
      prefix.push(m);
    } else if code.contains(&q) || m.title.to_lowercase().contains(&q) {
      contains.push(m);
    }
  }

  exact
    .into_iter()
    .chain(prefix)
    .chain(contains)
    .take(limit)
    .cloned()
    .collect()
}

/// Commonly taken computing and maths modules, in suggestion order.
pub const POPULAR_MODULE_CODES: &[&str] = &[
  "CS1010", "CS1010S", "CS1010X", "CS1010E", "CS1231", "CS1231S", "CS2030", "CS2030S", "CS2040",
  "CS2040S", "CS2100", "CS2101", "CS2102", "CS2103", "CS2103T", "CS2105", "CS2106", "CS3203",
  "CS3216", "CS3217", "CS3230", "IS1108", "IS2101", "IS2102", "IS2103", "MA1521", "MA1522",
  "MA2001", "ST2334",
];

/// The modules from `modules` whose code is in [`POPULAR_MODULE_CODES`],
/// keeping the order of `modules`.
pub fn popular_modules(modules: &[CourseModule]) -> Vec<CourseModule> {
  modules
    .iter()
    .filter(|m| POPULAR_MODULE_CODES.contains(&m.module_code.as_str()))
    .cloned()
    .collect()
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

pub struct ModuleCatalog<M, S> {
  source: Arc<M>,
  store:  Arc<S>,
  clock:  Arc<dyn Clock>,
  ttl:    TimeDelta,
  memory: Mutex<Slot<Vec<CourseModule>>>,
}

impl<M, S> ModuleCatalog<M, S>
where
  M: ModuleSource,
  S: SnapshotStore,
{
  pub fn new(source: Arc<M>, store: Arc<S>, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
    Self { source, store, clock, ttl, memory: Mutex::new(Slot::default()) }
  }

  fn memory(&self) -> MutexGuard<'_, Slot<Vec<CourseModule>>> {
    self.memory.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// The module list, fetched at most once per TTL. Failures fall back to a
  /// stale copy or an empty list.
  pub async fn modules(&self) -> Vec<CourseModule> {
    let now = self.clock.now();
    let (generation, stale) = {
      let memory = self.memory();
      if let Some(modules) = memory.fresh(now, self.ttl) {
        return modules;
      }
      (memory.generation(), memory.any())
    };

    let persisted = match self.store.load(MODULES_KEY).await {
      Ok(snapshot) => snapshot,
      Err(e) => {
        tracing::warn!(error = %e, "modules: reading persisted cache failed");
        None
      }
    };
    let persisted = persisted.and_then(|snap| match snap.decode::<Vec<CourseModule>>() {
      Ok(modules) => Some((snap.stored_at, modules)),
      Err(e) => {
        tracing::warn!(error = %e, "modules: persisted cache is unreadable");
        None
      }
    });
    let trusted = persisted
      .as_ref()
      .is_some_and(|(stored_at, _)| self.memory().postdates_invalidation(*stored_at));
    if let Some((stored_at, modules)) = &persisted
      && trusted
      && now.signed_duration_since(*stored_at) < self.ttl
    {
      tracing::debug!(count = modules.len(), "modules: persisted hit");
      self.memory().fill(generation, modules.clone(), *stored_at);
      return modules.clone();
    }

    let acad_year = academic_year(now);
    match self.source.fetch_modules(&acad_year).await {
      Ok(modules) => {
        tracing::info!(%acad_year, count = modules.len(), "fetched module list");
        if self.memory().fill(generation, modules.clone(), now) {
          self.persist(generation, now, &modules).await;
        }
        modules
      }
      Err(e) => {
        tracing::warn!(%acad_year, error = %e, "module list fetch failed");
        stale
          .or_else(|| persisted.map(|(_, modules)| modules))
          .unwrap_or_default()
      }
    }
  }

  async fn persist(&self, generation: u64, now: DateTime<Utc>, modules: &[CourseModule]) {
    let result = match Snapshot::capture(MODULES_KEY, now, &modules) {
      Ok(snapshot) => self.store.save(snapshot).await.map_err(Error::store),
      Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
      tracing::warn!(error = %e, "modules: writing persisted cache failed");
      return;
    }
    let invalidated = self.memory().generation() != generation;
    if invalidated && let Err(e) = self.store.remove(MODULES_KEY).await {
      tracing::warn!(error = %e, "modules: clearing persisted cache failed");
    }
  }

  pub async fn search(&self, query: &str, limit: usize) -> Vec<CourseModule> {
    search_modules(&self.modules().await, query, limit)
  }

  /// The popular subset of the module list, shown before anything is typed.
  pub async fn popular(&self) -> Vec<CourseModule> { popular_modules(&self.modules().await) }

  pub(crate) fn forget(&self) { self.memory().invalidate(self.clock.now()); }

  /// Drop both cache tiers.
  pub async fn clear(&self) -> Result<()> {
    self.forget();
    self.store.remove(MODULES_KEY).await.map_err(Error::store)
  }
}
