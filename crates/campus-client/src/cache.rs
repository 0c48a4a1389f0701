//! The in-memory cache tier shared by the directory, review and module
//! services.

use chrono::{DateTime, TimeDelta, Utc};

/// A cached value and the time it was fetched.
#[derive(Debug, Clone)]
pub(crate) struct Cached<T> {
  pub value:      T,
  pub fetched_at: DateTime<Utc>,
}

impl<T> Cached<T> {
  pub fn new(value: T, fetched_at: DateTime<Utc>) -> Self { Self { value, fetched_at } }

  pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
    now.signed_duration_since(self.fetched_at) < ttl
  }
}

/// A cache slot guarded by a generation counter.
///
/// Every invalidation bumps the generation. A fetch records the generation it
/// started under and may only populate the slot if nothing was invalidated in
/// the meantime. The time of the last invalidation is kept too, so persisted
/// copies written before it are never served as fresh.
#[derive(Debug)]
pub(crate) struct Slot<T> {
  entry:          Option<Cached<T>>,
  generation:     u64,
  invalidated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Slot<T> {
  fn default() -> Self { Self { entry: None, generation: 0, invalidated_at: None } }
}

impl<T: Clone> Slot<T> {
  pub fn generation(&self) -> u64 { self.generation }

  /// The cached value if it is still fresh.
  pub fn fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> Option<T> {
    self
      .entry
      .as_ref()
      .filter(|c| c.is_fresh(now, ttl))
      .map(|c| c.value.clone())
  }

  /// The cached value regardless of age.
  pub fn any(&self) -> Option<T> { self.entry.as_ref().map(|c| c.value.clone()) }

  /// Whether a copy stored at `stored_at` was written after the last
  /// invalidation.
  pub fn postdates_invalidation(&self, stored_at: DateTime<Utc>) -> bool {
    self.invalidated_at.is_none_or(|at| stored_at > at)
  }

  /// Store `value` if the slot has not been invalidated since `generation`.
  /// Returns whether the value was stored.
  pub fn fill(&mut self, generation: u64, value: T, fetched_at: DateTime<Utc>) -> bool {
    if generation != self.generation {
      return false;
    }
    self.entry = Some(Cached::new(value, fetched_at));
    true
  }

  pub fn invalidate(&mut self, at: DateTime<Utc>) {
    self.entry = None;
    self.generation = self.generation.wrapping_add(1);
    self.invalidated_at = Some(self.invalidated_at.map_or(at, |prev| prev.max(at)));
  }
}
