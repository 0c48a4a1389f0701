//! [`Directory`] — the cached, read-mostly view of every entity.
//!
//! Reads go memory tier → persisted tier → network. Both tiers honour the
//! same TTL, and every write through the client invalidates them. A persisted
//! copy written before the last invalidation is never served as fresh, even
//! if removing it failed. A failed network read falls back to whatever stale
//! copy exists, and finally to an empty list; `fetch_all` never errors.

use std::sync::{Arc, Mutex, MutexGuard};

use campus_core::{
  backend::ReviewBackend,
  clock::Clock,
  entity::{Entity, EntityId, EntityType, NewEntity},
  query::{self, EntityFilters, Page},
  snapshot::{ENTITIES_KEY, Snapshot, SnapshotStore},
};
use chrono::{DateTime, TimeDelta, Utc};

use crate::{Error, Result, cache::Slot};

pub struct Directory<B, S> {
  backend: Arc<B>,
  store:   Arc<S>,
  clock:   Arc<dyn Clock>,
  ttl:     TimeDelta,
  memory:  Mutex<Slot<Vec<Entity>>>,
}

impl<B, S> Directory<B, S>
where
  B: ReviewBackend<Error = Error>,
  S: SnapshotStore,
{
  pub fn new(backend: Arc<B>, store: Arc<S>, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
    Self { backend, store, clock, ttl, memory: Mutex::new(Slot::default()) }
  }

  fn memory(&self) -> MutexGuard<'_, Slot<Vec<Entity>>> {
    self.memory.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Every entity, from the freshest source available.
  pub async fn fetch_all(&self) -> Vec<Entity> {
    let now = self.clock.now();
    let (generation, stale) = {
      let memory = self.memory();
      if let Some(entities) = memory.fresh(now, self.ttl) {
        tracing::debug!(count = entities.len(), "directory: memory hit");
        return entities;
      }
      (memory.generation(), memory.any())
    };

    let persisted = self.load_snapshot().await;
    let trusted = persisted
      .as_ref()
      .is_some_and(|(stored_at, _)| self.memory().postdates_invalidation(*stored_at));
    if let Some((stored_at, entities)) = &persisted
      && trusted
      && now.signed_duration_since(*stored_at) < self.ttl
    {
      tracing::debug!(count = entities.len(), "directory: persisted hit");
      self.memory().fill(generation, entities.clone(), *stored_at);
      return entities.clone();
    }

    match self.backend.fetch_entities().await {
      Ok(entities) => {
        tracing::debug!(count = entities.len(), "directory: fetched from network");
        if self.memory().fill(generation, entities.clone(), now) {
          self.save_snapshot(generation, now, &entities).await;
        } else {
          tracing::debug!("directory: invalidated during fetch, not caching");
        }
        entities
      }
      Err(e) => {
        tracing::warn!(error = %e, "directory fetch failed, serving stale data");
        stale
          .or_else(|| persisted.map(|(_, entities)| entities))
          .unwrap_or_default()
      }
    }
  }

  async fn load_snapshot(&self) -> Option<(DateTime<Utc>, Vec<Entity>)> {
    let snapshot = match self.store.load(ENTITIES_KEY).await {
      Ok(snapshot) => snapshot?,
      Err(e) => {
        tracing::warn!(error = %e, "directory: reading persisted cache failed");
        return None;
      }
    };
    match snapshot.decode() {
      Ok(entities) => Some((snapshot.stored_at, entities)),
      Err(e) => {
        tracing::warn!(error = %e, "directory: persisted cache is unreadable");
        None
      }
    }
  }

  /// Persist `entities`, then undo the write if an invalidation landed while
  /// it was in flight.
  async fn save_snapshot(&self, generation: u64, now: DateTime<Utc>, entities: &[Entity]) {
    let result = match Snapshot::capture(ENTITIES_KEY, now, &entities) {
      Ok(snapshot) => self.store.save(snapshot).await.map_err(Error::store),
      Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
      tracing::warn!(error = %e, "directory: writing persisted cache failed");
      return;
    }
    if self.memory().generation() != generation {
      tracing::debug!("directory: invalidated while persisting, dropping snapshot");
      self.remove_snapshot().await;
    }
  }

  async fn remove_snapshot(&self) {
    if let Err(e) = self.store.remove(ENTITIES_KEY).await {
      tracing::warn!(error = %e, "directory: clearing persisted cache failed");
    }
  }

  /// Drop the memory tier and mark every persisted copy written so far as
  /// outdated.
  pub(crate) fn forget(&self) { self.memory().invalidate(self.clock.now()); }

  /// Drop both cache tiers; the next read goes to the network.
  pub async fn invalidate(&self) {
    self.forget();
    self.remove_snapshot().await;
  }

  /// Invalidate, then fetch.
  pub async fn refresh(&self) -> Vec<Entity> {
    self.invalidate().await;
    self.fetch_all().await
  }

  pub async fn get(&self, id: &EntityId) -> Option<Entity> {
    self.fetch_all().await.into_iter().find(|e| &e.id == id)
  }

  /// One page of `entity_type`, filtered and sorted.
  pub async fn list(
    &self,
    entity_type: EntityType,
    filters: &EntityFilters,
    page: usize,
    page_size: usize,
  ) -> Page<Entity> {
    let all = self.fetch_all().await;
    let matching = query::filter_and_sort(&all, entity_type, filters);
    query::paginate(&matching, page, page_size)
  }

  /// Cross-type typeahead.
  pub async fn search(&self, q: &str, limit: usize) -> Vec<Entity> {
    query::search(&self.fetch_all().await, q, limit)
  }

  pub async fn top_rated(&self, limit: usize) -> Vec<Entity> {
    query::top_rated(&self.fetch_all().await, limit)
  }

  /// Create an entity. The directory cache is invalidated so it shows up on
  /// the next read.
  pub async fn create_entity(&self, input: NewEntity) -> Result<EntityId> {
    let input = input.normalize()?;
    let id = self.backend.create_entity(&input).await?;
    tracing::info!(%id, entity_type = %input.entity_type, name = %input.name, "created entity");
    self.invalidate().await;
    Ok(id)
  }
}
