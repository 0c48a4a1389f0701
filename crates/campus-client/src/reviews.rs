//! [`ReviewService`] — per-entity review reads and the submission pipeline.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard},
};

use campus_core::{
  backend::ReviewBackend,
  clock::Clock,
  entity::EntityId,
  query::{self, Page},
  review::{NewReview, Review},
  snapshot::SnapshotStore,
};
use chrono::TimeDelta;

use crate::{Error, Result, cache::Slot, directory::Directory};

pub struct ReviewService<B, S> {
  backend:   Arc<B>,
  directory: Arc<Directory<B, S>>,
  clock:     Arc<dyn Clock>,
  ttl:       TimeDelta,
  cache:     Mutex<HashMap<EntityId, Slot<Vec<Review>>>>,
}

impl<B, S> ReviewService<B, S>
where
  B: ReviewBackend<Error = Error>,
  S: SnapshotStore,
{
  pub fn new(
    backend: Arc<B>,
    directory: Arc<Directory<B, S>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
  ) -> Self {
    Self { backend, directory, clock, ttl, cache: Mutex::new(HashMap::new()) }
  }

  fn cache(&self) -> MutexGuard<'_, HashMap<EntityId, Slot<Vec<Review>>>> {
    self.cache.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Every review of `entity_id`, in backend order.
  ///
  /// Served from cache while fresh. A failed fetch returns the stale cached
  /// list if there is one, else an empty list.
  pub async fn reviews_for(&self, entity_id: &EntityId) -> Vec<Review> {
    let now = self.clock.now();
    let (generation, stale) = {
      let mut cache = self.cache();
      let slot = cache.entry(entity_id.clone()).or_default();
      if let Some(reviews) = slot.fresh(now, self.ttl) {
        tracing::debug!(%entity_id, count = reviews.len(), "reviews: cache hit");
        return reviews;
      }
      (slot.generation(), slot.any())
    };

    match self.backend.fetch_reviews(entity_id).await {
      Ok(reviews) => {
        tracing::debug!(%entity_id, count = reviews.len(), "reviews: fetched");
        self
          .cache()
          .entry(entity_id.clone())
          .or_default()
          .fill(generation, reviews.clone(), now);
        reviews
      }
      Err(e) => {
        tracing::warn!(%entity_id, error = %e, "review fetch failed, serving stale data");
        stale.unwrap_or_default()
      }
    }
  }

  pub async fn page(&self, entity_id: &EntityId, page: usize, page_size: usize) -> Page<Review> {
    query::paginate(&self.reviews_for(entity_id).await, page, page_size)
  }

  /// Drop the cached reviews of one entity. A fetch already in flight for it
  /// will not repopulate the cache.
  pub fn invalidate(&self, entity_id: &EntityId) {
    if let Some(slot) = self.cache().get_mut(entity_id) {
      slot.invalidate(self.clock.now());
    }
  }

  pub fn invalidate_all(&self) {
    let now = self.clock.now();
    for slot in self.cache().values_mut() {
      slot.invalidate(now);
    }
  }

  /// Validate and post a review.
  ///
  /// The rating is checked before anything else, so an out-of-range rating
  /// never touches the network. Catalog checks (subrating keys, tags, module
  /// code) need the target entity and are skipped with a warning if it is
  /// not in the directory. On success the directory and this entity's
  /// reviews are invalidated; errors are returned as-is, without retry.
  pub async fn submit(&self, input: NewReview) -> Result<Review> {
    let input = input.normalize(None)?;

    let input = match self.directory.get(&input.entity_id).await {
      Some(entity) => input.normalize(Some(&entity))?,
      None => {
        tracing::warn!(
          entity_id = %input.entity_id,
          "submitting review for an entity missing from the directory; catalog checks skipped"
        );
        input
      }
    };

    let id = self.backend.create_review(&input).await?;
    tracing::info!(%id, entity_id = %input.entity_id, rating = input.rating, "review submitted");

    self.directory.invalidate().await;
    self.invalidate(&input.entity_id);

    Ok(Review {
      id,
      entity_id: input.entity_id,
      rating: input.rating,
      text: input.text,
      created_at: self.clock.now(),
      author_name: input.author_name,
      tags: input.tags,
      module_code: input.module_code,
      subratings: input.subratings,
      vote_count: 0,
    })
  }
}
