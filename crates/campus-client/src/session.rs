//! [`Session`] — one of each service, sharing a backend, store and clock.

use std::sync::Arc;

use campus_core::{
  backend::ReviewBackend,
  clock::{Clock, SystemClock},
  detail::{DEFAULT_TOP_TAGS, EntityDetail},
  entity::{Entity, EntityId},
  snapshot::SnapshotStore,
};

use crate::{
  Bookmarks, ClientConfig, Directory, Error, HttpBackend, ModuleCatalog, ModuleSource, Result,
  ReviewService, VoteTracker,
};

pub struct Session<B, S> {
  pub directory: Arc<Directory<B, S>>,
  pub reviews:   ReviewService<B, S>,
  pub votes:     VoteTracker<B>,
  pub modules:   ModuleCatalog<B, S>,
  pub bookmarks: Bookmarks,
  store:         Arc<S>,
}

impl<S: SnapshotStore> Session<HttpBackend, S> {
  /// A session against the configured HTTP endpoints, on wall-clock time.
  pub fn connect(config: &ClientConfig, store: S) -> Result<Self> {
    let backend = HttpBackend::new(config)?;
    Ok(Self::new(
      Arc::new(backend),
      Arc::new(store),
      Arc::new(SystemClock),
      config,
    ))
  }
}

impl<B, S> Session<B, S>
where
  B: ReviewBackend<Error = Error> + ModuleSource + 'static,
  S: SnapshotStore,
{
  pub fn new(backend: Arc<B>, store: Arc<S>, clock: Arc<dyn Clock>, config: &ClientConfig) -> Self {
    let directory = Arc::new(Directory::new(
      Arc::clone(&backend),
      Arc::clone(&store),
      Arc::clone(&clock),
      config.cache_ttl(),
    ));
    let reviews = ReviewService::new(
      Arc::clone(&backend),
      Arc::clone(&directory),
      Arc::clone(&clock),
      config.cache_ttl(),
    );
    let modules = ModuleCatalog::new(
      Arc::clone(&backend),
      Arc::clone(&store),
      clock,
      config.module_cache_ttl(),
    );
    Self {
      directory,
      reviews,
      votes: VoteTracker::new(backend),
      modules,
      bookmarks: Bookmarks::new(),
      store,
    }
  }

  /// Everything an entity page shows, or `NotFound` if the directory does
  /// not know `id`.
  pub async fn entity_detail(&self, id: &EntityId) -> Result<EntityDetail> {
    let entity = self
      .directory
      .get(id)
      .await
      .ok_or_else(|| Error::NotFound(format!("entity {id}")))?;
    let reviews = self.reviews.reviews_for(id).await;
    Ok(EntityDetail::materialize(entity, reviews, DEFAULT_TOP_TAGS))
  }

  /// Bookmarked entities, in directory order.
  pub async fn bookmarked_entities(&self) -> Vec<Entity> {
    self.bookmarks.select(self.directory.fetch_all().await)
  }

  /// Drop every cached entity, review and module list. Unlike the
  /// per-service invalidation this reports persisted-tier failures.
  pub async fn clear_caches(&self) -> Result<()> {
    self.directory.forget();
    self.reviews.invalidate_all();
    self.modules.forget();
    self.store.clear().await.map_err(Error::store)
  }
}
