//! [`Bookmarks`] — entities saved for later, kept for the session only.

use std::{
  collections::HashSet,
  sync::{Mutex, MutexGuard},
};

use campus_core::entity::{Entity, EntityId};

#[derive(Debug, Default)]
pub struct Bookmarks {
  marked: Mutex<HashSet<EntityId>>,
}

impl Bookmarks {
  pub fn new() -> Self { Self::default() }

  fn marked(&self) -> MutexGuard<'_, HashSet<EntityId>> {
    self.marked.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Flip the bookmark on `entity_id`. Returns whether it is now bookmarked.
  pub fn toggle(&self, entity_id: &EntityId) -> bool {
    let mut marked = self.marked();
    if marked.remove(entity_id) {
      tracing::debug!(%entity_id, "bookmark removed");
      false
    } else {
      tracing::debug!(%entity_id, "bookmark added");
      marked.insert(entity_id.clone());
      true
    }
  }

  pub fn is_bookmarked(&self, entity_id: &EntityId) -> bool {
    self.marked().contains(entity_id)
  }

  /// The bookmarked entries of `entities`, in the order given. Bookmarks on
  /// ids missing from `entities` are kept but not returned.
  pub fn select(&self, entities: Vec<Entity>) -> Vec<Entity> {
    let marked = self.marked();
    entities.into_iter().filter(|e| marked.contains(&e.id)).collect()
  }
}
