//! The `ReviewBackend` trait: the remote data source behind the directory,
//! the review list, submission and voting.
//!
//! Implemented over HTTP by `campus-client`. Implementations return records
//! already mapped to canonical types; envelope and location parsing happen
//! behind this seam.

use std::future::Future;

use crate::{
  entity::{Entity, EntityId, NewEntity},
  review::{NewReview, Review, ReviewId},
};

/// All methods return `Send` futures so backends can be shared across tasks
/// (votes are confirmed in the background).
pub trait ReviewBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every entity in the directory.
  fn fetch_entities(
    &self,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  /// Create an entity and return its server-assigned id.
  fn create_entity<'a>(
    &'a self,
    input: &'a NewEntity,
  ) -> impl Future<Output = Result<EntityId, Self::Error>> + Send + 'a;

  /// Every review of `entity_id`.
  fn fetch_reviews<'a>(
    &'a self,
    entity_id: &'a EntityId,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + 'a;

  /// Store an already-validated review and return its server-assigned id.
  fn create_review<'a>(
    &'a self,
    input: &'a NewReview,
  ) -> impl Future<Output = Result<ReviewId, Self::Error>> + Send + 'a;

  /// Add one helpful-vote to `review_id`; returns the server's new count.
  fn vote<'a>(
    &'a self,
    review_id: &'a ReviewId,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;
}
