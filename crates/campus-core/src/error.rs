//! Error types for `campus-core`.

use thiserror::Error;

use crate::entity::{EntityId, EntityType};

#[derive(Debug, Error)]
pub enum Error {
  #[error("rating must be between 1 and 5, got {0}")]
  RatingOutOfRange(u8),

  #[error("subrating {key:?} must be between 0 and 5, got {value}")]
  SubratingOutOfRange { key: String, value: u8 },

  #[error("subrating {key:?} does not apply to {entity_type}")]
  UnknownSubrating { key: String, entity_type: EntityType },

  #[error("tag {tag:?} is not in the {entity_type} catalog")]
  UnknownTag { tag: String, entity_type: EntityType },

  #[error("module codes can only be attached to professor reviews, not {0}")]
  ModuleCodeNotAllowed(EntityType),

  #[error("entity name must not be empty")]
  EmptyName,

  #[error("entity not found: {0}")]
  EntityNotFound(EntityId),

  #[error("unexpected response shape: {0}")]
  UnexpectedShape(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// `true` for client-side precondition failures that are detected before
  /// any network call is attempted.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::RatingOutOfRange(_)
        | Self::SubratingOutOfRange { .. }
        | Self::UnknownSubrating { .. }
        | Self::UnknownTag { .. }
        | Self::ModuleCodeNotAllowed(_)
        | Self::EmptyName
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
