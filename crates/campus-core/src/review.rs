//! Reviews — one rating event tied to exactly one entity.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalog::{applicable_subratings, tag_by_id},
  entity::{Entity, EntityId, EntityType},
};

/// Shown in place of an author name when a review was posted anonymously.
pub const ANONYMOUS: &str = "Anonymous";

/// A subrating value of zero means "not rated".
pub const UNSET: u8 = 0;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

// ─── ReviewId ────────────────────────────────────────────────────────────────

/// Opaque, server-assigned review identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(pub String);

impl ReviewId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ReviewId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for ReviewId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for ReviewId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Review ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id:          ReviewId,
  pub entity_id:   EntityId,
  /// Overall score, 1–5.
  pub rating:      u8,
  #[serde(default)]
  pub text:        String,
  pub created_at:  DateTime<Utc>,
  /// `None` means the review is displayed as anonymous.
  pub author_name: Option<String>,
  #[serde(default)]
  pub tags:        Vec<String>,
  /// Course identifier; professor reviews only.
  pub module_code: Option<String>,
  /// Subrating key → score. [`UNSET`] marks a dimension the author skipped.
  #[serde(default)]
  pub subratings:  BTreeMap<String, u8>,
  #[serde(default)]
  pub vote_count:  u32,
}

impl Review {
  pub fn display_author(&self) -> &str {
    self
      .author_name
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .unwrap_or(ANONYMOUS)
  }

  /// The score for `key`, or `None` if absent or unset.
  pub fn subrating(&self, key: &str) -> Option<u8> {
    self.subratings.get(key).copied().filter(|v| *v != UNSET)
  }
}

// ─── NewReview ───────────────────────────────────────────────────────────────

/// Input to the submission pipeline. Only `entity_id` and `rating` are
/// required; `created_at` and `id` are assigned during submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
  pub entity_id:   EntityId,
  pub rating:      u8,
  #[serde(rename = "description")]
  pub text:        String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub tags:        Vec<String>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub subratings:  BTreeMap<String, u8>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub module_code: Option<String>,
}

impl NewReview {
  /// Convenience constructor with all optional fields empty.
  pub fn new(entity_id: impl Into<EntityId>, rating: u8) -> Self {
    Self {
      entity_id: entity_id.into(),
      rating,
      text: String::new(),
      tags: Vec::new(),
      subratings: BTreeMap::new(),
      author_name: None,
      module_code: None,
    }
  }

  /// Validate and canonicalise the input.
  ///
  /// The rating range is always checked. Catalog membership of subrating keys
  /// and tags, and the professor-only module code, are checked only when the
  /// target `entity` is known. Text and names are trimmed, a blank author
  /// becomes anonymous, and unset subratings are dropped.
  pub fn normalize(mut self, entity: Option<&Entity>) -> Result<Self> {
    if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
      return Err(Error::RatingOutOfRange(self.rating));
    }
    for (key, value) in &self.subratings {
      if *value > MAX_RATING {
        return Err(Error::SubratingOutOfRange { key: key.clone(), value: *value });
      }
    }

    self.text = self.text.trim().to_owned();
    self.author_name = self
      .author_name
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty());
    self.module_code = self
      .module_code
      .map(|m| m.trim().to_uppercase())
      .filter(|m| !m.is_empty());
    self.subratings.retain(|_, v| *v != UNSET);
    let mut seen = Vec::with_capacity(self.tags.len());
    for t in self.tags.drain(..) {
      let t = t.trim().to_owned();
      if !t.is_empty() && !seen.contains(&t) {
        seen.push(t);
      }
    }
    self.tags = seen;

    if let Some(entity) = entity {
      self.check_catalog(entity)?;
    }
    Ok(self)
  }

  fn check_catalog(&self, entity: &Entity) -> Result<()> {
    let entity_type = entity.entity_type;
    let applicable = applicable_subratings(entity_type, &entity.attrs());
    for key in self.subratings.keys() {
      if !applicable.iter().any(|d| d.key == key.as_str()) {
        return Err(Error::UnknownSubrating { key: key.clone(), entity_type });
      }
    }
    for tag in &self.tags {
      if tag_by_id(entity_type, tag).is_none() {
        return Err(Error::UnknownTag { tag: tag.clone(), entity_type });
      }
    }
    if self.module_code.is_some() && entity_type != EntityType::Professor {
      return Err(Error::ModuleCodeNotAllowed(entity_type));
    }
    Ok(())
  }
}
