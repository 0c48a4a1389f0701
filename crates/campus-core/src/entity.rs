//! Entities — the reviewable places and people on campus.
//!
//! An entity's type is fixed at creation and decides which subrating and tag
//! catalog applies to its reviews. The aggregate fields (`avg_rating`,
//! `rating_count`) are denormalised copies of server state and are refreshed by
//! re-fetching, never by local mutation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque, server-assigned entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for EntityId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for EntityId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── EntityType ──────────────────────────────────────────────────────────────

/// The closed set of reviewable entity kinds.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EntityType {
  Dorm,
  Classroom,
  Professor,
  FoodPlace,
  Toilet,
}

impl EntityType {
  /// Resolve a type string as sent by the directory endpoint.
  ///
  /// Accepts the canonical `SCREAMING_SNAKE_CASE` names plus the free-form
  /// labels the backend seeds with (`"Canteen"`, `"Lecture Theatre"`, ...).
  pub fn from_wire(raw: &str) -> Option<Self> {
    let raw = raw.trim();
    if let Ok(t) = raw.parse() {
      return Some(t);
    }
    match raw {
      "Canteen" | "Food" => Some(Self::FoodPlace),
      "Tutorial Room" | "Lecture Theatre" | "Seminar Room" | "Auditorium" => {
        Some(Self::Classroom)
      }
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Zone ────────────────────────────────────────────────────────────────────

/// A coarse campus sub-area, used as a filter facet.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Zone {
  Utown,
  KentRidge,
  Biz,
  Engineering,
  Medicine,
  Other,
}

impl Zone {
  /// Resolve a zone label from the wire. Blank input means "no zone"; any
  /// unrecognised label collapses to [`Zone::Other`].
  pub fn from_wire(raw: &str) -> Option<Self> {
    let raw = raw.trim();
    if raw.is_empty() {
      return None;
    }
    if let Ok(z) = raw.parse() {
      return Some(z);
    }
    Some(match raw {
      "UTown" => Self::Utown,
      "Kent Ridge" => Self::KentRidge,
      "Business" => Self::Biz,
      _ => Self::Other,
    })
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

/// Where an entity is. Resolved once when a raw record is mapped; downstream
/// code never re-parses location strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
  Coordinates {
    lat: f64,
    lng: f64,
  },
  /// Classrooms are located by building rather than by coordinates.
  BuildingRef {
    campus:        Option<String>,
    building_code: Option<String>,
  },
  #[default]
  Unknown,
}

impl Location {
  /// Parse the `"lat lng"` string form. Anything that does not yield two
  /// finite numbers is [`Location::Unknown`].
  pub fn parse_pair(raw: &str) -> Self {
    let mut parts = raw
      .split(|c: char| c.is_whitespace() || c == ',')
      .filter(|p| !p.is_empty())
      .map(str::parse::<f64>);
    match (parts.next(), parts.next()) {
      (Some(Ok(lat)), Some(Ok(lng))) if lat.is_finite() && lng.is_finite() => {
        Self::Coordinates { lat, lng }
      }
      _ => Self::Unknown,
    }
  }

  pub fn coordinates(&self) -> Option<(f64, f64)> {
    match self {
      Self::Coordinates { lat, lng } => Some((*lat, *lng)),
      _ => None,
    }
  }
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A reviewable campus place or person, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
  pub id:             EntityId,
  #[serde(rename = "type")]
  pub entity_type:    EntityType,
  pub name:           String,
  /// Location or affiliation line, e.g. "UTown" or "School of Computing".
  pub subtitle:       Option<String>,
  /// Descriptive tags set when the entity was created.
  #[serde(default)]
  pub tags:           Vec<String>,
  #[serde(default)]
  pub location:       Location,
  pub zone:           Option<Zone>,
  /// Only meaningful for toilets; gates the shower subrating.
  #[serde(default)]
  pub has_shower:     bool,
  #[serde(default)]
  pub avg_rating:     f64,
  #[serde(default)]
  pub rating_count:   u32,
  /// Server-generated summary of the entity's reviews, if any.
  pub review_summary: Option<String>,
  pub created_at:     Option<DateTime<Utc>>,
}

impl Entity {
  /// Minimal constructor; every optional field starts empty.
  pub fn new(id: impl Into<EntityId>, entity_type: EntityType, name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      entity_type,
      name: name.into(),
      subtitle: None,
      tags: Vec::new(),
      location: Location::Unknown,
      zone: None,
      has_shower: false,
      avg_rating: 0.0,
      rating_count: 0,
      review_summary: None,
      created_at: None,
    }
  }

  pub fn attrs(&self) -> EntityAttrs { EntityAttrs { has_shower: self.has_shower } }
}

/// The entity attributes that conditional catalog entries inspect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityAttrs {
  pub has_shower: bool,
}

// ─── NewEntity ───────────────────────────────────────────────────────────────

/// Input for creating an entity. Type and name are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntity {
  pub name:        String,
  #[serde(rename = "type")]
  pub entity_type: EntityType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub tags:        Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location:    Option<NewLocation>,
}

/// Coordinates in the shape the create endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NewLocation {
  pub latitude:  f64,
  pub longitude: f64,
}

impl NewEntity {
  pub fn new(entity_type: EntityType, name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      entity_type,
      description: None,
      tags: Vec::new(),
      location: None,
    }
  }

  /// Trim free text, drop blank optional fields and reject an empty name.
  pub fn normalize(mut self) -> crate::Result<Self> {
    self.name = self.name.trim().to_owned();
    if self.name.is_empty() {
      return Err(crate::Error::EmptyName);
    }
    self.description = self
      .description
      .map(|d| d.trim().to_owned())
      .filter(|d| !d.is_empty());
    self.tags = self
      .tags
      .into_iter()
      .map(|t| t.trim().to_owned())
      .filter(|t| !t.is_empty())
      .collect();
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn entity_type_wire_aliases() {
    assert_eq!(EntityType::from_wire("FOOD_PLACE"), Some(EntityType::FoodPlace));
    assert_eq!(EntityType::from_wire("Canteen"), Some(EntityType::FoodPlace));
    assert_eq!(EntityType::from_wire("Lecture Theatre"), Some(EntityType::Classroom));
    assert_eq!(EntityType::from_wire("Toilet"), Some(EntityType::Toilet));
    assert_eq!(EntityType::from_wire("Spaceship"), None);
  }

  #[test]
  fn entity_type_display_matches_serde() {
    for t in EntityType::iter() {
      let json = serde_json::to_value(t).unwrap();
      assert_eq!(json.as_str(), Some(t.to_string().as_str()));
    }
  }

  #[test]
  fn zone_wire_aliases() {
    assert_eq!(Zone::from_wire("UTown"), Some(Zone::Utown));
    assert_eq!(Zone::from_wire("KENT_RIDGE"), Some(Zone::KentRidge));
    assert_eq!(Zone::from_wire("Business"), Some(Zone::Biz));
    assert_eq!(Zone::from_wire("Science"), Some(Zone::Other));
    assert_eq!(Zone::from_wire("  "), None);
  }

  #[test]
  fn location_pair_parsing() {
    assert_eq!(
      Location::parse_pair("1.2966 103.7764"),
      Location::Coordinates { lat: 1.2966, lng: 103.7764 }
    );
    assert_eq!(
      Location::parse_pair("1.5, 103.5"),
      Location::Coordinates { lat: 1.5, lng: 103.5 }
    );
    assert_eq!(Location::parse_pair("COM2"), Location::Unknown);
    assert_eq!(Location::parse_pair("1.5"), Location::Unknown);
  }

  #[test]
  fn new_entity_requires_name() {
    let err = NewEntity::new(EntityType::Dorm, "   ").normalize().unwrap_err();
    assert!(matches!(err, crate::Error::EmptyName));

    let mut input = NewEntity::new(EntityType::Dorm, " Tembusu ");
    input.description = Some("  ".into());
    let ok = input.normalize().unwrap();
    assert_eq!(ok.name, "Tembusu");
    assert_eq!(ok.description, None);
  }
}
