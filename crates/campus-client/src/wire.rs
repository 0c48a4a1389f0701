//! Raw backend records and their mapping into canonical `campus-core` types.
//!
//! The backend is loose about shapes: list responses may be bare arrays or
//! wrapped in an envelope, `location` comes in three forms, and review ids
//! and timestamps vary by record age. All of that is absorbed here. Records
//! that cannot be mapped are skipped with a warning rather than failing the
//! whole response.

use std::collections::{BTreeMap, HashMap};

use campus_core::{
  entity::{Entity, EntityType, Location, Zone},
  review::{Review, UNSET},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

// ─── Envelopes ───────────────────────────────────────────────────────────────

/// Pull the record list out of `body`, which may be a bare array or an
/// object carrying the array under one of `fields`.
fn unwrap_list(endpoint: &str, body: Value, fields: &[&str]) -> Result<Vec<Value>> {
  match body {
    Value::Array(items) => Ok(items),
    Value::Object(mut map) => fields
      .iter()
      .find_map(|f| match map.remove(*f) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
      })
      .ok_or_else(|| Error::shape(endpoint, format!("expected an array or one of {fields:?}"))),
    other => Err(Error::shape(endpoint, format!("expected a list, got {}", kind(&other)))),
  }
}

fn kind(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Decode each item independently, skipping the ones that do not fit.
fn decode_each<R: DeserializeOwned>(endpoint: &str, items: Vec<Value>) -> Vec<R> {
  items
    .into_iter()
    .enumerate()
    .filter_map(|(i, item)| match serde_json::from_value(item) {
      Ok(raw) => Some(raw),
      Err(e) => {
        tracing::warn!(endpoint, index = i, error = %e, "skipping malformed record");
        None
      }
    })
    .collect()
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
  Millis(i64),
  Text(String),
}

impl RawTimestamp {
  fn resolve(&self) -> Option<DateTime<Utc>> {
    match self {
      Self::Millis(ms) => DateTime::from_timestamp_millis(*ms),
      Self::Text(s) => DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc)),
    }
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// A coordinate given as a number or as numeric text.
fn coordinate(v: Option<&Value>) -> Option<f64> {
  let n = match v? {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }?;
  n.is_finite().then_some(n)
}

fn text(v: Option<&Value>) -> Option<String> {
  v.and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// Resolve `location` in any of its forms: a `"lat lng"` string, an object
/// with coordinates, or an object naming a building. Anything else is
/// [`Location::Unknown`].
fn resolve_location(raw: &Value) -> Location {
  match raw {
    Value::String(s) => Location::parse_pair(s),
    Value::Object(map) => {
      let lat = coordinate(map.get("latitude"));
      let lng = coordinate(map.get("longitude"));
      if let (Some(lat), Some(lng)) = (lat, lng) {
        return Location::Coordinates { lat, lng };
      }
      let campus = text(map.get("campus"));
      let building_code = text(map.get("building_code"));
      if campus.is_some() || building_code.is_some() {
        Location::BuildingRef { campus, building_code }
      } else {
        Location::Unknown
      }
    }
    _ => Location::Unknown,
  }
}

/// `true`/`false` from the boolean feature flags; entries of any other type
/// are ignored.
fn feature_flag(features: Option<&Value>, names: &[&str]) -> Option<bool> {
  let map = features?.as_object()?;
  names.iter().find_map(|n| map.get(*n).and_then(Value::as_bool))
}

/// Optional fields are kept as raw JSON and resolved leniently, so a field
/// of an unexpected type drops that field rather than the whole record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
  id:             String,
  name:           String,
  #[serde(rename = "type")]
  kind:           String,
  description:    Option<Value>,
  location:       Option<Value>,
  tags:           Option<Value>,
  avg_rating:     Option<Value>,
  rating_count:   Option<Value>,
  review_summary: Option<Value>,
  created_at:     Option<Value>,
  zone:           Option<Value>,
  has_shower:     Option<Value>,
  features:       Option<Value>,
}

impl RawEntity {
  fn into_entity(self) -> Option<Entity> {
    let Some(entity_type) = EntityType::from_wire(&self.kind) else {
      tracing::warn!(id = %self.id, kind = %self.kind, "skipping entity of unknown type");
      return None;
    };
    let has_shower = self
      .has_shower
      .as_ref()
      .and_then(Value::as_bool)
      .or_else(|| feature_flag(self.features.as_ref(), &["hasShower", "shower"]))
      .unwrap_or(false);
    let tags = match self.tags {
      Some(Value::Array(items)) => items
        .into_iter()
        .filter_map(|t| match t {
          Value::String(s) => Some(s),
          _ => None,
        })
        .collect(),
      _ => Vec::new(),
    };
    Some(Entity {
      id: self.id.into(),
      entity_type,
      name: self.name,
      subtitle: text(self.description.as_ref()),
      tags,
      location: self.location.as_ref().map(resolve_location).unwrap_or_default(),
      zone: self
        .zone
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Zone::from_wire),
      has_shower,
      avg_rating: self
        .avg_rating
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|r| r.is_finite())
        .unwrap_or(0.0),
      rating_count: self
        .rating_count
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map_or(0, |n| n as u32),
      review_summary: text(self.review_summary.as_ref()),
      created_at: self
        .created_at
        .and_then(|v| serde_json::from_value::<RawTimestamp>(v).ok())
        .as_ref()
        .and_then(RawTimestamp::resolve),
    })
  }
}

pub(crate) fn decode_entities(endpoint: &str, body: Value) -> Result<Vec<Entity>> {
  let items = unwrap_list(endpoint, body, &["entities", "data"])?;
  Ok(
    decode_each::<RawEntity>(endpoint, items)
      .into_iter()
      .filter_map(RawEntity::into_entity)
      .collect(),
  )
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReview {
  id:          Option<String>,
  uuid:        Option<String>,
  entity_id:   String,
  rating:      f64,
  description: Option<String>,
  author_name: Option<String>,
  tags:        Option<Vec<String>>,
  module_code: Option<String>,
  subratings:  Option<HashMap<String, Option<f64>>>,
  vote_count:  Option<f64>,
  created_at:  Option<RawTimestamp>,
}

fn clamp_score(v: f64) -> u8 {
  if v.is_finite() { v.round().clamp(0.0, 5.0) as u8 } else { UNSET }
}

impl RawReview {
  fn into_review(self) -> Option<Review> {
    let Some(id) = self.id.or(self.uuid) else {
      tracing::warn!(entity_id = %self.entity_id, "skipping review without an id");
      return None;
    };
    let subratings: BTreeMap<String, u8> = self
      .subratings
      .unwrap_or_default()
      .into_iter()
      .map(|(k, v)| (k, v.map_or(UNSET, clamp_score)))
      .collect();
    Some(Review {
      id: id.into(),
      entity_id: self.entity_id.into(),
      rating: clamp_score(self.rating),
      text: self.description.unwrap_or_default(),
      created_at: self
        .created_at
        .as_ref()
        .and_then(RawTimestamp::resolve)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
      author_name: self.author_name.filter(|n| !n.trim().is_empty()),
      tags: self.tags.unwrap_or_default(),
      module_code: self.module_code.filter(|m| !m.trim().is_empty()),
      subratings,
      vote_count: self
        .vote_count
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map_or(0, |n| n as u32),
    })
  }
}

pub(crate) fn decode_reviews(endpoint: &str, body: Value) -> Result<Vec<Review>> {
  let items = unwrap_list(endpoint, body, &["reviews", "data"])?;
  Ok(
    decode_each::<RawReview>(endpoint, items)
      .into_iter()
      .filter_map(RawReview::into_review)
      .collect(),
  )
}

// ─── Write responses ─────────────────────────────────────────────────────────

/// The id in a create response: `{id}`, `{entityId}` or `{uuid}`.
pub(crate) fn created_id(endpoint: &str, body: &Value) -> Result<String> {
  ["id", "entityId", "uuid"]
    .iter()
    .find_map(|f| match body.get(*f) {
      Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
      Some(Value::Number(n)) => Some(n.to_string()),
      _ => None,
    })
    .ok_or_else(|| Error::shape(endpoint, "no id in create response"))
}

/// The new count in a vote response: `{voteCount}`, `{votes}` or
/// `{review: {voteCount}}`.
pub(crate) fn vote_count(endpoint: &str, body: &Value) -> Result<u32> {
  body
    .get("voteCount")
    .or_else(|| body.get("votes"))
    .or_else(|| body.get("review").and_then(|r| r.get("voteCount")))
    .and_then(Value::as_u64)
    .and_then(|n| u32::try_from(n).ok())
    .ok_or_else(|| Error::shape(endpoint, "no vote count in vote response"))
}

/// Best-effort message from a non-2xx body: the `error` field if the body is
/// JSON carrying one, otherwise the raw text cut to a sensible length.
pub(crate) fn error_message(body: &str) -> String {
  if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
    && let Some(Value::String(msg)) = map.get("error")
  {
    return msg.clone();
  }
  let body = body.trim();
  match body.char_indices().nth(200) {
    Some((cut, _)) => format!("{}…", &body[..cut]),
    None => body.to_owned(),
  }
}
