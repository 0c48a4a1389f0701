//! In-memory directory queries: filtering, sorting, pagination and search over
//! the full entity set.
//!
//! The directory is fetched once and every listing is computed locally, so
//! these functions must be deterministic: sorts are stable and re-applying the
//! same criteria to a result returns it unchanged.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::entity::{Entity, EntityType, Zone};

/// Listing order. Absent means "keep directory order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SortOrder {
  /// `avg_rating`, highest first.
  TopRated,
  /// `rating_count`, highest first.
  MostReviewed,
  /// `created_at`, most recent first; entities without a creation time keep
  /// their directory order after the dated ones.
  Newest,
}

/// Facets applied on top of the mandatory type filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityFilters {
  /// Case-insensitive substring over name, subtitle and tags.
  pub search:     Option<String>,
  pub zone:       Option<Zone>,
  pub has_shower: Option<bool>,
  pub sort:       Option<SortOrder>,
}

/// One page of a larger result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items:     Vec<T>,
  pub total:     usize,
  pub page:      usize,
  pub page_size: usize,
  pub has_more:  bool,
}

/// `true` if `needle` (already lowercased) occurs in the entity's name,
/// subtitle, or any descriptive tag.
fn matches_text(entity: &Entity, needle: &str) -> bool {
  entity.name.to_lowercase().contains(needle)
    || entity
      .subtitle
      .as_deref()
      .is_some_and(|s| s.to_lowercase().contains(needle))
    || entity.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

fn normalize_needle(query: &str) -> String { query.trim().to_lowercase() }

pub fn filter_and_sort(
  entities: &[Entity],
  entity_type: EntityType,
  filters: &EntityFilters,
) -> Vec<Entity> {
  let needle = filters
    .search
    .as_deref()
    .map(normalize_needle)
    .filter(|n| !n.is_empty());

  let mut result: Vec<Entity> = entities
    .iter()
    .filter(|e| e.entity_type == entity_type)
    .filter(|e| needle.as_deref().is_none_or(|n| matches_text(e, n)))
    .filter(|e| filters.zone.is_none_or(|z| e.zone == Some(z)))
    .filter(|e| filters.has_shower.is_none_or(|s| e.has_shower == s))
    .cloned()
    .collect();

  // `sort_by` / `sort_by_key` are stable, which keeps pagination deterministic.
  match filters.sort {
    Some(SortOrder::TopRated) => {
      result.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
    }
    Some(SortOrder::MostReviewed) => {
      result.sort_by_key(|e| Reverse(e.rating_count));
    }
    Some(SortOrder::Newest) => {
      result.sort_by_key(|e| Reverse(e.created_at));
    }
    None => {}
  }
  result
}

/// Slice out page `page` (1-indexed; 0 is treated as 1) of `page_size` items.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
  let page = page.max(1);
  let total = items.len();
  let start = (page - 1).saturating_mul(page_size);
  let end = start.saturating_add(page_size);
  Page {
    items: items[start.min(total)..end.min(total)].to_vec(),
    total,
    page,
    page_size,
    has_more: end < total,
  }
}

/// Cross-type typeahead: substring match over the whole directory, truncated
/// to `limit`. A blank query matches everything.
pub fn search(entities: &[Entity], query: &str, limit: usize) -> Vec<Entity> {
  let needle = normalize_needle(query);
  entities
    .iter()
    .filter(|e| matches_text(e, &needle))
    .take(limit)
    .cloned()
    .collect()
}

/// The `limit` highest-rated entities of any type.
pub fn top_rated(entities: &[Entity], limit: usize) -> Vec<Entity> {
  let mut sorted = entities.to_vec();
  sorted.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
  sorted.truncate(limit);
  sorted
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn entity(id: &str, t: EntityType, name: &str, avg: f64, count: u32) -> Entity {
    let mut e = Entity::new(id, t, name);
    e.avg_rating = avg;
    e.rating_count = count;
    e
  }

  fn directory() -> Vec<Entity> {
    let mut toilet_a = entity("t1", EntityType::Toilet, "COM2 L1 Male", 4.2, 78);
    toilet_a.zone = Some(Zone::KentRidge);
    toilet_a.subtitle = Some("School of Computing".into());
    let mut toilet_b = entity("t2", EntityType::Toilet, "UTown Gym Toilet", 4.5, 112);
    toilet_b.zone = Some(Zone::Utown);
    toilet_b.has_shower = true;
    toilet_b.tags = vec!["Spacious".into()];
    let mut toilet_c = entity("t3", EntityType::Toilet, "Central Library B1", 4.2, 45);
    toilet_c.zone = Some(Zone::KentRidge);
    let dorm = entity("d1", EntityType::Dorm, "Tembusu College", 4.8, 10);
    vec![toilet_a, toilet_b, toilet_c, dorm]
  }

  fn ids(entities: &[Entity]) -> Vec<&str> { entities.iter().map(|e| e.id.as_str()).collect() }

  #[test]
  fn filters_by_type_only_when_no_facets() {
    let out = filter_and_sort(&directory(), EntityType::Toilet, &EntityFilters::default());
    assert_eq!(ids(&out), ["t1", "t2", "t3"]);
  }

  #[test]
  fn search_is_case_insensitive_over_name_subtitle_and_tags() {
    let dir = directory();
    let by = |q: &str| {
      let filters = EntityFilters { search: Some(q.into()), ..Default::default() };
      ids(&filter_and_sort(&dir, EntityType::Toilet, &filters))
        .into_iter()
        .map(str::to_owned)
        .collect::<Vec<_>>()
    };
    assert_eq!(by("utown"), ["t2"]);
    assert_eq!(by("COMPUTING"), ["t1"]);
    assert_eq!(by("spacious"), ["t2"]);
    assert_eq!(by("   "), ["t1", "t2", "t3"]);
  }

  #[test]
  fn zone_and_shower_facets() {
    let dir = directory();
    let filters = EntityFilters { zone: Some(Zone::KentRidge), ..Default::default() };
    assert_eq!(ids(&filter_and_sort(&dir, EntityType::Toilet, &filters)), ["t1", "t3"]);

    let filters = EntityFilters { has_shower: Some(true), ..Default::default() };
    assert_eq!(ids(&filter_and_sort(&dir, EntityType::Toilet, &filters)), ["t2"]);

    let filters = EntityFilters { has_shower: Some(false), ..Default::default() };
    assert_eq!(ids(&filter_and_sort(&dir, EntityType::Toilet, &filters)), ["t1", "t3"]);
  }

  #[test]
  fn top_rated_sort_is_stable() {
    let filters = EntityFilters { sort: Some(SortOrder::TopRated), ..Default::default() };
    let out = filter_and_sort(&directory(), EntityType::Toilet, &filters);
    // t1 and t3 tie on 4.2 and keep their directory order.
    assert_eq!(ids(&out), ["t2", "t1", "t3"]);
  }

  #[test]
  fn most_reviewed_sort() {
    let filters = EntityFilters { sort: Some(SortOrder::MostReviewed), ..Default::default() };
    let out = filter_and_sort(&directory(), EntityType::Toilet, &filters);
    assert_eq!(ids(&out), ["t2", "t1", "t3"]);
  }

  #[test]
  fn newest_sort_puts_undated_last() {
    let mut dir = directory();
    dir[0].created_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    dir[2].created_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    let filters = EntityFilters { sort: Some(SortOrder::Newest), ..Default::default() };
    let out = filter_and_sort(&dir, EntityType::Toilet, &filters);
    assert_eq!(ids(&out), ["t3", "t1", "t2"]);
  }

  #[test]
  fn filter_and_sort_is_idempotent() {
    let dir = directory();
    for sort in [None, Some(SortOrder::TopRated), Some(SortOrder::MostReviewed), Some(SortOrder::Newest)] {
      let filters = EntityFilters {
        search: Some("o".into()),
        sort,
        ..Default::default()
      };
      let once = filter_and_sort(&dir, EntityType::Toilet, &filters);
      let twice = filter_and_sort(&once, EntityType::Toilet, &filters);
      assert_eq!(once, twice, "{sort:?}");
    }
  }

  #[test]
  fn pages_concatenate_back_to_the_list() {
    let list: Vec<u32> = (0..23).collect();
    let size = 5;
    let pages = list.len().div_ceil(size);
    let mut rebuilt = Vec::new();
    for page in 1..=pages {
      let p = paginate(&list, page, size);
      assert_eq!(p.total, 23);
      assert_eq!(p.has_more, page < pages);
      rebuilt.extend(p.items);
    }
    assert_eq!(rebuilt, list);
  }

  #[test]
  fn page_past_the_end_is_empty() {
    let list = [1, 2, 3];
    let p = paginate(&list, 4, 2);
    assert!(p.items.is_empty());
    assert!(!p.has_more);
    assert_eq!(paginate(&list, 0, 2).items, vec![1, 2]);
  }

  #[test]
  fn search_spans_types_and_truncates() {
    let dir = directory();
    let hits = search(&dir, "e", 10);
    assert_eq!(ids(&hits), ["t1", "t2", "t3", "d1"]);
    assert_eq!(search(&dir, "e", 2).len(), 2);
    assert_eq!(ids(&search(&dir, "tembusu", 5)), ["d1"]);
  }

  #[test]
  fn top_rated_across_types() {
    assert_eq!(ids(&top_rated(&directory(), 2)), ["d1", "t2"]);
  }
}
