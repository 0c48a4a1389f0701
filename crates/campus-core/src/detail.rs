//! `EntityDetail` — the computed read model for one entity's page.
//!
//! Never stored, always derived from the entity plus its fetched reviews.

use serde::Serialize;

use crate::{
  aggregate::{
    RatingHistogram, SubratingStat, average_rating, rating_histogram, subrating_averages,
    top_tags,
  },
  catalog::applicable_subratings,
  entity::Entity,
  review::Review,
};

/// How many review tags an entity page highlights.
pub const DEFAULT_TOP_TAGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetail {
  pub entity:         Entity,
  pub reviews:        Vec<Review>,
  /// Recomputed from `reviews` when there are any; otherwise the server's
  /// denormalised average, or `None` if the entity has never been rated.
  pub average_rating: Option<f64>,
  pub histogram:      RatingHistogram,
  pub subratings:     Vec<SubratingStat>,
  pub top_tags:       Vec<String>,
}

impl EntityDetail {
  pub fn materialize(entity: Entity, reviews: Vec<Review>, top_tag_limit: usize) -> Self {
    let defs = applicable_subratings(entity.entity_type, &entity.attrs());
    let average_rating = average_rating(&reviews)
      .or_else(|| (entity.rating_count > 0).then_some(entity.avg_rating));
    Self {
      histogram: rating_histogram(&reviews),
      subratings: subrating_averages(&reviews, &defs),
      top_tags: top_tags(&reviews, top_tag_limit),
      average_rating,
      entity,
      reviews,
    }
  }

  pub fn subrating(&self, key: &str) -> Option<&SubratingStat> {
    self.subratings.iter().find(|s| s.key == key)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use chrono::{DateTime, Utc};

  use super::*;
  use crate::entity::EntityType;

  fn review(id: &str, rating: u8, subs: &[(&str, u8)]) -> Review {
    Review {
      id:          id.into(),
      entity_id:   "t1".into(),
      rating,
      text:        String::new(),
      created_at:  DateTime::<Utc>::UNIX_EPOCH,
      author_name: None,
      tags:        vec![],
      module_code: None,
      subratings:  subs.iter().map(|(k, v)| (k.to_string(), *v)).collect::<BTreeMap<_, _>>(),
      vote_count:  0,
    }
  }

  #[test]
  fn toilet_with_shower_end_to_end() {
    let mut toilet = Entity::new("t1", EntityType::Toilet, "UTown Gym Toilet");
    toilet.has_shower = true;
    let reviews = vec![
      review("r1", 5, &[("cleanliness", 5), ("showerUsability", 4)]),
      review("r2", 3, &[("cleanliness", 3)]),
    ];

    let detail = EntityDetail::materialize(toilet, reviews, DEFAULT_TOP_TAGS);
    assert_eq!(detail.average_rating, Some(4.0));

    let clean = detail.subrating("cleanliness").unwrap();
    assert_eq!((clean.average, clean.count), (Some(4.0), 2));
    let shower = detail.subrating("showerUsability").unwrap();
    assert_eq!((shower.average, shower.count), (Some(4.0), 1));
  }

  #[test]
  fn falls_back_to_server_average_without_reviews() {
    let mut dorm = Entity::new("d1", EntityType::Dorm, "Tembusu");
    dorm.avg_rating = 4.3;
    dorm.rating_count = 12;
    let detail = EntityDetail::materialize(dorm, vec![], DEFAULT_TOP_TAGS);
    assert_eq!(detail.average_rating, Some(4.3));

    let fresh = Entity::new("d2", EntityType::Dorm, "New Hall");
    let detail = EntityDetail::materialize(fresh, vec![], DEFAULT_TOP_TAGS);
    assert_eq!(detail.average_rating, None);
    assert!(detail.subrating("showerUsability").is_none());
  }
}
