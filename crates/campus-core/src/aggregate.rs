//! Pure, stateless statistics over the reviews of a single entity.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
  catalog::SubratingDefinition,
  review::{MAX_RATING, MIN_RATING, Review},
};

/// Arithmetic mean of the overall ratings, or `None` for no reviews.
/// Ratings outside 1–5 are left out, as in [`rating_histogram`].
///
/// Callers render `None` as a dash, never as zero.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
  let (sum, count) = reviews
    .iter()
    .map(|r| r.rating)
    .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
    .fold((0u64, 0usize), |(s, c), r| (s + u64::from(r), c + 1));
  (count > 0).then(|| sum as f64 / count as f64)
}

// ─── Histogram ───────────────────────────────────────────────────────────────

/// Review counts per star value, in display order 5, 4, 3, 2, 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RatingHistogram {
  pub counts: [usize; 5],
  /// Number of reviews the histogram was built from.
  pub reviews: usize,
}

impl RatingHistogram {
  /// Star values in the same order as `counts`.
  pub const BUCKETS: [u8; 5] = [5, 4, 3, 2, 1];

  pub fn count(&self, stars: u8) -> usize {
    match stars {
      MIN_RATING..=MAX_RATING => self.counts[usize::from(MAX_RATING - stars)],
      _ => 0,
    }
  }

  /// Divisor for percentage bars; never zero.
  pub fn normalizer(&self) -> usize { self.reviews.max(1) }

  /// Share of reviews with `stars`, in percent.
  pub fn percent(&self, stars: u8) -> f64 {
    self.count(stars) as f64 * 100.0 / self.normalizer() as f64
  }

  pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
    Self::BUCKETS.iter().copied().zip(self.counts.iter().copied())
  }
}

/// Count reviews by star value. Ratings outside 1–5 are not bucketed but
/// still count towards the normaliser.
pub fn rating_histogram(reviews: &[Review]) -> RatingHistogram {
  let mut hist = RatingHistogram { counts: [0; 5], reviews: reviews.len() };
  for r in reviews {
    if (MIN_RATING..=MAX_RATING).contains(&r.rating) {
      hist.counts[usize::from(MAX_RATING - r.rating)] += 1;
    }
  }
  hist
}

// ─── Subratings ──────────────────────────────────────────────────────────────

/// Average of one subrating across the reviews that actually scored it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubratingStat {
  pub key:     String,
  pub label:   String,
  /// `None` when no review contributed ("No data").
  pub average: Option<f64>,
  /// How many reviews contributed to `average`.
  pub count:   usize,
}

pub fn subrating_averages(
  reviews: &[Review],
  definitions: &[&SubratingDefinition],
) -> Vec<SubratingStat> {
  definitions
    .iter()
    .map(|def| {
      let (sum, count) = reviews
        .iter()
        .filter_map(|r| r.subrating(def.key))
        .fold((0u64, 0usize), |(s, c), v| (s + u64::from(v), c + 1));
      SubratingStat {
        key:     def.key.to_owned(),
        label:   def.label.to_owned(),
        average: (count > 0).then(|| sum as f64 / count as f64),
        count,
      }
    })
    .collect()
}

// ─── Tags ────────────────────────────────────────────────────────────────────

/// The `limit` most frequent review tags, most frequent first. Equal counts
/// keep the order in which the tags were first seen.
pub fn top_tags(reviews: &[Review], limit: usize) -> Vec<String> {
  // tag → (count, first-seen position)
  let mut freq: HashMap<&str, (usize, usize)> = HashMap::new();
  for tag in reviews.iter().flat_map(|r| r.tags.iter()) {
    let next = freq.len();
    freq.entry(tag.as_str()).or_insert((0, next)).0 += 1;
  }
  let mut ranked: Vec<(&str, usize, usize)> =
    freq.into_iter().map(|(t, (n, first))| (t, n, first)).collect();
  ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
  ranked
    .into_iter()
    .take(limit)
    .map(|(t, _, _)| t.to_owned())
    .collect()
}
