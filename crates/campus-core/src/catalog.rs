//! The static per-type catalog: which subratings and which review tags apply
//! to each [`EntityType`].
//!
//! Lookups match exhaustively on the type, so adding a variant to
//! `EntityType` fails to compile until its catalog rows exist here.

use serde::Serialize;

use crate::entity::{EntityAttrs, EntityType};

// ─── Definitions ─────────────────────────────────────────────────────────────

/// A predicate over entity attributes that gates a subrating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubratingCondition {
  /// Only shown for entities with `has_shower == true`.
  RequiresShower,
}

impl SubratingCondition {
  pub fn holds(self, attrs: &EntityAttrs) -> bool {
    match self {
      Self::RequiresShower => attrs.has_shower,
    }
  }
}

/// One named quality dimension scored 1–5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubratingDefinition {
  /// Stable key used in `Review::subratings`.
  pub key:         &'static str,
  pub label:       &'static str,
  pub helper_text: Option<&'static str>,
  pub condition:   Option<SubratingCondition>,
}

impl SubratingDefinition {
  /// An entry without a condition always applies.
  pub fn applies_to(&self, attrs: &EntityAttrs) -> bool {
    self.condition.is_none_or(|c| c.holds(attrs))
  }
}

/// Colour family used when rendering a tag chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagTone {
  Green,
  Red,
  Blue,
  Orange,
  Yellow,
  Gray,
  Purple,
  Indigo,
  Cyan,
  Pink,
}

/// A selectable review tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDefinition {
  pub id:    &'static str,
  pub label: &'static str,
  pub icon:  &'static str,
  pub tone:  TagTone,
}

const fn sub(
  key: &'static str,
  label: &'static str,
  helper_text: &'static str,
) -> SubratingDefinition {
  SubratingDefinition { key, label, helper_text: Some(helper_text), condition: None }
}

const fn tag(
  id: &'static str,
  label: &'static str,
  icon: &'static str,
  tone: TagTone,
) -> TagDefinition {
  TagDefinition { id, label, icon, tone }
}

// ─── Subratings ──────────────────────────────────────────────────────────────

static DORM_SUBRATINGS: [SubratingDefinition; 5] = [
  sub("cleanliness", "Cleanliness", "How clean are common areas and rooms?"),
  sub("facilities", "Facilities", "Quality of gym, study rooms, laundry, etc."),
  sub("noiseLevel", "Noise Level", "Is it quiet enough for studying/sleeping?"),
  sub("community", "Community", "Social atmosphere and hall culture"),
  sub("valueForMoney", "Value for Money", "Is it worth the cost?"),
];

static CLASSROOM_SUBRATINGS: [SubratingDefinition; 5] = [
  sub("comfort", "Comfort", "Seating quality and legroom"),
  sub("visibility", "Visibility", "Can you see the board/screen clearly?"),
  sub("audioClarity", "Audio Clarity", "Microphone and speaker quality"),
  sub("aircon", "Air Conditioning", "Temperature comfort"),
  sub("powerAndWifi", "Power & WiFi", "Outlet availability and network quality"),
];

static PROFESSOR_SUBRATINGS: [SubratingDefinition; 5] = [
  sub("clarity", "Clarity", "Are explanations easy to understand?"),
  sub("structureAndPace", "Structure & Pace", "Is the course well-organized?"),
  sub("helpfulness", "Helpfulness", "Availability and willingness to help"),
  sub("fairness", "Fairness", "Fair grading and reasonable expectations"),
  sub("engagement", "Engagement", "How engaging are the lectures?"),
];

static FOOD_PLACE_SUBRATINGS: [SubratingDefinition; 5] = [
  sub("taste", "Taste", "How good is the food?"),
  sub("valueForMoney", "Value for Money", "Is it worth the price?"),
  sub("queueTime", "Queue Time", "How long do you typically wait?"),
  sub("variety", "Variety", "Range of food options"),
  sub("cleanliness", "Cleanliness", "Hygiene of the stall and seating"),
];

static TOILET_SUBRATINGS: [SubratingDefinition; 5] = [
  sub("cleanliness", "Cleanliness", "How clean is it overall?"),
  sub("availability", "Availability", "Are stalls usually free?"),
  sub("smell", "Smell", "Any unpleasant odors?"),
  sub("supplies", "Supplies", "Soap, tissue, hand dryer availability"),
  SubratingDefinition {
    key:         "showerUsability",
    label:       "Shower Usability",
    helper_text: Some("Water pressure, temperature, privacy"),
    condition:   Some(SubratingCondition::RequiresShower),
  },
];

/// Every subrating defined for `entity_type`, conditional ones included.
pub fn subratings_for(entity_type: EntityType) -> &'static [SubratingDefinition] {
  match entity_type {
    EntityType::Dorm => &DORM_SUBRATINGS,
    EntityType::Classroom => &CLASSROOM_SUBRATINGS,
    EntityType::Professor => &PROFESSOR_SUBRATINGS,
    EntityType::FoodPlace => &FOOD_PLACE_SUBRATINGS,
    EntityType::Toilet => &TOILET_SUBRATINGS,
  }
}

/// The subratings a review of an entity with `attrs` may carry.
pub fn applicable_subratings(
  entity_type: EntityType,
  attrs: &EntityAttrs,
) -> Vec<&'static SubratingDefinition> {
  subratings_for(entity_type)
    .iter()
    .filter(|d| d.applies_to(attrs))
    .collect()
}

// ─── Tags ────────────────────────────────────────────────────────────────────

static DORM_TAGS: [TagDefinition; 5] = [
  tag("very-happening", "Very happening", "🎉", TagTone::Pink),
  tag("good-for-studying", "Good for studying", "📖", TagTone::Indigo),
  tag("quiet-and-chill", "Quiet & chill", "🧘", TagTone::Cyan),
  tag("far-from-everything", "Far from everything", "🏃", TagTone::Orange),
  tag("strong-community", "Strong community", "🤝", TagTone::Green),
];

static CLASSROOM_TAGS: [TagDefinition; 5] = [
  tag("power-sockets-everywhere", "Power sockets everywhere", "🔌", TagTone::Yellow),
  tag("freezing-cold", "Freezing cold", "🧊", TagTone::Blue),
  tag("mic-issues", "Mic issues", "🔊", TagTone::Red),
  tag("bad-sightlines", "Bad sightlines", "👀", TagTone::Gray),
  tag("uncomfortable-seats", "Uncomfortable seats", "💺", TagTone::Orange),
];

static PROFESSOR_TAGS: [TagDefinition; 6] = [
  tag("clear-explanations", "Clear explanations", "🎯", TagTone::Blue),
  tag("hard-to-follow", "Hard to follow", "💤", TagTone::Gray),
  tag("heavy-workload", "Heavy workload", "📚", TagTone::Purple),
  tag("very-approachable", "Very approachable", "🤝", TagTone::Green),
  tag("theory-heavy", "Theory-heavy", "🧪", TagTone::Indigo),
  tag("practical-heavy", "Practical-heavy", "🧪", TagTone::Cyan),
];

static FOOD_PLACE_TAGS: [TagDefinition; 5] = [
  tag("worth-the-queue", "Worth the queue", "🔥", TagTone::Red),
  tag("overpriced", "Overpriced", "💸", TagTone::Yellow),
  tag("healthy-ish", "Healthy-ish", "🥗", TagTone::Green),
  tag("comfort-food", "Comfort food", "🍛", TagTone::Orange),
  tag("inconsistent-quality", "Inconsistent quality", "🧂", TagTone::Gray),
];

static TOILET_TAGS: [TagDefinition; 4] = [
  tag("hidden-gem", "Hidden gem", "🚽", TagTone::Green),
  tag("avoid-at-all-costs", "Avoid at all costs", "🚫", TagTone::Red),
  tag("very-clean", "Very clean", "🧼", TagTone::Blue),
  tag("poorly-maintained", "Poorly maintained", "🛠️", TagTone::Orange),
];

pub fn tags_for(entity_type: EntityType) -> &'static [TagDefinition] {
  match entity_type {
    EntityType::Dorm => &DORM_TAGS,
    EntityType::Classroom => &CLASSROOM_TAGS,
    EntityType::Professor => &PROFESSOR_TAGS,
    EntityType::FoodPlace => &FOOD_PLACE_TAGS,
    EntityType::Toilet => &TOILET_TAGS,
  }
}

pub fn tag_by_id(entity_type: EntityType, id: &str) -> Option<&'static TagDefinition> {
  tags_for(entity_type).iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn empty_attrs_yield_only_unconditional_entries() {
    for t in EntityType::iter() {
      let applicable = applicable_subratings(t, &EntityAttrs::default());
      assert!(applicable.iter().all(|d| d.condition.is_none()), "{t}");
    }
  }

  #[test]
  fn shower_subrating_follows_has_shower() {
    let keys = |has_shower| {
      applicable_subratings(EntityType::Toilet, &EntityAttrs { has_shower })
        .into_iter()
        .map(|d| d.key)
        .collect::<Vec<_>>()
    };
    assert!(keys(true).contains(&"showerUsability"));
    assert!(!keys(false).contains(&"showerUsability"));
    assert_eq!(keys(true).len(), 5);
    assert_eq!(keys(false).len(), 4);
  }

  #[test]
  fn keys_and_tag_ids_are_unique_per_type() {
    for t in EntityType::iter() {
      let keys: HashSet<_> = subratings_for(t).iter().map(|d| d.key).collect();
      assert_eq!(keys.len(), subratings_for(t).len(), "{t}");
      let ids: HashSet<_> = tags_for(t).iter().map(|d| d.id).collect();
      assert_eq!(ids.len(), tags_for(t).len(), "{t}");
      assert!(!tags_for(t).is_empty(), "{t}");
    }
  }

  #[test]
  fn tag_lookup() {
    let tag = tag_by_id(EntityType::FoodPlace, "overpriced").unwrap();
    assert_eq!(tag.label, "Overpriced");
    assert!(tag_by_id(EntityType::Toilet, "overpriced").is_none());
  }
}
