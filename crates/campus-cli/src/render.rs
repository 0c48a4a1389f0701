//! Plain-text and JSON output for each command.

use anyhow::Result;
use campus_client::CourseModule;
use campus_core::{
  catalog::{SubratingDefinition, TagDefinition, tag_by_id},
  detail::EntityDetail,
  entity::{Entity, EntityId, EntityType, Location},
  query::Page,
  review::{Review, ReviewId},
};
use serde::Serialize;
use serde_json::json;

const BAR_WIDTH: usize = 20;

pub struct Output {
  json: bool,
}

impl Output {
  pub fn new(json: bool) -> Self { Self { json } }

  fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
  }

  // ── Entities ──────────────────────────────────────────────────────────────

  pub fn entities(&self, entities: &[Entity]) -> Result<()> {
    if self.json {
      return self.emit(entities);
    }
    if entities.is_empty() {
      println!("No matches.");
    }
    for e in entities {
      println!("{}", entity_line(e));
    }
    Ok(())
  }

  pub fn entity_page(&self, page: &Page<Entity>) -> Result<()> {
    if self.json {
      return self.emit(page);
    }
    self.entities(&page.items)?;
    println!("{}", page_footer(page.page, page.items.len(), page.total, page.has_more));
    Ok(())
  }

  pub fn detail(&self, d: &EntityDetail) -> Result<()> {
    if self.json {
      return self.emit(d);
    }
    let e = &d.entity;
    println!("{} ({})", e.name, e.entity_type);
    if let Some(subtitle) = &e.subtitle {
      println!("  {subtitle}");
    }
    match &e.location {
      Location::Coordinates { lat, lng } => println!("  at {lat:.5}, {lng:.5}"),
      Location::BuildingRef { campus, building_code } => {
        let parts: Vec<&str> = [building_code.as_deref(), campus.as_deref()]
          .into_iter()
          .flatten()
          .collect();
        println!("  in {}", parts.join(", "));
      }
      Location::Unknown => {}
    }
    if !e.tags.is_empty() {
      println!("  {}", e.tags.join(" · "));
    }
    println!();
    println!("Rating  {}  from {} reviews", fmt_rating(d.average_rating), d.histogram.reviews);
    for (stars, n) in d.histogram.iter() {
      let filled = (d.histogram.percent(stars) / 100.0 * BAR_WIDTH as f64).round() as usize;
      println!("  {stars}★ {:<width$} {n}", "█".repeat(filled), width = BAR_WIDTH);
    }
    if !d.subratings.is_empty() {
      println!();
      for s in &d.subratings {
        let value = match s.average {
          Some(avg) => format!("{avg:.1} ({})", s.count),
          None => "No data".to_string(),
        };
        println!("  {:<18} {value}", s.label);
      }
    }
    if !d.top_tags.is_empty() {
      println!();
      println!("Often tagged: {}", tag_labels(e.entity_type, &d.top_tags).join(", "));
    }
    if let Some(summary) = &e.review_summary {
      println!();
      println!("{summary}");
    }
    println!();
    for r in &d.reviews {
      print_review(r);
    }
    Ok(())
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  pub fn review_page(&self, page: &Page<Review>) -> Result<()> {
    if self.json {
      return self.emit(page);
    }
    if page.items.is_empty() {
      println!("No reviews yet.");
    }
    for r in &page.items {
      print_review(r);
    }
    println!("{}", page_footer(page.page, page.items.len(), page.total, page.has_more));
    Ok(())
  }

  pub fn submitted(&self, review: &Review) -> Result<()> {
    if self.json {
      return self.emit(review);
    }
    println!("Posted review {} for {}.", review.id, review.entity_id);
    Ok(())
  }

  pub fn vote_count(&self, review_id: &ReviewId, count: u32, sent: bool) -> Result<()> {
    if self.json {
      return self.emit(&json!({ "reviewId": review_id, "voteCount": count, "sent": sent }));
    }
    if sent {
      println!("Marked {review_id} as helpful ({count} votes).");
    } else {
      println!("Already voted for {review_id} ({count} votes).");
    }
    Ok(())
  }

  pub fn created(&self, id: &EntityId) -> Result<()> {
    if self.json {
      return self.emit(&json!({ "id": id }));
    }
    println!("Created {id}.");
    Ok(())
  }

  // ── Lookups ───────────────────────────────────────────────────────────────

  pub fn modules(&self, modules: &[CourseModule]) -> Result<()> {
    if self.json {
      return self.emit(modules);
    }
    if modules.is_empty() {
      println!("No matching modules.");
    }
    for m in modules {
      println!("{:<10} {}", m.module_code, m.title);
    }
    Ok(())
  }

  pub fn catalog(
    &self,
    entity_type: EntityType,
    subratings: &[&SubratingDefinition],
    tags: &[TagDefinition],
  ) -> Result<()> {
    if self.json {
      return self.emit(&json!({
        "type": entity_type,
        "subratings": subratings,
        "tags": tags,
      }));
    }
    println!("{entity_type} subratings:");
    for s in subratings {
      println!("  {:<18} {:<18} {}", s.key, s.label, s.helper_text.unwrap_or(""));
    }
    println!("{entity_type} tags:");
    for t in tags {
      println!("  {} {:<26} {}", t.icon, t.id, t.label);
    }
    Ok(())
  }

  pub fn refreshed(&self, entities: usize) -> Result<()> {
    if self.json {
      return self.emit(&json!({ "entities": entities }));
    }
    println!("Directory reloaded: {entities} entities.");
    Ok(())
  }
}

fn fmt_rating(rating: Option<f64>) -> String {
  rating.map_or_else(|| "-".to_string(), |r| format!("{r:.1}"))
}

fn entity_line(e: &Entity) -> String {
  let rating = fmt_rating((e.rating_count > 0).then_some(e.avg_rating));
  let mut line = format!(
    "{:<14} {:<10} ★ {rating:<4} ({:>3})  {}",
    e.id.as_str(),
    e.entity_type.as_str(),
    e.rating_count,
    e.name
  );
  if let Some(subtitle) = &e.subtitle {
    line.push_str(" · ");
    line.push_str(subtitle);
  }
  line
}

/// Catalog labels for review tag ids; ids outside the catalog print as-is.
fn tag_labels(entity_type: EntityType, ids: &[String]) -> Vec<String> {
  ids
    .iter()
    .map(|id| tag_by_id(entity_type, id).map_or_else(|| id.clone(), |t| t.label.to_owned()))
    .collect()
}

fn page_footer(page: usize, shown: usize, total: usize, has_more: bool) -> String {
  let more = if has_more { format!(", --page {} for more", page + 1) } else { String::new() };
  format!("page {page}: {shown} of {total}{more}")
}

fn print_review(r: &Review) {
  println!(
    "[{}] {}★ {} · {} · {} helpful",
    r.id,
    r.rating,
    r.display_author(),
    r.created_at.format("%Y-%m-%d"),
    r.vote_count
  );
  if let Some(code) = &r.module_code {
    println!("  {code}");
  }
  if !r.text.is_empty() {
    for line in r.text.lines() {
      println!("  {line}");
    }
  }
  if !r.subratings.is_empty() {
    let subs: Vec<String> = r
      .subratings
      .iter()
      .filter(|(_, v)| **v > 0)
      .map(|(k, v)| format!("{k} {v}"))
      .collect();
    println!("  {}", subs.join(", "));
  }
  if !r.tags.is_empty() {
    println!("  #{}", r.tags.join(" #"));
  }
  println!();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn entity_line_shows_dash_when_unrated() {
    let e = Entity::new("d1", EntityType::Dorm, "New Hall");
    assert!(entity_line(&e).contains("★ -"));
  }

  #[test]
  fn tags_print_with_catalog_labels() {
    let ids = vec!["very-clean".to_string(), "legacy-tag".to_string()];
    assert_eq!(tag_labels(EntityType::Toilet, &ids), ["Very clean", "legacy-tag"]);
  }

  #[test]
  fn footer_hints_next_page() {
    assert_eq!(page_footer(1, 12, 30, true), "page 1: 12 of 30, --page 2 for more");
    assert_eq!(page_footer(3, 6, 30, false), "page 3: 6 of 30");
  }
}
