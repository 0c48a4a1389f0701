//! `campus` — browse and review campus places from the terminal.
//!
//! # Usage
//!
//! ```
//! campus list toilet --shower true --sort top_rated
//! campus show t1
//! campus review t1 --rating 4 --sub cleanliness=5 --tag very-clean
//! campus --config ~/.config/campus/config.toml refresh
//! ```

mod render;

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use campus_client::{ClientConfig, HttpBackend, Session, Vote};
use campus_core::{
  catalog,
  entity::{EntityAttrs, EntityId, EntityType, NewEntity, NewLocation, Zone},
  query::{EntityFilters, SortOrder},
  review::{NewReview, ReviewId},
};
use campus_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::render::Output;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", version, about = "Browse and review campus places")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the review backend (overrides the config file).
  #[arg(long, global = true)]
  url: Option<String>,

  /// SQLite file for the persisted cache (overrides the config file).
  #[arg(long, value_name = "FILE", global = true)]
  cache: Option<PathBuf>,

  /// Print JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List entities of one type.
  List {
    #[arg(value_parser = parse_entity_type)]
    entity_type: EntityType,
    #[arg(short, long)]
    search:      Option<String>,
    #[arg(long, value_parser = parse_zone)]
    zone:        Option<Zone>,
    /// Only toilets with (`true`) or without (`false`) a shower.
    #[arg(long)]
    shower:      Option<bool>,
    /// `top_rated`, `most_reviewed` or `newest`.
    #[arg(long)]
    sort:        Option<SortOrder>,
    #[arg(long, default_value_t = 1)]
    page:        usize,
    #[arg(long, default_value_t = 12)]
    page_size:   usize,
  },
  /// Search every entity by name, subtitle or tag.
  Search {
    query: String,
    #[arg(long, default_value_t = 10)]
    limit: usize,
  },
  /// The highest-rated entities of any type.
  Top {
    #[arg(long, default_value_t = 6)]
    limit: usize,
  },
  /// An entity with its reviews and rating breakdown.
  Show { id: String },
  /// One page of an entity's reviews.
  Reviews {
    id:        String,
    #[arg(long, default_value_t = 1)]
    page:      usize,
    #[arg(long, default_value_t = 10)]
    page_size: usize,
  },
  /// Write a review.
  Review {
    id:     String,
    #[arg(short, long)]
    rating: u8,
    #[arg(short, long, default_value = "")]
    text:   String,
    /// Review tag id; repeatable.
    #[arg(long = "tag")]
    tags:   Vec<String>,
    /// Subrating as `key=value`; repeatable.
    #[arg(long = "sub", value_parser = parse_subrating)]
    subs:   Vec<(String, u8)>,
    /// Display name; omit to post anonymously.
    #[arg(long)]
    name:   Option<String>,
    /// Course code, for professor reviews.
    #[arg(long)]
    module: Option<String>,
  },
  /// Mark a review as helpful.
  Vote {
    review_id: String,
    /// The count currently shown for the review.
    #[arg(long, default_value_t = 0)]
    current:   u32,
  },
  /// Add a new entity to the directory.
  AddEntity {
    #[arg(value_parser = parse_entity_type)]
    entity_type: EntityType,
    name:        String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long = "tag")]
    tags:        Vec<String>,
    #[arg(long, requires = "lng")]
    lat:         Option<f64>,
    #[arg(long, requires = "lat")]
    lng:         Option<f64>,
  },
  /// Look up course modules by code or title. Without a query, lists the
  /// popular ones.
  Modules {
    #[arg(default_value = "")]
    query: String,
    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
  /// Subratings and review tags available for a type.
  Catalog {
    #[arg(value_parser = parse_entity_type)]
    entity_type: EntityType,
    /// Include subratings that only apply to toilets with showers.
    #[arg(long)]
    shower:      bool,
  },
  /// Drop cached data and reload the directory.
  Refresh {
    /// Also drop cached reviews and the module list.
    #[arg(long)]
    all: bool,
  },
}

fn parse_entity_type(s: &str) -> Result<EntityType, String> {
  EntityType::from_wire(s).ok_or_else(|| {
    format!("unknown entity type {s:?} (dorm, classroom, professor, food_place, toilet)")
  })
}

fn parse_zone(s: &str) -> Result<Zone, String> {
  Zone::from_wire(s).ok_or_else(|| "zone must not be empty".to_string())
}

fn parse_subrating(s: &str) -> Result<(String, u8), String> {
  let (key, value) = s
    .split_once('=')
    .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
  let value = value
    .trim()
    .parse()
    .map_err(|_| format!("subrating {key:?} needs a number from 0 to 5"))?;
  Ok((key.trim().to_string(), value))
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // CLI flags override config file and environment, which override defaults.
  let mut config =
    ClientConfig::load(args.config.as_deref()).context("failed to load configuration")?;
  if let Some(url) = args.url {
    config.base_url = url;
  }
  if let Some(cache) = args.cache {
    config.cache_path = cache;
  }

  let cache_path = expand_tilde(&config.cache_path);
  if let Some(dir) = cache_path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create cache directory {dir:?}"))?;
  }
  let store = SqliteStore::open(&cache_path)
    .await
    .with_context(|| format!("failed to open cache at {cache_path:?}"))?;
  tracing::debug!(base_url = %config.base_url, cache = ?cache_path, "starting session");

  let session = Session::connect(&config, store).context("failed to build HTTP client")?;
  let out = Output::new(args.json);
  run(&session, args.command, &out).await
}

async fn run(
  session: &Session<HttpBackend, SqliteStore>,
  command: Command,
  out: &Output,
) -> Result<()> {
  match command {
    Command::List { entity_type, search, zone, shower, sort, page, page_size } => {
      let filters = EntityFilters { search, zone, has_shower: shower, sort };
      let page = session
        .directory
        .list(entity_type, &filters, page, page_size)
        .await;
      out.entity_page(&page)
    }
    Command::Search { query, limit } => out.entities(&session.directory.search(&query, limit).await),
    Command::Top { limit } => out.entities(&session.directory.top_rated(limit).await),
    Command::Show { id } => {
      let detail = session.entity_detail(&EntityId::from(id)).await?;
      out.detail(&detail)
    }
    Command::Reviews { id, page, page_size } => {
      let page = session.reviews.page(&EntityId::from(id), page, page_size).await;
      out.review_page(&page)
    }
    Command::Review { id, rating, text, tags, subs, name, module } => {
      let input = NewReview {
        text,
        tags,
        subratings: subs.into_iter().collect::<BTreeMap<_, _>>(),
        author_name: name,
        module_code: module,
        ..NewReview::new(id, rating)
      };
      let review = session.reviews.submit(input).await?;
      out.submitted(&review)
    }
    Command::Vote { review_id, current } => {
      let review_id = ReviewId::from(review_id);
      match session.votes.vote(&review_id, current) {
        Vote::AlreadyVoted { count } => out.vote_count(&review_id, count, false),
        Vote::Pending { confirmation, .. } => {
          let count = confirmation
            .await
            .map_err(|e| anyhow!("vote task failed: {e}"))??;
          out.vote_count(&review_id, count, true)
        }
      }
    }
    Command::AddEntity { entity_type, name, description, tags, lat, lng } => {
      let location = match (lat, lng) {
        (Some(latitude), Some(longitude)) => Some(NewLocation { latitude, longitude }),
        (None, None) => None,
        _ => bail!("--lat and --lng must be given together"),
      };
      let input = NewEntity {
        description,
        tags,
        location,
        ..NewEntity::new(entity_type, name)
      };
      let id = session.directory.create_entity(input).await?;
      out.created(&id)
    }
    Command::Modules { query, limit } if query.trim().is_empty() => {
      let mut popular = session.modules.popular().await;
      popular.truncate(limit);
      out.modules(&popular)
    }
    Command::Modules { query, limit } => out.modules(&session.modules.search(&query, limit).await),
    Command::Catalog { entity_type, shower } => {
      let subratings = catalog::applicable_subratings(entity_type, &EntityAttrs { has_shower: shower });
      out.catalog(entity_type, &subratings, catalog::tags_for(entity_type))
    }
    Command::Refresh { all } => {
      if all {
        session.clear_caches().await?;
      }
      let entities = session.directory.refresh().await;
      out.refreshed(entities.len())
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
