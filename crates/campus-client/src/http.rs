//! Async HTTP client for the review backend's JSON endpoints.

use campus_core::{
  backend::ReviewBackend,
  entity::{Entity, EntityId, NewEntity},
  review::{NewReview, Review, ReviewId},
};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::{
  ClientConfig, Error, Result,
  modules::{CourseModule, ModuleSource},
  wire,
};

/// [`ReviewBackend`] and [`ModuleSource`] over HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpBackend {
  client:      Client,
  base_url:    String,
  modules_url: String,
}

impl HttpBackend {
  pub fn new(config: &ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.request_timeout())
      .build()
      .map_err(|e| Error::request("client", e))?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
      modules_url: config.modules_url.trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self, path: &str) -> String { format!("{}/{path}", self.base_url) }

  /// Send `req` and return the JSON body of a 2xx response.
  async fn send(&self, endpoint: &str, req: RequestBuilder) -> Result<Value> {
    let resp = req.send().await.map_err(|e| Error::request(endpoint, e))?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status {
        endpoint: endpoint.to_owned(),
        status:   status.as_u16(),
        body:     wire::error_message(&body),
      });
    }

    let bytes = resp.bytes().await.map_err(|e| Error::request(endpoint, e))?;
    serde_json::from_slice(&bytes)
      .map_err(|e| Error::shape(endpoint, format!("body is not JSON: {e}")))
  }
}

// ─── ReviewBackend impl ──────────────────────────────────────────────────────

impl ReviewBackend for HttpBackend {
  type Error = Error;

  /// `GET entities`
  async fn fetch_entities(&self) -> Result<Vec<Entity>> {
    const EP: &str = "GET entities";
    let body = self.send(EP, self.client.get(self.url("entities"))).await?;
    wire::decode_entities(EP, body)
  }

  /// `POST entities`
  async fn create_entity(&self, input: &NewEntity) -> Result<EntityId> {
    const EP: &str = "POST entities";
    let body = self
      .send(EP, self.client.post(self.url("entities")).json(input))
      .await?;
    wire::created_id(EP, &body).map(EntityId::from)
  }

  /// `GET reviews?entityId=<id>`
  async fn fetch_reviews(&self, entity_id: &EntityId) -> Result<Vec<Review>> {
    const EP: &str = "GET reviews";
    let req = self
      .client
      .get(self.url("reviews"))
      .query(&[("entityId", entity_id.as_str())]);
    let body = self.send(EP, req).await?;
    wire::decode_reviews(EP, body)
  }

  /// `POST reviews`
  async fn create_review(&self, input: &NewReview) -> Result<ReviewId> {
    const EP: &str = "POST reviews";
    let body = self
      .send(EP, self.client.post(self.url("reviews")).json(input))
      .await?;
    wire::created_id(EP, &body).map(ReviewId::from)
  }

  /// `POST vote?id=<reviewId>`
  async fn vote(&self, review_id: &ReviewId) -> Result<u32> {
    const EP: &str = "POST vote";
    let req = self
      .client
      .post(self.url("vote"))
      .query(&[("id", review_id.as_str())]);
    let body = self.send(EP, req).await?;
    wire::vote_count(EP, &body)
  }
}

// ─── ModuleSource impl ───────────────────────────────────────────────────────

impl ModuleSource for HttpBackend {
  /// `GET {modules_url}/{acad_year}/moduleList.json`
  async fn fetch_modules(&self, acad_year: &str) -> Result<Vec<CourseModule>> {
    const EP: &str = "GET moduleList";
    let url = format!("{}/{acad_year}/moduleList.json", self.modules_url);
    let body = self.send(EP, self.client.get(url)).await?;
    serde_json::from_value(body).map_err(|e| Error::shape(EP, e.to_string()))
  }
}
