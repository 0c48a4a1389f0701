//! Error types for `campus-client`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{endpoint}: network error: {source}")]
  Network {
    endpoint: String,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{endpoint}: request timed out")]
  Timeout { endpoint: String },

  #[error("{endpoint} → {status}: {body}")]
  Status {
    endpoint: String,
    status:   u16,
    body:     String,
  },

  #[error("{endpoint}: unexpected response shape: {detail}")]
  UnexpectedShape { endpoint: String, detail: String },

  #[error("invalid input: {0}")]
  Validation(#[source] campus_core::Error),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("cache store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

impl Error {
  /// Classify a transport failure from `reqwest`.
  pub(crate) fn request(endpoint: &str, source: reqwest::Error) -> Self {
    if source.is_timeout() {
      Self::Timeout { endpoint: endpoint.to_owned() }
    } else {
      Self::Network { endpoint: endpoint.to_owned(), source }
    }
  }

  pub(crate) fn shape(endpoint: &str, detail: impl Into<String>) -> Self {
    Self::UnexpectedShape { endpoint: endpoint.to_owned(), detail: detail.into() }
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// `true` if the input was rejected before any request was sent.
  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }

  /// `true` if repeating the same call might succeed: transport failures,
  /// timeouts, `429` and `5xx` responses.
  pub fn is_retryable(&self) -> bool {
    match self {
      Self::Network { .. } | Self::Timeout { .. } => true,
      Self::Status { status, .. } => *status == 429 || *status >= 500,
      _ => false,
    }
  }
}

impl From<campus_core::Error> for Error {
  fn from(e: campus_core::Error) -> Self {
    match e {
      campus_core::Error::EntityNotFound(id) => Self::NotFound(format!("entity {id}")),
      campus_core::Error::Serialization(e) => Self::Json(e),
      e => Self::Validation(e),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
