//! Error type for `staffdir-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A batch named an id that does not exist; nothing was written.
  #[error("document not found: {collection}/{id}")]
  MissingDocument { collection: &'static str, id: String },

  #[error("document {0} is not a JSON object")]
  NotAnObject(String),

  #[error("invalid field name: {0:?}")]
  InvalidField(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
