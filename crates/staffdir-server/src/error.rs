//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as JSON `{"error": "<message>"}`. Store and upload
//! failures are logged here and reach the client only as a generic
//! `failed to <action>` message.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use staffdir_core::ValidationError;
use thiserror::Error;

/// One rejected spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
  /// 1-based spreadsheet row number (the header is row 1).
  pub row:     usize,
  pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{} rows failed validation", .0.len())]
  Import(Vec<RowError>),

  #[error("failed to {action}: {source}")]
  Internal {
    action: &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Map a core error raised while performing `action`.
  pub fn from_core(action: &'static str, err: staffdir_core::Error) -> Self {
    match err {
      staffdir_core::Error::Validation(e) => Self::Validation(e),
      staffdir_core::Error::NotFound(id) => Self::NotFound(format!("contact {id} not found")),
      other => Self::internal(action, other),
    }
  }

  pub fn internal<E>(action: &'static str, err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Internal { action, source: Box::new(err) }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"staffdir\""),
        );
        return res;
      }
      ApiError::Forbidden => (
        StatusCode::FORBIDDEN,
        json!({ "error": "you are not allowed to manage contacts" }),
      ),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Validation(e) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": e.to_string(), "field": e.field() }),
      ),
      ApiError::Import(rows) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({
          "error": format!("{} rows failed validation; nothing was imported", rows.len()),
          "rows": rows,
        }),
      ),
      ApiError::Internal { action, source } => {
        tracing::error!(error = %source, "failed to {action}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": format!("failed to {action}") }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
