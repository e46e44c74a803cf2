//! Spreadsheet endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contacts/template` | xlsx with a header row and one example |
//! | `POST` | `/contacts/bulk-import` | multipart `file`; all rows or none |

use axum::{
  Json,
  extract::{Multipart, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde_json::json;
use staffdir_core::{
  store::{BlobStore, DocumentStore},
  validate::prepare,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, RowError},
  spreadsheet::{self, SheetRow, XLSX_CONTENT_TYPE},
};

/// `GET /contacts/template`
pub async fn template<S, B>(_: Authenticated) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let bytes =
    spreadsheet::template().map_err(|e| ApiError::internal("generate template", e))?;
  Ok((
    [
      (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=\"contacts_template.xlsx\"",
      ),
    ],
    bytes,
  ))
}

/// `POST /contacts/bulk-import`
///
/// Every row goes through the same normalize/validate pipeline as the form.
/// If any row fails, nothing is written and the response lists each failing
/// row.
pub async fn bulk_import<S, B>(
  State(state): State<AppState<S, B>>,
  auth: Authenticated,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let actor = auth.require_manager()?;

  let mut file = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    // Older clients also send `userEmail`; the importer is the
    // authenticated actor instead.
    if field.name() == Some("file") {
      let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
      file = Some(bytes);
    }
  }
  let bytes = file.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;

  let rows = tokio::task::spawn_blocking(move || spreadsheet::read_contacts(&bytes))
    .await
    .map_err(|e| ApiError::internal("read spreadsheet", e))?
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let mut valid = Vec::with_capacity(rows.len());
  let mut failures = Vec::new();
  for SheetRow { row, contact } in rows {
    match contact.and_then(|c| prepare(c).map_err(|e| e.to_string())) {
      Ok(record) => valid.push(record),
      Err(message) => failures.push(RowError { row, message }),
    }
  }
  if !failures.is_empty() {
    tracing::info!(failed = failures.len(), "bulk import rejected");
    return Err(ApiError::Import(failures));
  }

  let ids = state
    .gateway
    .bulk_create(valid, &actor)
    .await
    .map_err(|e| ApiError::from_core("import contacts", e))?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "imported": ids.len(), "ids": ids })),
  ))
}
