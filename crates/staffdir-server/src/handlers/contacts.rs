//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/contacts` | `search`, `department`, `institute`, `unit`, `type`, `status`, `page`, `limit` |
//! | `POST`   | `/contacts` | multipart: `contact` JSON + optional `profilePicture` |
//! | `GET`    | `/contacts/{id}` | 404 for inactive contacts unless the caller manages contacts |
//! | `PUT`    | `/contacts/{id}` | multipart as for `POST` |
//! | `DELETE` | `/contacts/{id}` | soft or hard per server config |
//! | `POST`   | `/contacts/bulk-delete` | body: `{"ids":[...]}` |

use std::str::FromStr;

use axum::{
  Json,
  extract::{Multipart, Path, Query, State, multipart::MultipartError},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use staffdir_core::{
  contact::{Contact, NewContact, PendingFile},
  listing::{ContactFilters, apply_filters, paginate},
  store::{BlobStore, DocumentStore},
  validate::prepare,
};

use crate::{AppState, auth::Authenticated, error::ApiError};

const DEFAULT_PAGE_SIZE: usize = 10;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
  pub search:       String,
  pub department:   String,
  pub institute:    String,
  pub unit:         String,
  #[serde(rename = "type")]
  pub contact_type: String,
  pub status:       String,
  pub page:         Option<usize>,
  pub limit:        Option<usize>,
}

impl ListParams {
  fn filters(&self) -> Result<ContactFilters, ApiError> {
    Ok(ContactFilters {
      search_term:    self.search.clone(),
      department_id:  self.department.clone(),
      institute_id:   self.institute.clone(),
      unit_id:        self.unit.clone(),
      contact_type:   parse_optional("type", &self.contact_type)?,
      contact_status: parse_optional("status", &self.status)?,
    })
  }
}

fn parse_optional<T: FromStr>(param: &str, value: &str) -> Result<Option<T>, ApiError> {
  if value.is_empty() {
    return Ok(None);
  }
  T::from_str(value)
    .map(Some)
    .map_err(|_| ApiError::BadRequest(format!("unknown {param} {value:?}")))
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub status: &'static str,
  pub data:   ListData,
}

#[derive(Debug, Serialize)]
pub struct ListData {
  pub contacts:   Vec<Contact>,
  pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
  pub total:   usize,
  pub pages:   usize,
  pub current: usize,
  pub limit:   usize,
}

/// `GET /contacts`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
  Authenticated(actor): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let filters = params.filters()?;
  let page = params.page.unwrap_or(1);
  let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

  let visible = state
    .gateway
    .list(&actor)
    .await
    .map_err(|e| ApiError::from_core("fetch contacts", e))?;
  let page = paginate(apply_filters(visible, &filters), page, limit);

  Ok(Json(ListResponse {
    status: "success",
    data:   ListData {
      contacts:   page.items,
      pagination: Pagination {
        total:   page.total_items,
        pages:   page.total_pages,
        current: page.page,
        limit:   page.page_size,
      },
    },
  }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contacts/{id}`
pub async fn get_one<S, B>(
  State(state): State<AppState<S, B>>,
  Authenticated(actor): Authenticated,
  Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let contact = state
    .gateway
    .get(&id)
    .await
    .map_err(|e| ApiError::from_core("fetch contact", e))?;

  if !contact.is_active() && !actor.can_manage_contacts() {
    return Err(ApiError::NotFound(format!("contact {id} not found")));
  }
  Ok(Json(contact))
}

// ─── Create / update ──────────────────────────────────────────────────────────

fn bad_multipart(e: MultipartError) -> ApiError { ApiError::BadRequest(e.to_string()) }

/// Read the add/edit form: a `contact` JSON part and an optional
/// `profilePicture` file part.
async fn read_contact_form(mut multipart: Multipart) -> Result<NewContact, ApiError> {
  let mut contact: Option<NewContact> = None;
  let mut picture: Option<PendingFile> = None;

  while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      Some("contact") => {
        let text = field.text().await.map_err(bad_multipart)?;
        let parsed = serde_json::from_str(&text)
          .map_err(|e| ApiError::BadRequest(format!("invalid contact: {e}")))?;
        contact = Some(parsed);
      }
      Some("profilePicture") => {
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(bad_multipart)?;
        // Browsers send an empty part when no file was chosen.
        if !bytes.is_empty() {
          picture = Some(PendingFile { file_name, content_type, bytes });
        }
      }
      _ => {}
    }
  }

  let mut contact =
    contact.ok_or_else(|| ApiError::BadRequest("missing `contact` field".into()))?;
  contact.profile_picture = picture;
  Ok(contact)
}

/// `POST /contacts`
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  auth: Authenticated,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let actor = auth.require_manager()?;
  let record = prepare(read_contact_form(multipart).await?)?;

  let id = state
    .gateway
    .create(record, &actor)
    .await
    .map_err(|e| ApiError::from_core("create contact", e))?;
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `PUT /contacts/{id}`
pub async fn update<S, B>(
  State(state): State<AppState<S, B>>,
  auth: Authenticated,
  Path(id): Path<String>,
  multipart: Multipart,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let actor = auth.require_manager()?;
  let record = prepare(read_contact_form(multipart).await?)?;

  state
    .gateway
    .update(&id, record, &actor)
    .await
    .map_err(|e| ApiError::from_core("update contact", e))?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}`
pub async fn remove<S, B>(
  State(state): State<AppState<S, B>>,
  auth: Authenticated,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let actor = auth.require_manager()?;
  state
    .gateway
    .remove(&id, state.config.delete_mode, &actor)
    .await
    .map_err(|e| ApiError::from_core("delete contact", e))?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
  pub ids: Vec<String>,
}

/// `POST /contacts/bulk-delete`
pub async fn bulk_remove<S, B>(
  State(state): State<AppState<S, B>>,
  auth: Authenticated,
  Json(body): Json<BulkDeleteBody>,
) -> Result<StatusCode, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let actor = auth.require_manager()?;
  state
    .gateway
    .bulk_remove(&body.ids, state.config.delete_mode, &actor)
    .await
    .map_err(|e| ApiError::from_core("delete contacts", e))?;
  Ok(StatusCode::NO_CONTENT)
}
