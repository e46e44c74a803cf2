//! Handlers for organization reference data.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/departments` | |
//! | `GET`  | `/institutes` | Optional `?departmentId=` |
//! | `GET`  | `/units` | Optional `?instituteId=` |
//! | `GET`  | `/organizations` | All three levels at once |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use staffdir_core::{
  org::OrgSnapshot,
  store::{BlobStore, DocumentStore},
};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /departments`
pub async fn departments<S, B>(
  State(state): State<AppState<S, B>>,
  _: Authenticated,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let departments = state
    .gateway
    .departments()
    .await
    .map_err(|e| ApiError::from_core("fetch departments", e))?;
  Ok(Json(json!({ "departments": departments })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstituteParams {
  pub department_id: Option<String>,
}

/// `GET /institutes[?departmentId=<id>]`
pub async fn institutes<S, B>(
  State(state): State<AppState<S, B>>,
  _: Authenticated,
  Query(params): Query<InstituteParams>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let department = params.department_id.filter(|id| !id.is_empty());
  let institutes = state
    .gateway
    .institutes(department.as_deref())
    .await
    .map_err(|e| ApiError::from_core("fetch institutes", e))?;
  Ok(Json(json!({ "institutes": institutes })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitParams {
  pub institute_id: Option<String>,
}

/// `GET /units[?instituteId=<id>]`
pub async fn units<S, B>(
  State(state): State<AppState<S, B>>,
  _: Authenticated,
  Query(params): Query<UnitParams>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let institute = params.institute_id.filter(|id| !id.is_empty());
  let units = state
    .gateway
    .units(institute.as_deref())
    .await
    .map_err(|e| ApiError::from_core("fetch units", e))?;
  Ok(Json(json!({ "units": units })))
}

/// `GET /organizations`
pub async fn organizations<S, B>(
  State(state): State<AppState<S, B>>,
  _: Authenticated,
) -> Result<Json<OrgSnapshot>, ApiError>
where
  S: DocumentStore,
  B: BlobStore,
{
  let snapshot = state
    .gateway
    .org_snapshot()
    .await
    .map_err(|e| ApiError::from_core("fetch organization data", e))?;
  Ok(Json(snapshot))
}
