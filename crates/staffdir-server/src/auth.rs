//! HTTP Basic-auth extractor producing the acting [`Actor`].

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;
use staffdir_core::actor::{Actor, Role};

use crate::{AppState, error::ApiError};

/// One account allowed to use the directory.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCredential {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub role:          Role,
}

/// Accounts accepted by this server instance.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub users: Vec<UserCredential>,
}

impl AuthConfig {
  pub fn new(users: Vec<UserCredential>) -> Self { Self { users } }

  /// Check an `Authorization: Basic` header and return the matching actor.
  pub fn verify(&self, headers: &HeaderMap) -> Result<Actor, ApiError> {
    let header_val = headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let encoded = header_val
      .strip_prefix("Basic ")
      .ok_or(ApiError::Unauthorized)?;

    let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
    let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

    let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

    let user = self
      .users
      .iter()
      .find(|u| u.username == username)
      .ok_or(ApiError::Unauthorized)?;

    let parsed_hash =
      PasswordHash::new(&user.password_hash).map_err(|_| ApiError::Unauthorized)?;

    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .map_err(|_| ApiError::Unauthorized)?;

    Ok(Actor::new(user.username.clone(), user.role))
  }
}

/// An authenticated request. Handlers receive the actor explicitly.
pub struct Authenticated(pub Actor);

impl Authenticated {
  /// Reject actors that may not add, edit, or delete contacts.
  pub fn require_manager(self) -> Result<Actor, ApiError> {
    if self.0.can_manage_contacts() {
      Ok(self.0)
    } else {
      Err(ApiError::Forbidden)
    }
  }
}

impl<S, B> FromRequestParts<AppState<S, B>> for Authenticated
where
  S: Send + Sync,
  B: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    let actor = state.auth.verify(&parts.headers)?;
    Ok(Authenticated(actor))
  }
}
