//! HTTP layer for the staff directory.
//!
//! Exposes an axum [`Router`] serving the JSON API under `/api` and the
//! uploaded blobs under `/files`, backed by any [`DocumentStore`] and
//! [`BlobStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod spreadsheet;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use serde::Deserialize;
use staffdir_core::{
  gateway::{ContactGateway, DeleteMode},
  store::{BlobStore, DocumentStore},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use auth::{AuthConfig, UserCredential};
use handlers::{contacts, import, org};

/// Largest accepted request body (profile pictures, spreadsheets).
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Directory that uploaded profile pictures are written to.
  pub blob_dir:        PathBuf,
  /// Externally visible origin, e.g. `http://localhost:8080`. Blob URLs are
  /// built as `<public_base_url>/files/<path>`.
  pub public_base_url: String,
  #[serde(default)]
  pub delete_mode:     DeleteMode,
  #[serde(default)]
  pub users:           Vec<UserCredential>,
}

impl ServerConfig {
  pub fn files_base_url(&self) -> String {
    format!("{}/files", self.public_base_url.trim_end_matches('/'))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B> {
  pub gateway: ContactGateway<S, B>,
  pub config:  Arc<ServerConfig>,
  pub auth:    Arc<AuthConfig>,
}

impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      gateway: self.gateway.clone(),
      config:  Arc::clone(&self.config),
      auth:    Arc::clone(&self.auth),
    }
  }
}

impl<S, B> AppState<S, B>
where
  S: DocumentStore,
  B: BlobStore,
{
  pub fn new(store: Arc<S>, blobs: Arc<B>, config: ServerConfig) -> Self {
    Self {
      gateway: ContactGateway::new(store, blobs),
      auth:    Arc::new(AuthConfig::new(config.users.clone())),
      config:  Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S, B>(state: AppState<S, B>) -> Router
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
{
  let files = ServeDir::new(&state.config.blob_dir);

  let api = Router::new()
    // Contacts
    .route("/contacts", get(contacts::list::<S, B>).post(contacts::create::<S, B>))
    .route("/contacts/template", get(import::template::<S, B>))
    .route("/contacts/bulk-import", post(import::bulk_import::<S, B>))
    .route("/contacts/bulk-delete", post(contacts::bulk_remove::<S, B>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S, B>)
        .put(contacts::update::<S, B>)
        .delete(contacts::remove::<S, B>),
    )
    // Organization
    .route("/departments", get(org::departments::<S, B>))
    .route("/institutes", get(org::institutes::<S, B>))
    .route("/units", get(org::units::<S, B>))
    .route("/organizations", get(org::organizations::<S, B>))
    .with_state(state);

  Router::new()
    .nest("/api", api)
    .nest_service("/files", files)
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::LazyLock;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use staffdir_blob_fs::FsBlobStore;
  use staffdir_core::{
    actor::Role,
    store::{Collection, Fields},
  };
  use staffdir_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  const PASSWORD: &str = "secret";

  static HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(PASSWORD.as_bytes(), &salt)
      .unwrap()
      .to_string()
  });

  struct TestApp {
    state: AppState<SqliteStore, FsBlobStore>,
    store: Arc<SqliteStore>,
    _dir:  tempfile::TempDir,
  }

  async fn make_app(delete_mode: DeleteMode) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let users = [("admin", Role::Admin), ("clerk", Role::DataEntry), ("viewer", Role::User)]
      .into_iter()
      .map(|(username, role)| UserCredential {
        username: username.into(),
        password_hash: HASH.clone(),
        role,
      })
      .collect();
    let config = ServerConfig {
      host: "127.0.0.1".into(),
      port: 8080,
      store_path: PathBuf::from(":memory:"),
      blob_dir: dir.path().to_path_buf(),
      public_base_url: "http://localhost:8080".into(),
      delete_mode,
      users,
    };

    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let blobs = Arc::new(FsBlobStore::new(dir.path(), config.files_base_url()));
    TestApp {
      state: AppState::new(store.clone(), blobs, config),
      store,
      _dir: dir,
    }
  }

  fn auth_header(user: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{PASSWORD}")))
  }

  async fn send(app: &TestApp, req: Request<Body>) -> Response {
    router(app.state.clone()).oneshot(req).await.unwrap()
  }

  async fn call(app: &TestApp, method: &str, uri: &str, user: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(header::AUTHORIZATION, auth_header(user));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
  }

  async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Multipart helpers ───────────────────────────────────────────────────────

  const BOUNDARY: &str = "staffdir-test-boundary";

  enum Part<'a> {
    Text(&'a str, String),
    File(&'a str, &'a str, &'a str, Vec<u8>),
  }

  fn multipart(
    method: &str,
    uri: &str,
    user: &str,
    parts: Vec<Part<'_>>,
  ) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
      body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
      match part {
        Part::Text(name, value) => {
          body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
          );
          body.extend_from_slice(value.as_bytes());
        }
        Part::File(name, file_name, content_type, bytes) => {
          body.extend_from_slice(
            format!(
              "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
               Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
          );
          body.extend_from_slice(&bytes);
        }
      }
      body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, auth_header(user))
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(body))
      .unwrap()
  }

  fn contact_json(name: &str) -> String {
    json!({
      "title": "Dr",
      "fullName": name,
      "departmentId": "d1",
      "officialEmail": "x@y.com",
      "mobileNo1": "0771234567",
    })
    .to_string()
  }

  async fn create_contact(app: &TestApp, name: &str) -> String {
    let resp = send(
      app,
      multipart("POST", "/api/contacts", "admin", vec![Part::Text("contact", contact_json(name))]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().unwrap().to_owned()
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = call(&app, "GET", "/api/contacts", None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn plain_users_cannot_write() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(
      &app,
      multipart("POST", "/api/contacts", "viewer", vec![Part::Text("contact", contact_json("A B"))]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let id = create_contact(&app, "A B").await;
    let resp = call(&app, "DELETE", &format!("/api/contacts/{id}"), Some("viewer")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Create / read ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn created_contact_is_normalized_and_listed() {
    let app = make_app(DeleteMode::Soft).await;
    let id = create_contact(&app, "  A B ").await;

    let resp = call(&app, "GET", "/api/contacts", Some("viewer")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");

    let contact = &body["data"]["contacts"][0];
    assert_eq!(contact["id"], id.as_str());
    assert_eq!(contact["fullName"], "A B");
    assert_eq!(contact["mobileNo1"], "+94771234567");
    assert_eq!(contact["status"], "active");
    assert_eq!(contact["createdBy"], "admin");
    assert_eq!(
      body["data"]["pagination"],
      json!({ "total": 1, "pages": 1, "current": 1, "limit": 10 })
    );
  }

  #[tokio::test]
  async fn data_entry_staff_can_create() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(
      &app,
      multipart("POST", "/api/contacts", "clerk", vec![Part::Text("contact", contact_json("A B"))]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn invalid_contact_returns_422_with_first_failure() {
    let app = make_app(DeleteMode::Soft).await;
    let contact = json!({ "fullName": "", "departmentId": "d1", "officialEmail": "bad" });
    let resp = send(
      &app,
      multipart("POST", "/api/contacts", "admin", vec![Part::Text("contact", contact.to_string())]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Full name is required");
    assert_eq!(body["field"], "fullName");
  }

  #[tokio::test]
  async fn missing_contact_part_is_a_bad_request() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(&app, multipart("POST", "/api/contacts", "admin", vec![])).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn uploaded_picture_is_served_from_files() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(
      &app,
      multipart(
        "POST",
        "/api/contacts",
        "admin",
        vec![
          Part::Text("contact", contact_json("A B")),
          Part::File("profilePicture", "me.png", "image/png", b"fake-png".to_vec()),
        ],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_str().unwrap().to_owned();

    let contact = body_json(call(&app, "GET", &format!("/api/contacts/{id}"), Some("viewer")).await).await;
    let url = contact["profilePicture"].as_str().unwrap();
    let path = url.strip_prefix("http://localhost:8080").unwrap();
    assert!(path.starts_with("/files/contact-profiles/"), "{path}");

    let resp = call(&app, "GET", path, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"fake-png");
  }

  #[tokio::test]
  async fn picture_with_spaces_in_its_name_gets_a_valid_url() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(
      &app,
      multipart(
        "POST",
        "/api/contacts",
        "admin",
        vec![
          Part::Text("contact", contact_json("A B")),
          Part::File("profilePicture", "my photo #1.png", "image/png", b"spaced".to_vec()),
        ],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_str().unwrap().to_owned();

    let contact = body_json(call(&app, "GET", &format!("/api/contacts/{id}"), Some("viewer")).await).await;
    let url = contact["profilePicture"].as_str().unwrap();
    assert!(url.parse::<axum::http::Uri>().is_ok(), "{url}");
    assert!(url.ends_with("-my_photo__1.png"), "{url}");

    let path = url.strip_prefix("http://localhost:8080").unwrap();
    let resp = call(&app, "GET", path, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"spaced");
  }

  #[tokio::test]
  async fn get_unknown_contact_returns_404() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = call(&app, "GET", "/api/contacts/nope", Some("admin")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Update ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_replaces_fields_and_restores_status() {
    let app = make_app(DeleteMode::Soft).await;
    let id = create_contact(&app, "A B").await;
    call(&app, "DELETE", &format!("/api/contacts/{id}"), Some("admin")).await;

    let mut edited: Value = serde_json::from_str(&contact_json("A B C")).unwrap();
    edited["status"] = json!("active");
    let resp = send(
      &app,
      multipart(
        "PUT",
        &format!("/api/contacts/{id}"),
        "clerk",
        vec![Part::Text("contact", edited.to_string())],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let contact = body_json(call(&app, "GET", &format!("/api/contacts/{id}"), Some("viewer")).await).await;
    assert_eq!(contact["fullName"], "A B C");
    assert_eq!(contact["updatedBy"], "clerk");
    assert_eq!(contact["status"], "active");
  }

  #[tokio::test]
  async fn editing_a_deleted_contact_does_not_restore_it() {
    let app = make_app(DeleteMode::Soft).await;
    let id = create_contact(&app, "A B").await;
    call(&app, "DELETE", &format!("/api/contacts/{id}"), Some("admin")).await;

    let resp = send(
      &app,
      multipart(
        "PUT",
        &format!("/api/contacts/{id}"),
        "clerk",
        vec![Part::Text("contact", contact_json("A B typo fix"))],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let viewer = call(&app, "GET", &format!("/api/contacts/{id}"), Some("viewer")).await;
    assert_eq!(viewer.status(), StatusCode::NOT_FOUND);

    let admin = body_json(call(&app, "GET", &format!("/api/contacts/{id}"), Some("admin")).await).await;
    assert_eq!(admin["fullName"], "A B typo fix");
    assert_eq!(admin["status"], "inactive");
    assert_eq!(admin["deletedBy"], "admin");
  }

  #[tokio::test]
  async fn update_unknown_contact_returns_404() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(
      &app,
      multipart("PUT", "/api/contacts/nope", "admin", vec![Part::Text("contact", contact_json("A B"))]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Delete ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn soft_delete_hides_contact_from_plain_users() {
    let app = make_app(DeleteMode::Soft).await;
    let id = create_contact(&app, "A B").await;

    let resp = call(&app, "DELETE", &format!("/api/contacts/{id}"), Some("admin")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let viewer = call(&app, "GET", &format!("/api/contacts/{id}"), Some("viewer")).await;
    assert_eq!(viewer.status(), StatusCode::NOT_FOUND);

    let admin = body_json(call(&app, "GET", &format!("/api/contacts/{id}"), Some("admin")).await).await;
    assert_eq!(admin["status"], "inactive");
    assert_eq!(admin["deletedBy"], "admin");

    let listed = body_json(call(&app, "GET", "/api/contacts", Some("viewer")).await).await;
    assert_eq!(listed["data"]["pagination"]["total"], 0);
    let listed = body_json(call(&app, "GET", "/api/contacts", Some("clerk")).await).await;
    assert_eq!(listed["data"]["pagination"]["total"], 1);
  }

  #[tokio::test]
  async fn hard_delete_removes_contact() {
    let app = make_app(DeleteMode::Hard).await;
    let id = create_contact(&app, "A B").await;

    let resp = call(&app, "DELETE", &format!("/api/contacts/{id}"), Some("admin")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = call(&app, "GET", &format!("/api/contacts/{id}"), Some("admin")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn bulk_delete_is_all_or_nothing() {
    let app = make_app(DeleteMode::Soft).await;
    let a = create_contact(&app, "A").await;
    let b = create_contact(&app, "B").await;

    let bulk = |ids: Value| {
      Request::builder()
        .method("POST")
        .uri("/api/contacts/bulk-delete")
        .header(header::AUTHORIZATION, auth_header("admin"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "ids": ids }).to_string()))
        .unwrap()
    };

    let resp = send(&app, bulk(json!([a, "ghost"]))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["error"], "failed to delete contacts");
    let listed = body_json(call(&app, "GET", "/api/contacts", Some("viewer")).await).await;
    assert_eq!(listed["data"]["pagination"]["total"], 2);

    let resp = send(&app, bulk(json!([a, b]))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let listed = body_json(call(&app, "GET", "/api/contacts", Some("viewer")).await).await;
    assert_eq!(listed["data"]["pagination"]["total"], 0);
  }

  // ── Listing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_filters_then_paginates() {
    let app = make_app(DeleteMode::Soft).await;
    for i in 1..=12 {
      create_contact(&app, &format!("Perera {i:02}")).await;
    }
    create_contact(&app, "Silva").await;

    let body = body_json(
      call(&app, "GET", "/api/contacts?search=perera&page=2&limit=10", Some("viewer")).await,
    )
    .await;
    let names: Vec<_> = body["data"]["contacts"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["fullName"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(names, ["Perera 11", "Perera 12"]);
    assert_eq!(
      body["data"]["pagination"],
      json!({ "total": 12, "pages": 2, "current": 2, "limit": 10 })
    );
  }

  #[tokio::test]
  async fn list_accepts_display_names_for_status() {
    let app = make_app(DeleteMode::Soft).await;
    create_contact(&app, "A B").await;

    let on_duty = body_json(call(&app, "GET", "/api/contacts?status=On%20Duty", Some("viewer")).await).await;
    assert_eq!(on_duty["data"]["pagination"]["total"], 1);
    let retired = body_json(call(&app, "GET", "/api/contacts?status=Retired", Some("viewer")).await).await;
    assert_eq!(retired["data"]["pagination"]["total"], 0);
  }

  #[tokio::test]
  async fn list_rejects_unknown_type() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = call(&app, "GET", "/api/contacts?type=Alien", Some("viewer")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Spreadsheets ────────────────────────────────────────────────────────────

  async fn template_bytes(app: &TestApp) -> Vec<u8> {
    let resp = call(app, "GET", "/api/contacts/template", Some("viewer")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers()[header::CONTENT_TYPE],
      spreadsheet::XLSX_CONTENT_TYPE
    );
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  #[tokio::test]
  async fn template_imports_cleanly() {
    let app = make_app(DeleteMode::Soft).await;
    let bytes = template_bytes(&app).await;

    let resp = send(
      &app,
      multipart(
        "POST",
        "/api/contacts/bulk-import",
        "clerk",
        vec![
          Part::File("file", "contacts.xlsx", spreadsheet::XLSX_CONTENT_TYPE, bytes),
          Part::Text("userEmail", "ignored@example.com".into()),
        ],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["imported"], 1);

    let listed = body_json(call(&app, "GET", "/api/contacts", Some("viewer")).await).await;
    let contact = &listed["data"]["contacts"][0];
    assert_eq!(contact["fullName"], "John Doe");
    assert_eq!(contact["createdBy"], "clerk");
  }

  #[tokio::test]
  async fn bulk_import_with_invalid_row_imports_nothing() {
    let app = make_app(DeleteMode::Soft).await;

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (row, values) in [
      ["fullName", "departmentId", "officialEmail", "mobileNo1"],
      ["Good Row", "d1", "good@dept.lk", "0771234567"],
      ["Bad Row", "d1", "not-an-email", ""],
    ]
    .iter()
    .enumerate()
    {
      for (col, value) in values.iter().enumerate() {
        if !value.is_empty() {
          sheet.write_string(row as u32, col as u16, *value).unwrap();
        }
      }
    }
    let bytes = workbook.save_to_buffer().unwrap();

    let resp = send(
      &app,
      multipart(
        "POST",
        "/api/contacts/bulk-import",
        "admin",
        vec![Part::File("file", "contacts.xlsx", spreadsheet::XLSX_CONTENT_TYPE, bytes)],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(
      body["rows"],
      json!([{ "row": 3, "message": "Official email is not a valid email address" }])
    );

    let listed = body_json(call(&app, "GET", "/api/contacts", Some("admin")).await).await;
    assert_eq!(listed["data"]["pagination"]["total"], 0);
  }

  #[tokio::test]
  async fn bulk_import_without_file_is_a_bad_request() {
    let app = make_app(DeleteMode::Soft).await;
    let resp = send(
      &app,
      multipart(
        "POST",
        "/api/contacts/bulk-import",
        "admin",
        vec![Part::Text("userEmail", "x@y.com".into())],
      ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Organization ────────────────────────────────────────────────────────────

  async fn seed_org(app: &TestApp) {
    let seed = |value: Value| match value {
      Value::Object(map) => map,
      _ => Fields::new(),
    };
    let store = &app.store;
    store
      .create(Collection::Departments, seed(json!({ "name": "Health" })))
      .await
      .unwrap();
    for (name, dept) in [("Teachers College", "d2"), ("General Hospital", "d1")] {
      store
        .create(
          Collection::Institutes,
          seed(json!({ "name": name, "departmentId": dept })),
        )
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn institutes_filter_by_department() {
    let app = make_app(DeleteMode::Soft).await;
    seed_org(&app).await;

    let body = body_json(call(&app, "GET", "/api/institutes?departmentId=d1", Some("viewer")).await).await;
    let institutes = body["institutes"].as_array().unwrap();
    assert_eq!(institutes.len(), 1);
    assert_eq!(institutes[0]["name"], "General Hospital");
  }

  #[tokio::test]
  async fn organizations_returns_all_levels() {
    let app = make_app(DeleteMode::Soft).await;
    seed_org(&app).await;

    let body = body_json(call(&app, "GET", "/api/organizations", Some("viewer")).await).await;
    assert_eq!(body["departments"].as_array().unwrap().len(), 1);
    assert_eq!(body["institutes"][0]["name"], "General Hospital");
    assert_eq!(body["units"], json!([]));
  }
}
