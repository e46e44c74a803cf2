//! The `DocumentStore` and `BlobStore` traits and supporting types.
//!
//! Both are implemented by backend crates (`staffdir-store-sqlite`,
//! `staffdir-blob-fs`). Higher layers depend on these abstractions, not on
//! any concrete backend.

use std::{fmt, future::Future};

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level fields of a schemaless document.
pub type Fields = Map<String, Value>;

// ─── Collections ─────────────────────────────────────────────────────────────

/// The collections the directory reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Contacts,
  Departments,
  Institutes,
  Units,
}

impl Collection {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Contacts => "contacts",
      Self::Departments => "departments",
      Self::Institutes => "institutes",
      Self::Units => "units",
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// A stored document: store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
  pub id:     String,
  pub fields: Fields,
}

impl Document {
  /// Deserialise into a typed record whose `id` field is taken from the
  /// document id.
  pub fn decode<T: serde::de::DeserializeOwned>(
    self,
  ) -> Result<T, serde_json::Error> {
    let mut fields = self.fields;
    fields.insert("id".to_owned(), Value::String(self.id));
    serde_json::from_value(Value::Object(fields))
  }
}

// ─── Server timestamps ───────────────────────────────────────────────────────

const SERVER_TIMESTAMP_KEY: &str = "$serverTimestamp";

/// Sentinel value replaced by the store's own clock at write time.
pub fn server_timestamp() -> Value {
  let mut marker = Map::new();
  marker.insert(SERVER_TIMESTAMP_KEY.to_owned(), Value::Bool(true));
  Value::Object(marker)
}

pub fn is_server_timestamp(value: &Value) -> bool {
  value
    .as_object()
    .is_some_and(|o| {
      o.len() == 1 && o.get(SERVER_TIMESTAMP_KEY) == Some(&Value::Bool(true))
    })
}

/// Canonical text form of a stored timestamp.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Replace every top-level [`server_timestamp`] sentinel with `now`.
pub fn resolve_server_timestamps(fields: &mut Fields, now: DateTime<Utc>) {
  for value in fields.values_mut() {
    if is_server_timestamp(value) {
      *value = Value::String(encode_timestamp(now));
    }
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Ascending,
  Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
  pub field:     String,
  pub direction: Direction,
}

/// Parameters for [`DocumentStore::query`].
///
/// The default query returns every document in store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocQuery {
  /// Keep only documents whose top-level `field` equals `value`.
  pub where_equals: Option<(String, Value)>,
  pub order_by:     Option<OrderBy>,
}

impl DocQuery {
  pub fn all() -> Self { Self::default() }

  pub fn where_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
    Self {
      where_equals: Some((field.into(), value.into())),
      order_by:     None,
    }
  }

  pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
    self.order_by = Some(OrderBy { field: field.into(), direction });
    self
  }
}

// ─── DocumentStore ───────────────────────────────────────────────────────────

/// Abstraction over a schemaless document database.
///
/// Batch operations are all-or-nothing: if any id is missing or the backend
/// fails part-way, no document is changed.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a document and return its new id.
  fn create(
    &self,
    collection: Collection,
    fields: Fields,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Insert several documents in one transaction.
  fn batch_create(
    &self,
    collection: Collection,
    docs: Vec<Fields>,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Fetch a document by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// `getAll` and `getWhereEquals`, with optional ordering.
  fn query<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocQuery,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// Shallow-merge `patch` into an existing document. Returns `false` if the
  /// id does not exist.
  fn update_by_id<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    patch: Fields,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Physically remove a document. Returns `false` if the id does not exist.
  fn delete_by_id<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Apply the same patch to every id, atomically.
  fn batch_update<'a>(
    &'a self,
    collection: Collection,
    ids: &'a [String],
    patch: Fields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every id, atomically.
  fn batch_delete<'a>(
    &'a self,
    collection: Collection,
    ids: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── BlobStore ───────────────────────────────────────────────────────────────

/// Handle to an uploaded blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
  pub path: String,
}

/// Abstraction over binary file storage with URL-based retrieval.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `bytes` under `path`, replacing any previous blob there.
  fn put(
    &self,
    path: String,
    bytes: Bytes,
    content_type: Option<String>,
  ) -> impl Future<Output = Result<BlobRef, Self::Error>> + Send + '_;

  /// The retrieval URL for a stored blob.
  fn url(&self, blob: &BlobRef) -> String;
}
