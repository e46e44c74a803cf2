//! Encoding and decoding helpers between core document types and the
//! plain-text representations stored in SQLite columns.
//!
//! Documents are stored as compact JSON objects. Server-timestamp sentinels
//! are resolved to RFC 3339 strings (UTC, microsecond precision) before a
//! write, so stored timestamps sort lexicographically.

use chrono::{DateTime, Utc};
use serde_json::Value;
use staffdir_core::store::{Document, Fields, resolve_server_timestamps};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Ids ─────────────────────────────────────────────────────────────────────

pub fn new_doc_id() -> String { Uuid::new_v4().simple().to_string() }

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Serialize `fields` for storage, stamping server timestamps with `now`.
pub fn encode_fields(mut fields: Fields, now: DateTime<Utc>) -> Result<String> {
  resolve_server_timestamps(&mut fields, now);
  Ok(serde_json::to_string(&fields)?)
}

/// Encode a scalar for comparison against `json_extract` output.
pub fn encode_value(value: &Value) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

/// JSON path for a top-level field. Only plain identifiers are accepted.
pub fn field_path(field: &str) -> Result<String> {
  let plain = !field.is_empty()
    && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
  if plain {
    Ok(format!("$.{field}"))
  } else {
    Err(Error::InvalidField(field.to_owned()))
  }
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Row from `documents` before JSON decoding.
pub struct RawDocument {
  pub doc_id: String,
  pub data:   String,
}

impl RawDocument {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { doc_id: row.get(0)?, data: row.get(1)? })
  }

  pub fn into_document(self) -> Result<Document> {
    match serde_json::from_str(&self.data)? {
      Value::Object(fields) => Ok(Document { id: self.doc_id, fields }),
      _ => Err(Error::NotAnObject(self.doc_id)),
    }
  }
}
