//! In-memory store doubles for unit tests.

use std::{
  collections::HashMap,
  sync::Mutex,
  sync::atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::store::{
  BlobRef, BlobStore, Collection, DocQuery, Direction, Document, DocumentStore,
  Fields, resolve_server_timestamps,
};

#[derive(Debug, Error)]
#[error("memory store: {0}")]
pub struct MemoryError(String);

// ─── MemoryStore ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Collections {
  next_id: u64,
  docs:    HashMap<Collection, Vec<Document>>,
}

impl Collections {
  fn insert(&mut self, collection: Collection, mut fields: Fields) -> String {
    self.next_id += 1;
    let id = format!("doc-{}", self.next_id);
    resolve_server_timestamps(&mut fields, Utc::now());
    self
      .docs
      .entry(collection)
      .or_default()
      .push(Document { id: id.clone(), fields });
    id
  }

  fn find_mut(&mut self, collection: Collection, id: &str) -> Option<&mut Document> {
    self
      .docs
      .get_mut(&collection)?
      .iter_mut()
      .find(|d| d.id == id)
  }

  fn remove(&mut self, collection: Collection, id: &str) -> bool {
    let Some(docs) = self.docs.get_mut(&collection) else {
      return false;
    };
    let before = docs.len();
    docs.retain(|d| d.id != id);
    docs.len() != before
  }
}

/// A [`DocumentStore`] over a `HashMap`, with switches for injecting
/// failures.
#[derive(Default)]
pub struct MemoryStore {
  inner:       Mutex<Collections>,
  failing:     AtomicBool,
  /// One-shot: the next batch call fails after touching this many ids.
  batch_limit: Mutex<Option<usize>>,
}

impl MemoryStore {
  /// Make every write fail until switched off again.
  pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

  /// Make the next batch operation fail part-way, after `n` ids.
  pub fn fail_batches_after(&self, n: usize) { *self.batch_limit.lock().unwrap() = Some(n); }

  pub fn count(&self, collection: Collection) -> usize {
    self
      .inner
      .lock()
      .unwrap()
      .docs
      .get(&collection)
      .map_or(0, Vec::len)
  }

  fn write<T>(&self, f: impl FnOnce(&mut Collections) -> T) -> Result<T, MemoryError> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(MemoryError("write rejected".into()));
    }
    Ok(f(&mut self.inner.lock().unwrap()))
  }

  /// Run `step` for each id against a scratch copy; commit only if every
  /// step succeeds.
  fn batch(
    &self,
    collection: Collection,
    ids: &[String],
    step: impl Fn(&mut Collections, &str) -> bool,
  ) -> Result<(), MemoryError> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(MemoryError("write rejected".into()));
    }
    let limit = self.batch_limit.lock().unwrap().take();

    let mut inner = self.inner.lock().unwrap();
    let mut scratch = Collections {
      next_id: inner.next_id,
      docs:    inner.docs.clone(),
    };
    for (n, id) in ids.iter().enumerate() {
      if limit == Some(n) {
        return Err(MemoryError(format!("batch interrupted at {id}")));
      }
      if !step(&mut scratch, id) {
        return Err(MemoryError(format!("{collection}/{id} not found")));
      }
    }
    *inner = scratch;
    Ok(())
  }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
  match (a, b) {
    (Some(Value::Number(x)), Some(Value::Number(y))) => x
      .as_f64()
      .partial_cmp(&y.as_f64())
      .unwrap_or(std::cmp::Ordering::Equal),
    (Some(x), Some(y)) => x.as_str().cmp(&y.as_str()),
    (a, b) => a.is_some().cmp(&b.is_some()),
  }
}

impl DocumentStore for MemoryStore {
  type Error = MemoryError;

  async fn create(&self, collection: Collection, fields: Fields) -> Result<String, MemoryError> {
    self.write(|inner| inner.insert(collection, fields))
  }

  async fn batch_create(
    &self,
    collection: Collection,
    docs: Vec<Fields>,
  ) -> Result<Vec<String>, MemoryError> {
    self.write(|inner| docs.into_iter().map(|f| inner.insert(collection, f)).collect())
  }

  async fn get<'a>(&'a self, collection: Collection, id: &'a str) -> Result<Option<Document>, MemoryError> {
    let inner = self.inner.lock().unwrap();
    Ok(
      inner
        .docs
        .get(&collection)
        .and_then(|docs| docs.iter().find(|d| d.id == id))
        .cloned(),
    )
  }

  async fn query<'a>(
    &'a self,
    collection: Collection,
    query: &'a DocQuery,
  ) -> Result<Vec<Document>, MemoryError> {
    let mut docs: Vec<Document> = {
      let inner = self.inner.lock().unwrap();
      inner.docs.get(&collection).cloned().unwrap_or_default()
    };
    if let Some((field, value)) = &query.where_equals {
      docs.retain(|d| d.fields.get(field) == Some(value));
    }
    if let Some(order) = &query.order_by {
      docs.sort_by(|a, b| {
        let ord = compare(a.fields.get(&order.field), b.fields.get(&order.field));
        match order.direction {
          Direction::Ascending => ord,
          Direction::Descending => ord.reverse(),
        }
      });
    }
    Ok(docs)
  }

  async fn update_by_id<'a>(
    &'a self,
    collection: Collection,
    id: &'a str,
    mut patch: Fields,
  ) -> Result<bool, MemoryError> {
    resolve_server_timestamps(&mut patch, Utc::now());
    self.write(|inner| match inner.find_mut(collection, id) {
      Some(doc) => {
        doc.fields.extend(patch);
        true
      }
      None => false,
    })
  }

  async fn delete_by_id<'a>(&'a self, collection: Collection, id: &'a str) -> Result<bool, MemoryError> {
    self.write(|inner| inner.remove(collection, id))
  }

  async fn batch_update<'a>(
    &'a self,
    collection: Collection,
    ids: &'a [String],
    mut patch: Fields,
  ) -> Result<(), MemoryError> {
    resolve_server_timestamps(&mut patch, Utc::now());
    self.batch(collection, ids, |inner, id| match inner.find_mut(collection, id) {
      Some(doc) => {
        doc.fields.extend(patch.clone());
        true
      }
      None => false,
    })
  }

  async fn batch_delete<'a>(&'a self, collection: Collection, ids: &'a [String]) -> Result<(), MemoryError> {
    self.batch(collection, ids, |inner, id| inner.remove(collection, id))
  }
}

// ─── MemoryBlobStore ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryBlobStore {
  blobs:   Mutex<HashMap<String, Bytes>>,
  failing: AtomicBool,
}

impl MemoryBlobStore {
  pub fn set_failing(&self, failing: bool) { self.failing.store(failing, Ordering::SeqCst); }

  pub fn len(&self) -> usize { self.blobs.lock().unwrap().len() }
}

impl BlobStore for MemoryBlobStore {
  type Error = MemoryError;

  async fn put(
    &self,
    path: String,
    bytes: Bytes,
    _content_type: Option<String>,
  ) -> Result<BlobRef, MemoryError> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(MemoryError("upload rejected".into()));
    }
    self.blobs.lock().unwrap().insert(path.clone(), bytes);
    Ok(BlobRef { path })
  }

  fn url(&self, blob: &BlobRef) -> String { format!("memory://{}", blob.path) }
}
