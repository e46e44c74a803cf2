//! [`ContactGateway`] mediates between validated contacts and the
//! document/blob store collaborators, stamping audit metadata on the way.
//!
//! Only [`ValidContact`]s are accepted for writes, so nothing reaches the
//! store without passing [`crate::validate::prepare`] first.

use std::{collections::BTreeSet, sync::Arc};

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::Actor,
  contact::{Contact, PendingFile, RecordStatus, ValidContact},
  listing::visible_set,
  org::{Department, Institute, OrgSnapshot, Unit},
  store::{
    BlobStore, Collection, DocQuery, Direction, Document, DocumentStore, Fields,
    server_timestamp,
  },
};

/// Blob-store folder that holds contact profile pictures.
pub const PROFILE_PICTURE_DIR: &str = "contact-profiles";

/// How a contact is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
  /// Flip `status` to inactive; the record stays visible to managers.
  #[default]
  Soft,
  /// Physically delete the document.
  Hard,
}

/// Contact persistence over a [`DocumentStore`] and a [`BlobStore`].
pub struct ContactGateway<S, B> {
  store: Arc<S>,
  blobs: Arc<B>,
}

impl<S, B> Clone for ContactGateway<S, B> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      blobs: Arc::clone(&self.blobs),
    }
  }
}

impl<S, B> ContactGateway<S, B>
where
  S: DocumentStore,
  B: BlobStore,
{
  pub fn new(store: Arc<S>, blobs: Arc<B>) -> Self { Self { store, blobs } }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every contact `actor` may see, in creation order.
  ///
  /// Non-managers only ever fetch active records; the result is then passed
  /// through [`visible_set`] regardless of what the store returned.
  pub async fn list(&self, actor: &Actor) -> Result<Vec<Contact>> {
    let query = if actor.can_manage_contacts() {
      DocQuery::all()
    } else {
      DocQuery::where_equals("status", RecordStatus::Active.to_string())
    };
    let query = query.order_by("createdAt", Direction::Ascending);

    let docs = self
      .store
      .query(Collection::Contacts, &query)
      .await
      .map_err(Error::persistence)?;

    Ok(visible_set(decode_all(Collection::Contacts, docs), actor))
  }

  /// Fetch one contact regardless of status.
  pub async fn get(&self, id: &str) -> Result<Contact> {
    let doc = self
      .store
      .get(Collection::Contacts, id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;

    let id = doc.id.clone();
    doc
      .decode()
      .map_err(|source| Error::MalformedDocument { id, source })
  }

  pub async fn departments(&self) -> Result<Vec<Department>> {
    self.reference_data(Collection::Departments, None).await
  }

  /// Institutes, optionally only those under `department_id`.
  pub async fn institutes(&self, department_id: Option<&str>) -> Result<Vec<Institute>> {
    let filter = department_id.map(|id| ("departmentId", id));
    self.reference_data(Collection::Institutes, filter).await
  }

  /// Units, optionally only those under `institute_id`.
  pub async fn units(&self, institute_id: Option<&str>) -> Result<Vec<Unit>> {
    let filter = institute_id.map(|id| ("instituteId", id));
    self.reference_data(Collection::Units, filter).await
  }

  /// The whole organization hierarchy, each level ordered by name.
  pub async fn org_snapshot(&self) -> Result<OrgSnapshot> {
    Ok(OrgSnapshot {
      departments: self.departments().await?,
      institutes:  self.institutes(None).await?,
      units:       self.units(None).await?,
    })
  }

  async fn reference_data<T: DeserializeOwned>(
    &self,
    collection: Collection,
    filter: Option<(&str, &str)>,
  ) -> Result<Vec<T>> {
    let query = match filter {
      Some((field, value)) => DocQuery::where_equals(field, value),
      None => DocQuery::all(),
    };
    let query = query.order_by("name", Direction::Ascending);
    let docs = self
      .store
      .query(collection, &query)
      .await
      .map_err(Error::persistence)?;
    Ok(decode_all(collection, docs))
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Persist a new contact and return its id.
  ///
  /// A pending profile picture is uploaded first; if the upload fails nothing
  /// is written.
  pub async fn create(&self, record: ValidContact, actor: &Actor) -> Result<String> {
    let mut record = record.into_inner();
    let picture_url = match record.profile_picture.take() {
      Some(file) => Some(self.upload_picture(file).await?),
      None => None,
    };

    let mut fields = to_fields(&record)?;
    fields.insert("profilePicture".into(), picture_url.map_or(Value::Null, Value::String));
    stamp_created(&mut fields, actor);

    let id = self
      .store
      .create(Collection::Contacts, fields)
      .await
      .map_err(Error::persistence)?;

    tracing::info!(contact_id = %id, actor = %actor.id, "contact created");
    Ok(id)
  }

  /// Persist many contacts in a single all-or-nothing batch. Pending
  /// pictures are ignored.
  pub async fn bulk_create(
    &self,
    records: Vec<ValidContact>,
    actor: &Actor,
  ) -> Result<Vec<String>> {
    if records.is_empty() {
      return Ok(Vec::new());
    }

    let docs = records
      .into_iter()
      .map(|record| {
        let mut record = record.into_inner();
        record.profile_picture = None;
        let mut fields = to_fields(&record)?;
        fields.insert("profilePicture".into(), Value::Null);
        stamp_created(&mut fields, actor);
        Ok(fields)
      })
      .collect::<Result<Vec<_>>>()?;

    let ids = self
      .store
      .batch_create(Collection::Contacts, docs)
      .await
      .map_err(Error::persistence)?;

    tracing::info!(count = ids.len(), actor = %actor.id, "contacts imported");
    Ok(ids)
  }

  /// Overwrite an existing contact's editable fields.
  ///
  /// The stored picture URL is kept unless a new file is supplied. Without
  /// an explicit `status` the stored one is left alone; `active` restores
  /// and clears the deletion stamp, `inactive` soft-deletes.
  pub async fn update(&self, id: &str, record: ValidContact, actor: &Actor) -> Result<()> {
    let existing = self
      .store
      .get(Collection::Contacts, id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;
    let was_active = existing.fields.get("status")
      == Some(&Value::from(RecordStatus::Active.to_string()));

    let mut record = record.into_inner();
    let picture_url = match record.profile_picture.take() {
      Some(file) => Some(self.upload_picture(file).await?),
      None => None,
    };

    let mut patch = to_fields(&record)?;
    if let Some(url) = picture_url {
      patch.insert("profilePicture".into(), Value::String(url));
    }
    match record.status {
      Some(RecordStatus::Active) => {
        patch.insert("deletedAt".into(), Value::Null);
        patch.insert("deletedBy".into(), Value::Null);
        stamp_updated(&mut patch, actor);
      }
      Some(RecordStatus::Inactive) if was_active => {
        patch.extend(soft_delete_patch(actor));
      }
      _ => stamp_updated(&mut patch, actor),
    }

    let found = self
      .store
      .update_by_id(Collection::Contacts, id, patch)
      .await
      .map_err(Error::persistence)?;
    if !found {
      return Err(Error::NotFound(id.to_owned()));
    }

    tracing::info!(contact_id = %id, actor = %actor.id, "contact updated");
    Ok(())
  }

  /// Remove one contact.
  pub async fn remove(&self, id: &str, mode: DeleteMode, actor: &Actor) -> Result<()> {
    let found = match mode {
      DeleteMode::Soft => self
        .store
        .update_by_id(Collection::Contacts, id, soft_delete_patch(actor))
        .await
        .map_err(Error::persistence)?,
      DeleteMode::Hard => self
        .store
        .delete_by_id(Collection::Contacts, id)
        .await
        .map_err(Error::persistence)?,
    };
    if !found {
      return Err(Error::NotFound(id.to_owned()));
    }

    tracing::info!(contact_id = %id, ?mode, actor = %actor.id, "contact removed");
    Ok(())
  }

  /// Remove every id in one all-or-nothing batch. Duplicate ids count once.
  pub async fn bulk_remove(
    &self,
    ids: &[String],
    mode: DeleteMode,
    actor: &Actor,
  ) -> Result<()> {
    let ids: Vec<String> = ids
      .iter()
      .cloned()
      .collect::<BTreeSet<_>>()
      .into_iter()
      .collect();
    if ids.is_empty() {
      return Ok(());
    }

    match mode {
      DeleteMode::Soft => self
        .store
        .batch_update(Collection::Contacts, &ids, soft_delete_patch(actor))
        .await
        .map_err(Error::persistence)?,
      DeleteMode::Hard => self
        .store
        .batch_delete(Collection::Contacts, &ids)
        .await
        .map_err(Error::persistence)?,
    }

    tracing::info!(count = ids.len(), ?mode, actor = %actor.id, "contacts removed");
    Ok(())
  }

  async fn upload_picture(&self, file: PendingFile) -> Result<String> {
    let token = Uuid::new_v4().simple().to_string();
    let path = picture_path(&file.file_name, Utc::now().timestamp_millis(), &token[..8]);
    let blob = self
      .blobs
      .put(path, file.bytes, file.content_type)
      .await
      .map_err(Error::upload)?;
    Ok(self.blobs.url(&blob))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Blob key for an uploaded picture:
/// `contact-profiles/<millis>-<token>-<file name>`.
///
/// The file name is reduced to `[A-Za-z0-9._-]` so the key is usable as a
/// URL path segment as-is.
pub fn picture_path(file_name: &str, millis: i64, token: &str) -> String {
  let name: String = file_name
    .chars()
    .map(|c| match c {
      'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
      _ => '_',
    })
    .collect();
  let name = name.trim_start_matches('.');
  let name = if name.is_empty() { "upload" } else { name };
  format!("{PROFILE_PICTURE_DIR}/{millis}-{token}-{name}")
}

fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
  match serde_json::to_value(value).map_err(Error::persistence)? {
    Value::Object(fields) => Ok(fields),
    other => Err(Error::persistence(NotAnObject(json_kind(&other)))),
  }
}

#[derive(Debug, thiserror::Error)]
#[error("record serialized to {0}, expected an object")]
struct NotAnObject(&'static str);

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

fn stamp_created(fields: &mut Fields, actor: &Actor) {
  fields.insert("status".into(), Value::from(RecordStatus::Active.to_string()));
  fields.insert("createdAt".into(), server_timestamp());
  fields.insert("createdBy".into(), Value::String(actor.id.clone()));
  stamp_updated(fields, actor);
}

fn stamp_updated(fields: &mut Fields, actor: &Actor) {
  fields.insert("updatedAt".into(), server_timestamp());
  fields.insert("updatedBy".into(), Value::String(actor.id.clone()));
}

fn soft_delete_patch(actor: &Actor) -> Fields {
  let mut patch = Fields::new();
  patch.insert("status".into(), Value::from(RecordStatus::Inactive.to_string()));
  patch.insert("deletedAt".into(), server_timestamp());
  patch.insert("deletedBy".into(), Value::String(actor.id.clone()));
  stamp_updated(&mut patch, actor);
  patch
}

fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<Document>) -> Vec<T> {
  docs
    .into_iter()
    .filter_map(|doc| {
      let id = doc.id.clone();
      match doc.decode() {
        Ok(record) => Some(record),
        Err(e) => {
          tracing::warn!(%collection, document_id = %id, error = %e, "skipping malformed document");
          None
        }
      }
    })
    .collect()
}
