//! Contact records: the only entity with validation and normalization
//! rules.
//!
//! Field names serialise as camelCase so stored documents keep the same shape
//! regardless of which client wrote them.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Honorific shown before the full name.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
pub enum Title {
  #[default]
  Mr,
  Mrs,
  Miss,
  Dr,
  Prof,
}

/// Whether the contact is an individual or an institution's general line.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
pub enum ContactType {
  #[default]
  Person,
  Institute,
}

/// Employment state of the contact.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
pub enum ContactStatus {
  #[default]
  #[serde(rename = "On Duty")]
  #[strum(serialize = "On Duty")]
  OnDuty,
  Retired,
  Transferred,
  Other,
}

/// Record lifecycle flag. Inactive records are soft-deleted.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordStatus {
  #[default]
  Active,
  Inactive,
}

// ─── Phone numbers ───────────────────────────────────────────────────────────

/// The seven phone-like fields of a contact. Empty string means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneNumbers {
  pub mobile_no1:   String,
  pub mobile_no2:   String,
  pub whats_app_no: String,
  pub office_no1:   String,
  pub office_no2:   String,
  pub fax_no1:      String,
  pub fax_no2:      String,
}

impl PhoneNumbers {
  /// Document field names, in form order.
  pub const FIELDS: [&'static str; 7] = [
    "mobileNo1",
    "mobileNo2",
    "whatsAppNo",
    "officeNo1",
    "officeNo2",
    "faxNo1",
    "faxNo2",
  ];

  /// `(field name, value)` pairs in form order.
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    Self::FIELDS.into_iter().zip([
      self.mobile_no1.as_str(),
      self.mobile_no2.as_str(),
      self.whats_app_no.as_str(),
      self.office_no1.as_str(),
      self.office_no2.as_str(),
      self.fax_no1.as_str(),
      self.fax_no2.as_str(),
    ])
  }

  pub fn values_mut(&mut self) -> [&mut String; 7] {
    [
      &mut self.mobile_no1,
      &mut self.mobile_no2,
      &mut self.whats_app_no,
      &mut self.office_no1,
      &mut self.office_no2,
      &mut self.fax_no1,
      &mut self.fax_no2,
    ]
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// A file selected in the add/edit form that has not been uploaded yet.
#[derive(Debug, Clone)]
pub struct PendingFile {
  pub file_name:    String,
  pub content_type: Option<String>,
  pub bytes:        Bytes,
}

/// A candidate contact from the add/edit form or a spreadsheet row.
///
/// Not yet trusted: pass it through [`crate::validate::prepare`] to obtain a
/// [`ValidContact`] before it can reach the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContact {
  pub title:           Title,
  pub full_name:       String,
  pub department_id:   String,
  pub institute_id:    String,
  pub unit_id:         String,
  #[serde(flatten)]
  pub phones:          PhoneNumbers,
  pub personal_email:  String,
  pub official_email:  String,
  pub address:         String,
  pub description:     String,
  pub contact_type:    ContactType,
  pub contact_status:  ContactStatus,
  /// Honoured on edit only. `None` keeps the stored status; `active`
  /// restores and `inactive` soft-deletes. Creation always stores
  /// [`RecordStatus::Active`].
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status:          Option<RecordStatus>,
  #[serde(skip)]
  pub profile_picture: Option<PendingFile>,
}

/// A [`NewContact`] that passed validation. Only [`crate::validate`] can
/// construct one.
#[derive(Debug, Clone)]
pub struct ValidContact(pub(crate) NewContact);

impl ValidContact {
  pub fn get(&self) -> &NewContact { &self.0 }

  pub fn into_inner(self) -> NewContact { self.0 }
}

// ─── Stored record ───────────────────────────────────────────────────────────

/// A contact as stored, with its id and audit metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:              String,
  #[serde(default)]
  pub title:           Title,
  pub full_name:       String,
  pub department_id:   String,
  #[serde(default)]
  pub institute_id:    String,
  #[serde(default)]
  pub unit_id:         String,
  #[serde(flatten)]
  pub phones:          PhoneNumbers,
  #[serde(default)]
  pub personal_email:  String,
  pub official_email:  String,
  #[serde(default)]
  pub address:         String,
  #[serde(default)]
  pub description:     String,
  #[serde(default)]
  pub contact_type:    ContactType,
  #[serde(default)]
  pub contact_status:  ContactStatus,
  /// Retrieval URL of the uploaded picture.
  #[serde(default)]
  pub profile_picture: Option<String>,
  pub status:          RecordStatus,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  pub created_by:      String,
  pub updated_by:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at:      Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_by:      Option<String>,
}

impl Contact {
  pub fn is_active(&self) -> bool { self.status == RecordStatus::Active }
}
