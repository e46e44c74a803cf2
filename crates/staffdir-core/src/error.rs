//! Error types for `staffdir-core`.

use thiserror::Error;

/// A contact record rejected by [`crate::validate::validate`].
///
/// Validation short-circuits: only the first failing rule is reported. The
/// `Display` text is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("{} is required", field_label(.0))]
  MissingRequiredField(&'static str),

  #[error("{} is not a valid email address", field_label(.0))]
  InvalidEmail(&'static str),

  #[error("{} must be +94 followed by 9 digits", field_label(.0))]
  InvalidPhone(&'static str),
}

impl ValidationError {
  /// The camelCase document field that failed.
  pub fn field(&self) -> &'static str {
    match self {
      Self::MissingRequiredField(f)
      | Self::InvalidEmail(f)
      | Self::InvalidPhone(f) => f,
    }
  }
}

fn field_label(field: &str) -> &'static str {
  match field {
    "fullName" => "Full name",
    "departmentId" => "Department",
    "officialEmail" => "Official email",
    "personalEmail" => "Personal email",
    "mobileNo1" => "Mobile number 1",
    "mobileNo2" => "Mobile number 2",
    "whatsAppNo" => "WhatsApp number",
    "officeNo1" => "Office number 1",
    "officeNo2" => "Office number 2",
    "faxNo1" => "Fax number 1",
    "faxNo2" => "Fax number 2",
    _ => "Field",
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("contact not found: {0}")]
  NotFound(String),

  #[error("upload error: {0}")]
  Upload(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("malformed document {id}: {source}")]
  MalformedDocument {
    id:     String,
    #[source]
    source: serde_json::Error,
  },
}

impl Error {
  pub(crate) fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }

  pub(crate) fn upload<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Upload(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
