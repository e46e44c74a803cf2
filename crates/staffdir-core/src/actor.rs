//! The acting user, passed explicitly into every operation that needs to
//! know who is asking.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Access level of a directory user.
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
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
  Admin,
  DataEntry,
  #[default]
  User,
}

/// Capability object for the user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  /// Stable identity recorded in `createdBy` / `updatedBy` / `deletedBy`.
  pub id:   String,
  pub role: Role,
}

impl Actor {
  pub fn new(id: impl Into<String>, role: Role) -> Self {
    Self { id: id.into(), role }
  }

  /// Admins and data-entry staff may add, edit, and delete contacts, and see
  /// inactive ones.
  pub fn can_manage_contacts(&self) -> bool {
    matches!(self.role, Role::Admin | Role::DataEntry)
  }
}
