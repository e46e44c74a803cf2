//! Organization hierarchy: departments → institutes → units.
//!
//! Read-only reference data from the contact directory's point of view. Used
//! to populate cascading selects and to resolve ids to display names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
  pub id:   String,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institute {
  pub id:            String,
  pub name:          String,
  pub department_id: String,
}

/// `department_id` is denormalized from the parent institute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
  pub id:            String,
  pub name:          String,
  pub institute_id:  String,
  #[serde(default)]
  pub department_id: String,
}

/// The whole hierarchy, fetched in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgSnapshot {
  pub departments: Vec<Department>,
  pub institutes:  Vec<Institute>,
  pub units:       Vec<Unit>,
}

impl OrgSnapshot {
  pub fn department_name(&self, id: &str) -> Option<&str> {
    self
      .departments
      .iter()
      .find(|d| d.id == id)
      .map(|d| d.name.as_str())
  }

  pub fn institute_name(&self, id: &str) -> Option<&str> {
    self
      .institutes
      .iter()
      .find(|i| i.id == id)
      .map(|i| i.name.as_str())
  }

  pub fn unit_name(&self, id: &str) -> Option<&str> {
    self.units.iter().find(|u| u.id == id).map(|u| u.name.as_str())
  }

  /// Institutes selectable once `department_id` is chosen.
  pub fn institutes_of<'a>(
    &'a self,
    department_id: &'a str,
  ) -> impl Iterator<Item = &'a Institute> + 'a {
    self
      .institutes
      .iter()
      .filter(move |i| i.department_id == department_id)
  }

  /// Units selectable once `institute_id` is chosen.
  pub fn units_of<'a>(
    &'a self,
    institute_id: &'a str,
  ) -> impl Iterator<Item = &'a Unit> + 'a {
    self.units.iter().filter(move |u| u.institute_id == institute_id)
  }
}
