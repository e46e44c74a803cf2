//! The contact list view: visibility, filtering, and pagination over an
//! already-fetched collection.
//!
//! Everything here runs in memory; changing a filter never goes back to the
//! store.

use serde::{Deserialize, Serialize};

use crate::{
  actor::Actor,
  contact::{Contact, ContactStatus, ContactType},
};

/// User-chosen filters. Empty or `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFilters {
  /// Case-insensitive substring of `fullName` or `officialEmail`.
  pub search_term:    String,
  pub department_id:  String,
  pub institute_id:   String,
  pub unit_id:        String,
  pub contact_type:   Option<ContactType>,
  pub contact_status: Option<ContactStatus>,
}

impl ContactFilters {
  pub fn matches(&self, contact: &Contact) -> bool {
    self.matches_search(contact)
      && matches_id(&self.department_id, &contact.department_id)
      && matches_id(&self.institute_id, &contact.institute_id)
      && matches_id(&self.unit_id, &contact.unit_id)
      && self.contact_type.is_none_or(|t| t == contact.contact_type)
      && self.contact_status.is_none_or(|s| s == contact.contact_status)
  }

  fn matches_search(&self, contact: &Contact) -> bool {
    if self.search_term.is_empty() {
      return true;
    }
    let term = self.search_term.to_lowercase();
    contact.full_name.to_lowercase().contains(&term)
      || contact.official_email.to_lowercase().contains(&term)
  }
}

fn matches_id(wanted: &str, actual: &str) -> bool {
  wanted.is_empty() || wanted == actual
}

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub total_items: usize,
  pub total_pages: usize,
  /// 1-based page number that was requested.
  pub page:        usize,
  pub page_size:   usize,
}

/// Contacts the actor is allowed to see. Users who cannot manage contacts
/// never see inactive records; managers see everything so they can restore.
pub fn visible_set(all: Vec<Contact>, actor: &Actor) -> Vec<Contact> {
  if actor.can_manage_contacts() {
    return all;
  }
  all.into_iter().filter(Contact::is_active).collect()
}

/// Keep the contacts matching every filter. Input order is preserved.
pub fn apply_filters(set: Vec<Contact>, filters: &ContactFilters) -> Vec<Contact> {
  set.into_iter().filter(|c| filters.matches(c)).collect()
}

/// Slice out page `page` (1-based). Pages past the end are empty; page `0`
/// is treated as page 1.
pub fn paginate<T>(set: Vec<T>, page: usize, page_size: usize) -> Page<T> {
  let total_items = set.len();
  let page = page.max(1);
  let total_pages = if page_size == 0 {
    0
  } else {
    total_items.div_ceil(page_size)
  };

  let start = (page - 1).saturating_mul(page_size);
  let items = set.into_iter().skip(start).take(page_size).collect();

  Page { items, total_items, total_pages, page, page_size }
}
