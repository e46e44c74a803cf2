//! Contact validation and normalization.
//!
//! Every write path runs [`prepare`], which is [`normalize`] followed by
//! [`validate`]. `validate` on its own is strict: phone fields must already be
//! in canonical form.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
  ValidationError,
  contact::{NewContact, ValidContact},
};

/// Country code every stored phone number carries.
pub const COUNTRY_CODE: &str = "+94";

/// Digits kept after the country code.
const SUBSCRIBER_DIGITS: usize = 9;

static PHONE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\+94\d{9}$").expect("phone regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
    .expect("email regex")
});

/// Bring a free-form phone number to `+94XXXXXXXXX`.
///
/// Non-digits are dropped, then leading zeros (trunk or `00` international
/// prefix), a single leading `94`, and any zeros after it. At most nine
/// digits are kept. Returns `""` when no digits remain.
///
/// Idempotent: `normalize_phone(&normalize_phone(x)) == normalize_phone(x)`.
pub fn normalize_phone(raw: &str) -> String {
  let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
  let rest = digits.trim_start_matches('0');
  let rest = rest.strip_prefix("94").unwrap_or(rest);
  let rest = rest.trim_start_matches('0');
  let subscriber: String = rest.chars().take(SUBSCRIBER_DIGITS).collect();

  if subscriber.is_empty() {
    String::new()
  } else {
    format!("{COUNTRY_CODE}{subscriber}")
  }
}

pub fn is_canonical_phone(value: &str) -> bool { PHONE_RE.is_match(value) }

pub fn is_valid_email(value: &str) -> bool { EMAIL_RE.is_match(value) }

/// Trim text fields, normalize all phone fields, and clear organization ids
/// whose parent is empty.
pub fn normalize(mut input: NewContact) -> NewContact {
  for field in [
    &mut input.full_name,
    &mut input.department_id,
    &mut input.institute_id,
    &mut input.unit_id,
    &mut input.personal_email,
    &mut input.official_email,
    &mut input.address,
    &mut input.description,
  ] {
    let trimmed = field.trim();
    if trimmed.len() != field.len() {
      *field = trimmed.to_owned();
    }
  }

  for phone in input.phones.values_mut() {
    *phone = normalize_phone(phone);
  }

  cascade_org_ids(&mut input);
  input
}

/// A unit requires an institute, an institute requires a department.
pub fn cascade_org_ids(input: &mut NewContact) {
  if input.department_id.is_empty() {
    input.institute_id.clear();
  }
  if input.institute_id.is_empty() {
    input.unit_id.clear();
  }
}

/// Check a contact against the storage invariants.
///
/// Rules are checked in order and the first failure is returned: required
/// fields, then email shape, then phone shape.
pub fn validate(mut input: NewContact) -> Result<ValidContact, ValidationError> {
  for (field, value) in [
    ("fullName", &input.full_name),
    ("departmentId", &input.department_id),
    ("officialEmail", &input.official_email),
  ] {
    if value.trim().is_empty() {
      return Err(ValidationError::MissingRequiredField(field));
    }
  }

  if !is_valid_email(input.official_email.trim()) {
    return Err(ValidationError::InvalidEmail("officialEmail"));
  }
  let personal = input.personal_email.trim();
  if !personal.is_empty() && !is_valid_email(personal) {
    return Err(ValidationError::InvalidEmail("personalEmail"));
  }

  for (field, value) in input.phones.iter() {
    if !value.is_empty() && !is_canonical_phone(value) {
      return Err(ValidationError::InvalidPhone(field));
    }
  }

  for phone in input.phones.values_mut() {
    *phone = normalize_phone(phone);
  }
  cascade_org_ids(&mut input);

  Ok(ValidContact(input))
}

/// The full pipeline: [`normalize`] then [`validate`].
pub fn prepare(input: NewContact) -> Result<ValidContact, ValidationError> {
  validate(normalize(input))
}
