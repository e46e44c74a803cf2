//! Spreadsheet import and the downloadable import template.
//!
//! Columns are matched by their header text (the camelCase document field
//! names), so column order in an uploaded file does not matter and unknown
//! columns are ignored.

use std::{collections::HashMap, io::Cursor, str::FromStr};

use calamine::{Data, Range, Reader, Xls, Xlsx};
use rust_xlsxwriter::{Workbook, XlsxError};
use staffdir_core::contact::{ContactStatus, ContactType, NewContact, Title};
use strum::IntoEnumIterator;
use thiserror::Error;

/// Name of the data sheet in the template.
pub const TEMPLATE_SHEET: &str = "Contacts Template";

/// Name of the sheet listing accepted values for enumerated columns.
pub const ALLOWED_VALUES_SHEET: &str = "Allowed Values";

pub const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Template header row, in form order.
pub const COLUMNS: [&str; 18] = [
  "title",
  "fullName",
  "departmentId",
  "instituteId",
  "unitId",
  "mobileNo1",
  "mobileNo2",
  "whatsAppNo",
  "officeNo1",
  "officeNo2",
  "faxNo1",
  "faxNo2",
  "personalEmail",
  "officialEmail",
  "address",
  "description",
  "contactType",
  "contactStatus",
];

const EXAMPLE_ROW: [&str; 18] = [
  "Mr",
  "John Doe",
  "department-id-1",
  "institute-id-1",
  "unit-id-1",
  "+94771234567",
  "",
  "+94771234567",
  "+94112345678",
  "",
  "",
  "",
  "john.personal@example.com",
  "john.official@example.com",
  "123 Main St, City",
  "Department Head",
  "Person",
  "On Duty",
];

#[derive(Debug, Error)]
pub enum SheetError {
  #[error("file is not an XLSX or XLS spreadsheet")]
  UnknownFormat,

  #[error("spreadsheet has no sheets")]
  NoSheets,

  #[error("failed to read sheet {sheet:?}: {message}")]
  Sheet { sheet: String, message: String },
}

/// One data row of an uploaded sheet.
#[derive(Debug)]
pub struct SheetRow {
  /// 1-based spreadsheet row number.
  pub row:     usize,
  /// The parsed contact, or why the row could not be read.
  pub contact: Result<NewContact, String>,
}

// ─── Template ────────────────────────────────────────────────────────────────

/// Build the import template: a header row plus one example row, and a second
/// sheet listing the accepted enumerated values.
pub fn template() -> Result<Vec<u8>, XlsxError> {
  let mut workbook = Workbook::new();

  let sheet = workbook.add_worksheet();
  sheet.set_name(TEMPLATE_SHEET)?;
  for (col, (header, example)) in COLUMNS.iter().zip(EXAMPLE_ROW).enumerate() {
    let col = col as u16;
    sheet.write_string(0, col, *header)?;
    sheet.write_string(1, col, example)?;
  }

  let allowed = workbook.add_worksheet();
  allowed.set_name(ALLOWED_VALUES_SHEET)?;
  let lists: [(&str, Vec<String>); 3] = [
    ("title", Title::iter().map(|t| t.to_string()).collect()),
    ("contactType", ContactType::iter().map(|t| t.to_string()).collect()),
    ("contactStatus", ContactStatus::iter().map(|s| s.to_string()).collect()),
  ];
  for (col, (header, values)) in lists.iter().enumerate() {
    let col = col as u16;
    allowed.write_string(0, col, *header)?;
    for (row, value) in values.iter().enumerate() {
      allowed.write_string(row as u32 + 1, col, value)?;
    }
  }

  workbook.save_to_buffer()
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Read every non-empty data row of the first sheet.
pub fn read_contacts(bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
  let cursor = Cursor::new(bytes);

  if let Ok(mut workbook) = Xlsx::new(cursor.clone()) {
    return first_sheet_rows(&mut workbook);
  }
  if let Ok(mut workbook) = Xls::new(cursor) {
    return first_sheet_rows(&mut workbook);
  }
  Err(SheetError::UnknownFormat)
}

fn first_sheet_rows<RS, R>(workbook: &mut R) -> Result<Vec<SheetRow>, SheetError>
where
  RS: std::io::Read + std::io::Seek,
  R: Reader<RS>,
  R::Error: std::fmt::Display,
{
  let sheet = workbook
    .sheet_names()
    .into_iter()
    .next()
    .ok_or(SheetError::NoSheets)?;
  let range = workbook
    .worksheet_range(&sheet)
    .map_err(|e| SheetError::Sheet { sheet: sheet.clone(), message: e.to_string() })?;
  Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
  let mut rows = range.rows();
  let Some(header) = rows.next() else {
    return Vec::new();
  };
  let header: Vec<String> = header.iter().map(|c| cell_to_string(c).trim().to_owned()).collect();
  // Absolute sheet row of the header, 1-based.
  let header_row = range.start().map_or(1, |(row, _)| row as usize + 1);

  rows
    .enumerate()
    .filter_map(|(i, cells)| {
      let values: HashMap<&str, String> = header
        .iter()
        .map(String::as_str)
        .zip(cells.iter().map(cell_to_string))
        .filter(|(column, value)| !column.is_empty() && !value.trim().is_empty())
        .collect();
      if values.is_empty() {
        return None;
      }
      Some(SheetRow {
        row:     header_row + i + 1,
        contact: contact_from_cells(&values),
      })
    })
    .collect()
}

fn contact_from_cells(values: &HashMap<&str, String>) -> Result<NewContact, String> {
  let mut contact = NewContact::default();
  for (&column, value) in values {
    let value = value.trim();
    let text = value.to_owned();
    match column {
      "title" => contact.title = parse_enum(column, value)?,
      "fullName" => contact.full_name = text,
      "departmentId" => contact.department_id = text,
      "instituteId" => contact.institute_id = text,
      "unitId" => contact.unit_id = text,
      "mobileNo1" => contact.phones.mobile_no1 = text,
      "mobileNo2" => contact.phones.mobile_no2 = text,
      "whatsAppNo" => contact.phones.whats_app_no = text,
      "officeNo1" => contact.phones.office_no1 = text,
      "officeNo2" => contact.phones.office_no2 = text,
      "faxNo1" => contact.phones.fax_no1 = text,
      "faxNo2" => contact.phones.fax_no2 = text,
      "personalEmail" => contact.personal_email = text,
      "officialEmail" => contact.official_email = text,
      "address" => contact.address = text,
      "description" => contact.description = text,
      "contactType" => contact.contact_type = parse_enum(column, value)?,
      "contactStatus" => contact.contact_status = parse_enum(column, value)?,
      _ => {}
    }
  }
  Ok(contact)
}

fn parse_enum<T: FromStr>(column: &str, value: &str) -> Result<T, String> {
  T::from_str(value).map_err(|_| format!("{column} has unrecognised value {value:?}"))
}

fn cell_to_string(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    Data::Int(i) => i.to_string(),
    // Phone numbers typed as numbers arrive as floats.
    Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
    Data::Float(f) => f.to_string(),
    Data::Bool(b) => b.to_string(),
    Data::DateTime(dt) => dt.to_string(),
    Data::Error(e) => format!("#ERROR: {e:?}"),
  }
}
