//! # Page Handlers
//!
//! One module per page. Every handler has the same shape:
//!
//! - `submit` (POST): validate field shape, run at most one existence check
//!   and one stored computation (or one UPDATE), flash the outcome, and
//!   redirect back to the page. Invalid input never reaches the database.
//! - `load` (GET): run the page's report queries in a fixed order. The first
//!   failure stops the remaining queries and flashes one error; sections not
//!   fetched stay empty.
//!
//! Handlers never touch HTTP types; they take a `RequestDb`, the parsed form
//! and the flash queue, and return a `PageOutcome`.

use std::collections::HashMap;

use crate::db::RowSet;
use crate::translate::OptionalObject;

pub mod consumers;
pub mod search;
pub mod vendors;
pub mod warehouse;

/// Raw form fields of one POST request
pub type FormValues = HashMap<String, String>;

/// Field carrying the submitted form's identity
pub const FORM_NAME_FIELD: &str = "form_name";

/// Flash shown when the request could not obtain a database connection
pub const NO_DATABASE: &str = "Could not connect to the database.";

pub const HOME_PATH: &str = "/";

/// What the HTTP layer should do with a handled request
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Redirect (GET) to the given path
    Redirect(&'static str),
    /// Render the page with its data
    Render(Page),
}

/// Data for each renderable page
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Home,
    Vendors(vendors::VendorsView),
    Warehouse(warehouse::WarehouseView),
    Search(search::SearchView),
    Consumers(consumers::ConsumersView),
}

/// One report on a page
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Fetched rows (possibly none, or never fetched)
    Rows(RowSet),
    /// Backing view/table does not exist yet
    Absent(OptionalObject),
}

impl Default for Section {
    fn default() -> Self {
        Section::Rows(Vec::new())
    }
}

impl Section {
    /// Rows of the section, empty when absent
    pub fn rows(&self) -> &[crate::db::ReportRow] {
        match self {
            Section::Rows(rows) => rows,
            Section::Absent(_) => &[],
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Section::Absent(_))
    }
}

/// Why a form field was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Field absent or empty
    Missing,
    /// Field present but not a number; carries the raw text
    Invalid(String),
}

/// The submitted `form_name`, if any
pub fn form_name(form: &FormValues) -> Option<&str> {
    form.get(FORM_NAME_FIELD).map(String::as_str)
}

fn raw_field<'a>(form: &'a FormValues, name: &str) -> Result<&'a str, FieldError> {
    match form.get(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(FieldError::Missing),
    }
}

/// Integer field; surrounding whitespace is ignored
pub fn int_field(form: &FormValues, name: &str) -> Result<i64, FieldError> {
    let raw = raw_field(form, name)?;
    raw.trim()
        .parse()
        .map_err(|_| FieldError::Invalid(raw.to_string()))
}

/// Finite decimal field; surrounding whitespace is ignored
pub fn float_field(form: &FormValues, name: &str) -> Result<f64, FieldError> {
    let raw = raw_field(form, name)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FieldError::Invalid(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_int_field() {
        let f = form(&[("id", " 42 "), ("bad", "4x2"), ("empty", "")]);
        assert_eq!(int_field(&f, "id"), Ok(42));
        assert_eq!(int_field(&f, "bad"), Err(FieldError::Invalid("4x2".into())));
        assert_eq!(int_field(&f, "empty"), Err(FieldError::Missing));
        assert_eq!(int_field(&f, "absent"), Err(FieldError::Missing));
    }

    #[test]
    fn test_int_field_rejects_decimals() {
        let f = form(&[("id", "10.5")]);
        assert_eq!(int_field(&f, "id"), Err(FieldError::Invalid("10.5".into())));
    }

    #[test]
    fn test_float_field() {
        let f = form(&[("p", "10.00"), ("neg", "-3"), ("nan", "NaN"), ("inf", "inf")]);
        assert_eq!(float_field(&f, "p"), Ok(10.0));
        assert_eq!(float_field(&f, "neg"), Ok(-3.0));
        assert!(matches!(float_field(&f, "nan"), Err(FieldError::Invalid(_))));
        assert!(matches!(float_field(&f, "inf"), Err(FieldError::Invalid(_))));
    }

    #[test]
    fn test_section_default_is_empty_rows() {
        let section = Section::default();
        assert!(section.rows().is_empty());
        assert!(!section.is_absent());
        assert!(Section::Absent(OptionalObject::PriceAuditTable).rows().is_empty());
    }
}
