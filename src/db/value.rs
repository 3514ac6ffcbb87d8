//! # Report Values
//!
//! Query parameters and the rows handed, unmodified, to the render step.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// A bound query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

/// A single column value as returned by the database
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl ReportValue {
    /// Integer view of the value, for counts and ids
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ReportValue::Int(v) => Some(*v),
            ReportValue::UInt(v) => i64::try_from(*v).ok(),
            ReportValue::Decimal(d) => d.trunc().to_i64(),
            ReportValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ReportValue::Null)
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Null => write!(f, "None"),
            ReportValue::Int(v) => write!(f, "{}", v),
            ReportValue::UInt(v) => write!(f, "{}", v),
            ReportValue::Float(v) => write!(f, "{}", v),
            ReportValue::Decimal(v) => write!(f, "{}", v),
            ReportValue::Text(v) => write!(f, "{}", v),
            ReportValue::Date(v) => write!(f, "{}", v),
            ReportValue::Time(v) => write!(f, "{}", v),
            ReportValue::DateTime(v) => write!(f, "{}", v),
        }
    }
}

/// One result row: column names in select order, each with its value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportRow {
    columns: Vec<(String, ReportValue)>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style)
    pub fn with(mut self, name: impl Into<String>, value: ReportValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: ReportValue) {
        self.columns.push((name.into(), value));
    }

    /// Value of the named column
    pub fn get(&self, name: &str) -> Option<&ReportValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Column names in select order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &ReportValue> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Ordered rows of one query
pub type RowSet = Vec<ReportRow>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_row_keeps_select_order() {
        let row = ReportRow::new()
            .with("VendorName", ReportValue::Text("Acme".into()))
            .with("TotalOrders", ReportValue::Int(4));

        let names: Vec<_> = row.column_names().collect();
        assert_eq!(names, vec!["VendorName", "TotalOrders"]);
        assert_eq!(row.get("TotalOrders"), Some(&ReportValue::Int(4)));
        assert_eq!(row.get("Missing"), None);
    }

    #[test]
    fn test_decimal_display_keeps_scale() {
        let value = ReportValue::Decimal(Decimal::from_str("15.2500").unwrap());
        assert_eq!(value.to_string(), "15.2500");
    }

    #[test]
    fn test_count_conversions() {
        assert_eq!(ReportValue::Int(3).as_i64(), Some(3));
        assert_eq!(ReportValue::UInt(0).as_i64(), Some(0));
        assert_eq!(ReportValue::Null.as_i64(), None);
    }

    #[test]
    fn test_decimal_count_truncates() {
        let value = ReportValue::Decimal(Decimal::from_str("42.9000").unwrap());
        assert_eq!(value.as_i64(), Some(42));
        let huge = ReportValue::Decimal(Decimal::from_str("99999999999999999999999").unwrap());
        assert_eq!(huge.as_i64(), None);
    }
}
