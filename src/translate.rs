//! # Error Translator
//!
//! Turns database errors into flash messages. Signaled errors (raised by a
//! trigger or stored routine with SQLSTATE 45000) are business-rule
//! rejections and are shown verbatim; everything else is reported as an
//! unexpected database error with the raw driver text.

use tracing::warn;

use crate::db::catalog::{PRODUCT_PRICE_AUDIT, VW_PRODUCT_LOCATIONS};
use crate::db::DbError;
use crate::flash::Flash;

/// Flash for a failed form submission
pub fn flash_for(err: &DbError) -> Flash {
    warn!(code = ?err.code(), error = %err, "database error during form submission");
    if err.is_signal() {
        Flash::error(format!("Error: {}", err.message()))
    } else {
        Flash::error(format!("An unexpected database error occurred: {}", err))
    }
}

/// Report sections that may legitimately be missing until their setup SQL runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionalObject {
    ProductLocationsView,
    PriceAuditTable,
}

impl OptionalObject {
    pub const ALL: [OptionalObject; 2] = [
        OptionalObject::ProductLocationsView,
        OptionalObject::PriceAuditTable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OptionalObject::ProductLocationsView => VW_PRODUCT_LOCATIONS,
            OptionalObject::PriceAuditTable => PRODUCT_PRICE_AUDIT,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OptionalObject::ProductLocationsView => "view",
            OptionalObject::PriceAuditTable => "table",
        }
    }

    /// Notice shown in place of the section
    pub fn setup_notice(&self) -> String {
        format!(
            "Error: The {} '{}' does not exist. Please create it using the provided SQL.",
            self.kind(),
            self.name()
        )
    }
}

/// Outcome of a failed page load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub flash: Flash,
    /// Section to mark absent, if the error named an optional object
    pub missing: Option<OptionalObject>,
}

/// Classify an error raised while loading a page's reports.
///
/// `context` prefixes generic messages (e.g. "Error loading warehouse data").
/// Only pages that render optional objects pass `optional`; other pages treat
/// every missing table as a generic failure.
pub fn classify_load_error(
    err: &DbError,
    context: &str,
    optional: &[OptionalObject],
) -> LoadFailure {
    warn!(code = ?err.code(), error = %err, "database error while loading page data");

    if err.is_missing_table() && !optional.is_empty() {
        if let Some(object) = optional.iter().find(|o| err.is_missing_object(o.name())) {
            return LoadFailure {
                flash: Flash::error(object.setup_notice()),
                missing: Some(*object),
            };
        }
        return LoadFailure {
            flash: Flash::error(format!("{}: A table is missing ({})", context, err)),
            missing: None,
        };
    }

    LoadFailure {
        flash: Flash::error(format!("{}: {}", context, err)),
        missing: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::FlashLevel;

    #[test]
    fn test_signal_message_is_verbatim() {
        let flash = flash_for(&DbError::signal("List price cannot be negative."));
        assert_eq!(flash.level, FlashLevel::Error);
        assert_eq!(flash.text, "Error: List price cannot be negative.");
    }

    #[test]
    fn test_other_errors_are_generic() {
        let err = DbError::server(1054, "42S22", "Unknown column 'ListPrice' in 'field list'");
        let flash = flash_for(&err);
        assert_eq!(
            flash.text,
            "An unexpected database error occurred: 1054 (42S22): Unknown column 'ListPrice' in 'field list'"
        );
    }

    #[test]
    fn test_missing_optional_view_marks_section() {
        let err = DbError::no_such_table("adventureworks", "vw_ProductLocations");
        let failure = classify_load_error(&err, "Error loading warehouse data", &OptionalObject::ALL);
        assert_eq!(failure.missing, Some(OptionalObject::ProductLocationsView));
        assert_eq!(
            failure.flash.text,
            "Error: The view 'vw_ProductLocations' does not exist. Please create it using the provided SQL."
        );
    }

    #[test]
    fn test_missing_unknown_table_is_generic() {
        let err = DbError::no_such_table("adventureworks", "sales_customer");
        let failure = classify_load_error(&err, "Error loading warehouse data", &OptionalObject::ALL);
        assert_eq!(failure.missing, None);
        assert!(failure
            .flash
            .text
            .starts_with("Error loading warehouse data: A table is missing (1146"));
    }

    #[test]
    fn test_pages_without_optional_sections() {
        let err = DbError::no_such_table("adventureworks", "product_price_audit");
        let failure = classify_load_error(&err, "Error loading consumer data", &[]);
        assert_eq!(failure.missing, None);
        assert_eq!(
            failure.flash.text,
            format!("Error loading consumer data: {}", err)
        );
    }
}
