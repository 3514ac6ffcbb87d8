//! # Vendors Page
//!
//! Vendor performance and purchase history, plus the average lead time
//! lookup (`fn_GetAvgVendorLeadTime`).

use tracing::debug;

use super::{form_name, int_field, FieldError, FormValues, PageOutcome, Section, NO_DATABASE};
use crate::db::{catalog, DbResult, ReportValue, RequestDb, Session};
use crate::flash::FlashQueue;
use crate::translate::{classify_load_error, flash_for};

pub const PATH: &str = "/vendors";
pub const LEAD_TIME_FORM: &str = "vendor_lead_time_form";

/// Render data; field names are the template keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorsView {
    pub vendor_data: Section,
    pub purchase_history_data: Section,
}

/// Handle a POST to the vendors page
pub async fn submit(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) -> PageOutcome {
    match form_name(form) {
        Some(LEAD_TIME_FORM) => lead_time(db, form, flashes).await,
        other => debug!(form = ?other, "ignoring unknown vendors form"),
    }
    PageOutcome::Redirect(PATH)
}

async fn lead_time(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) {
    let vendor_id = match int_field(form, "vendor_id") {
        Ok(id) => id,
        Err(FieldError::Missing) => return flashes.error("Please enter a Vendor ID."),
        Err(FieldError::Invalid(raw)) => {
            return flashes.error(format!("Invalid Vendor ID: '{}' is not a number.", raw))
        }
    };

    let Some(session) = db.acquire().await else {
        return flashes.error(NO_DATABASE);
    };

    match checked_lead_time(session, vendor_id).await {
        Ok(Some(lead_time)) => flashes.success(format!(
            "Average lead time for Vendor {}: {} days",
            vendor_id, lead_time
        )),
        Ok(None) => flashes.error(format!("Error: Vendor ID {} does not exist.", vendor_id)),
        Err(err) => flashes.push(flash_for(&err)),
    }
}

async fn checked_lead_time(session: &mut dyn Session, vendor_id: i64) -> DbResult<Option<ReportValue>> {
    if !catalog::vendor_exists(session, vendor_id).await? {
        return Ok(None);
    }
    catalog::avg_vendor_lead_time(session, vendor_id).await.map(Some)
}

/// Load the vendors page reports
pub async fn load(db: &mut RequestDb, flashes: &mut FlashQueue) -> VendorsView {
    let mut view = VendorsView::default();
    let Some(session) = db.acquire().await else {
        flashes.error(NO_DATABASE);
        return view;
    };

    if let Err(err) = fill(session, &mut view).await {
        flashes.push(classify_load_error(&err, "Error loading page data", &[]).flash);
    }
    view
}

async fn fill(session: &mut dyn Session, view: &mut VendorsView) -> DbResult<()> {
    view.vendor_data = Section::Rows(catalog::report(session, catalog::VENDOR_PERFORMANCE).await?);
    view.purchase_history_data =
        Section::Rows(catalog::report(session, catalog::PURCHASE_HISTORY).await?);
    Ok(())
}
