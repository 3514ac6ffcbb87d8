//! # Consumers Page
//!
//! Top customers, average shipping lead time and sales history, plus the
//! average delivery time lookup (`fn_GetAvgProductDeliveryTime`).

use tracing::debug;

use super::{form_name, int_field, FieldError, FormValues, PageOutcome, Section, NO_DATABASE};
use crate::db::{catalog, DbResult, ReportRow, ReportValue, RequestDb, Session};
use crate::flash::FlashQueue;
use crate::translate::{classify_load_error, flash_for};

pub const PATH: &str = "/consumers";
pub const DELIVERY_FORM: &str = "product_delivery_form";

/// Render data; field names are the template keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumersView {
    pub top_customers_data: Section,
    /// Single `AvgLeadTime` row; `None` when not fetched
    pub avg_shipping_data: Option<ReportRow>,
    pub sales_history_data: Section,
}

/// Handle a POST to the consumers page
pub async fn submit(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) -> PageOutcome {
    match form_name(form) {
        Some(DELIVERY_FORM) => delivery_time(db, form, flashes).await,
        other => debug!(form = ?other, "ignoring unknown consumers form"),
    }
    PageOutcome::Redirect(PATH)
}

async fn delivery_time(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) {
    let product_id = match int_field(form, "product_id_delivery") {
        Ok(id) => id,
        Err(FieldError::Missing) => return flashes.error("Please enter a Product ID."),
        Err(FieldError::Invalid(raw)) => {
            return flashes.error(format!("Invalid Product ID: '{}' is not a number.", raw))
        }
    };

    let Some(session) = db.acquire().await else {
        return flashes.error(NO_DATABASE);
    };

    match checked_delivery_time(session, product_id).await {
        Ok(Some(days)) => flashes.success(format!(
            "Average delivery time for Product {}: {} days",
            product_id, days
        )),
        Ok(None) => flashes.error(format!("Error: Product ID {} does not exist.", product_id)),
        Err(err) => flashes.push(flash_for(&err)),
    }
}

async fn checked_delivery_time(
    session: &mut dyn Session,
    product_id: i64,
) -> DbResult<Option<ReportValue>> {
    if !catalog::product_exists(session, product_id).await? {
        return Ok(None);
    }
    catalog::avg_product_delivery_time(session, product_id)
        .await
        .map(Some)
}

/// Load the consumers page reports
pub async fn load(db: &mut RequestDb, flashes: &mut FlashQueue) -> ConsumersView {
    let mut view = ConsumersView::default();
    let Some(session) = db.acquire().await else {
        flashes.error(NO_DATABASE);
        return view;
    };

    if let Err(err) = fill(session, &mut view).await {
        flashes.push(classify_load_error(&err, "Error loading consumer data", &[]).flash);
    }
    view
}

async fn fill(session: &mut dyn Session, view: &mut ConsumersView) -> DbResult<()> {
    view.top_customers_data = Section::Rows(catalog::report(session, catalog::TOP_CUSTOMERS).await?);
    view.avg_shipping_data = catalog::report_row(session, catalog::AVG_SHIPPING_LEAD_TIME).await?;
    view.sales_history_data = Section::Rows(catalog::report(session, catalog::SALES_HISTORY).await?);
    Ok(())
}
