//! # Warehouse Page
//!
//! Inventory reports, the list-price update form and the stock lookup
//! (`fn_GetProductStock`). Price updates go straight to the UPDATE; the
//! audit trigger on `production_product` rejects invalid prices and writes
//! the audit rows shown at the bottom of the page.

use tracing::{debug, info};

use super::{
    float_field, form_name, int_field, FieldError, FormValues, PageOutcome, Section, NO_DATABASE,
};
use crate::db::{catalog, DbResult, ReportValue, RequestDb, Session};
use crate::flash::FlashQueue;
use crate::translate::{classify_load_error, flash_for, OptionalObject};

pub const PATH: &str = "/warehouse";
pub const UPDATE_PRICE_FORM: &str = "update_price_form";
pub const GET_STOCK_FORM: &str = "get_stock_form";

/// Render data; field names are the template keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarehouseView {
    pub inventory_value_data: Section,
    pub main_warehouse_stock: Section,
    pub unsold_products_data: Section,
    pub locations_data: Section,
    pub audit_log_data: Section,
}

/// Handle a POST to the warehouse page
pub async fn submit(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) -> PageOutcome {
    match form_name(form) {
        Some(UPDATE_PRICE_FORM) => update_price(db, form, flashes).await,
        Some(GET_STOCK_FORM) => stock(db, form, flashes).await,
        other => debug!(form = ?other, "ignoring unknown warehouse form"),
    }
    PageOutcome::Redirect(PATH)
}

async fn update_price(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) {
    let (product_id, new_price) = match (int_field(form, "product_id"), float_field(form, "new_price")) {
        (Ok(id), Ok(price)) => (id, price),
        (Err(FieldError::Missing), _) | (_, Err(FieldError::Missing)) => {
            return flashes.error("Please enter both Product ID and New Price.")
        }
        _ => {
            return flashes.error(
                "Invalid input: Product ID must be an integer and Price must be a number.",
            )
        }
    };

    let Some(session) = db.acquire().await else {
        return flashes.error(NO_DATABASE);
    };

    match catalog::update_list_price(session, product_id, new_price).await {
        Ok(0) => flashes.warning(format!(
            "Warning: Product ID {} was not found. No price was updated.",
            product_id
        )),
        Ok(_) => {
            info!(product_id, new_price, "list price updated");
            flashes.success(format!(
                "Successfully updated price for Product {}. Check audit log below!",
                product_id
            ))
        }
        Err(err) => flashes.push(flash_for(&err)),
    }
}

async fn stock(db: &mut RequestDb, form: &FormValues, flashes: &mut FlashQueue) {
    let product_id = match int_field(form, "product_id_stock") {
        Ok(id) => id,
        Err(FieldError::Missing) => return flashes.error("Please enter a Product ID."),
        Err(FieldError::Invalid(raw)) => {
            return flashes.error(format!("Invalid Product ID: '{}' is not a number.", raw))
        }
    };

    let Some(session) = db.acquire().await else {
        return flashes.error(NO_DATABASE);
    };

    match checked_stock(session, product_id).await {
        Ok(Some(stock)) => flashes.success(format!(
            "Current stock for Product {}: {} units",
            product_id, stock
        )),
        Ok(None) => flashes.error(format!("Error: Product ID {} does not exist.", product_id)),
        Err(err) => flashes.push(flash_for(&err)),
    }
}

async fn checked_stock(session: &mut dyn Session, product_id: i64) -> DbResult<Option<ReportValue>> {
    if !catalog::product_exists(session, product_id).await? {
        return Ok(None);
    }
    catalog::product_stock(session, product_id).await.map(Some)
}

/// Load the warehouse reports and the audit log tail
pub async fn load(db: &mut RequestDb, flashes: &mut FlashQueue) -> WarehouseView {
    let mut view = WarehouseView::default();
    let Some(session) = db.acquire().await else {
        flashes.error(NO_DATABASE);
        return view;
    };

    if let Err(err) = fill(session, &mut view).await {
        let failure = classify_load_error(&err, "Error loading warehouse data", &OptionalObject::ALL);
        match failure.missing {
            Some(object @ OptionalObject::ProductLocationsView) => {
                view.locations_data = Section::Absent(object)
            }
            Some(object @ OptionalObject::PriceAuditTable) => {
                view.audit_log_data = Section::Absent(object)
            }
            None => {}
        }
        flashes.push(failure.flash);
    }
    view
}

async fn fill(session: &mut dyn Session, view: &mut WarehouseView) -> DbResult<()> {
    view.inventory_value_data =
        Section::Rows(catalog::report(session, catalog::INVENTORY_VALUE_TOP20).await?);
    view.main_warehouse_stock =
        Section::Rows(catalog::report(session, catalog::MAIN_WAREHOUSE_STOCK).await?);
    view.unsold_products_data =
        Section::Rows(catalog::report(session, catalog::UNSOLD_PRODUCTS).await?);
    view.locations_data = Section::Rows(catalog::report(session, catalog::PRODUCT_LOCATIONS).await?);
    view.audit_log_data = Section::Rows(catalog::report(session, catalog::PRICE_AUDIT_TAIL).await?);
    Ok(())
}
