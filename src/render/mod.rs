//! # Rendering
//!
//! Turns a handled page into HTML. Every section gets the rows the handler
//! fetched, unmodified; the only per-page logic here is layout.

pub mod html;

use html::{escape, form, layout, section, table, Field};

use crate::flash::Flash;
use crate::pages::consumers::{self, ConsumersView};
use crate::pages::search::{self, SearchView};
use crate::pages::vendors::{self, VendorsView};
use crate::pages::warehouse::{self, WarehouseView};
use crate::pages::Page;

/// Render a page with the flashes due for this response
pub fn render_page(page: &Page, flashes: &[Flash]) -> String {
    match page {
        Page::Home => layout("AdventureWorks Dashboard", flashes, &home()),
        Page::Vendors(view) => layout("Vendors", flashes, &vendors_body(view)),
        Page::Warehouse(view) => layout("Warehouse", flashes, &warehouse_body(view)),
        Page::Search(view) => layout("Product Search", flashes, &search_body(view)),
        Page::Consumers(view) => layout("Consumers", flashes, &consumers_body(view)),
    }
}

fn home() -> String {
    format!(
        "<p>Reports over vendors, inventory and sales.</p><ul>\
<li><a href=\"{}\">Vendors</a>: purchasing performance and lead times</li>\
<li><a href=\"{}\">Warehouse</a>: inventory value, stock, price updates</li>\
<li><a href=\"{}\">Consumers</a>: top customers, shipping and delivery times</li>\
<li><a href=\"{}\">Search</a>: find products by name</li></ul>",
        vendors::PATH,
        warehouse::PATH,
        consumers::PATH,
        search::PATH
    )
}

fn vendors_body(view: &VendorsView) -> String {
    let mut body = form(
        vendors::PATH,
        vendors::LEAD_TIME_FORM,
        "Average Vendor Lead Time",
        &[Field {
            name: "vendor_id",
            label: "Vendor ID",
            input_type: "text",
        }],
        "Get Lead Time",
    );
    body.push_str(&section("Vendor Performance", &view.vendor_data));
    body.push_str(&section("Product Purchase History (Top 100)", &view.purchase_history_data));
    body
}

fn warehouse_body(view: &WarehouseView) -> String {
    let mut body = form(
        warehouse::PATH,
        warehouse::UPDATE_PRICE_FORM,
        "Update List Price",
        &[
            Field {
                name: "product_id",
                label: "Product ID",
                input_type: "text",
            },
            Field {
                name: "new_price",
                label: "New Price",
                input_type: "text",
            },
        ],
        "Update Price",
    );
    body.push_str(&form(
        warehouse::PATH,
        warehouse::GET_STOCK_FORM,
        "Product Stock",
        &[Field {
            name: "product_id_stock",
            label: "Product ID",
            input_type: "text",
        }],
        "Get Stock",
    ));
    body.push_str(&section("Price Audit Log (Latest 5)", &view.audit_log_data));
    body.push_str(&section("Top 20 Products by Inventory Value", &view.inventory_value_data));
    body.push_str(&section("Main Warehouse Stock", &view.main_warehouse_stock));
    body.push_str(&section("Products Never Sold", &view.unsold_products_data));
    body.push_str(&section("Live Inventory Locations", &view.locations_data));
    body
}

fn search_body(view: &SearchView) -> String {
    let mut body = format!(
        "<form method=\"get\" action=\"{}\"><input type=\"text\" name=\"search_term\" value=\"{}\">\
<button type=\"submit\">Search</button></form>",
        search::PATH,
        escape(&view.search_term)
    );
    if !view.search_term.is_empty() {
        body.push_str(&format!(
            "<h2>Results for &quot;{}&quot;</h2>{}",
            escape(&view.search_term),
            table(&view.results)
        ));
    }
    body
}

fn consumers_body(view: &ConsumersView) -> String {
    let mut body = form(
        consumers::PATH,
        consumers::DELIVERY_FORM,
        "Average Product Delivery Time",
        &[Field {
            name: "product_id_delivery",
            label: "Product ID",
            input_type: "text",
        }],
        "Get Delivery Time",
    );

    let avg = view
        .avg_shipping_data
        .as_ref()
        .and_then(|row| row.get("AvgLeadTime"))
        .filter(|value| !value.is_null())
        .map(|value| format!("{} days", html::cell(value)))
        .unwrap_or_else(|| "N/A".to_string());
    body.push_str(&format!(
        "<section><h2>Average Shipping Lead Time</h2><p class=\"metric\">{}</p></section>",
        avg
    ));
    body.push_str(&section("Top 10 Customers by Spending", &view.top_customers_data));
    body.push_str(&section("Sales History (Top 100)", &view.sales_history_data));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ReportRow, ReportValue};
    use crate::pages::Section;
    use crate::translate::OptionalObject;

    #[test]
    fn test_home_has_navigation() {
        let html = render_page(&Page::Home, &[]);
        assert!(html.contains("href=\"/warehouse\""));
        assert!(html.contains("href=\"/search\""));
    }

    #[test]
    fn test_warehouse_marks_absent_view() {
        let view = WarehouseView {
            locations_data: Section::Absent(OptionalObject::ProductLocationsView),
            ..Default::default()
        };
        let html = render_page(&Page::Warehouse(view), &[]);
        assert!(html.contains("vw_ProductLocations"));
        assert!(html.contains("name=\"form_name\" value=\"update_price_form\""));
        assert!(html.contains("name=\"form_name\" value=\"get_stock_form\""));
    }

    #[test]
    fn test_consumers_average_lead_time() {
        let view = ConsumersView {
            avg_shipping_data: Some(
                ReportRow::new().with("AvgLeadTime", ReportValue::Text("7.0000".into())),
            ),
            ..Default::default()
        };
        let html = render_page(&Page::Consumers(view), &[]);
        assert!(html.contains("7.0000 days"));

        let html = render_page(&Page::Consumers(ConsumersView::default()), &[]);
        assert!(html.contains("N/A"));
    }

    #[test]
    fn test_search_echoes_escaped_term() {
        let view = SearchView {
            search_term: "<bike>".into(),
            results: vec![],
        };
        let html = render_page(&Page::Search(view), &[]);
        assert!(html.contains("value=\"&lt;bike&gt;\""));
        assert!(!html.contains("<bike>"));
    }
}
