//! # Stored-Logic Catalog
//!
//! Every statement the dashboard sends to the database. Business logic
//! (lead-time averages, search ranking, price auditing) lives in the stored
//! functions, procedures, triggers and views named here; this module only
//! binds parameters and picks the result field out of the row.

use super::errors::{DbError, DbResult};
use super::gateway::Session;
use super::value::{ReportRow, ReportValue, RowSet, SqlParam};

// ==================
// Stored objects
// ==================

pub const SP_SEARCH_PRODUCTS: &str = "sp_SearchProducts";

/// Optional view backing the live location report
pub const VW_PRODUCT_LOCATIONS: &str = "vw_ProductLocations";
/// Optional table filled by the list-price audit trigger
pub const PRODUCT_PRICE_AUDIT: &str = "product_price_audit";

// ==================
// Existence checks and lookups
// ==================

pub const VENDOR_EXISTS: &str =
    "SELECT COUNT(*) AS count FROM purchasing_vendor WHERE BusinessEntityID = ?";

pub const PRODUCT_EXISTS: &str =
    "SELECT COUNT(*) AS count FROM production_product WHERE ProductID = ?";

pub const AVG_VENDOR_LEAD_TIME: &str = "SELECT fn_GetAvgVendorLeadTime(?) AS lead_time";

pub const PRODUCT_STOCK: &str = "SELECT fn_GetProductStock(?) AS stock";

pub const AVG_PRODUCT_DELIVERY_TIME: &str =
    "SELECT fn_GetAvgProductDeliveryTime(?) AS delivery_time";

pub const UPDATE_LIST_PRICE: &str =
    "UPDATE production_product SET ListPrice = ? WHERE ProductID = ?";

// ==================
// Vendor reports
// ==================

pub const VENDOR_PERFORMANCE: &str = "\
SELECT v.Name AS VendorName, v.BusinessEntityID,
    COUNT(poh.PurchaseOrderID) AS TotalOrders,
    SUM(poh.TotalDue) AS TotalPurchaseValue
FROM purchasing_vendor AS v
LEFT JOIN purchasing_purchaseorderheader AS poh ON v.BusinessEntityID = poh.VendorID
GROUP BY v.BusinessEntityID, v.Name
ORDER BY TotalPurchaseValue DESC";

pub const PURCHASE_HISTORY: &str = "\
SELECT
    v.BusinessEntityID AS VendorID,
    v.Name AS VendorName,
    p.ProductID,
    p.Name AS ProductName,
    pod.UnitPrice AS LastPricePaid
FROM purchasing_purchaseorderdetail pod
JOIN production_product p ON pod.ProductID = p.ProductID
JOIN purchasing_purchaseorderheader poh ON pod.PurchaseOrderID = poh.PurchaseOrderID
JOIN purchasing_vendor v ON poh.VendorID = v.BusinessEntityID
GROUP BY v.BusinessEntityID, p.ProductID, v.Name, p.Name, pod.UnitPrice
ORDER BY VendorName, ProductName
LIMIT 100";

// ==================
// Warehouse reports
// ==================

pub const INVENTORY_VALUE_TOP20: &str = "\
SELECT p.ProductID, p.Name, p.ListPrice, p.StandardCost,
    COALESCE(SUM(pi.Quantity), 0) AS TotalStock,
    (p.StandardCost * COALESCE(SUM(pi.Quantity), 0)) AS TotalInventoryValue
FROM production_product AS p
LEFT JOIN production_productinventory AS pi ON p.ProductID = pi.ProductID
GROUP BY p.ProductID, p.Name, p.ListPrice, p.StandardCost
ORDER BY TotalInventoryValue DESC LIMIT 20";

/// Location 1 is the main warehouse
pub const MAIN_WAREHOUSE_STOCK: &str = "\
SELECT p.ProductID, p.Name, pi.Quantity, p.ListPrice
FROM production_productinventory pi
JOIN production_product p ON pi.ProductID = p.ProductID
WHERE pi.LocationID = 1 AND pi.Quantity > 0
ORDER BY p.Name";

pub const UNSOLD_PRODUCTS: &str = "\
SELECT ProductID, Name, ListPrice, StandardCost
FROM production_product
WHERE ProductID NOT IN (SELECT DISTINCT ProductID FROM sales_salesorderdetail)";

pub const PRODUCT_LOCATIONS: &str =
    "SELECT * FROM vw_ProductLocations ORDER BY ProductName, LocationName";

pub const PRICE_AUDIT_TAIL: &str =
    "SELECT * FROM product_price_audit ORDER BY ChangedAt DESC LIMIT 5";

// ==================
// Consumer reports
// ==================

pub const TOP_CUSTOMERS: &str = "\
WITH CustomerSpending AS (
    SELECT c.CustomerID, p.FirstName, p.LastName,
        SUM(soh.TotalDue) AS TotalSpending
    FROM sales_customer AS c
    JOIN person_person AS p ON c.PersonID = p.BusinessEntityID
    JOIN sales_salesorderheader AS soh ON c.CustomerID = soh.CustomerID
    GROUP BY c.CustomerID, p.FirstName, p.LastName
)
SELECT
    RANK() OVER (ORDER BY TotalSpending DESC) AS CustomerRank,
    FirstName, LastName, TotalSpending
FROM CustomerSpending
ORDER BY CustomerRank ASC LIMIT 10";

/// Status 5 is "shipped"
pub const AVG_SHIPPING_LEAD_TIME: &str = "\
SELECT AVG(DATEDIFF(ShipDate, OrderDate)) AS AvgLeadTime
FROM sales_salesorderheader
WHERE ShipDate IS NOT NULL AND Status = 5";

pub const SALES_HISTORY: &str = "\
SELECT
    c.CustomerID,
    p.FirstName,
    p.LastName,
    prod.ProductID,
    prod.Name AS ProductName
FROM sales_salesorderdetail sod
JOIN sales_salesorderheader soh ON sod.SalesOrderID = soh.SalesOrderID
JOIN sales_customer c ON soh.CustomerID = c.CustomerID
JOIN person_person p ON c.PersonID = p.BusinessEntityID
JOIN production_product prod ON sod.ProductID = prod.ProductID
GROUP BY c.CustomerID, p.FirstName, p.LastName, prod.ProductID, prod.Name
ORDER BY p.LastName, prod.Name
LIMIT 100";

// ==================
// Calls
// ==================

async fn exists(session: &mut dyn Session, sql: &str, id: i64) -> DbResult<bool> {
    let row = session.fetch_optional(sql, &[SqlParam::Int(id)]).await?;
    let count = row
        .as_ref()
        .and_then(|r| r.get("count"))
        .and_then(ReportValue::as_i64)
        .ok_or_else(|| DbError::Driver("existence check returned no count".to_string()))?;
    Ok(count > 0)
}

async fn scalar(session: &mut dyn Session, sql: &str, id: i64, column: &str) -> DbResult<ReportValue> {
    let row = session.fetch_optional(sql, &[SqlParam::Int(id)]).await?;
    Ok(row
        .and_then(|r| r.get(column).cloned())
        .unwrap_or(ReportValue::Null))
}

pub async fn vendor_exists(session: &mut dyn Session, vendor_id: i64) -> DbResult<bool> {
    exists(session, VENDOR_EXISTS, vendor_id).await
}

pub async fn product_exists(session: &mut dyn Session, product_id: i64) -> DbResult<bool> {
    exists(session, PRODUCT_EXISTS, product_id).await
}

/// `fn_GetAvgVendorLeadTime(vendor_id)`, in days
pub async fn avg_vendor_lead_time(session: &mut dyn Session, vendor_id: i64) -> DbResult<ReportValue> {
    scalar(session, AVG_VENDOR_LEAD_TIME, vendor_id, "lead_time").await
}

/// `fn_GetProductStock(product_id)`, in units across all locations
pub async fn product_stock(session: &mut dyn Session, product_id: i64) -> DbResult<ReportValue> {
    scalar(session, PRODUCT_STOCK, product_id, "stock").await
}

/// `fn_GetAvgProductDeliveryTime(product_id)`, in days
pub async fn avg_product_delivery_time(
    session: &mut dyn Session,
    product_id: i64,
) -> DbResult<ReportValue> {
    scalar(session, AVG_PRODUCT_DELIVERY_TIME, product_id, "delivery_time").await
}

/// Set a product's list price. Returns the affected row count; the audit
/// trigger rejects invalid prices with a signaled error.
pub async fn update_list_price(
    session: &mut dyn Session,
    product_id: i64,
    new_price: f64,
) -> DbResult<u64> {
    session
        .execute(
            UPDATE_LIST_PRICE,
            &[SqlParam::Float(new_price), SqlParam::Int(product_id)],
        )
        .await
}

/// `CALL sp_SearchProducts(term)`; rows come back in the procedure's order
pub async fn search_products(session: &mut dyn Session, term: &str) -> DbResult<RowSet> {
    session
        .call_procedure(SP_SEARCH_PRODUCTS, &[SqlParam::Text(term.to_string())])
        .await
}

/// Run a parameterless report query
pub async fn report(session: &mut dyn Session, sql: &str) -> DbResult<RowSet> {
    session.fetch_all(sql, &[]).await
}

/// Run a parameterless single-row report query
pub async fn report_row(session: &mut dyn Session, sql: &str) -> DbResult<Option<ReportRow>> {
    session.fetch_optional(sql, &[]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::{FakeConnector, FakeResponse};
    use crate::db::gateway::Connector;

    #[tokio::test]
    async fn test_exists_reads_count_column() {
        let fake = FakeConnector::new();
        fake.respond_with(PRODUCT_EXISTS, |params| {
            FakeResponse::count(if params.first() == Some(&SqlParam::Int(707)) { 1 } else { 0 })
        });
        let mut session = fake.connect().await.unwrap();

        assert!(product_exists(session.as_mut(), 707).await.unwrap());
        assert!(!product_exists(session.as_mut(), 999999).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_binds_price_then_id() {
        let fake = FakeConnector::new();
        fake.respond(UPDATE_LIST_PRICE, FakeResponse::Affected(1));
        let mut session = fake.connect().await.unwrap();

        let affected = update_list_price(session.as_mut(), 707, 34.99).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(
            fake.calls()[0].params,
            vec![SqlParam::Float(34.99), SqlParam::Int(707)]
        );
    }

    #[tokio::test]
    async fn test_scalar_missing_row_is_null() {
        let fake = FakeConnector::new();
        let mut session = fake.connect().await.unwrap();
        let value = product_stock(session.as_mut(), 1).await.unwrap();
        assert!(value.is_null());
    }
}
