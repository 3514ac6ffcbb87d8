//! End-to-end routing: form POST → 303 redirect with flash cookie → GET renders
//! the flash once and clears the cookie.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use aw_dashboard::db::catalog;
use aw_dashboard::db::fake::{FakeConnector, FakeResponse};
use aw_dashboard::db::{Connector, DbResult, ReportRow, ReportValue, Session};
use aw_dashboard::flash::FLASH_COOKIE;
use aw_dashboard::http_server::{build_router, AppState};

const SECRET: &str = "test-secret";

fn app(fake: &FakeConnector) -> Router {
    build_router(AppState::new(fake.connector(), SECRET))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Flash cookie from `Set-Cookie`, as a request `Cookie` value
fn cookie_from_response(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(FLASH_COOKIE) && !pair.ends_with('='))
        .map(str::to_string)
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_price_update_for_missing_product_round_trip() {
    let fake = FakeConnector::new();
    fake.respond(catalog::UPDATE_LIST_PRICE, FakeResponse::Affected(0));

    let response = app(&fake)
        .oneshot(post_form(
            "/warehouse",
            "form_name=update_price_form&product_id=999999&new_price=10.00",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/warehouse");
    let cookie = cookie_from_response(response.headers()).expect("flash cookie set");

    let response = app(&fake).oneshot(get("/warehouse", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cleared.contains("Max-Age=0"));

    let html = body_text(response).await;
    assert!(html.contains("Warning: Product ID 999999 was not found. No price was updated."));
    assert!(html.contains("flash warning"));

    assert_eq!(fake.opened(), 2);
    assert_eq!(fake.closed(), 2);
}

#[tokio::test]
async fn test_price_update_success_shows_audit_row() {
    let fake = FakeConnector::new();
    fake.respond(catalog::UPDATE_LIST_PRICE, FakeResponse::Affected(1))
        .respond(
            catalog::PRICE_AUDIT_TAIL,
            FakeResponse::Rows(vec![ReportRow::new()
                .with("ProductID", ReportValue::Int(707))
                .with("OldPrice", ReportValue::Text("34.9900".into()))
                .with("NewPrice", ReportValue::Text("39.9900".into()))]),
        );

    let response = app(&fake)
        .oneshot(post_form(
            "/warehouse",
            "form_name=update_price_form&product_id=707&new_price=39.99",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = cookie_from_response(response.headers()).expect("flash cookie set");

    let response = app(&fake).oneshot(get("/warehouse", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains(
        "<div class=\"flash success\">Successfully updated price for Product 707. Check audit log below!</div>"
    ));
    assert!(html.contains("<td>707</td><td>34.9900</td><td>39.9900</td>"));
    assert_eq!(fake.calls_to(catalog::PRICE_AUDIT_TAIL), 1);
}

struct PanickingConnector;

#[async_trait]
impl Connector for PanickingConnector {
    async fn connect(&self) -> DbResult<Box<dyn Session>> {
        panic!("connector blew up");
    }

    fn describe(&self) -> String {
        "panicking".to_string()
    }
}

#[tokio::test]
async fn test_handler_panic_returns_error_page() {
    let router = build_router(AppState::new(Arc::new(PanickingConnector), SECRET));

    let response = router.oneshot(get("/vendors", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Internal Server Error"));
    assert!(!html.contains("connector blew up"));
}

#[tokio::test]
async fn test_invalid_post_redirects_without_touching_database() {
    let fake = FakeConnector::new();

    let response = app(&fake)
        .oneshot(post_form("/vendors", "form_name=vendor_lead_time_form&vendor_id=abc"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/vendors");
    assert!(cookie_from_response(response.headers()).is_some());
    assert_eq!(fake.connect_attempts(), 0);
}

#[tokio::test]
async fn test_tampered_cookie_shows_nothing() {
    let fake = FakeConnector::new();
    let forged = format!(
        "dashboard_flash={}",
        aw_dashboard::flash::FlashCodec::new("wrong-secret")
            .encode(&[aw_dashboard::flash::Flash::error("forged")])
            .unwrap()
    );

    let response = app(&fake).oneshot(get("/", Some(&forged))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("forged"));
}

#[tokio::test]
async fn test_search_renders_results() {
    let fake = FakeConnector::new();
    fake.respond(
        "CALL sp_SearchProducts",
        FakeResponse::Rows(vec![ReportRow::new()
            .with("ProductID", ReportValue::Int(707))
            .with("Name", ReportValue::Text("Sport-100 Helmet, Red".into()))]),
    );

    let response = app(&fake)
        .oneshot(get("/search?search_term=Helmet", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Sport-100 Helmet, Red"));
    assert!(html.contains("value=\"Helmet\""));
}

#[tokio::test]
async fn test_home_page_does_not_open_a_connection() {
    let fake = FakeConnector::new();

    let response = app(&fake).oneshot(get("/", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(fake.connect_attempts(), 0);
}

#[tokio::test]
async fn test_health_check() {
    let fake = FakeConnector::unreachable();

    let response = app(&fake).oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(fake.connect_attempts(), 0);
}
