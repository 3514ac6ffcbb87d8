//! Dashboard HTTP Routes
//!
//! Thin adapters between axum and the page handlers. Each adapter seeds the
//! flash queue from the cookie, opens a request-scoped `RequestDb`, runs the
//! handler, releases the connection, and turns the `PageOutcome` into a
//! redirect or an HTML response.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::{Connector, RequestDb};
use crate::flash::{FlashCodec, FlashQueue};
use crate::pages::{consumers, search, vendors, warehouse, FormValues, Page, PageOutcome};
use crate::render::render_page;

// ==================
// Shared State
// ==================

/// State shared across handlers; nothing request-specific lives here
#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn Connector>,
    pub flash: FlashCodec,
}

impl AppState {
    pub fn new(connector: Arc<dyn Connector>, secret_key: &str) -> Self {
        Self {
            connector,
            flash: FlashCodec::new(secret_key),
        }
    }

    fn request_db(&self) -> RequestDb {
        RequestDb::new(Arc::clone(&self.connector))
    }
}

// ==================
// Routes
// ==================

/// Create the dashboard routes
pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route(vendors::PATH, get(vendors_page).post(vendors_submit))
        .route(warehouse::PATH, get(warehouse_page).post(warehouse_submit))
        .route(search::PATH, get(search_page))
        .route(consumers::PATH, get(consumers_page).post(consumers_submit))
        .with_state(state)
}

/// Health check route; does not touch the database
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

// ==================
// Response Helpers
// ==================

fn respond(state: &AppState, outcome: PageOutcome, mut flashes: FlashQueue) -> Response {
    match outcome {
        PageOutcome::Redirect(path) => {
            let mut response = Redirect::to(path).into_response();
            if let Some(cookie) = state.flash.store_cookie(&flashes) {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            response
        }
        PageOutcome::Render(page) => {
            let messages = flashes.take();
            let mut response = Html(render_page(&page, &messages)).into_response();
            if let Some(cookie) = state.flash.store_cookie(&flashes) {
                response.headers_mut().insert(SET_COOKIE, cookie);
            }
            response
        }
    }
}

// ==================
// Page Handlers
// ==================

async fn home_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let flashes = state.flash.read(&headers);
    respond(&state, PageOutcome::Render(Page::Home), flashes)
}

async fn vendors_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut flashes = state.flash.read(&headers);
    let mut db = state.request_db();
    let view = vendors::load(&mut db, &mut flashes).await;
    db.release().await;
    respond(&state, PageOutcome::Render(Page::Vendors(view)), flashes)
}

async fn vendors_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FormValues>,
) -> Response {
    let mut flashes = state.flash.read(&headers);
    let mut db = state.request_db();
    let outcome = vendors::submit(&mut db, &form, &mut flashes).await;
    db.release().await;
    respond(&state, outcome, flashes)
}

async fn warehouse_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut flashes = state.flash.read(&headers);
    let mut db = state.request_db();
    let view = warehouse::load(&mut db, &mut flashes).await;
    db.release().await;
    respond(&state, PageOutcome::Render(Page::Warehouse(view)), flashes)
}

async fn warehouse_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FormValues>,
) -> Response {
    let mut flashes = state.flash.read(&headers);
    let mut db = state.request_db();
    let outcome = warehouse::submit(&mut db, &form, &mut flashes).await;
    db.release().await;
    respond(&state, outcome, flashes)
}

async fn search_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut flashes = state.flash.read(&headers);
    let term = params.get("search_term").map(String::as_str).unwrap_or("");
    let mut db = state.request_db();
    let outcome = search::run(&mut db, term, &mut flashes).await;
    db.release().await;
    respond(&state, outcome, flashes)
}

async fn consumers_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut flashes = state.flash.read(&headers);
    let mut db = state.request_db();
    let view = consumers::load(&mut db, &mut flashes).await;
    db.release().await;
    respond(&state, PageOutcome::Render(Page::Consumers(view)), flashes)
}

async fn consumers_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FormValues>,
) -> Response {
    let mut flashes = state.flash.read(&headers);
    let mut db = state.request_db();
    let outcome = consumers::submit(&mut db, &form, &mut flashes).await;
    db.release().await;
    respond(&state, outcome, flashes)
}
