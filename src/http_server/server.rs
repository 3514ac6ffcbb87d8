//! # HTTP Server
//!
//! Combines the dashboard and health routers behind request tracing. A
//! panicking handler is answered with a generic 500 page.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};
use uuid::Uuid;

use super::config::HttpServerConfig;
use super::routes::{dashboard_routes, health_routes, AppState};
use crate::db::Connector;

/// HTTP server for the dashboard
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with the default listen address
    pub fn new(connector: Arc<dyn Connector>, secret_key: &str) -> Self {
        Self::with_config(HttpServerConfig::default(), connector, secret_key)
    }

    /// Create a server with a custom listen address
    pub fn with_config(config: HttpServerConfig, connector: Arc<dyn Connector>, secret_key: &str) -> Self {
        let router = build_router(AppState::new(connector, secret_key));
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid listen address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "dashboard listening");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Full application router: dashboard pages plus `/health`
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(dashboard_routes(state))
        .layer(CatchPanicLayer::custom(internal_error))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
}

const INTERNAL_ERROR_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\">\
<title>Internal Server Error</title></head><body><h1>Internal Server Error</h1>\
<p>Something went wrong while handling your request.</p><p><a href=\"/\">Back to the dashboard</a></p>\
</body></html>";

fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Html(INTERNAL_ERROR_PAGE)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::FakeConnector;

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(FakeConnector::new().connector(), "secret");
        assert_eq!(server.socket_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_config(config, FakeConnector::new().connector(), "secret");
        assert_eq!(server.socket_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_router_builds() {
        let server = HttpServer::new(FakeConnector::new().connector(), "secret");
        let _router = server.router();
    }

    #[test]
    fn test_panic_becomes_error_page() {
        let response = internal_error(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
