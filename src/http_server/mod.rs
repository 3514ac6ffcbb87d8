//! # Dashboard HTTP Server
//!
//! # Endpoints
//!
//! - `/` - Landing page
//! - `/vendors` - Vendor reports, lead time lookup
//! - `/warehouse` - Inventory reports, price update, stock lookup
//! - `/search` - Product search
//! - `/consumers` - Customer reports, delivery time lookup
//! - `/health` - Health check

pub mod config;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use routes::AppState;
pub use server::{build_router, HttpServer};
