//! aw-dashboard - server-rendered reports over the AdventureWorks schema
//!
//! Request flow: `http_server` routes → `pages` handlers (validate, check,
//! call stored logic, flash) → `render` HTML. `db` owns the per-request
//! connection, `translate` turns database errors into user-facing messages.

pub mod cli;
pub mod config;
pub mod db;
pub mod flash;
pub mod http_server;
pub mod pages;
pub mod render;
pub mod translate;
