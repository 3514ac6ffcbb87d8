//! CLI module for the dashboard
//!
//! Provides command-line interface for:
//! - serve: run the HTTP dashboard
//! - check: verify database connectivity

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
