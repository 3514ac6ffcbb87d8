//! CLI argument definitions using clap
//!
//! Commands:
//! - dashboard serve [--config <path>] [--host <host>] [--port <port>]
//! - dashboard check [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AdventureWorks reporting dashboard
#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the dashboard over HTTP
    Serve {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to, overriding configuration
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overriding configuration
        #[arg(long)]
        port: Option<u16>,
    },

    /// Open one database connection, run a trivial query and exit
    Check {
        /// Path to a JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
