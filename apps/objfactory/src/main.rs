//! # objfactory
//!
//! The main binary for the objfactory construction engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/objfactory (THE BINARY)           │
//! │                                                      │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────┐  │
//! │  │    CLI      │   │ Demo catalog │   │  Config   │  │
//! │  │   (clap)    │   │  (registry)  │   │  (toml)   │  │
//! │  └──────┬──────┘   └──────┬───────┘   └─────┬─────┘  │
//! │         └─────────────────┼─────────────────┘        │
//! │                           ▼                          │
//! │                  ┌─────────────────┐                 │
//! │                  │ objfactory-core │                 │
//! │                  │   (THE ENGINE)  │                 │
//! │                  └─────────────────┘                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! objfactory --specs specs.toml keys
//! objfactory --specs specs.toml create geometry.Segment
//! objfactory create people.Person --arg string=Ada --arg int=36
//! objfactory --strategy specification check
//! ```

use clap::Parser;
use objfactory::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // OBJFACTORY_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("OBJFACTORY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "objfactory=info,objfactory_core=info".into());

    // Logs go to stderr so command output stays clean on stdout.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
