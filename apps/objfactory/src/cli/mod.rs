//! # objfactory CLI Module
//!
//! This module implements the CLI interface for objfactory.
//!
//! ## Available Commands
//!
//! - `create` - Build an object by key and print it
//! - `show` - Print a stored specification
//! - `keys` - List the stored specifications
//! - `check` - Build every stored specification and report failures
//! - `types` - List the registered classes and code bundles

mod commands;

use crate::catalog;
use crate::config::{AppConfig, STRATEGY_ENV, Settings};
use clap::{Parser, Subcommand};
use objfactory_core::{ConfigStore, FactoryError, ObjectFactory, StoreError};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

/// Everything a CLI run can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    /// The config file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The specification file was rejected.
    #[error("Specification file error: {0}")]
    Store(#[from] StoreError),

    /// The engine refused or failed the request.
    #[error(transparent)]
    Factory(#[from] FactoryError),

    /// A command argument was malformed.
    #[error("Invalid command argument: {0}")]
    Usage(String),

    /// `check` found specifications that do not build.
    #[error("{0} specification(s) failed to build")]
    CheckFailed(usize),

    /// Writing the output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// objfactory - build objects from declarative specifications
///
/// Objects are built either from a TOML specification file or by calling the
/// registered initializers of the demo type catalog.
#[derive(Parser, Debug)]
#[command(name = "objfactory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file (default: objfactory.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the TOML specification file
    #[arg(short = 's', long, global = true)]
    pub specs: Option<PathBuf>,

    /// Construction strategy: "both", "reflection" or "specification"
    #[arg(short = 'S', long, global = true)]
    pub strategy: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an object and print it
    Create {
        /// Specification key, or type name
        key: String,

        /// Identifier distinguishing several specifications under one key
        #[arg(short, long)]
        id: Option<String>,

        /// Initializer argument as TYPE=VALUE (repeatable). Class-typed
        /// values name a stored key (`key` or `key:id`), or `null`
        #[arg(short, long = "arg", value_name = "TYPE=VALUE")]
        args: Vec<String>,

        /// Treat KEY as a type and require the result to be assignable to it
        #[arg(short, long)]
        typed: bool,

        /// Code bundle to resolve the type in
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Print a stored specification
    Show {
        /// Specification key
        key: String,

        /// Identifier
        #[arg(short, long)]
        id: Option<String>,
    },

    /// List stored specifications
    Keys,

    /// Build every stored specification and report failures
    Check,

    /// List registered classes and code bundles
    Types,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI against standard output.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

/// Execute the CLI, writing command output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let file = AppConfig::discover(cli.config.as_deref())?;
    let env_strategy = std::env::var(STRATEGY_ENV).ok();
    let settings = Settings::resolve(
        cli.strategy.as_deref(),
        cli.specs.as_deref(),
        &file,
        env_strategy.as_deref(),
    )?;
    let factory = open_factory(&settings)?;

    if cli.verbose {
        tracing::info!(
            strategy = %settings.strategy,
            specifications = factory.store().len(),
            "engine ready"
        );
    }

    let json_mode = cli.json_mode;
    match cli.command {
        Some(Commands::Create {
            key,
            id,
            args,
            typed,
            location,
        }) => cmd_create(
            &factory,
            out,
            json_mode,
            &CreateRequest {
                key: &key,
                id: id.as_deref(),
                args: &args,
                typed,
                location: location.as_deref(),
            },
        ),
        Some(Commands::Show { key, id }) => cmd_show(&factory, out, json_mode, &key, id.as_deref()),
        Some(Commands::Keys) => cmd_keys(&factory, out, json_mode),
        Some(Commands::Check) => cmd_check(&factory, out, json_mode, cli.quiet),
        Some(Commands::Types) => cmd_types(&factory, out, json_mode),
        None => {
            // No subcommand - list keys by default
            cmd_keys(&factory, out, json_mode)
        }
    }
}

/// Build the engine the commands run against.
pub fn open_factory(settings: &Settings) -> Result<ObjectFactory<ConfigStore>, CliError> {
    let store = match &settings.specifications {
        Some(path) => ConfigStore::open(path)?,
        None => ConfigStore::default(),
    };
    let registry = catalog::registry();
    let bundles = catalog::bundles(&registry);
    Ok(ObjectFactory::with_strategy(store, registry, settings.strategy).with_bundles(bundles))
}
