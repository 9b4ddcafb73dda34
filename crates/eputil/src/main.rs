//! Command line tools for EPrints metadata.
//!
//! `eputil` wraps the `eprinttools` library:
//! - Look up DOIs at CrossRef or DataCite and print them as EPrints records
//! - Convert EPrints XML to JSON or simplified JSON, optionally normalizing
//! - Strip markup from titles and abstracts
//! - Harvest records from an EPrints repository into a local store
//!
//! # Usage
//!
//! ```bash
//! # Look up a DOI with the Caltech Library rules applied
//! eputil doi 10.1364/prj.437518
//!
//! # Same, as simplified JSON, with titles trimmed
//! eputil doi 10.1103/PhysRevLett.116.061102 --format simplified --trim-title
//!
//! # Convert an EPrints XML export to JSON
//! eputil convert export.xml --format json
//!
//! # Strip tags from text
//! echo '<i>Hello</i> world' | eputil strip
//!
//! # Harvest records and read one back
//! eputil harvest 85447 85448 --eprints-url https://authors.library.caltech.edu
//! eputil get 85447
//! ```
//!
//! Records and converted documents go to stdout, progress and errors to
//! stderr. Use `-v` (repeatable) for more logging.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  io::{Read, Write},
  path::{Path, PathBuf},
};

use clap::{builder::ArgAction, Args, Parser, Subcommand, ValueEnum};
use console::style;
use eprinttools::{
  client::HttpClient,
  configuration::Config,
  crosswalk::{simplified_to_json, simplify, SimplifiedRecord},
  database::Database,
  error::EPrintsError,
  harvest::{Harvester, Lookup},
  prelude::*,
  rules::Rule,
  store::MemoryStore,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;

use crate::{commands::*, error::*};

/// Prefix for information messages
static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
static ERROR_PREFIX: &str = "✗ ";

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Harvest, convert and normalize EPrints metadata")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. Defaults to the platform config
  /// directory; a missing file means built-in defaults.
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Path to the SQLite record store. Overrides the configuration.
  #[arg(long, global = true)]
  store: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so they never
/// mix with records written to stdout.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Entry point for the eputil CLI application
///
/// Any error is reported on stderr and turns into exit code 1.
#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  if let Err(e) = run(cli).await {
    eprintln!("{} {e}", style(ERROR_PREFIX).red());
    std::process::exit(1);
  }
}

/// Loads the configuration and dispatches the subcommand.
async fn run(cli: Cli) -> Result<()> {
  let config_path = cli.config.unwrap_or_else(Config::default_path);
  trace!("Using configuration at {}", config_path.display());
  let config = Config::load(&config_path)?;
  let store = cli.store.unwrap_or_else(|| config.store_path());

  match cli.command {
    Commands::Doi(args) => doi(&config, args).await,
    Commands::Convert(args) => convert(&config, args),
    Commands::Strip(args) => strip(args),
    Commands::Harvest(args) => harvest(&config, &store, args).await,
    Commands::Get(args) => get(&store, args).await,
  }
}
