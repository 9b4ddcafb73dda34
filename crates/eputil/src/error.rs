//! Error types for the eputil binary.

use thiserror::Error;

use super::*;

/// Error type alias used throughout the CLI.
pub type Result<T> = core::result::Result<T, EputilError>;

/// Errors surfaced to the user, each ending the process with exit code 1.
#[derive(Error, Debug)]
pub enum EputilError {
  /// Errors from the `eprinttools` library.
  #[error(transparent)]
  EPrints(#[from] EPrintsError),

  /// Reading input or writing output failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A single record could not be serialized.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The command line was well formed but can't be acted on.
  #[error("{0}")]
  Usage(String),

  /// Every identifier failed.
  #[error("No records were produced")]
  NothingFound,
}
