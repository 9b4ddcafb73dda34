//! Error types for the eprinttools library.
//!
//! A single error type covers every failure mode of the crate:
//! - Malformed JSON, XML or base64 input
//! - Records missing a field the crosswalk cannot do without
//! - Identifiers that don't parse as DOIs
//! - Rule failures when the engine runs in strict mode
//! - Network, storage and configuration problems
//!
//! # Examples
//!
//! ```
//! use eprinttools::{crosswalk::crossref_works_to_eprint, error::EPrintsError};
//!
//! match crossref_works_to_eprint(br#"{"message": {"DOI": "10.1103/abc"}}"#) {
//!   Err(EPrintsError::MissingField(field)) => assert_eq!(field, "title"),
//!   other => panic!("unexpected result: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`eprinttools`](crate) crate.
pub type Result<T> = core::result::Result<T, EPrintsError>;

/// Errors that can occur when crosswalking, normalizing or storing records.
#[derive(Error, Debug)]
pub enum EPrintsError {
  /// A JSON payload could not be decoded or a record could not be encoded.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// An XML document could not be read or written.
  ///
  /// The string holds the underlying parser or writer message.
  #[error("XML error: {0}")]
  Xml(String),

  /// The base64 `xml` attribute of a DataCite record could not be decoded.
  #[error(transparent)]
  Base64(#[from] base64::DecodeError),

  /// A source record lacked a field that every EPrint needs.
  ///
  /// Title and DOI are required when crosswalking CrossRef or DataCite works.
  #[error("Missing required field: {0}")]
  MissingField(&'static str),

  /// The value could not be interpreted as a DOI.
  #[error("Invalid DOI: {0:?}")]
  InvalidDoi(String),

  /// A normalization rule failed on a record.
  ///
  /// Only surfaced when the rule engine runs in strict mode; otherwise the
  /// failure is logged and the rule is skipped.
  #[error("Rule {rule} failed for record {record}: {reason}")]
  Rule {
    /// Name of the rule.
    rule:   String,
    /// Identifier of the record the rule was applied to.
    record: String,
    /// What went wrong.
    reason: String,
  },

  /// A network request failed.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// An API answered with a non-success status.
  #[error("API error: {0}")]
  ApiError(String),

  /// The requested record doesn't exist.
  #[error("Record not found: {0}")]
  NotFound(String),

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// The configuration file is not valid TOML for [`Config`](crate::configuration::Config).
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be serialized.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// The configuration is inconsistent.
  #[error("{0}")]
  Config(String),
}

impl EPrintsError {
  /// Wraps an XML reader or writer failure.
  pub(crate) fn xml(e: impl std::fmt::Display) -> Self { Self::Xml(e.to_string()) }
}
