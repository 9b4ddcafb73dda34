//! Metadata crosswalks and normalization rules for EPrints repositories.
//!
//! `eprinttools` turns bibliographic metadata from external registries into
//! EPrints records, normalizes them, and writes them back out. It provides:
//!
//! - CrossRef and DataCite works records mapped onto a canonical [`EPrint`]
//! - EPrints REST XML parsing and serialization
//! - A JSON mirror of the XML and a flattened "simplified" record
//! - An ordered, toggleable set of normalization rules
//! - A small tag and entity stripper for free-text fields
//! - Harvesting of identifiers into a document store
//!
//! # Getting Started
//!
//! ```no_run
//! use eprinttools::{
//!   crosswalk::crossref_works_to_eprint,
//!   rules::{RuleEngine, RuleSet},
//!   EPrints,
//! };
//!
//! # fn example(src: &[u8]) -> eprinttools::error::Result<()> {
//! let eprint = crossref_works_to_eprint(src)?;
//! let mut eprints = EPrints::new();
//! eprints.append(eprint);
//!
//! let eprints = RuleEngine::cls().apply(eprints)?;
//! let xml = eprints.to_xml()?;
//! println!("{}", String::from_utf8_lossy(&xml));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`eprint`]: the canonical record model
//! - [`crosswalk`]: conversions between sources, the record model and outputs
//! - [`rules`]: normalization rules and the engine that applies them
//! - [`cleaner`]: tag and entity stripping
//! - [`doi`]: DOI parsing and the prefix to publisher table
//! - [`client`]: HTTP access to CrossRef, DataCite and EPrints
//! - [`store`] and [`database`]: document storage
//! - [`harvest`]: fetch, crosswalk, normalize and store in one pass
//! - [`configuration`]: TOML configuration

#![warn(missing_docs)]

use std::{
  collections::{BTreeMap, HashMap},
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod cleaner;
pub mod client;
pub mod configuration;
pub mod crosswalk;
pub mod database;
pub mod doi;
pub mod eprint;
pub mod error;
pub mod harvest;
pub mod rules;
pub mod store;

pub use crate::eprint::{EPrint, EPrints, Item, Name};
use crate::error::*;

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use eprinttools::prelude::*;
///
/// fn example() -> Result<(), EPrintsError> {
///   let eprints = RuleEngine::new(RuleSet::cls()).apply(EPrints::new())?;
///   assert!(eprints.is_empty());
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    client::MetadataClient,
    eprint::{EPrint, EPrints},
    error::EPrintsError,
    rules::{RuleEngine, RuleSet},
    store::DocumentStore,
  };
}
