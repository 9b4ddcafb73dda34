//! Conversions between source formats, the [`EPrint`] model and outputs.
//!
//! Sources:
//! - [`crossref`]: CrossRef works API JSON
//! - [`datacite`]: DataCite works API JSON, including its embedded XML
//! - [`eprintsxml`]: EPrints REST XML (read and write)
//!
//! Outputs:
//! - EPrints XML via [`EPrints::to_xml`]
//! - A JSON mirror of the XML via [`EPrints::to_json`]
//! - The flattened [`simplified`] record
//!
//! Source payloads are decoded into partial schemas where every field is
//! optional. A record only fails to crosswalk when it is unparseable or lacks a
//! title or DOI.

use super::*;

pub mod crossref;
pub mod datacite;
pub mod eprintsxml;
pub mod simplified;

pub use self::{
  crossref::crossref_works_to_eprint,
  datacite::datacite_works_to_eprint,
  simplified::{simplified_to_json, simplify, SimplifiedRecord},
};

const ORCID_PREFIXES: [&str; 4] =
  ["https://orcid.org/", "http://orcid.org/", "https://www.orcid.org/", "orcid.org/"];

/// Maps the work type vocabularies of CrossRef and DataCite onto EPrints
/// types.
pub(crate) fn normalize_eprint_type(work_type: &str) -> String {
  let key = work_type.trim().to_lowercase().replace(['_', ' '], "-");
  let eprint_type = match key.as_str() {
    "journal-article" | "journalarticle" | "article" => "article",
    "proceedings-article" | "book-chapter" | "book-section" | "booksection" | "book-part" =>
      "book_section",
    "book" | "edited-book" | "monograph" | "reference-book" => "book",
    "dissertation" | "thesis" => "thesis",
    "report" | "report-series" => "monograph",
    "proceedings" | "conferencepaper" | "conference-paper" => "conference_item",
    "dataset" => "dataset",
    other => other,
  };
  eprint_type.to_string()
}

/// Strips any resolver prefix from an ORCID.
pub(crate) fn strip_orcid(orcid: &str) -> String {
  let orcid = orcid.trim();
  ORCID_PREFIXES
    .iter()
    .find_map(|prefix| orcid.strip_prefix(prefix))
    .unwrap_or(orcid)
    .to_string()
}

impl EPrints {
  /// Serializes the collection as pretty-printed JSON.
  ///
  /// The layout mirrors the XML: a top-level `eprint` array whose objects use
  /// the XML tag names as keys, with empty fields omitted.
  pub fn to_json(&self) -> Result<Vec<u8>> { Ok(serde_json::to_vec_pretty(self)?) }

  /// Reads the JSON mirror produced by [`EPrints::to_json`].
  pub fn from_json(src: &[u8]) -> Result<Self> { Ok(serde_json::from_slice(src)?) }
}
