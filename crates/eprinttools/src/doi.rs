//! DOI parsing helpers and the DOI prefix to publisher table.
//!
//! DOIs arrive in several shapes (bare, `doi:` prefixed, or as resolver URLs)
//! and are reduced to the bare `prefix/suffix` form before anything else
//! touches them.
//!
//! # Examples
//!
//! ```
//! use eprinttools::doi::{doi_prefix, normalize_doi, publisher_for_doi};
//!
//! let doi = normalize_doi("https://doi.org/10.1103/PhysRevD.104.022004").unwrap();
//! assert_eq!(doi, "10.1103/PhysRevD.104.022004");
//! assert_eq!(doi_prefix(&doi).unwrap(), "10.1103");
//! assert_eq!(publisher_for_doi(&doi), Some("American Physical Society"));
//! ```

use url::Url;

use super::*;

/// Base URL of the DOI resolver.
pub const DOI_RESOLVER: &str = "https://doi.org/";

lazy_static! {
  /// Shape of a bare DOI: a `10.` registrant prefix, a slash and a suffix.
  static ref DOI_PATTERN: Regex = Regex::new(r"^10\.\d{4,9}(\.\d+)*/\S+$").unwrap();

  /// Publisher names keyed by DOI prefix.
  ///
  /// Publishers with several registrant prefixes appear once per prefix.
  pub static ref DOI_PREFIX_PUBLISHERS: HashMap<&'static str, &'static str> = HashMap::from([
    ("10.1103", "American Physical Society"),
    ("10.1063", "American Institute of Physics"),
    ("10.1039", "Royal Society of Chemistry"),
    ("10.1242", "Company of Biologists"),
    ("10.1073", "PNAS"),
    ("10.1109", "IEEE"),
    ("10.2514", "AIAA"),
    ("10.1029", "AGU (pre-Wiley hosting)"),
    ("10.1093", "MNRAS"),
    ("10.1046", "Geophysical Journal International"),
    ("10.1175", "American Meteorological Society"),
    ("10.1083", "Rockefeller University Press"),
    ("10.1084", "Rockefeller University Press"),
    ("10.1085", "Rockefeller University Press"),
    ("10.26508", "Rockefeller University Press"),
    ("10.1371", "PLOS"),
    ("10.5194", "European Geosciences Union"),
    ("10.1051", "EDP Sciences"),
    ("10.2140", "Mathematical Sciences Publishers"),
    ("10.1074", "ASBMB"),
    ("10.1091", "ASCB"),
    ("10.1523", "Society for Neuroscience"),
    ("10.1101", "Cold Spring Harbor"),
    ("10.1128", "American Society for Microbiology"),
    ("10.1115", "ASME"),
    ("10.1061", "ASCE"),
    ("10.1038", "Nature"),
    ("10.1126", "Science"),
    ("10.1021", "American Chemical Society"),
    ("10.1002", "Wiley"),
    ("10.1016", "Elsevier"),
  ]);
}

/// Reduces a DOI in any of its common notations to the bare `prefix/suffix`
/// form.
///
/// Accepts bare DOIs, `doi:` prefixed DOIs and `doi.org` resolver URLs.
///
/// # Errors
///
/// Returns [`EPrintsError::InvalidDoi`] when the result doesn't look like a
/// DOI.
pub fn normalize_doi(input: &str) -> Result<String> {
  let trimmed = input.trim();
  let bare = if let Some(rest) =
    trimmed.get(..4).filter(|p| p.eq_ignore_ascii_case("doi:")).map(|_| &trimmed[4..])
  {
    rest.trim().to_string()
  } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
    let url = Url::parse(trimmed).map_err(|_| EPrintsError::InvalidDoi(input.to_string()))?;
    match url.host_str() {
      Some(host) if host == "doi.org" || host.ends_with(".doi.org") => {},
      _ => return Err(EPrintsError::InvalidDoi(input.to_string())),
    }
    url.path().trim_start_matches('/').replace("%2F", "/").replace("%2f", "/")
  } else {
    trimmed.to_string()
  };

  if DOI_PATTERN.is_match(&bare) {
    trace!("Normalized DOI {input:?} to {bare:?}");
    Ok(bare)
  } else {
    Err(EPrintsError::InvalidDoi(input.to_string()))
  }
}

/// Splits a bare DOI into prefix and suffix.
pub fn split_doi(doi: &str) -> Result<(&str, &str)> {
  match doi.split_once('/') {
    Some((prefix, suffix)) if prefix.starts_with("10.") && !suffix.is_empty() =>
      Ok((prefix, suffix)),
    _ => Err(EPrintsError::InvalidDoi(doi.to_string())),
  }
}

/// The registrant prefix of a DOI, e.g. `10.1103`.
pub fn doi_prefix(doi: &str) -> Result<&str> { split_doi(doi).map(|(prefix, _)| prefix) }

/// Everything after the first slash of a DOI.
pub fn doi_suffix(doi: &str) -> Result<&str> { split_doi(doi).map(|(_, suffix)| suffix) }

/// Resolver URL for a bare DOI.
pub fn doi_url(doi: &str) -> String { format!("{DOI_RESOLVER}{doi}") }

/// Looks up the publisher registered for the DOI's prefix. Any notation
/// [`normalize_doi`] accepts works.
///
/// Returns `None` for unknown prefixes and for values that aren't DOIs.
pub fn publisher_for_doi(doi: &str) -> Option<&'static str> {
  let doi = normalize_doi(doi).ok()?;
  let prefix = doi_prefix(&doi).ok()?;
  DOI_PREFIX_PUBLISHERS.get(prefix).copied()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_doi_forms() {
    for input in [
      "10.1364/prj.437518",
      "  10.1364/prj.437518 ",
      "doi:10.1364/prj.437518",
      "DOI: 10.1364/prj.437518",
      "https://doi.org/10.1364/prj.437518",
      "http://dx.doi.org/10.1364/prj.437518",
      "https://doi.org/10.1364%2Fprj.437518",
    ] {
      assert_eq!(normalize_doi(input).unwrap(), "10.1364/prj.437518", "input {input:?}");
    }
  }

  #[test]
  fn test_normalize_doi_rejects() {
    for input in ["", "prj.437518", "10.1364", "https://example.org/10.1364/prj.437518", "11.1/x"]
    {
      assert!(
        matches!(normalize_doi(input), Err(EPrintsError::InvalidDoi(_))),
        "input {input:?} should be rejected"
      );
    }
  }

  #[test]
  fn test_split_doi_keeps_slashes_in_suffix() {
    assert_eq!(split_doi("10.1016/s0924-4247(01)00609-4").unwrap().1, "s0924-4247(01)00609-4");
    assert_eq!(doi_suffix("10.1093/mnras/stab2505").unwrap(), "mnras/stab2505");
    assert!(doi_prefix("not a doi").is_err());
  }

  #[test]
  fn test_publisher_lookup() {
    assert_eq!(publisher_for_doi("10.26508/lsa.202000818"), Some("Rockefeller University Press"));
    assert_eq!(publisher_for_doi("10.1093/mnras/stab2505"), Some("MNRAS"));
    assert_eq!(publisher_for_doi("10.1364/prj.437518"), None);
    assert_eq!(publisher_for_doi("garbage"), None);
    assert_eq!(
      publisher_for_doi("https://doi.org/10.1103/PhysRevLett.116.061102"),
      Some("American Physical Society")
    );
  }
}
