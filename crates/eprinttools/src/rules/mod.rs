//! Normalization rules applied to EPrint records before they are written out.
//!
//! Each [`Rule`] is a small, named transformation of a single record. A
//! [`RuleSet`] says which rules are enabled, and a [`RuleEngine`] runs the
//! enabled rules over every record of an [`EPrints`] collection in the fixed
//! order given by [`Rule::ALL`]. Order matters: ids are generated after
//! defaults are filled, and related URL descriptions are normalized after the
//! DOI has been moved into them.
//!
//! The [`RuleSet::cls`] bundle together with [`Defaults::cls`] reproduces the
//! Caltech Library conventions for CaltechAUTHORS.
//!
//! # Failure policy
//!
//! A rule that cannot be applied to a record (for instance because its DOI is
//! malformed) is logged at `warn` level and skipped; the remaining rules and
//! records are still processed. An engine built with
//! [`RuleEngine::strict`] instead stops at the first failure and returns
//! [`EPrintsError::Rule`] naming the record and the rule.
//!
//! # Examples
//!
//! ```
//! use eprinttools::{rules::RuleEngine, EPrint, EPrints};
//!
//! let mut eprints = EPrints::new();
//! eprints.append(EPrint {
//!   doi: "10.1364/prj.437518".into(),
//!   title: "Beamforming".into(),
//!   ..EPrint::default()
//! });
//!
//! let eprints = RuleEngine::cls().apply(eprints).unwrap();
//! let eprint = &eprints.eprint[0];
//! assert_eq!(eprint.id_number, "CaltechAUTHORS:prj.437518");
//! assert!(eprint.official_url.ends_with(&eprint.id_number));
//! ```

use std::collections::BTreeSet;

use chrono::Utc;

use super::*;
use crate::{
  cleaner::{has_encoded_elements, strip_tags},
  doi::{doi_suffix, doi_url, normalize_doi, publisher_for_doi},
};


/// Creator lists longer than this are dropped by [`Rule::PruneCreators`].
pub const MAX_CREATORS: usize = 30;

/// A named normalization rule.
///
/// Variants are declared in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  /// Remove markup and entities from the title and abstract.
  StripTags,
  /// Add a period after single letter given names of people.
  DotInitials,
  /// Drop a leading "The " from the title and trim it.
  TrimTitle,
  /// Strip leading zeros from the volume.
  TrimVolume,
  /// Strip leading zeros from the issue number.
  TrimNumber,
  /// Drop the creator list when it has more than [`MAX_CREATORS`] entries.
  PruneCreators,
  /// Clear the series.
  PruneSeries,
  /// Set the publisher from the DOI prefix table or the journal table.
  NormalizePublisher,
  /// Set the publication name from the journal table.
  NormalizePublication,
  /// Mark articles as refereed.
  AssumeRefereed,
  /// Fill an empty rights statement from the defaults.
  DefaultRights,
  /// Fill an empty collection from the defaults.
  DefaultCollection,
  /// Fill an empty refereed flag from the defaults.
  DefaultRefereed,
  /// Fill an empty record status from the defaults.
  DefaultStatus,
  /// Derive an id number from the DOI, or from the clock without one.
  GenerateIdNumber,
  /// Point the official URL at the resolver for the id number.
  GenerateOfficialUrl,
  /// Move the DOI into the first related URL slot.
  DoiAsRelatedUrl,
  /// Capitalize related URL descriptions.
  NormalizeRelatedUrl,
}

impl Rule {
  /// Every rule, in execution order.
  pub const ALL: [Rule; 18] = [
    Rule::StripTags,
    Rule::DotInitials,
    Rule::TrimTitle,
    Rule::TrimVolume,
    Rule::TrimNumber,
    Rule::PruneCreators,
    Rule::PruneSeries,
    Rule::NormalizePublisher,
    Rule::NormalizePublication,
    Rule::AssumeRefereed,
    Rule::DefaultRights,
    Rule::DefaultCollection,
    Rule::DefaultRefereed,
    Rule::DefaultStatus,
    Rule::GenerateIdNumber,
    Rule::GenerateOfficialUrl,
    Rule::DoiAsRelatedUrl,
    Rule::NormalizeRelatedUrl,
  ];

  /// The configuration name of the rule.
  pub fn as_str(&self) -> &'static str {
    match self {
      Rule::StripTags => "strip_tags",
      Rule::DotInitials => "dot_initials",
      Rule::TrimTitle => "trim_title",
      Rule::TrimVolume => "trim_volume",
      Rule::TrimNumber => "trim_number",
      Rule::PruneCreators => "prune_creators",
      Rule::PruneSeries => "prune_series",
      Rule::NormalizePublisher => "normalize_publisher",
      Rule::NormalizePublication => "normalize_publication",
      Rule::AssumeRefereed => "assume_refereed",
      Rule::DefaultRights => "default_rights",
      Rule::DefaultCollection => "default_collection",
      Rule::DefaultRefereed => "default_refereed",
      Rule::DefaultStatus => "default_status",
      Rule::GenerateIdNumber => "generate_id_number",
      Rule::GenerateOfficialUrl => "generate_official_url",
      Rule::DoiAsRelatedUrl => "doi_as_related_url",
      Rule::NormalizeRelatedUrl => "normalize_related_url",
    }
  }
}

impl Display for Rule {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Rule {
  type Err = EPrintsError;

  /// Parses a rule name. `trim_series` and `trim_creators` are accepted as
  /// aliases of `prune_series` and `prune_creators`.
  fn from_str(s: &str) -> Result<Self> {
    let name = s.trim().to_lowercase().replace('-', "_");
    match name.as_str() {
      "trim_series" => Ok(Rule::PruneSeries),
      "trim_creators" => Ok(Rule::PruneCreators),
      _ => Rule::ALL
        .into_iter()
        .find(|rule| rule.as_str() == name)
        .ok_or_else(|| EPrintsError::Config(format!("Unknown rule: {s:?}"))),
    }
  }
}

/// The set of enabled rules.
///
/// Rules not in the set are disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
  enabled: BTreeSet<Rule>,
}

impl RuleSet {
  /// A set with every rule disabled.
  pub fn new() -> Self { Self::default() }

  /// A set with every rule enabled.
  pub fn all() -> Self { Self { enabled: Rule::ALL.into_iter().collect() } }

  /// The Caltech Library bundle: every rule except `trim_title`,
  /// `prune_creators` and `doi_as_related_url`.
  pub fn cls() -> Self {
    let mut set = Self::all();
    set.disable(Rule::TrimTitle);
    set.disable(Rule::PruneCreators);
    set.disable(Rule::DoiAsRelatedUrl);
    set
  }

  /// Builds a set from `name -> enabled` pairs, ignoring unknown names.
  pub fn from_map<'a>(map: impl IntoIterator<Item = (&'a String, &'a bool)>) -> Self {
    let mut set = Self::new();
    set.update(map);
    set
  }

  /// Applies `name -> enabled` overrides, ignoring unknown names.
  pub fn update<'a>(&mut self, map: impl IntoIterator<Item = (&'a String, &'a bool)>) {
    for (name, enabled) in map {
      self.set(name, *enabled);
    }
  }

  /// Enables or disables a rule by name.
  ///
  /// Returns `false`, after logging a warning, when the name is unknown.
  pub fn set(&mut self, name: &str, enabled: bool) -> bool {
    match name.parse::<Rule>() {
      Ok(rule) => {
        if enabled {
          self.enable(rule);
        } else {
          self.disable(rule);
        }
        true
      },
      Err(_) => {
        warn!("Ignoring unknown rule {name:?}");
        false
      },
    }
  }

  /// Enables a rule.
  pub fn enable(&mut self, rule: Rule) { self.enabled.insert(rule); }

  /// Disables a rule.
  pub fn disable(&mut self, rule: Rule) { self.enabled.remove(&rule); }

  /// Disables every rule.
  pub fn clear(&mut self) { self.enabled.clear(); }

  /// Whether `rule` is enabled.
  pub fn is_enabled(&self, rule: Rule) -> bool { self.enabled.contains(&rule) }

  /// Whether no rule is enabled.
  pub fn is_empty(&self) -> bool { self.enabled.is_empty() }

  /// Enabled rules in execution order.
  pub fn iter(&self) -> impl Iterator<Item = Rule> + '_ { self.enabled.iter().copied() }
}

/// Values filled in by the `default_*` and `generate_*` rules.
///
/// An empty value leaves the corresponding field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
  /// Collection name, also the id number prefix.
  pub collection:   String,
  /// Rights statement.
  pub rights:       String,
  /// Resolver prefix used to build official URLs.
  pub official_url: String,
  /// Refereed flag.
  pub refereed:     String,
  /// Record status.
  pub status:       String,
}

impl Defaults {
  /// The CaltechAUTHORS defaults.
  pub fn cls() -> Self {
    Self {
      collection:   "CaltechAUTHORS".to_string(),
      rights:       "No commercial reproduction, distribution, display or performance rights in \
                     this work are provided."
        .to_string(),
      official_url: "https://resolver.caltech.edu".to_string(),
      refereed:     "TRUE".to_string(),
      status:       "inbox".to_string(),
    }
  }
}

/// Publisher and publication name of a journal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Journal {
  /// Publisher name.
  pub publisher:   String,
  /// Journal title.
  pub publication: String,
}

/// Journals keyed by ISSN.
pub type JournalTable = BTreeMap<String, Journal>;

/// Applies an enabled [`RuleSet`] to records.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
  rules:    RuleSet,
  defaults: Defaults,
  journals: JournalTable,
  strict:   bool,
}

impl RuleEngine {
  /// An engine running `rules` with empty defaults and no journal table.
  pub fn new(rules: RuleSet) -> Self { Self { rules, ..Self::default() } }

  /// The Caltech Library bundle with its defaults.
  pub fn cls() -> Self { Self::new(RuleSet::cls()).with_defaults(Defaults::cls()) }

  /// Replaces the defaults.
  pub fn with_defaults(mut self, defaults: Defaults) -> Self {
    self.defaults = defaults;
    self
  }

  /// Replaces the journal table.
  pub fn with_journals(mut self, journals: JournalTable) -> Self {
    self.journals = journals;
    self
  }

  /// In strict mode the first rule failure aborts [`RuleEngine::apply`].
  pub fn strict(mut self, strict: bool) -> Self {
    self.strict = strict;
    self
  }

  /// The enabled rules.
  pub fn rules(&self) -> &RuleSet { &self.rules }

  /// Runs the enabled rules over every record, in order.
  ///
  /// # Errors
  ///
  /// Only in strict mode: [`EPrintsError::Rule`] for the first rule that
  /// fails.
  pub fn apply(&self, mut eprints: EPrints) -> Result<EPrints> {
    for eprint in eprints.eprint.iter_mut() {
      self.apply_to(eprint)?;
    }
    Ok(eprints)
  }

  /// Runs the enabled rules over one record and returns how many changed it.
  pub fn apply_to(&self, eprint: &mut EPrint) -> Result<usize> {
    let mut changed = 0;
    for rule in self.rules.iter() {
      match self.apply_rule(rule, eprint) {
        Ok(true) => {
          trace!("Rule {rule} changed {}", eprint.label());
          changed += 1;
        },
        Ok(false) => {},
        Err(e) if self.strict =>
          return Err(EPrintsError::Rule {
            rule:   rule.to_string(),
            record: eprint.label(),
            reason: e.to_string(),
          }),
        Err(e) => warn!("Skipping rule {rule} for {}: {e}", eprint.label()),
      }
    }
    debug!("{changed} rule(s) changed {}", eprint.label());
    Ok(changed)
  }

  /// Applies a single rule, returning whether the record changed.
  pub fn apply_rule(&self, rule: Rule, eprint: &mut EPrint) -> Result<bool> {
    match rule {
      Rule::StripTags =>
        Ok(strip_markup(&mut eprint.title) | strip_markup(&mut eprint.abstract_text)),
      Rule::DotInitials => Ok(
        [&mut eprint.creators, &mut eprint.editors, &mut eprint.contributors]
          .into_iter()
          .flat_map(|items| items.iter_mut())
          .fold(false, |changed, item| dot_initials(item) | changed),
      ),
      Rule::TrimTitle => {
        let title = trim_title(&eprint.title);
        Ok(replace(&mut eprint.title, title))
      },
      Rule::TrimVolume => {
        let volume = trim_leading_zeros(&eprint.volume);
        Ok(replace(&mut eprint.volume, volume))
      },
      Rule::TrimNumber => {
        let number = trim_leading_zeros(&eprint.number);
        Ok(replace(&mut eprint.number, number))
      },
      Rule::PruneCreators => {
        let prune = eprint.creators.len() > MAX_CREATORS;
        if prune {
          eprint.creators.clear();
        }
        Ok(prune)
      },
      Rule::PruneSeries => Ok(replace(&mut eprint.series, String::new())),
      Rule::NormalizePublisher => self.normalize_publisher(eprint),
      Rule::NormalizePublication => Ok(
        match self.journals.get(eprint.issn.trim()).filter(|j| !j.publication.is_empty()) {
          Some(journal) => replace(&mut eprint.publication, journal.publication.clone()),
          None => false,
        },
      ),
      Rule::AssumeRefereed => Ok(
        eprint.eprint_type == "article" && replace(&mut eprint.refereed, "TRUE".to_string()),
      ),
      Rule::DefaultRights => Ok(fill(&mut eprint.rights, &self.defaults.rights)),
      Rule::DefaultCollection => Ok(fill(&mut eprint.collection, &self.defaults.collection)),
      Rule::DefaultRefereed => Ok(fill(&mut eprint.refereed, &self.defaults.refereed)),
      Rule::DefaultStatus => Ok(fill(&mut eprint.eprint_status, &self.defaults.status)),
      Rule::GenerateIdNumber => {
        let id_changed = self.generate_id_number(eprint)?;
        Ok(self.generate_official_url(eprint)? | id_changed)
      },
      Rule::GenerateOfficialUrl => self.generate_official_url(eprint),
      Rule::DoiAsRelatedUrl => doi_as_related_url(eprint),
      Rule::NormalizeRelatedUrl => Ok(eprint.related_url.iter_mut().fold(false, |changed, item| {
        let description = match item.description.as_str() {
          "book_section" => "Book Section",
          "article" => "Article",
          _ => return changed,
        };
        item.description = description.to_string();
        true
      })),
    }
  }

  fn normalize_publisher(&self, eprint: &mut EPrint) -> Result<bool> {
    if !eprint.doi.is_empty() {
      let doi = normalize_doi(&eprint.doi)?;
      if let Some(publisher) = publisher_for_doi(&doi) {
        return Ok(replace(&mut eprint.publisher, publisher.to_string()));
      }
    }
    match self.journals.get(eprint.issn.trim()).filter(|j| !j.publisher.is_empty()) {
      Some(journal) => Ok(replace(&mut eprint.publisher, journal.publisher.clone())),
      None => Ok(false),
    }
  }

  /// Sets the id number when it is empty.
  ///
  /// With a DOI in any notation the id is `<collection>:<suffix>` with
  /// slashes in the suffix replaced by dashes. Without a usable DOI it is
  /// `<collection>:<YYYYMMDD>-<nanos>`.
  fn generate_id_number(&self, eprint: &mut EPrint) -> Result<bool> {
    if !eprint.id_number.is_empty() {
      return Ok(false);
    }
    let local = match normalize_doi(&eprint.doi) {
      Ok(doi) => doi_suffix(&doi)?.replace('/', "-"),
      Err(_) => {
        if !eprint.doi.is_empty() {
          debug!("Unusable DOI {:?}, generating a timestamp id number", eprint.doi);
        }
        let now = Utc::now();
        format!("{}-{}", now.format("%Y%m%d"), now.timestamp_subsec_nanos())
      },
    };
    let collection = match eprint.collection.as_str() {
      "" => self.defaults.collection.as_str(),
      collection => collection,
    };
    eprint.id_number =
      if collection.is_empty() { local } else { format!("{collection}:{local}") };
    Ok(true)
  }

  /// Points the official URL at `<resolver>/<id number>`, generating the id
  /// number first if needed. A URL already ending in the id number is kept.
  fn generate_official_url(&self, eprint: &mut EPrint) -> Result<bool> {
    let id_changed = self.generate_id_number(eprint)?;
    if eprint.official_url.ends_with(&eprint.id_number) {
      return Ok(id_changed);
    }
    let prefix = self.defaults.official_url.trim_end_matches('/');
    eprint.official_url = if prefix.is_empty() {
      eprint.id_number.clone()
    } else {
      format!("{prefix}/{}", eprint.id_number)
    };
    Ok(true)
  }
}

/// Runs `rules` with the Caltech Library [`Defaults`] over `eprints`.
///
/// Rule failures are logged and skipped.
pub fn apply(eprints: EPrints, rules: &RuleSet) -> Result<EPrints> {
  RuleEngine::new(rules.clone()).with_defaults(Defaults::cls()).apply(eprints)
}

/// Assigns `value` to `field` and reports whether it differed.
fn replace(field: &mut String, value: String) -> bool {
  if *field == value {
    false
  } else {
    *field = value;
    true
  }
}

/// Assigns `default` to an empty `field`.
fn fill(field: &mut String, default: &str) -> bool {
  field.is_empty() && !default.is_empty() && replace(field, default.to_string())
}

fn strip_markup(field: &mut String) -> bool {
  if !has_encoded_elements(field) {
    return false;
  }
  let stripped = strip_tags(field).trim().to_string();
  replace(field, stripped)
}

fn trim_title(title: &str) -> String {
  match title.get(..4) {
    Some(prefix) if prefix.eq_ignore_ascii_case("the ") => title[4..].trim().to_string(),
    _ => title.to_string(),
  }
}

/// `"007"` becomes `"7"` and `"000"` becomes `"0"`.
fn trim_leading_zeros(value: &str) -> String {
  let value = value.trim();
  let stripped = value.trim_start_matches('0');
  if stripped.is_empty() && !value.is_empty() {
    "0".to_string()
  } else {
    stripped.to_string()
  }
}

fn dot_initials(item: &mut Item) -> bool {
  let Some(name) = item.name.as_mut() else { return false };
  let parts: Vec<&str> = name.given.split_whitespace().collect();
  if !parts.iter().any(|part| is_initial(part)) {
    return false;
  }
  let given = parts
    .iter()
    .map(|part| if is_initial(part) { format!("{part}.") } else { part.to_string() })
    .collect::<Vec<_>>()
    .join(" ");
  replace(&mut name.given, given)
}

fn is_initial(part: &str) -> bool {
  let mut chars = part.chars();
  matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

fn doi_as_related_url(eprint: &mut EPrint) -> Result<bool> {
  if eprint.doi.is_empty() {
    return Ok(false);
  }
  let url = doi_url(&normalize_doi(&eprint.doi)?);
  if !eprint.related_url.iter().any(|item| item.url == url) {
    eprint.related_url.insert(0, Item::related_url(url, "doi", eprint.eprint_type.as_str()));
  }
  eprint.doi.clear();
  Ok(true)
}
