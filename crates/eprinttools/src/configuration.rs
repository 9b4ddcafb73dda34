//! TOML configuration.
//!
//! ```toml
//! strict = false
//!
//! [defaults]
//! collection = "CaltechAUTHORS"
//! official_url = "https://resolver.caltech.edu"
//!
//! [rules]
//! trim_title = true
//! dot_initials = false
//!
//! [journals."2327-9125"]
//! publisher = "Optica Publishing Group"
//! publication = "Photonics Research"
//!
//! [api]
//! eprints_url = "https://authors.library.caltech.edu"
//! mailto = "library@example.edu"
//! ```
//!
//! Every section is optional. A `[defaults]` section replaces the built-in
//! CaltechAUTHORS defaults as a whole, `[rules]` overrides individual rules
//! on top of whichever bundle the caller starts from.

use super::*;
use crate::{
  client::ApiConfig,
  database::Database,
  rules::{Defaults, JournalTable, Rule, RuleEngine, RuleSet},
};

/// Settings shared by the library and the command line tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Location of the SQLite record store.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub database_path: Option<PathBuf>,
  /// Abort on the first rule failure instead of skipping the rule.
  pub strict:        bool,
  /// Values used by the `default_*` and `generate_*` rules.
  pub defaults:      Defaults,
  /// Rule name to enabled overrides.
  pub rules:         BTreeMap<String, bool>,
  /// Journals keyed by ISSN.
  pub journals:      JournalTable,
  /// API endpoints.
  pub api:           ApiConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_path: None,
      strict:        false,
      defaults:      Defaults::cls(),
      rules:         BTreeMap::new(),
      journals:      JournalTable::new(),
      api:           ApiConfig::default(),
    }
  }
}

impl Config {
  /// Returns the default path for the configuration file.
  ///
  /// - On Unix: `~/.config/eprinttools/config.toml`
  /// - On macOS: `~/Library/Application Support/eprinttools/config.toml`
  /// - On Windows: `%APPDATA%\eprinttools\config.toml`
  /// - Fallback: `./eprinttools/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join("eprinttools")
      .join("config.toml")
  }

  /// Reads the configuration at `path`, falling back to the built-in
  /// defaults when the file doesn't exist.
  ///
  /// # Errors
  ///
  /// Returns [`EPrintsError::TomlDe`] for malformed files and
  /// [`EPrintsError::Path`] when the file exists but can't be read.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      debug!("No configuration at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: Self = toml::from_str(&content)?;
    for name in config.rules.keys() {
      if name.parse::<Rule>().is_err() {
        warn!("Configuration {} names unknown rule {name:?}", path.display());
      }
    }
    Ok(config)
  }

  /// Writes the configuration as TOML, creating the parent directory.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// The rule set selected by this configuration.
  ///
  /// Starts from the CLS bundle when `cls` is set and from an empty set
  /// otherwise, then applies the `[rules]` overrides.
  pub fn rule_set(&self, cls: bool) -> RuleSet {
    let mut rules = if cls { RuleSet::cls() } else { RuleSet::new() };
    rules.update(&self.rules);
    rules
  }

  /// A rule engine carrying this configuration's defaults, journals and
  /// strictness.
  pub fn rule_engine(&self, rules: RuleSet) -> RuleEngine {
    RuleEngine::new(rules)
      .with_defaults(self.defaults.clone())
      .with_journals(self.journals.clone())
      .strict(self.strict)
  }

  /// The configured record store location, or [`Database::default_path`].
  pub fn store_path(&self) -> PathBuf {
    self.database_path.clone().unwrap_or_else(Database::default_path)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"
strict = true

[defaults]
collection = "CaltechTHESIS"
official_url = "https://thesis.library.caltech.edu"

[rules]
trim_title = true
dot_initials = false
not_a_rule = true

[journals."2327-9125"]
publisher = "Optica Publishing Group"
publication = "Photonics Research"

[api]
eprints_url = "https://authors.library.caltech.edu"
"#;

  #[traced_test]
  #[test]
  fn test_missing_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.defaults.collection, "CaltechAUTHORS");
    assert_eq!(config.api.crossref_url, "https://api.crossref.org/works");
  }

  #[traced_test]
  #[test]
  fn test_load_sample() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let config = Config::load(&path).unwrap();
    assert!(config.strict);
    assert_eq!(config.defaults.collection, "CaltechTHESIS");
    assert!(config.defaults.rights.is_empty());
    assert_eq!(config.journals["2327-9125"].publication, "Photonics Research");
    assert_eq!(config.api.eprints_url, "https://authors.library.caltech.edu");
    assert_eq!(config.api.datacite_url, "https://api.datacite.org/works");
    assert!(logs_contain("not_a_rule"));

    let rules = config.rule_set(true);
    assert!(rules.is_enabled(Rule::TrimTitle));
    assert!(!rules.is_enabled(Rule::DotInitials));
    assert!(rules.is_enabled(Rule::StripTags));

    let rules = config.rule_set(false);
    assert_eq!(rules.iter().collect::<Vec<_>>(), vec![Rule::TrimTitle]);
  }

  #[test]
  fn test_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[rules\ntrim_title = ").unwrap();
    assert!(matches!(Config::load(&path), Err(EPrintsError::TomlDe(_))));
  }

  #[test]
  fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.rules.insert("trim_title".to_string(), true);
    config.database_path = Some(dir.path().join("eprints.db"));
    config.save(&path).unwrap();
    assert_eq!(Config::load(&path).unwrap(), config);
    assert_eq!(config.store_path(), dir.path().join("eprints.db"));
  }
}
