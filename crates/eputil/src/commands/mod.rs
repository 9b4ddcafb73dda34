//! Subcommands and the pieces they share: input reading, output formats and
//! rule selection flags.

use super::*;

pub mod convert;
pub mod doi;
pub mod get;
pub mod harvest;
pub mod strip;

pub use convert::{convert, ConvertArgs};
pub use doi::{doi, DoiArgs};
pub use get::{get, GetArgs};
pub use harvest::{harvest, HarvestArgs};
pub use strip::{strip, StripArgs};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Look up DOIs at CrossRef or DataCite and print them as EPrints records
  Doi(DoiArgs),

  /// Convert EPrints XML or JSON, optionally applying rules
  Convert(ConvertArgs),

  /// Strip tags and entities from text
  Strip(StripArgs),

  /// Harvest records from an EPrints repository into the record store
  Harvest(HarvestArgs),

  /// Print a record from the record store
  Get(GetArgs),
}

/// Serialization of the records a command produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  /// EPrints XML
  Xml,
  /// JSON mirror of the EPrints XML
  Json,
  /// Flattened JSON records
  Simplified,
}

/// Individual rules that can be switched on from the command line.
#[derive(Args, Clone, Debug, Default)]
pub struct RuleFlags {
  /// Drop a leading "The" from titles
  #[arg(long)]
  pub trim_title: bool,

  /// Strip leading zeros from volumes
  #[arg(long)]
  pub trim_volume: bool,

  /// Strip leading zeros from issue numbers
  #[arg(long)]
  pub trim_number: bool,

  /// Drop creator lists with more than 30 entries
  #[arg(long)]
  pub trim_creators: bool,

  /// Clear the series
  #[arg(long)]
  pub trim_series: bool,

  /// Capitalize related URL descriptions
  #[arg(long)]
  pub normalize_related_url: bool,

  /// Set the publisher from the DOI prefix
  #[arg(long)]
  pub normalize_publisher: bool,

  /// Set the publication from the journal table
  #[arg(long)]
  pub normalize_publication: bool,

  /// Add periods to single letter given names
  #[arg(long)]
  pub dot_initials: bool,

  /// Stop at the first rule failure instead of skipping the rule
  #[arg(long)]
  pub strict: bool,
}

impl RuleFlags {
  /// Builds the engine: the configured rule set, starting from the CLS
  /// bundle when `cls` is set, plus every flag given on the command line.
  pub fn engine(&self, config: &Config, cls: bool) -> RuleEngine {
    let mut rules = config.rule_set(cls);
    let flags = [
      (self.trim_title, Rule::TrimTitle),
      (self.trim_volume, Rule::TrimVolume),
      (self.trim_number, Rule::TrimNumber),
      (self.trim_creators, Rule::PruneCreators),
      (self.trim_series, Rule::PruneSeries),
      (self.normalize_related_url, Rule::NormalizeRelatedUrl),
      (self.normalize_publisher, Rule::NormalizePublisher),
      (self.normalize_publication, Rule::NormalizePublication),
      (self.dot_initials, Rule::DotInitials),
    ];
    for (_, rule) in flags.into_iter().filter(|(on, _)| *on) {
      rules.enable(rule);
    }
    debug!("Enabled rules: {:?}", rules.iter().map(|r| r.as_str()).collect::<Vec<_>>());
    config.rule_engine(rules).strict(self.strict || config.strict)
  }
}

/// Reads a whole file, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  match path {
    Some(path) => buf = std::fs::read(path)?,
    None => {
      std::io::stdin().read_to_end(&mut buf)?;
    },
  }
  Ok(buf)
}

/// Serializes `eprints` in `format`.
pub fn render(format: OutputFormat, eprints: &EPrints) -> Result<Vec<u8>> {
  let bytes = match format {
    OutputFormat::Xml => eprints.to_xml()?,
    OutputFormat::Json => eprints.to_json()?,
    OutputFormat::Simplified => simplified_to_json(&simplify(eprints))?,
  };
  Ok(bytes)
}

/// Writes `bytes` to `output`, or stdout when no path is given.
pub fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
  match output {
    Some(path) => {
      std::fs::write(path, bytes)?;
      eprintln!("{} Wrote {}", style(SUCCESS_PREFIX).green(), style(path.display()).yellow());
    },
    None => {
      let mut stdout = std::io::stdout().lock();
      stdout.write_all(bytes)?;
      if !bytes.ends_with(b"\n") {
        stdout.write_all(b"\n")?;
      }
      stdout.flush()?;
    },
  }
  Ok(())
}

/// Reports per-identifier failures of a harvest on stderr.
fn report_failures(failures: &[(String, String)]) {
  for (id, reason) in failures {
    eprintln!("{} {}: {reason}", style(WARNING_PREFIX).yellow(), style(id).yellow());
  }
}
