//! Module for looking up DOIs and printing them as EPrints records.

use super::*;

/// Arguments for the doi command
#[derive(Args, Clone)]
pub struct DoiArgs {
  /// DOIs, bare or as doi.org URLs
  pub dois: Vec<String>,

  /// Read DOIs from a file, one per line. Blank lines and lines starting
  /// with `#` are ignored.
  #[arg(short, long)]
  pub input: Option<PathBuf>,

  /// Write to a file instead of stdout
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Xml)]
  pub format: OutputFormat,

  /// Only ask CrossRef
  #[arg(long, conflicts_with = "datacite")]
  pub crossref: bool,

  /// Only ask DataCite
  #[arg(long)]
  pub datacite: bool,

  /// Skip the Caltech Library rule bundle
  #[arg(long)]
  pub no_clsrules: bool,

  /// Individual rules to enable
  #[command(flatten)]
  pub rules: RuleFlags,
}

impl DoiArgs {
  /// DOIs from the command line followed by those in `--input`.
  fn dois(&self) -> Result<Vec<String>> {
    let mut dois = self.dois.clone();
    if let Some(path) = &self.input {
      let content = std::fs::read_to_string(path)?;
      dois.extend(
        content
          .lines()
          .map(str::trim)
          .filter(|line| !line.is_empty() && !line.starts_with('#'))
          .map(String::from),
      );
    }
    Ok(dois)
  }

  /// Registries selected by `--crossref` and `--datacite`.
  fn lookup(&self) -> Lookup {
    match (self.crossref, self.datacite) {
      (true, false) => Lookup::CrossRefOnly,
      (false, true) => Lookup::DataCiteOnly,
      _ => Lookup::Any,
    }
  }
}

/// Function for the doi command
pub async fn doi(config: &Config, args: DoiArgs) -> Result<()> {
  let dois = args.dois()?;
  if dois.is_empty() {
    return Err(EputilError::Usage("No DOIs given, pass them as arguments or with --input".into()));
  }

  let engine = args.rules.engine(config, !args.no_clsrules);
  let harvester = Harvester::new(HttpClient::new(config.api.clone())?, MemoryStore::new(), engine);

  eprintln!("{} Looking up {} DOI(s)", style(INFO_PREFIX).cyan(), dois.len());
  let report = harvester.harvest_dois(&dois, args.lookup()).await?;
  report_failures(&report.failures);
  if report.eprints.is_empty() {
    return Err(EputilError::NothingFound);
  }

  write_output(&render(args.format, &report.eprints)?, args.output.as_deref())?;
  if !report.is_complete() {
    eprintln!(
      "{} {} of {} DOI(s) failed",
      style(WARNING_PREFIX).yellow(),
      report.failures.len(),
      dois.len()
    );
  }
  Ok(())
}
