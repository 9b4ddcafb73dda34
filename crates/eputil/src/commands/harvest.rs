//! Module for harvesting EPrints records into the record store.

use super::*;

/// Arguments for the harvest command
#[derive(Args, Clone)]
pub struct HarvestArgs {
  /// EPrint ids to harvest
  #[arg(required = true)]
  pub ids: Vec<u64>,

  /// Base URL of the EPrints repository, overrides the configuration
  #[arg(long)]
  pub eprints_url: Option<String>,

  /// Apply the Caltech Library rule bundle before storing
  #[arg(long)]
  pub clsrules: bool,

  /// Individual rules to enable
  #[command(flatten)]
  pub rules: RuleFlags,
}

/// Function for the harvest command
pub async fn harvest(config: &Config, store: &Path, args: HarvestArgs) -> Result<()> {
  let mut api = config.api.clone();
  if let Some(url) = args.eprints_url.clone() {
    api.eprints_url = url;
  }

  let engine = args.rules.engine(config, args.clsrules);
  let db = Database::open(store).await?;
  let harvester = Harvester::new(HttpClient::new(api)?, db, engine);

  eprintln!(
    "{} Harvesting {} record(s) into {}",
    style(INFO_PREFIX).cyan(),
    args.ids.len(),
    style(store.display()).yellow()
  );
  let report = harvester.harvest_eprint_ids(&args.ids).await?;
  report_failures(&report.failures);
  if report.eprints.is_empty() {
    return Err(EputilError::NothingFound);
  }

  eprintln!(
    "{} Harvested {} of {} record(s)",
    style(SUCCESS_PREFIX).green(),
    style(report.eprints.len()).green().bold(),
    args.ids.len()
  );
  Ok(())
}
