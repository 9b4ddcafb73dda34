//! Module for reading a record back from the record store.

use super::*;

/// Arguments for the get command
#[derive(Args, Clone)]
pub struct GetArgs {
  /// Key of the record: a DOI for DOI harvests, the eprint id otherwise
  pub key: String,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
  pub format: OutputFormat,
}

/// Function for the get command
///
/// JSON output is the single record rather than a one-element collection.
pub async fn get(store: &Path, args: GetArgs) -> Result<()> {
  if !store.exists() {
    return Err(EputilError::Usage(format!("No record store at {}", store.display())));
  }

  let db = Database::open(store).await?;
  let eprint = db.get(&args.key).await?.ok_or_else(|| EPrintsError::NotFound(args.key.clone()))?;
  trace!("Found {} in {}", eprint.label(), store.display());

  let bytes = match args.format {
    OutputFormat::Json => serde_json::to_vec_pretty(&eprint)?,
    OutputFormat::Simplified => serde_json::to_vec_pretty(&SimplifiedRecord::from(&eprint))?,
    OutputFormat::Xml => {
      let mut eprints = EPrints::new();
      eprints.append(eprint);
      eprints.to_xml()?
    },
  };
  write_output(&bytes, None)
}
