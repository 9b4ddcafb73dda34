//! Module for converting EPrints documents between formats.

use super::*;

/// Serialization of the document being converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
  /// EPrints XML
  Xml,
  /// JSON mirror of the EPrints XML
  Json,
}

/// Arguments for the convert command
#[derive(Args, Clone)]
pub struct ConvertArgs {
  /// Document to read, stdin when omitted
  pub input: Option<PathBuf>,

  /// Input format
  #[arg(long, value_enum, default_value_t = InputFormat::Xml)]
  pub from: InputFormat,

  /// Write to a file instead of stdout
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
  pub format: OutputFormat,

  /// Apply the Caltech Library rule bundle
  #[arg(long)]
  pub clsrules: bool,

  /// Individual rules to enable
  #[command(flatten)]
  pub rules: RuleFlags,
}

/// Function for the convert command
pub fn convert(config: &Config, args: ConvertArgs) -> Result<()> {
  let src = read_input(args.input.as_deref())?;
  let mut eprints = match args.from {
    InputFormat::Xml => EPrints::from_xml(&src)?,
    InputFormat::Json => EPrints::from_json(&src)?,
  };
  debug!("Converting {} record(s)", eprints.len());

  let engine = args.rules.engine(config, args.clsrules);
  if !engine.rules().is_empty() {
    eprints = engine.apply(eprints)?;
  }

  write_output(&render(args.format, &eprints)?, args.output.as_deref())
}
