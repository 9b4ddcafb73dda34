//! Module for stripping markup from text.

use super::*;

/// Arguments for the strip command
#[derive(Args, Clone)]
pub struct StripArgs {
  /// Text to clean, read from stdin when omitted
  pub text: Option<String>,
}

/// Function for the strip command
///
/// Tags are removed whether literal (`<i>`) or entity encoded (`&lt;i&gt;`).
pub fn strip(args: StripArgs) -> Result<()> {
  let text = match args.text {
    Some(text) => text,
    None => String::from_utf8_lossy(&read_input(None)?).into_owned(),
  };
  println!("{}", eprinttools::cleaner::strip_tags(text.trim_end_matches(['\n', '\r'])));
  Ok(())
}
