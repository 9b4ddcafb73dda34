//! Tag and entity stripping for free-text fields.
//!
//! Titles and abstracts from CrossRef often carry JATS or HTML markup, either
//! literally (`<jats:p>`) or entity encoded (`&lt;jats:p&gt;`). These helpers
//! detect and remove it. This is a lightweight heuristic: it expects
//! well-formed, non-nested tags and makes no attempt at full HTML parsing.
//!
//! # Examples
//!
//! ```
//! use eprinttools::cleaner::{has_encoded_elements, strip_tags};
//!
//! let text = "&lt;jt&gt;This is a jats thing&lt;/jt&gt;";
//! assert!(has_encoded_elements(text));
//! assert_eq!(strip_tags(text), "This is a jats thing");
//! ```

use super::*;

lazy_static! {
  static ref OPEN_TAG: Regex = Regex::new(r"<([^/>]+)/*>").unwrap();
  static ref CLOSE_TAG: Regex = Regex::new(r"</([^/>]+)/*>").unwrap();
  static ref ENTITY: Regex = Regex::new(r"&\w+;").unwrap();
}

/// Entities decoded before tags are removed. `&amp;` goes last so that
/// double-encoded markup is decoded exactly one level.
const ENTITIES: [(&str, &str); 4] = [("&lt;", "<"), ("&gt;", ">"), ("&copy;", "©"), ("&amp;", "&")];

/// Reports whether `text` contains an entity reference, an opening tag or a
/// closing tag.
pub fn has_encoded_elements(text: &str) -> bool {
  ENTITY.is_match(text) || OPEN_TAG.is_match(text) || CLOSE_TAG.is_match(text)
}

/// Decodes the common entities and removes opening and closing tags, keeping
/// the text between them.
///
/// Text without markup is returned unchanged.
pub fn strip_tags(text: &str) -> String {
  let decoded = ENTITIES.iter().fold(text.to_string(), |acc, (entity, replacement)| {
    if acc.contains(entity) {
      acc.replace(entity, replacement)
    } else {
      acc
    }
  });
  let without_close = CLOSE_TAG.replace_all(&decoded, "");
  let stripped = OPEN_TAG.replace_all(&without_close, "").into_owned();
  if stripped != text {
    trace!("Stripped markup: {text:?} -> {stripped:?}");
  }
  stripped
}
