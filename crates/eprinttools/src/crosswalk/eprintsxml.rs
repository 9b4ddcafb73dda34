//! EPrints XML reading and writing.
//!
//! The layout is the one produced by the EPrints REST API:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <eprints xmlns="http://eprints.org/ep2/data/2.0">
//!   <eprint>
//!     <eprintid>1234</eprintid>
//!     <title>...</title>
//!     <creators>
//!       <item>
//!         <name><family>...</family><given>...</given></name>
//!         <orcid>...</orcid>
//!       </item>
//!     </creators>
//!   </eprint>
//! </eprints>
//! ```
//!
//! Both directions go through the tag tables on [`EPrint`], so any field the
//! model knows is read and written, and unknown elements are skipped.

use quick_xml::{
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
  Reader, Writer,
};

use super::*;

/// Namespace of the EPrints 2.0 data format.
pub const EPRINTS_NAMESPACE: &str = "http://eprints.org/ep2/data/2.0";

const NAME_PARTS: [&str; 4] = ["family", "given", "honourific", "lineage"];

impl EPrints {
  /// Parses an EPrints XML document.
  ///
  /// Accepts an `<eprints>` document with any number of `<eprint>` records or
  /// a single bare `<eprint>`.
  ///
  /// # Errors
  ///
  /// Returns [`EPrintsError::Xml`] for malformed XML.
  ///
  /// # Examples
  ///
  /// ```
  /// use eprinttools::EPrints;
  ///
  /// let xml = br#"<eprints><eprint><eprintid>7</eprintid><title>Hi</title></eprint></eprints>"#;
  /// let eprints = EPrints::from_xml(xml).unwrap();
  /// assert_eq!(eprints.eprint[0].eprint_id, Some(7));
  /// assert_eq!(eprints.eprint[0].title, "Hi");
  /// ```
  pub fn from_xml(src: &[u8]) -> Result<Self> {
    let mut reader = Reader::from_reader(src);
    let mut eprints = EPrints::new();
    let mut current: Option<EPrint> = None;
    // Element names below the current <eprint>.
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
      match reader.read_event().map_err(EPrintsError::xml)? {
        Event::Start(e) => {
          let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
          text.clear();
          if current.is_none() {
            if name == "eprint" {
              current = Some(EPrint::default());
            }
            continue;
          }
          if let (Some(eprint), [list]) = (current.as_mut(), path.as_slice()) {
            if name == "item" {
              if let Some(items) = eprint.item_list_mut(list) {
                items.push(Item::default());
              }
            }
          }
          path.push(name);
        },
        Event::Text(e) => text.push_str(&e.unescape().map_err(EPrintsError::xml)?),
        Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
        Event::End(_) => {
          let value = text.trim().to_string();
          text.clear();
          if current.is_none() {
            continue;
          }
          if path.is_empty() {
            if let Some(done) = current.take() {
              eprints.append(done);
            }
            continue;
          }
          if let Some(eprint) = current.as_mut() {
            if !value.is_empty() {
              assign(eprint, &path, value)?;
            }
          }
          path.pop();
        },
        Event::Eof => break,
        _ => {},
      }
    }

    debug!("Read {} eprint(s) from XML", eprints.len());
    Ok(eprints)
  }

  /// Serializes the collection as indented EPrints XML.
  ///
  /// Empty fields and empty lists are omitted.
  pub fn to_xml(&self) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
      .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
      .map_err(EPrintsError::xml)?;
    writer
      .write_event(Event::Start(
        BytesStart::new("eprints").with_attributes([("xmlns", EPRINTS_NAMESPACE)]),
      ))
      .map_err(EPrintsError::xml)?;
    for eprint in &self.eprint {
      write_eprint(&mut writer, eprint)?;
    }
    writer.write_event(Event::End(BytesEnd::new("eprints"))).map_err(EPrintsError::xml)?;

    let mut xml = writer.into_inner();
    xml.push(b'\n');
    Ok(xml)
  }
}

/// Stores the text of the element at `path` (relative to `<eprint>`).
fn assign(eprint: &mut EPrint, path: &[String], value: String) -> Result<()> {
  let tags: Vec<&str> = path.iter().map(String::as_str).collect();
  match tags.as_slice() {
    ["eprintid"] => {
      let id = value
        .parse()
        .map_err(|_| EPrintsError::Xml(format!("eprintid is not a number: {value:?}")))?;
      eprint.eprint_id = Some(id);
    },
    [tag] =>
      if let Some(field) = eprint.scalar_field_mut(tag) {
        *field = value;
      } else {
        trace!("Skipping unknown EPrint field <{tag}>");
      },
    [list, "item"] =>
      if let Some(item) = last_item(eprint, list) {
        item.value = value;
      },
    [list, "item", "name"] =>
      if let Some(item) = last_item(eprint, list) {
        item.name.get_or_insert_with(Name::default).value = value;
      },
    [list, "item", "name", part] =>
      if let Some(item) = last_item(eprint, list) {
        let name = item.name.get_or_insert_with(Name::default);
        match *part {
          "family" => name.family = value,
          "given" => name.given = value,
          "honourific" => name.honourific = value,
          "lineage" => name.lineage = value,
          _ => {},
        }
      },
    [list, "item", field] =>
      if let Some(slot) = last_item(eprint, list).and_then(|item| item.field_mut(field)) {
        *slot = value;
      },
    _ => {},
  }
  Ok(())
}

fn last_item<'a>(eprint: &'a mut EPrint, list: &str) -> Option<&'a mut Item> {
  eprint.item_list_mut(list).and_then(|items| items.last_mut())
}

fn write_text<W: std::io::Write>(writer: &mut Writer<W>, tag: &str, value: &str) -> Result<()> {
  if value.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new(tag))).map_err(EPrintsError::xml)?;
  writer.write_event(Event::Text(BytesText::new(value))).map_err(EPrintsError::xml)?;
  writer.write_event(Event::End(BytesEnd::new(tag))).map_err(EPrintsError::xml)?;
  Ok(())
}

fn write_start<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
  writer.write_event(Event::Start(BytesStart::new(tag))).map_err(EPrintsError::xml)?;
  Ok(())
}

fn write_end<W: std::io::Write>(writer: &mut Writer<W>, tag: &str) -> Result<()> {
  writer.write_event(Event::End(BytesEnd::new(tag))).map_err(EPrintsError::xml)?;
  Ok(())
}

fn write_eprint<W: std::io::Write>(writer: &mut Writer<W>, eprint: &EPrint) -> Result<()> {
  write_start(writer, "eprint")?;
  if let Some(id) = eprint.eprint_id {
    write_text(writer, "eprintid", &id.to_string())?;
  }
  for (tag, value) in eprint.scalar_fields() {
    write_text(writer, tag, value)?;
  }
  for (tag, items) in eprint.item_lists() {
    if items.is_empty() {
      continue;
    }
    write_start(writer, tag)?;
    for item in items {
      write_item(writer, item)?;
    }
    write_end(writer, tag)?;
  }
  write_end(writer, "eprint")
}

fn write_item<W: std::io::Write>(writer: &mut Writer<W>, item: &Item) -> Result<()> {
  let only_value =
    item.name.is_none() && item.fields().iter().all(|(tag, v)| *tag == "value" || v.is_empty());
  if only_value {
    return write_text(writer, "item", &item.value);
  }

  write_start(writer, "item")?;
  if let Some(name) = item.name.as_ref().filter(|n| !n.is_empty()) {
    let parts = [&name.family, &name.given, &name.honourific, &name.lineage];
    if parts.iter().all(|p| p.is_empty()) {
      write_text(writer, "name", &name.value)?;
    } else {
      write_start(writer, "name")?;
      for (tag, value) in NAME_PARTS.iter().zip(parts) {
        write_text(writer, tag, value)?;
      }
      write_end(writer, "name")?;
    }
  }
  for (tag, value) in item.fields() {
    write_text(writer, tag, value)?;
  }
  write_end(writer, "item")
}
