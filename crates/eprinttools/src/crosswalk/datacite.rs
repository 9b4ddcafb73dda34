//! DataCite works JSON to [`EPrint`].
//!
//! A DataCite works record carries metadata twice: as JSON attributes and as
//! a base64 encoded DataCite kernel XML document in `attributes.xml`. Both are
//! decoded and merged:
//!
//! | field                    | winner                              |
//! |--------------------------|-------------------------------------|
//! | title, creators          | JSON, XML fills gaps                |
//! | publisher                | JSON, XML fills gaps                |
//! | date, date_type          | XML (`Issued`, then publicationYear) |
//! | issn, related URLs       | XML                                 |
//! | series                   | XML (`SeriesInformation`)           |
//! | abstract                 | JSON, XML `Abstract` fills gaps     |
//! | ORCIDs                   | XML, matched to creators by family  |

use base64::{engine::general_purpose::STANDARD, Engine};
use quick_xml::{
  events::{BytesStart, Event},
  Reader,
};

use super::*;
use crate::doi::{doi_url, normalize_doi};

/// Relation types whose targets are citations rather than related works.
const CITATION_RELATIONS: [&str; 4] = ["References", "Cites", "IsCitedBy", "IsReferencedBy"];

/// Name particles that belong to the family name.
const NAME_PARTICLES: [&str; 6] = ["de", "van", "von", "der", "del", "da"];

#[derive(Debug, Deserialize)]
struct Envelope {
  data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
  attributes: Option<Attributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Attributes {
  doi:                   Option<String>,
  identifier:            Option<String>,
  title:                 Option<String>,
  titles:                Option<Vec<TitleEntry>>,
  author:                Option<Vec<Author>>,
  publisher:             Option<Publisher>,
  container_title:       Option<String>,
  description:           Option<String>,
  published:             Option<serde_json::Value>,
  #[serde(rename = "publicationYear")]
  publication_year:      Option<serde_json::Value>,
  resource_type_id:      Option<String>,
  resource_type_subtype: Option<String>,
  types:                 Option<Types>,
  url:                   Option<String>,
  xml:                   Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleEntry {
  title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Types {
  resource_type_general: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Author {
  literal: Option<String>,
  family:  Option<String>,
  given:   Option<String>,
}

/// Older records give the publisher as a string, newer ones as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Publisher {
  Name(String),
  Object { name: Option<String> },
}

impl Publisher {
  fn name(&self) -> Option<&str> {
    let name = match self {
      Publisher::Name(name) => Some(name.as_str()),
      Publisher::Object { name } => name.as_deref(),
    };
    name.map(str::trim).filter(|name| !name.is_empty())
  }
}

/// A creator from the kernel XML.
#[derive(Debug, Default)]
struct XmlCreator {
  name:   String,
  given:  String,
  family: String,
  orcid:  String,
}

/// A related identifier from the kernel XML.
#[derive(Debug, Default)]
struct RelatedIdentifier {
  identifier_type: String,
  relation_type:   String,
  value:           String,
}

/// The parts of a DataCite kernel XML document the crosswalk uses.
#[derive(Debug, Default)]
struct Resource {
  identifier:            String,
  titles:                Vec<String>,
  creators:              Vec<XmlCreator>,
  publisher:             String,
  publication_year:      String,
  issued:                String,
  resource_type_general: String,
  related:               Vec<RelatedIdentifier>,
  descriptions:          Vec<(String, String)>,
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn value_text(value: &Option<serde_json::Value>) -> Option<String> {
  match value.as_ref()? {
    serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    serde_json::Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Splits a name literal into family and given names.
///
/// `"Family, Given"` splits on the comma. Otherwise the last word is the
/// family name, together with a preceding particle such as "van". A single
/// word is taken as a corporate name.
fn name_from_literal(literal: &str) -> Option<Item> {
  let literal = literal.trim();
  if let Some((family, given)) = literal.split_once(',') {
    return Some(Item::person(family.trim(), given.trim()));
  }
  let words: Vec<&str> = literal.split_whitespace().collect();
  match words.len() {
    0 => None,
    1 => Some(Item::corporate(literal)),
    n => {
      let mut split = n - 1;
      while split > 1 && NAME_PARTICLES.contains(&words[split - 1].to_lowercase().as_str()) {
        split -= 1;
      }
      Some(Item::person(words[split..].join(" "), words[..split].join(" ")))
    },
  }
}

fn author_to_item(author: &Author) -> Option<Item> {
  if let Some(literal) = present(&author.literal) {
    return name_from_literal(literal);
  }
  let family = present(&author.family);
  let given = present(&author.given);
  (family.is_some() || given.is_some())
    .then(|| Item::person(family.unwrap_or_default(), given.unwrap_or_default()))
}

fn attributes(start: &BytesStart) -> Result<HashMap<String, String>> {
  let mut attrs = HashMap::new();
  for attr in start.attributes() {
    let attr = attr.map_err(EPrintsError::xml)?;
    let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
    let value = attr.unescape_value().map_err(EPrintsError::xml)?;
    attrs.insert(key, value.into_owned());
  }
  Ok(attrs)
}

/// Parses a DataCite kernel XML document.
fn parse_resource(xml: &[u8]) -> Result<Resource> {
  let mut reader = Reader::from_reader(xml);
  let mut resource = Resource::default();
  let mut path: Vec<String> = Vec::new();
  let mut attrs_stack: Vec<HashMap<String, String>> = Vec::new();
  let mut text = String::new();

  loop {
    match reader.read_event().map_err(EPrintsError::xml)? {
      Event::Start(e) => {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
        if name == "creator" {
          resource.creators.push(XmlCreator::default());
        }
        attrs_stack.push(attributes(&e)?);
        path.push(name);
        text.clear();
      },
      Event::Text(e) => text.push_str(&e.unescape().map_err(EPrintsError::xml)?),
      Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
      Event::End(_) => {
        let attrs = attrs_stack.pop().unwrap_or_default();
        let value = text.trim().to_string();
        text.clear();
        let tags: Vec<&str> = path.iter().map(String::as_str).collect();
        match tags.as_slice() {
          [.., "resource", "identifier"] => resource.identifier = value,
          [.., "titles", "title"] if !attrs.contains_key("titleType") =>
            resource.titles.push(value),
          [.., "resource", "publisher"] => resource.publisher = value,
          [.., "resource", "publicationYear"] => resource.publication_year = value,
          [.., "resource", "resourceType"] =>
            if let Some(general) = attrs.get("resourceTypeGeneral") {
              resource.resource_type_general = general.clone();
            },
          [.., "dates", "date"] if attrs.get("dateType").map(String::as_str) == Some("Issued") =>
            resource.issued = value,
          [.., "relatedIdentifiers", "relatedIdentifier"] =>
            resource.related.push(RelatedIdentifier {
              identifier_type: attrs.get("relatedIdentifierType").cloned().unwrap_or_default(),
              relation_type: attrs.get("relationType").cloned().unwrap_or_default(),
              value,
            }),
          [.., "descriptions", "description"] => resource.descriptions.push((
            attrs.get("descriptionType").cloned().unwrap_or_default(),
            value,
          )),
          [.., "creator", field] =>
            if let Some(creator) = resource.creators.last_mut() {
              match *field {
                "creatorName" => creator.name = value,
                "givenName" => creator.given = value,
                "familyName" => creator.family = value,
                "nameIdentifier"
                  if attrs
                    .get("nameIdentifierScheme")
                    .is_some_and(|scheme| scheme.eq_ignore_ascii_case("ORCID")) =>
                  creator.orcid = strip_orcid(&value),
                _ => {},
              }
            },
          _ => {},
        }
        path.pop();
      },
      Event::Eof => break,
      _ => {},
    }
  }

  trace!("Parsed DataCite resource {resource:?}");
  Ok(resource)
}

impl XmlCreator {
  fn to_item(&self) -> Option<Item> {
    let mut item = if !self.family.is_empty() {
      Item::person(&self.family, &self.given)
    } else {
      name_from_literal(&self.name)?
    };
    item.orcid = self.orcid.clone();
    Some(item)
  }
}

/// Copies ORCIDs from the kernel XML onto JSON creators that lack one.
///
/// A creator matches the XML creator with the same family and given name.
/// Failing that it matches the XML creator at the same position when both
/// lists have the same length and the family names agree, and then the only
/// XML creator with its family name.
fn attach_orcids(creators: &mut [Item], xml: &[XmlCreator]) {
  let names: Vec<(String, String)> = xml
    .iter()
    .map(|x| {
      x.to_item().and_then(|item| item.name).map(|n| (n.family, n.given)).unwrap_or_default()
    })
    .collect();
  let same_length = creators.len() == xml.len();

  for (position, creator) in creators.iter_mut().enumerate() {
    let Some(name) = creator.name.as_ref() else { continue };
    if !creator.orcid.is_empty() || name.family.is_empty() {
      continue;
    }
    let same_family = |i: &usize| names[*i].0.eq_ignore_ascii_case(&name.family);
    let by_name = (0..xml.len())
      .filter(same_family)
      .find(|&i| names[i].1.eq_ignore_ascii_case(&name.given));
    let by_position = Some(position).filter(|i| same_length && same_family(i));
    let by_family = {
      let mut candidates = (0..xml.len()).filter(same_family);
      match (candidates.next(), candidates.next()) {
        (Some(only), None) => Some(only),
        _ => None,
      }
    };
    if let Some(matched) = by_name.or(by_position).or(by_family).map(|i| &xml[i]) {
      if !matched.orcid.is_empty() {
        creator.orcid = matched.orcid.clone();
      }
    }
  }
}

/// Converts a DataCite works response into an [`EPrint`].
///
/// Accepts the `{"data": {"attributes": {...}}}` envelope or a bare
/// attributes object. When `attributes.xml` is present it is base64 decoded
/// and merged as described in the [module documentation](self).
///
/// # Errors
///
/// - [`EPrintsError::Json`] when `src` is not JSON of the expected shape
/// - [`EPrintsError::Base64`] or [`EPrintsError::Xml`] for a broken `xml` attribute
/// - [`EPrintsError::MissingField`] when neither source yields a title or DOI
pub fn datacite_works_to_eprint(src: &[u8]) -> Result<EPrint> {
  let value: serde_json::Value = serde_json::from_slice(src)?;
  let attrs: Attributes = if value.get("data").is_some() {
    serde_json::from_value::<Envelope>(value)?
      .data
      .and_then(|data| data.attributes)
      .unwrap_or_default()
  } else {
    serde_json::from_value(value)?
  };

  let resource = match present(&attrs.xml) {
    Some(encoded) => {
      let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
      parse_resource(&STANDARD.decode(compact)?)?
    },
    None => Resource::default(),
  };

  let title = present(&attrs.title)
    .map(String::from)
    .or_else(|| {
      attrs.titles.iter().flatten().find_map(|t| present(&t.title)).map(String::from)
    })
    .or_else(|| resource.titles.first().filter(|t| !t.is_empty()).cloned())
    .ok_or(EPrintsError::MissingField("title"))?;

  let doi = present(&attrs.doi)
    .or_else(|| (!resource.identifier.is_empty()).then_some(resource.identifier.as_str()))
    .or_else(|| present(&attrs.identifier))
    .ok_or(EPrintsError::MissingField("doi"))?;
  let doi = normalize_doi(doi).unwrap_or_else(|_| doi.to_string());
  debug!("Crosswalking DataCite work {doi}");

  let mut resource_type = present(&attrs.resource_type_id).unwrap_or_default();
  if resource_type == "text" {
    resource_type = present(&attrs.resource_type_subtype).unwrap_or(resource_type);
  }
  if resource_type.is_empty() {
    resource_type = attrs
      .types
      .as_ref()
      .and_then(|t| present(&t.resource_type_general))
      .unwrap_or(resource.resource_type_general.as_str());
  }

  let mut eprint = EPrint {
    eprint_type: normalize_eprint_type(resource_type),
    title,
    doi,
    ..EPrint::default()
  };

  eprint.publisher = attrs
    .publisher
    .as_ref()
    .and_then(Publisher::name)
    .unwrap_or(resource.publisher.as_str())
    .to_string();
  if let Some(container) = present(&attrs.container_title) {
    eprint.publication = container.to_string();
  }

  let date = [&resource.issued, &resource.publication_year]
    .into_iter()
    .find(|d| !d.is_empty())
    .cloned()
    .or_else(|| value_text(&attrs.published))
    .or_else(|| value_text(&attrs.publication_year));
  if let Some(date) = date {
    eprint.date = date;
    eprint.date_type = "published".to_string();
  }

  eprint.creators = attrs.author.iter().flatten().filter_map(author_to_item).collect();
  if eprint.creators.is_empty() {
    eprint.creators = resource.creators.iter().filter_map(XmlCreator::to_item).collect();
  } else {
    attach_orcids(&mut eprint.creators, &resource.creators);
  }
  // Corporate names parsed from literals belong in corp_creators.
  let (people, corporate): (Vec<Item>, Vec<Item>) = std::mem::take(&mut eprint.creators)
    .into_iter()
    .partition(|item| item.name.as_ref().map_or(true, |n| n.value.is_empty()));
  eprint.creators = people;
  eprint.corp_creators = corporate;

  if let Some(description) = present(&attrs.description) {
    eprint.abstract_text = description.to_string();
  }
  for (description_type, text) in &resource.descriptions {
    match description_type.as_str() {
      "SeriesInformation" if eprint.series.is_empty() => eprint.series = text.clone(),
      "Abstract" if eprint.abstract_text.is_empty() => eprint.abstract_text = text.clone(),
      _ => {},
    }
  }

  for related in &resource.related {
    if related.value.is_empty() || CITATION_RELATIONS.contains(&related.relation_type.as_str()) {
      continue;
    }
    match related.identifier_type.as_str() {
      "ISSN" if related.relation_type == "IsPartOf" && eprint.issn.is_empty() =>
        eprint.issn = related.value.clone(),
      "DOI" => eprint.related_url.push(Item::related_url(
        doi_url(&related.value),
        "doi",
        related.relation_type.as_str(),
      )),
      "URL" => eprint.related_url.push(Item::related_url(
        related.value.as_str(),
        "",
        related.relation_type.as_str(),
      )),
      _ => {},
    }
  }
  if let Some(url) = present(&attrs.url) {
    if !eprint.related_url.iter().any(|item| item.url == url) {
      eprint.related_url.push(Item { url: url.to_string(), ..Item::default() });
    }
  }

  trace!("DataCite work {} produced {eprint:?}", eprint.doi);
  Ok(eprint)
}
