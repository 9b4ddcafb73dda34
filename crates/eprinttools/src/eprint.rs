//! The canonical EPrint record model.
//!
//! Every source format is crosswalked into an [`EPrint`], normalized by the
//! [`rules`](crate::rules) engine and then serialized from it. Field names
//! follow the EPrints 3.x XML schema, and the JSON mirror uses the same names
//! as keys so that one table of tags drives both serializations.
//!
//! Empty text fields and empty lists are treated as absent: they are skipped
//! when serializing and defaulted when deserializing.
//!
//! # Examples
//!
//! ```
//! use eprinttools::{EPrint, EPrints, Item};
//!
//! let mut eprint = EPrint::default();
//! eprint.title = "Photonic beamforming".to_string();
//! eprint.creators.push(Item::person("Hajimiri", "Ali"));
//!
//! let mut eprints = EPrints::new();
//! eprints.append(eprint);
//! assert_eq!(eprints.len(), 1);
//! ```

use super::*;

/// A personal or corporate name attached to an [`Item`].
///
/// Personal names use `family` and `given`; corporate names carry the whole
/// name in `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
  /// Family name.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub family:     String,
  /// Given name(s).
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub given:      String,
  /// Honorific such as "Dr.".
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub honourific: String,
  /// Lineage such as "Jr.".
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub lineage:    String,
  /// Unstructured name, used for corporate creators.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub value:      String,
}

impl Name {
  /// Whether no part of the name is set.
  pub fn is_empty(&self) -> bool {
    self.family.is_empty()
      && self.given.is_empty()
      && self.honourific.is_empty()
      && self.lineage.is_empty()
      && self.value.is_empty()
  }

  /// Display form, `"Family, Given"` for people and the plain value otherwise.
  pub fn display(&self) -> String {
    match (self.family.is_empty(), self.given.is_empty()) {
      (false, false) => format!("{}, {}", self.family, self.given),
      (false, true) => self.family.clone(),
      (true, false) => self.given.clone(),
      (true, true) => self.value.clone(),
    }
  }
}

/// One entry in a list field.
///
/// EPrints reuses a single `<item>` element for creators, editors, related
/// URLs, funders, subjects and more, so the struct is the union of the fields
/// those lists use. Lists that hold plain values (subjects, groups) use
/// `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  /// Personal or corporate name.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:         Option<Name>,
  /// Local identifier, usually a person id.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub id:           String,
  /// ORCID without the `https://orcid.org/` prefix.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub orcid:        String,
  /// Contact e-mail address.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub email:        String,
  /// Contributor role.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub role:         String,
  /// Target of a related URL.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub url:          String,
  /// Kind of related URL, such as `doi` or `pub`.
  #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
  pub item_type:    String,
  /// Free text description.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description:  String,
  /// Funding agency.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub agency:       String,
  /// Grant or award number.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub grant_number: String,
  /// Subject or concept URI.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub uri:          String,
  /// Research Organization Registry identifier.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub ror:          String,
  /// Plain text content of the item.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub value:        String,
}

impl Item {
  /// A personal name entry.
  pub fn person(family: impl Into<String>, given: impl Into<String>) -> Self {
    Self {
      name: Some(Name { family: family.into(), given: given.into(), ..Name::default() }),
      ..Self::default()
    }
  }

  /// A corporate name entry.
  pub fn corporate(name: impl Into<String>) -> Self {
    Self { name: Some(Name { value: name.into(), ..Name::default() }), ..Self::default() }
  }

  /// A related URL entry.
  pub fn related_url(
    url: impl Into<String>,
    item_type: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      url: url.into(),
      item_type: item_type.into(),
      description: description.into(),
      ..Self::default()
    }
  }

  /// A plain value entry, as used by subjects and groups.
  pub fn value(value: impl Into<String>) -> Self {
    Self { value: value.into(), ..Self::default() }
  }

  /// Text fields of an item in XML output order, `name` excluded.
  pub(crate) fn fields(&self) -> [(&'static str, &str); 12] {
    [
      ("id", self.id.as_str()),
      ("orcid", self.orcid.as_str()),
      ("email", self.email.as_str()),
      ("role", self.role.as_str()),
      ("url", self.url.as_str()),
      ("type", self.item_type.as_str()),
      ("description", self.description.as_str()),
      ("agency", self.agency.as_str()),
      ("grant_number", self.grant_number.as_str()),
      ("uri", self.uri.as_str()),
      ("ror", self.ror.as_str()),
      ("value", self.value.as_str()),
    ]
  }

  /// Mutable access to a text field by its XML tag.
  pub(crate) fn field_mut(&mut self, tag: &str) -> Option<&mut String> {
    Some(match tag {
      "id" => &mut self.id,
      "orcid" => &mut self.orcid,
      "email" => &mut self.email,
      "role" => &mut self.role,
      "url" => &mut self.url,
      "type" => &mut self.item_type,
      "description" => &mut self.description,
      "agency" => &mut self.agency,
      "grant_number" => &mut self.grant_number,
      "uri" => &mut self.uri,
      "ror" => &mut self.ror,
      "value" => &mut self.value,
      _ => return None,
    })
  }

  /// Whether the item carries any data at all.
  pub fn is_empty(&self) -> bool {
    self.name.as_ref().map_or(true, Name::is_empty)
      && self.fields().iter().all(|(_, value)| value.is_empty())
  }
}

/// Declares the text fields of [`EPrint`] once and derives the tag tables
/// used by the XML reader and writer.
macro_rules! eprint_record {
  (
    scalars { $($field:ident => $tag:literal),* $(,)? }
    lists { $($list:ident => $list_tag:literal),* $(,)? }
  ) => {
    /// A single EPrints record.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EPrint {
      /// Repository assigned numeric id.
      #[serde(rename = "eprintid", default, skip_serializing_if = "Option::is_none")]
      pub eprint_id: Option<u64>,
      $(
        #[doc = concat!("The `", $tag, "` field.")]
        #[serde(rename = $tag, default, skip_serializing_if = "String::is_empty")]
        pub $field: String,
      )*
      $(
        #[doc = concat!("The `", $list_tag, "` list.")]
        #[serde(rename = $list_tag, default, skip_serializing_if = "Vec::is_empty")]
        pub $list: Vec<Item>,
      )*
    }

    impl EPrint {
      /// Text fields in XML output order as `(tag, value)` pairs.
      pub fn scalar_fields(&self) -> Vec<(&'static str, &str)> {
        vec![$(($tag, self.$field.as_str())),*]
      }

      /// Mutable access to a text field by its XML tag.
      pub fn scalar_field_mut(&mut self, tag: &str) -> Option<&mut String> {
        match tag {
          $($tag => Some(&mut self.$field),)*
          _ => None,
        }
      }

      /// List fields in XML output order as `(tag, items)` pairs.
      pub fn item_lists(&self) -> Vec<(&'static str, &[Item])> {
        vec![$(($list_tag, self.$list.as_slice())),*]
      }

      /// Mutable access to a list field by its XML tag.
      pub fn item_list_mut(&mut self, tag: &str) -> Option<&mut Vec<Item>> {
        match tag {
          $($list_tag => Some(&mut self.$list),)*
          _ => None,
        }
      }
    }
  };
}

eprint_record! {
  scalars {
    eprint_status => "eprint_status",
    datestamp => "datestamp",
    lastmod => "lastmod",
    eprint_type => "type",
    title => "title",
    ispublished => "ispublished",
    full_text_status => "full_text_status",
    keywords => "keywords",
    note => "note",
    abstract_text => "abstract",
    date => "date",
    date_type => "date_type",
    series => "series",
    publication => "publication",
    volume => "volume",
    number => "number",
    publisher => "publisher",
    place_of_pub => "place_of_pub",
    edition => "edition",
    pagerange => "pagerange",
    pages => "pages",
    id_number => "id_number",
    refereed => "refereed",
    isbn => "isbn",
    issn => "issn",
    book_title => "book_title",
    official_url => "official_url",
    rights => "rights",
    collection => "collection",
    doi => "doi",
    pmcid => "pmcid",
    pmid => "pmid",
  }
  lists {
    creators => "creators",
    corp_creators => "corp_creators",
    editors => "editors",
    contributors => "contributors",
    related_url => "related_url",
    funders => "funders",
    subjects => "subjects",
    local_group => "local_group",
  }
}

impl EPrint {
  /// Identifier used in log messages and rule errors.
  ///
  /// Prefers the DOI, then the id number, then the eprint id.
  pub fn label(&self) -> String {
    if !self.doi.is_empty() {
      self.doi.clone()
    } else if !self.id_number.is_empty() {
      self.id_number.clone()
    } else if let Some(id) = self.eprint_id {
      id.to_string()
    } else if !self.title.is_empty() {
      self.title.chars().take(40).collect()
    } else {
      "<unidentified>".to_string()
    }
  }

  /// Publication date, when the record's date is a publication date.
  pub fn publication_date(&self) -> Option<&str> {
    match self.date_type.as_str() {
      _ if self.date.is_empty() => None,
      "" | "published" => Some(&self.date),
      _ => None,
    }
  }

  /// Keywords split on the separators EPrints uses in the `keywords` field.
  pub fn keyword_list(&self) -> Vec<String> {
    self
      .keywords
      .split([';', ','])
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .map(String::from)
      .collect()
  }
}

/// An ordered collection of [`EPrint`] records.
///
/// This is the unit the rule engine and the output crosswalks work on.
/// Records keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EPrints {
  /// The records, in insertion order.
  #[serde(default)]
  pub eprint: Vec<EPrint>,
}

impl EPrints {
  /// Creates an empty collection.
  pub fn new() -> Self { Self::default() }

  /// Appends a record, returning the new length.
  pub fn append(&mut self, eprint: EPrint) -> usize {
    self.eprint.push(eprint);
    self.eprint.len()
  }

  /// Number of records.
  pub fn len(&self) -> usize { self.eprint.len() }

  /// Whether the collection has no records.
  pub fn is_empty(&self) -> bool { self.eprint.is_empty() }

  /// Iterates over the records in order.
  pub fn iter(&self) -> std::slice::Iter<'_, EPrint> { self.eprint.iter() }
}

impl From<Vec<EPrint>> for EPrints {
  fn from(eprint: Vec<EPrint>) -> Self { Self { eprint } }
}

impl IntoIterator for EPrints {
  type IntoIter = std::vec::IntoIter<EPrint>;
  type Item = EPrint;

  fn into_iter(self) -> Self::IntoIter { self.eprint.into_iter() }
}

impl Display for Name {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.display())
  }
}
