//! A flattened, one-way projection of [`EPrint`] for downstream consumers.
//!
//! The simplified record drops the EPrints `<item>` nesting in favour of
//! plain agent, URL and funder lists, turns `refereed` into a boolean and
//! provides a ready-made display string of creator names. There is no way
//! back from a [`SimplifiedRecord`] to an [`EPrint`].

use super::*;

/// A person or organization credited on a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
  /// Family name, for people.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub family_name: String,
  /// Given name, for people.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub given_name:  String,
  /// Full name, for organizations.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub name:        String,
  /// ORCID.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub orcid:       String,
  /// Local person or organization id.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub id:          String,
}

/// A related URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedUrl {
  /// Target URL.
  pub url:         String,
  /// Kind of link, e.g. `doi`.
  #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
  pub url_type:    String,
  /// Description of the link.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub description: String,
}

/// A funding acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funder {
  /// Funding agency.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub name:         String,
  /// Grant number.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub grant_number: String,
}

/// Flattened view of an [`EPrint`].
///
/// Fields share the meaning of their [`EPrint`] counterparts.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub eprint_id:        Option<u64>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub id_number:        String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub doi:              String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub record_type:      String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub status:           String,
  pub title:            String,
  #[serde(rename = "abstract", default, skip_serializing_if = "String::is_empty")]
  pub abstract_text:    String,
  /// Creators followed by corporate creators, as `"Family, Given; ..."`.
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub creator_names:    String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub creators:         Vec<Agent>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub corp_creators:    Vec<Agent>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub editors:          Vec<Agent>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub contributors:     Vec<Agent>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub publication:      String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub publisher:        String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub series:           String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub volume:           String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub number:           String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub pages:            String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub issn:             String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub isbn:             String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub publication_date: Option<String>,
  pub refereed:         bool,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub official_url:     String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub related_urls:     Vec<RelatedUrl>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub funders:          Vec<Funder>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub keywords:         Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub subjects:         Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub groups:           Vec<String>,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub collection:       String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub rights:           String,
}

fn agent(item: &Item) -> Agent {
  let name = item.name.clone().unwrap_or_default();
  Agent {
    family_name: name.family,
    given_name:  name.given,
    name:        name.value,
    orcid:       item.orcid.clone(),
    id:          item.id.clone(),
  }
}

fn values(items: &[Item]) -> Vec<String> {
  items.iter().map(|item| item.value.clone()).filter(|v| !v.is_empty()).collect()
}

impl From<&EPrint> for SimplifiedRecord {
  fn from(eprint: &EPrint) -> Self {
    let creator_names = eprint
      .creators
      .iter()
      .chain(&eprint.corp_creators)
      .filter_map(|item| item.name.as_ref().map(Name::display))
      .filter(|name| !name.is_empty())
      .collect::<Vec<_>>()
      .join("; ");

    Self {
      eprint_id: eprint.eprint_id,
      id_number: eprint.id_number.clone(),
      doi: eprint.doi.clone(),
      record_type: eprint.eprint_type.clone(),
      status: eprint.eprint_status.clone(),
      title: eprint.title.clone(),
      abstract_text: eprint.abstract_text.clone(),
      creator_names,
      creators: eprint.creators.iter().map(agent).collect(),
      corp_creators: eprint.corp_creators.iter().map(agent).collect(),
      editors: eprint.editors.iter().map(agent).collect(),
      contributors: eprint.contributors.iter().map(agent).collect(),
      publication: eprint.publication.clone(),
      publisher: eprint.publisher.clone(),
      series: eprint.series.clone(),
      volume: eprint.volume.clone(),
      number: eprint.number.clone(),
      pages: if eprint.pagerange.is_empty() {
        eprint.pages.clone()
      } else {
        eprint.pagerange.clone()
      },
      issn: eprint.issn.clone(),
      isbn: eprint.isbn.clone(),
      publication_date: eprint.publication_date().map(String::from),
      refereed: eprint.refereed.eq_ignore_ascii_case("true")
        || eprint.refereed.eq_ignore_ascii_case("yes"),
      official_url: eprint.official_url.clone(),
      related_urls: eprint
        .related_url
        .iter()
        .filter(|item| !item.url.is_empty())
        .map(|item| RelatedUrl {
          url:         item.url.clone(),
          url_type:    item.item_type.clone(),
          description: item.description.clone(),
        })
        .collect(),
      funders: eprint
        .funders
        .iter()
        .map(|item| Funder { name: item.agency.clone(), grant_number: item.grant_number.clone() })
        .collect(),
      keywords: eprint.keyword_list(),
      subjects: values(&eprint.subjects),
      groups: values(&eprint.local_group),
      collection: eprint.collection.clone(),
      rights: eprint.rights.clone(),
    }
  }
}

/// Projects every record of the collection, in order.
pub fn simplify(eprints: &EPrints) -> Vec<SimplifiedRecord> {
  eprints.iter().map(SimplifiedRecord::from).collect()
}

/// Serializes simplified records as a pretty-printed JSON array.
pub fn simplified_to_json(records: &[SimplifiedRecord]) -> Result<Vec<u8>> {
  Ok(serde_json::to_vec_pretty(records)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> EPrint {
    EPrint {
      eprint_id: Some(85447),
      title: "Co-prime photonic beamforming".into(),
      refereed: "TRUE".into(),
      date: "2022-04-29".into(),
      date_type: "published".into(),
      pagerange: "A66".into(),
      creators: vec![Item::person("Khachaturian", "Aroutin"), Item::person("Fatemi", "Reza")],
      corp_creators: vec![Item::corporate("Caltech Photonics Lab")],
      related_url: vec![
        Item::related_url("https://doi.org/10.1364/prj.437518", "doi", "Article"),
        Item::related_url("", "pub", "empty links are dropped"),
      ],
      funders: vec![Item { agency: "NSF".into(), grant_number: "1234".into(), ..Item::default() }],
      subjects: vec![Item::value("optics")],
      ..EPrint::default()
    }
  }

  #[test]
  fn test_simplify_record() {
    let record = SimplifiedRecord::from(&sample());
    assert_eq!(record.creator_names, "Khachaturian, Aroutin; Fatemi, Reza; Caltech Photonics Lab");
    assert_eq!(record.creators[1].family_name, "Fatemi");
    assert_eq!(record.corp_creators[0].name, "Caltech Photonics Lab");
    assert!(record.refereed);
    assert_eq!(record.publication_date.as_deref(), Some("2022-04-29"));
    assert_eq!(record.pages, "A66");
    assert_eq!(record.related_urls.len(), 1);
    assert_eq!(record.related_urls[0].description, "Article");
    assert_eq!(record.funders[0].grant_number, "1234");
    assert_eq!(record.subjects, vec!["optics"]);
  }

  #[test]
  fn test_simplify_keeps_order_and_json_shape() {
    let mut eprints = EPrints::new();
    eprints.append(sample());
    eprints.append(EPrint { title: "Second".into(), ..EPrint::default() });
    let records = simplify(&eprints);
    assert_eq!(records.len(), 2);
    assert!(!records[1].refereed);

    let json: serde_json::Value =
      serde_json::from_slice(&simplified_to_json(&records).unwrap()).unwrap();
    assert_eq!(json[0]["related_urls"][0]["type"], "doi");
    assert_eq!(json[1]["title"], "Second");
    assert_eq!(json[1]["refereed"], false);
    assert!(json[1].get("creators").is_none());
  }
}
