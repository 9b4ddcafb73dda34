//! CrossRef works JSON to [`EPrint`].
//!
//! Handles the `/works/{doi}` response of the CrossRef REST API. Only the
//! fields that map onto an EPrint are decoded; everything else in the payload
//! is ignored.

use super::*;
use crate::doi::doi_url;

/// Response envelope of the works endpoint.
#[derive(Debug, Deserialize)]
struct WorksEnvelope {
  message: Option<Work>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Work {
  #[serde(rename = "DOI")]
  doi:                   Option<String>,
  #[serde(rename = "type")]
  work_type:             Option<String>,
  title:                 Option<Vec<String>>,
  publisher:             Option<String>,
  container_title:       Option<Vec<String>>,
  short_container_title: Option<Vec<String>>,
  volume:                Option<String>,
  journal_issue:         Option<JournalIssue>,
  publisher_location:    Option<String>,
  page:                  Option<String>,
  #[serde(rename = "ISBN")]
  isbn:                  Option<Vec<String>>,
  #[serde(rename = "ISSN")]
  issn:                  Option<Vec<String>>,
  funder:                Option<Vec<Funder>>,
  update_to:             Option<Vec<Update>>,
  link:                  Option<Vec<Link>>,
  published_print:       Option<PartialDate>,
  issued:                Option<PartialDate>,
  created:               Option<PartialDate>,
  author:                Option<Vec<Contributor>>,
  editor:                Option<Vec<Contributor>>,
  #[serde(rename = "abstract")]
  abstract_text:         Option<String>,
  edition_number:        Option<String>,
  subject:               Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct JournalIssue {
  issue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Funder {
  name:  Option<String>,
  award: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Update {
  #[serde(rename = "DOI")]
  doi:     Option<String>,
  label:   Option<String>,
  updated: Option<PartialDate>,
}

#[derive(Debug, Deserialize)]
struct Link {
  #[serde(rename = "URL")]
  url:       Option<String>,
  #[serde(rename = "type")]
  link_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Contributor {
  #[serde(rename = "ORCID")]
  orcid:  Option<String>,
  family: Option<String>,
  given:  Option<String>,
  name:   Option<String>,
}

/// CrossRef date object, carrying `date-parts` and sometimes a `date-time`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PartialDate {
  date_parts: Option<Vec<Vec<Option<i64>>>>,
  date_time:  Option<String>,
}

impl PartialDate {
  /// `YYYY`, `YYYY-MM` or `YYYY-MM-DD` from the first `date-parts` entry.
  fn date_from_parts(&self) -> Option<String> {
    let parts = self.date_parts.as_ref()?.first()?;
    let parts: Vec<String> = parts
      .iter()
      .map_while(|part| *part)
      .enumerate()
      .map(|(i, n)| if i == 0 { format!("{n:04}") } else { format!("{n:02}") })
      .collect();
    (!parts.is_empty()).then(|| parts.join("-"))
  }

  /// The first ten characters of `date-time`.
  fn date_from_date_time(&self) -> Option<String> {
    self.date_time.as_deref().map(|dt| dt.chars().take(10).collect())
  }

  fn to_date(&self) -> Option<String> {
    self.date_from_parts().or_else(|| self.date_from_date_time())
  }
}

fn first(list: &Option<Vec<String>>) -> Option<&str> {
  list.as_ref().and_then(|l| l.first()).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|s| !s.is_empty() && *s != "N/A")
}

fn to_person(contributor: &Contributor) -> Option<Item> {
  let family = present(&contributor.family)?;
  let mut item = Item::person(family, present(&contributor.given).unwrap_or_default());
  if let Some(orcid) = present(&contributor.orcid) {
    item.orcid = strip_orcid(orcid);
  }
  Some(item)
}

/// Converts a CrossRef works response into an [`EPrint`].
///
/// Accepts the full API envelope (`{"status": "ok", "message": {...}}`) or a
/// bare works object.
///
/// # Errors
///
/// - [`EPrintsError::Json`] when `src` is not JSON of the expected shape
/// - [`EPrintsError::MissingField`] when the work has no title or DOI
///
/// # Examples
///
/// ```
/// use eprinttools::crosswalk::crossref_works_to_eprint;
///
/// let src = br#"{"message": {
///   "DOI": "10.1093/mnras/stab2505",
///   "type": "journal-article",
///   "title": ["A survey"],
///   "container-title": ["Monthly Notices of the Royal Astronomical Society"]
/// }}"#;
/// let eprint = crossref_works_to_eprint(src).unwrap();
/// assert_eq!(eprint.eprint_type, "article");
/// assert_eq!(eprint.publication, "Monthly Notices of the Royal Astronomical Society");
/// ```
pub fn crossref_works_to_eprint(src: &[u8]) -> Result<EPrint> {
  let value: serde_json::Value = serde_json::from_slice(src)?;
  let work: Work = if value.get("message").is_some() {
    serde_json::from_value::<WorksEnvelope>(value)?.message.unwrap_or_default()
  } else {
    serde_json::from_value(value)?
  };

  let title = first(&work.title).ok_or(EPrintsError::MissingField("title"))?;
  let doi = present(&work.doi).ok_or(EPrintsError::MissingField("doi"))?;
  debug!("Crosswalking CrossRef work {doi}");

  let mut eprint = EPrint {
    eprint_type: work.work_type.as_deref().map(normalize_eprint_type).unwrap_or_default(),
    title: title.to_string(),
    doi: doi.to_string(),
    ispublished: "pub".to_string(),
    ..EPrint::default()
  };
  let is_article = eprint.eprint_type == "article";
  let is_book = eprint.eprint_type == "book" || eprint.eprint_type == "book_section";

  if let Some(publisher) = present(&work.publisher) {
    eprint.publisher = publisher.to_string();
  }
  if let Some(container) = first(&work.container_title) {
    if is_article {
      eprint.publication = container.to_string();
    } else if is_book {
      eprint.series = container.to_string();
    }
  }
  if let Some(short) = first(&work.short_container_title) {
    eprint.series = short.to_string();
  }
  if is_article {
    if let Some(volume) = present(&work.volume) {
      eprint.volume = volume.to_string();
    }
    if let Some(issue) = work.journal_issue.as_ref().and_then(|ji| present(&ji.issue)) {
      eprint.number = issue.to_string();
    }
  }
  if let Some(place) = present(&work.publisher_location) {
    eprint.place_of_pub = place.to_string();
  }
  if let Some(page) = present(&work.page) {
    eprint.pagerange = page.to_string();
  }
  if let Some(isbn) = first(&work.isbn) {
    eprint.isbn = isbn.to_string();
  }
  if let Some(issn) = first(&work.issn) {
    eprint.issn = issn.to_string();
  }
  if eprint.eprint_type == "book" {
    eprint.book_title = eprint.title.clone();
  }
  if let Some(edition) = present(&work.edition_number) {
    eprint.edition = edition.to_string();
  }
  if let Some(abstract_text) = present(&work.abstract_text) {
    eprint.abstract_text = abstract_text.to_string();
  }

  for funder in work.funder.iter().flatten() {
    let agency = present(&funder.name).unwrap_or_default();
    let awards: Vec<&str> = funder
      .award
      .iter()
      .flatten()
      .map(|a| a.trim())
      .filter(|a| !a.is_empty() && *a != "N/A")
      .collect();
    if awards.is_empty() {
      if !agency.is_empty() {
        eprint.funders.push(Item { agency: agency.to_string(), ..Item::default() });
      }
    } else {
      eprint.funders.extend(awards.into_iter().map(|grant_number| Item {
        agency: agency.to_string(),
        grant_number: grant_number.to_string(),
        ..Item::default()
      }));
    }
  }

  for update in work.update_to.iter().flatten() {
    let Some(new_doi) = present(&update.doi) else { continue };
    let when =
      update.updated.as_ref().and_then(PartialDate::date_from_date_time).unwrap_or_default();
    let label = present(&update.label).unwrap_or("Update");
    eprint.related_url.push(Item::related_url(doi_url(new_doi), "doi", format!("{label}, {when}")));
  }

  for link in work.link.iter().flatten() {
    let Some(url) = present(&link.url) else { continue };
    if eprint.related_url.iter().any(|item| item.url == url) {
      continue;
    }
    eprint.related_url.push(Item {
      url: url.to_string(),
      item_type: present(&link.link_type).unwrap_or_default().to_string(),
      ..Item::default()
    });
  }

  eprint.date_type = "published".to_string();
  eprint.date = work
    .published_print
    .as_ref()
    .and_then(PartialDate::to_date)
    .or_else(|| work.issued.as_ref().and_then(PartialDate::to_date))
    .or_else(|| work.created.as_ref().and_then(PartialDate::to_date))
    .unwrap_or_default();
  if eprint.date.is_empty() {
    eprint.date_type.clear();
  }

  for author in work.author.iter().flatten() {
    if let Some(person) = to_person(author) {
      eprint.creators.push(person);
    } else if let Some(name) = present(&author.name) {
      let name = name.trim_start_matches('(').trim_end_matches(')').trim();
      eprint.corp_creators.push(Item::corporate(name));
    }
  }
  eprint.editors.extend(work.editor.iter().flatten().filter_map(to_person));
  eprint.subjects.extend(
    work.subject.iter().flatten().map(|s| s.trim()).filter(|s| !s.is_empty()).map(Item::value),
  );

  trace!("CrossRef work {doi} produced {eprint:?}");
  Ok(eprint)
}
