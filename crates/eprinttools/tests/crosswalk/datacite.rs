use super::*;

#[traced_test]
#[test]
fn test_datacite_embedded_xml() -> TestResult<()> {
  let eprint = datacite_works_to_eprint(&datacite_fixture())?;

  assert_eq!(eprint.doi, "10.1364/prj.437518");
  assert_eq!(eprint.eprint_type, "article");
  assert!(eprint.title.starts_with("Achieving full grating-lobe-free field of view"));
  assert_eq!(eprint.date, "2022-04-29");
  assert_eq!(eprint.date_type, "published");
  assert_eq!(eprint.issn, "2327-9125");
  assert_eq!(eprint.series, "Photonics Research, 10(5), A66");
  assert_eq!(eprint.publisher, "Optica Publishing Group");
  Ok(())
}

#[test]
fn test_datacite_creators_and_orcids() -> TestResult<()> {
  let eprint = datacite_works_to_eprint(&datacite_fixture())?;

  let creators: Vec<(String, &str)> = eprint
    .creators
    .iter()
    .map(|c| (c.name.as_ref().map(|n| n.display()).unwrap_or_default(), c.orcid.as_str()))
    .collect();
  assert_eq!(creators, [
    ("Khachaturian, Aroutin".to_string(), "0000-0001-8304-3302"),
    ("Fatemi, Reza".to_string(), "0000-0001-9081-2608"),
    ("Hajimiri, Ali".to_string(), "0000-0001-6736-8019"),
  ]);
  assert!(eprint.corp_creators.is_empty());
  Ok(())
}

#[test]
fn test_datacite_citations_are_not_related_urls() -> TestResult<()> {
  let eprint = datacite_works_to_eprint(&datacite_fixture())?;

  assert_eq!(eprint.related_url.len(), 1);
  assert_eq!(eprint.related_url[0].url, "https://opg.optica.org/abstract.cfm?URI=prj-10-5-A66");
  Ok(())
}
