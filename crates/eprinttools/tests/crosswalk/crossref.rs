use super::*;

#[traced_test]
#[test]
fn test_crossref_journal_article() -> TestResult<()> {
  let eprint = crossref_works_to_eprint(&crossref_fixture())?;

  assert_eq!(eprint.doi, "10.1103/PhysRevLett.116.061102");
  assert_eq!(eprint.eprint_type, "article");
  assert_eq!(eprint.title, "Observation of Gravitational Waves from a Binary Black Hole Merger");
  assert_eq!(eprint.publisher, "American Physical Society (APS)");
  assert_eq!(eprint.publication, "Physical Review Letters");
  assert_eq!(eprint.series, "Phys. Rev. Lett.");
  assert_eq!(eprint.volume, "116");
  assert_eq!(eprint.number, "6");
  assert_eq!(eprint.issn, "0031-9007");
  assert_eq!(eprint.date, "2016-02-12");
  assert_eq!(eprint.date_type, "published");
  assert!(eprint.abstract_text.starts_with("<jats:p>On September 14, 2015"));
  Ok(())
}

#[test]
fn test_crossref_people_keep_order() -> TestResult<()> {
  let eprint = crossref_works_to_eprint(&crossref_fixture())?;

  let given: Vec<&str> =
    eprint.creators.iter().filter_map(|c| c.name.as_ref()).map(|n| n.given.as_str()).collect();
  assert_eq!(given, ["B. P.", "R", "T. D."]);
  assert_eq!(eprint.creators[2].orcid, "0000-0002-4690-8545");
  assert!(eprint.creators[0].orcid.is_empty());

  assert_eq!(eprint.corp_creators.len(), 1);
  assert_eq!(
    eprint.corp_creators[0].name.as_ref().map(|n| n.value.as_str()),
    Some("LIGO Scientific Collaboration and Virgo Collaboration")
  );
  Ok(())
}

#[test]
fn test_crossref_funders_and_links() -> TestResult<()> {
  let eprint = crossref_works_to_eprint(&crossref_fixture())?;

  let grants: Vec<(&str, &str)> =
    eprint.funders.iter().map(|f| (f.agency.as_str(), f.grant_number.as_str())).collect();
  assert_eq!(grants, [
    ("National Science Foundation", "PHY-0757058"),
    ("National Science Foundation", "PHY-0823459"),
    ("Max Planck Society", ""),
  ]);

  assert_eq!(eprint.related_url.len(), 1);
  assert_eq!(eprint.related_url[0].url, "http://link.aps.org/article/10.1103/PhysRevLett.116.061102");
  Ok(())
}

#[test]
fn test_crossref_rejects_garbage() {
  assert!(matches!(crossref_works_to_eprint(b"not json"), Err(EPrintsError::Json(_))));
  assert!(matches!(
    crossref_works_to_eprint(br#"{"message": {"title": ["Untitled DOI"]}}"#),
    Err(EPrintsError::MissingField("doi"))
  ));
}
