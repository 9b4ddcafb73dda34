//! Crosswalk, normalize and serialize in one pass, the way the command line
//! tool does it.

use super::*;

fn one(eprint: EPrint) -> EPrints {
  let mut eprints = EPrints::new();
  eprints.append(eprint);
  eprints
}

#[traced_test]
#[test]
fn test_datacite_with_cls_rules() -> TestResult<()> {
  let eprint = datacite_works_to_eprint(&datacite_fixture())?;
  let eprints = RuleEngine::cls().apply(one(eprint))?;
  let eprint = &eprints.eprint[0];

  assert!(!eprint.id_number.is_empty());
  assert!(eprint.official_url.ends_with(&eprint.id_number));
  assert_eq!(eprint.official_url, "https://resolver.caltech.edu/CaltechAUTHORS:prj.437518");
  // prune_series is part of the bundle.
  assert!(eprint.series.is_empty());
  assert_eq!(eprint.refereed, "TRUE");
  assert_eq!(eprint.eprint_status, "inbox");
  Ok(())
}

#[traced_test]
#[test]
fn test_crossref_with_cls_rules() -> TestResult<()> {
  let eprint = crossref_works_to_eprint(&crossref_fixture())?;
  let eprints = RuleEngine::cls().apply(one(eprint))?;
  let eprint = &eprints.eprint[0];

  assert_eq!(eprint.publisher, "American Physical Society");
  assert!(eprint.abstract_text.starts_with("On September 14, 2015"));
  assert_eq!(eprint.creators[1].name.as_ref().map(|n| n.given.as_str()), Some("R."));
  assert_eq!(eprint.id_number, "CaltechAUTHORS:PhysRevLett.116.061102");
  assert_eq!(eprint.collection, Defaults::cls().collection);
  assert!(eprint.rights.starts_with("No commercial reproduction"));

  let xml = String::from_utf8(eprints.to_xml()?)?;
  assert!(xml.contains("<id_number>CaltechAUTHORS:PhysRevLett.116.061102</id_number>"));
  assert!(!xml.contains("<series>"));
  Ok(())
}

#[test]
fn test_convert_eprints_xml_with_selected_rules() -> TestResult<()> {
  let eprints = EPrints::from_xml(&eprints_fixture())?;
  let mut rules = RuleSet::new();
  for rule in [Rule::TrimTitle, Rule::TrimVolume, Rule::StripTags, Rule::NormalizeRelatedUrl] {
    rules.enable(rule);
  }
  let eprints = RuleEngine::new(rules).apply(eprints)?;
  let eprint = &eprints.eprint[0];

  assert_eq!(eprint.title, "Integrated Photonic Beamformer");
  assert_eq!(eprint.volume, "7");
  assert_eq!(eprint.abstract_text, "We report a co-prime photonic beamformer.");
  assert_eq!(eprint.related_url[0].description, "Book Section");
  assert_eq!(eprint.related_url[1].description, "Article");
  // Untouched by the selected rules.
  assert_eq!(eprint.id_number, "CaltechAUTHORS:20180409-100507125");
  assert_eq!(eprint.creators[0].name.as_ref().map(|n| n.given.as_str()), Some("A"));
  Ok(())
}

#[traced_test]
#[test]
fn test_cls_rules_on_resolver_url_doi() -> TestResult<()> {
  let xml = br#"<eprints><eprint>
    <eprintid>1</eprintid>
    <type>article</type>
    <title>Observation of Gravitational Waves</title>
    <doi>https://doi.org/10.1103/PhysRevLett.116.061102</doi>
  </eprint></eprints>"#;
  let eprints = RuleEngine::cls().apply(EPrints::from_xml(xml)?)?;
  let eprint = &eprints.eprint[0];

  assert_eq!(eprint.id_number, "CaltechAUTHORS:PhysRevLett.116.061102");
  assert!(eprint.official_url.ends_with(&eprint.id_number));
  assert_eq!(eprint.publisher, "American Physical Society");
  Ok(())
}

#[test]
fn test_doi_as_related_url_on_existing_record() -> TestResult<()> {
  let eprints = EPrints::from_xml(&eprints_fixture())?;
  let mut rules = RuleSet::cls();
  rules.enable(Rule::DoiAsRelatedUrl);
  let eprints = RuleEngine::cls().apply(eprints.clone())?;
  let moved = eprinttools::rules::apply(EPrints::from_xml(&eprints_fixture())?, &rules)?;

  // Same DOI URL is already present, so nothing is duplicated.
  assert!(moved.eprint[0].doi.is_empty());
  assert_eq!(moved.eprint[0].related_url.len(), 2);
  assert_eq!(moved.eprint[0].related_url[0].description, "Book Section");
  // The existing id and URL are kept by the generators.
  assert_eq!(eprints.eprint[0].official_url, moved.eprint[0].official_url);
  Ok(())
}

#[test]
fn test_rules_keep_record_order() -> TestResult<()> {
  let mut eprints = EPrints::new();
  for title in ["first", "second", "third"] {
    eprints.append(EPrint { title: title.into(), ..EPrint::default() });
  }
  let eprints = RuleEngine::cls().apply(eprints)?;
  let titles: Vec<&str> = eprints.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, ["first", "second", "third"]);
  assert!(eprints.iter().all(|e| e.official_url.ends_with(&e.id_number)));
  Ok(())
}
