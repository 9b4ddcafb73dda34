use super::*;

#[traced_test]
#[test]
fn test_read_eprints_xml() -> TestResult<()> {
  let eprints = EPrints::from_xml(&eprints_fixture())?;
  assert_eq!(eprints.len(), 1);

  let eprint = &eprints.eprint[0];
  assert_eq!(eprint.eprint_id, Some(85447));
  assert_eq!(eprint.eprint_type, "book_section");
  assert_eq!(eprint.title, "The Integrated Photonic Beamformer");
  assert_eq!(eprint.abstract_text, "We report a <i>co-prime</i> photonic beamformer.");
  assert_eq!(eprint.volume, "0007");
  assert_eq!(eprint.keyword_list(), ["photonics", "beamforming", "phased arrays"]);
  assert_eq!(eprint.creators.len(), 3);
  assert_eq!(eprint.creators[0].id, "Khachaturian-A");
  assert_eq!(eprint.related_url[0].description, "book_section");
  assert_eq!(eprint.related_url[1].item_type, "pub");
  assert_eq!(eprint.funders[0].grant_number, "FA9550-15-1-0016");
  assert_eq!(eprint.local_group[0].value, "Kavli Nanoscience Institute");
  Ok(())
}

#[test]
fn test_xml_and_json_mirror_agree() -> TestResult<()> {
  let eprints = EPrints::from_xml(&eprints_fixture())?;

  let xml = eprints.to_xml()?;
  assert_eq!(EPrints::from_xml(&xml)?, eprints);

  let json = eprints.to_json()?;
  assert_eq!(EPrints::from_json(&json)?, eprints);

  let value: serde_json::Value = serde_json::from_slice(&json)?;
  let record = &value["eprint"][0];
  assert_eq!(record["eprintid"], 85447);
  assert_eq!(record["type"], "book_section");
  assert_eq!(record["creators"][1]["name"]["family"], "Fatemi");
  assert!(record.get("series").is_none());
  Ok(())
}

#[test]
fn test_simplified_projection() -> TestResult<()> {
  let eprints = EPrints::from_xml(&eprints_fixture())?;
  let records = simplify(&eprints);

  assert_eq!(records.len(), 1);
  let record = &records[0];
  assert_eq!(record.creator_names, "Khachaturian, A; Fatemi, Reza; Hajimiri, Ali");
  assert_eq!(record.publication_date.as_deref(), Some("2018-05"));
  assert!(record.refereed);
  assert_eq!(record.pages, "1-2");
  assert_eq!(record.related_urls.len(), 2);
  assert_eq!(record.groups, ["Kavli Nanoscience Institute"]);
  Ok(())
}
