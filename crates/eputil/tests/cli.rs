use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<eprints>
  <eprint>
    <eprintid>85447</eprintid>
    <type>book_section</type>
    <title>The Integrated Photonic Beamformer</title>
    <abstract>&lt;i&gt;Co-prime&lt;/i&gt; sampling</abstract>
    <volume>0007</volume>
    <doi>10.1364/CLEO_AT.2018.JTh5C.8</doi>
    <creators>
      <item>
        <name><family>Fatemi</family><given>Reza</given></name>
      </item>
      <item>
        <name><family>Hajimiri</family><given>A</given></name>
      </item>
    </creators>
  </eprint>
</eprints>
"#;

fn eputil() -> Command { Command::cargo_bin("eputil").unwrap() }

/// Config path inside `dir` that doesn't exist, so runs use built-in defaults.
fn no_config(dir: &tempfile::TempDir) -> PathBuf { dir.path().join("config.toml") }

#[test]
fn test_help() {
  eputil()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("doi"))
    .stdout(predicate::str::contains("convert"))
    .stdout(predicate::str::contains("harvest"));
}

#[test]
fn test_strip_argument() {
  eputil()
    .args(["strip", "<i>This text has</i> encoded elements."])
    .assert()
    .success()
    .stdout("This text has encoded elements.\n");
}

#[test]
fn test_strip_stdin() {
  eputil()
    .arg("strip")
    .write_stdin("&lt;jt&gt;This is a jats thing&lt;/jt&gt;\n")
    .assert()
    .success()
    .stdout("This is a jats thing\n");
}

#[test]
fn test_convert_to_json_without_rules() {
  let dir = tempdir().unwrap();
  let input = dir.path().join("sample.xml");
  std::fs::write(&input, SAMPLE).unwrap();

  eputil()
    .arg("--config")
    .arg(no_config(&dir))
    .arg("convert")
    .arg(&input)
    .assert()
    .success()
    .stdout(predicate::str::contains("\"title\": \"The Integrated Photonic Beamformer\""))
    .stdout(predicate::str::contains("\"volume\": \"0007\""));
}

#[test]
fn test_convert_with_selected_rules() {
  let dir = tempdir().unwrap();
  let input = dir.path().join("sample.xml");
  let output = dir.path().join("out.xml");
  std::fs::write(&input, SAMPLE).unwrap();

  eputil()
    .arg("--config")
    .arg(no_config(&dir))
    .args(["convert", "--format", "xml", "--trim-title", "--trim-volume", "--dot-initials"])
    .arg(&input)
    .arg("--output")
    .arg(&output)
    .assert()
    .success();

  let xml = std::fs::read_to_string(&output).unwrap();
  assert!(xml.contains("<title>Integrated Photonic Beamformer</title>"));
  assert!(xml.contains("<volume>7</volume>"));
  assert!(xml.contains("<given>A.</given>"));
  assert!(xml.contains("<given>Reza</given>"));
}

#[test]
fn test_convert_stdin_with_cls_rules() {
  let dir = tempdir().unwrap();
  eputil()
    .arg("--config")
    .arg(no_config(&dir))
    .args(["convert", "--clsrules", "--format", "simplified"])
    .write_stdin(SAMPLE)
    .assert()
    .success()
    .stdout(predicate::str::contains("Co-prime sampling"))
    .stdout(predicate::str::contains("CaltechAUTHORS"));
}

#[test]
fn test_convert_malformed_input() {
  let dir = tempdir().unwrap();
  eputil()
    .arg("--config")
    .arg(no_config(&dir))
    .arg("convert")
    .write_stdin("<eprints><eprint></eprints>")
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("XML error"));
}

#[test]
fn test_doi_requires_input() {
  let dir = tempdir().unwrap();
  eputil()
    .arg("--config")
    .arg(no_config(&dir))
    .arg("doi")
    .assert()
    .failure()
    .stderr(predicate::str::contains("No DOIs given"));
}

#[test]
fn test_doi_registry_flags_conflict() {
  eputil().args(["doi", "--crossref", "--datacite", "10.1364/prj.437518"]).assert().failure();
}

#[test]
fn test_get_without_store() {
  let dir = tempdir().unwrap();
  eputil()
    .arg("--config")
    .arg(no_config(&dir))
    .arg("--store")
    .arg(dir.path().join("missing.db"))
    .args(["get", "85447"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("No record store"));
}

#[test]
fn test_bad_config() {
  let dir = tempdir().unwrap();
  let config = no_config(&dir);
  std::fs::write(&config, "strict = maybe").unwrap();
  eputil().arg("--config").arg(&config).args(["strip", "x"]).assert().failure().code(1);
}
