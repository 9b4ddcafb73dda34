//! Fetch, crosswalk, normalize and store records one identifier at a time.
//!
//! A [`Harvester`] ties a [`MetadataClient`] and a [`DocumentStore`] to a
//! [`RuleEngine`]. Identifiers are processed sequentially and in input order.
//! Failures are isolated per identifier: they are logged, collected in the
//! [`HarvestReport`] and the harvest moves on.

use super::*;
use crate::{
  client::MetadataClient,
  crosswalk::{crossref_works_to_eprint, datacite_works_to_eprint},
  doi::normalize_doi,
  rules::RuleEngine,
  store::DocumentStore,
};

/// Which registries to ask for a DOI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lookup {
  /// CrossRef first, DataCite when CrossRef has no record.
  #[default]
  Any,
  /// CrossRef only.
  CrossRefOnly,
  /// DataCite only.
  DataCiteOnly,
}

/// Outcome of a harvest.
#[derive(Debug, Default)]
pub struct HarvestReport {
  /// Records that were stored, in input order.
  pub eprints:  EPrints,
  /// Identifiers that failed, with the reason.
  pub failures: Vec<(String, String)>,
}

impl HarvestReport {
  /// Whether every identifier was harvested.
  pub fn is_complete(&self) -> bool { self.failures.is_empty() }

  fn fail(&mut self, id: String, error: EPrintsError) {
    warn!("Skipping {id}: {error}");
    self.failures.push((id, error.to_string()));
  }
}

/// Harvests identifiers into a store.
pub struct Harvester<C, S> {
  client: C,
  store:  S,
  engine: RuleEngine,
}

impl<C: MetadataClient, S: DocumentStore> Harvester<C, S> {
  /// A harvester applying `engine` to every record before storing it.
  pub fn new(client: C, store: S, engine: RuleEngine) -> Self { Self { client, store, engine } }

  /// The store records are written to.
  pub fn store(&self) -> &S { &self.store }

  /// Fetches and crosswalks a DOI without applying rules or storing it.
  ///
  /// # Errors
  ///
  /// [`EPrintsError::InvalidDoi`] for identifiers that aren't DOIs,
  /// [`EPrintsError::NotFound`] when no consulted registry knows the DOI,
  /// and any client or crosswalk error.
  pub async fn fetch_doi(&self, doi: &str, lookup: Lookup) -> Result<EPrint> {
    let doi = normalize_doi(doi)?;
    if lookup != Lookup::DataCiteOnly {
      if let Some(src) = self.client.crossref_works(&doi).await? {
        debug!("Found {doi} at CrossRef");
        return crossref_works_to_eprint(&src);
      }
    }
    if lookup != Lookup::CrossRefOnly {
      if let Some(src) = self.client.datacite_works(&doi).await? {
        debug!("Found {doi} at DataCite");
        return datacite_works_to_eprint(&src);
      }
    }
    Err(EPrintsError::NotFound(doi))
  }

  /// Harvests DOIs, storing each record under its bare DOI.
  pub async fn harvest_dois(&self, dois: &[String], lookup: Lookup) -> Result<HarvestReport> {
    let mut report = HarvestReport::default();
    for input in dois {
      match self.harvest_doi(input, lookup).await {
        Ok(eprint) => {
          report.eprints.append(eprint);
        },
        Err(e) => report.fail(input.clone(), e),
      }
    }
    debug!("Harvested {} of {} DOI(s)", report.eprints.len(), dois.len());
    Ok(report)
  }

  async fn harvest_doi(&self, input: &str, lookup: Lookup) -> Result<EPrint> {
    let mut eprint = self.fetch_doi(input, lookup).await?;
    let key = eprint.doi.clone();
    self.engine.apply_to(&mut eprint)?;
    self.store.put(&key, &eprint).await?;
    Ok(eprint)
  }

  /// Harvests records from the EPrints repository, storing each under its
  /// eprint id.
  pub async fn harvest_eprint_ids(&self, ids: &[u64]) -> Result<HarvestReport> {
    let mut report = HarvestReport::default();
    for &id in ids {
      match self.harvest_eprint_id(id).await {
        Ok(eprint) => {
          report.eprints.append(eprint);
        },
        Err(e) => report.fail(id.to_string(), e),
      }
    }
    debug!("Harvested {} of {} eprint(s)", report.eprints.len(), ids.len());
    Ok(report)
  }

  async fn harvest_eprint_id(&self, id: u64) -> Result<EPrint> {
    let src =
      self.client.eprint_xml(id).await?.ok_or_else(|| EPrintsError::NotFound(id.to_string()))?;
    let mut eprint = EPrints::from_xml(&src)?
      .into_iter()
      .next()
      .ok_or_else(|| EPrintsError::NotFound(id.to_string()))?;
    self.engine.apply_to(&mut eprint)?;
    self.store.put(&id.to_string(), &eprint).await?;
    Ok(eprint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{rules::RuleSet, store::MemoryStore};

  #[derive(Default)]
  struct MockClient {
    crossref: HashMap<String, Vec<u8>>,
    datacite: HashMap<String, Vec<u8>>,
    eprints:  HashMap<u64, Vec<u8>>,
  }

  #[async_trait]
  impl MetadataClient for MockClient {
    async fn crossref_works(&self, doi: &str) -> Result<Option<Vec<u8>>> {
      Ok(self.crossref.get(doi).cloned())
    }

    async fn datacite_works(&self, doi: &str) -> Result<Option<Vec<u8>>> {
      Ok(self.datacite.get(doi).cloned())
    }

    async fn eprint_xml(&self, eprint_id: u64) -> Result<Option<Vec<u8>>> {
      Ok(self.eprints.get(&eprint_id).cloned())
    }
  }

  const CROSSREF: &str = r#"{
    "status": "ok",
    "message": {
      "DOI": "10.1103/PhysRevLett.116.061102",
      "type": "journal-article",
      "title": ["Observation of Gravitational Waves from a Binary Black Hole Merger"],
      "container-title": ["Physical Review Letters"],
      "volume": "116",
      "author": [{"family": "Abbott", "given": "B P"}]
    }
  }"#;

  fn client() -> MockClient {
    let mut client = MockClient::default();
    client.crossref.insert("10.1103/PhysRevLett.116.061102".into(), CROSSREF.as_bytes().to_vec());
    client.datacite.insert(
      "10.1364/prj.437518".into(),
      include_bytes!("../tests/data/datacite-prj.437518.json").to_vec(),
    );
    client.eprints.insert(
      85447,
      br#"<eprints><eprint>
        <eprintid>85447</eprintid>
        <title>The stored one</title>
        <doi>https://doi.org/10.1364/CLEO_AT.2018.JTh5C.8</doi>
      </eprint></eprints>"#
        .to_vec(),
    );
    client.eprints.insert(2, b"<eprints></eprints>".to_vec());
    client
  }

  #[traced_test]
  #[tokio::test]
  async fn test_harvest_dois_with_fallback() {
    let harvester = Harvester::new(client(), MemoryStore::new(), RuleEngine::cls());
    let dois = vec![
      "https://doi.org/10.1103/PhysRevLett.116.061102".to_string(),
      "not a doi".to_string(),
      "10.1364/prj.437518".to_string(),
      "10.9999/missing".to_string(),
    ];
    let report = harvester.harvest_dois(&dois, Lookup::Any).await.unwrap();

    assert_eq!(report.eprints.len(), 2);
    assert_eq!(report.eprints.eprint[0].publisher, "American Physical Society");
    assert_eq!(report.eprints.eprint[0].creators[0].name.as_ref().unwrap().given, "B. P.");
    assert_eq!(report.eprints.eprint[1].id_number, "CaltechAUTHORS:prj.437518");
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].0, "not a doi");
    assert_eq!(report.failures[1].0, "10.9999/missing");
    assert!(!report.is_complete());
    assert!(logs_contain("Skipping 10.9999/missing"));

    let store = harvester.store();
    assert!(store.has_key("10.1103/PhysRevLett.116.061102").await.unwrap());
    assert!(store.has_key("10.1364/prj.437518").await.unwrap());
    assert_eq!(store.len().await, 2);
  }

  #[tokio::test]
  async fn test_lookup_modes() {
    let harvester = Harvester::new(client(), MemoryStore::new(), RuleEngine::new(RuleSet::new()));
    assert!(matches!(
      harvester.fetch_doi("10.1364/prj.437518", Lookup::CrossRefOnly).await,
      Err(EPrintsError::NotFound(_))
    ));
    assert!(matches!(
      harvester.fetch_doi("10.1103/PhysRevLett.116.061102", Lookup::DataCiteOnly).await,
      Err(EPrintsError::NotFound(_))
    ));
    let eprint = harvester.fetch_doi("10.1364/prj.437518", Lookup::DataCiteOnly).await.unwrap();
    assert_eq!(eprint.doi, "10.1364/prj.437518");
    assert!(eprint.id_number.is_empty());
  }

  #[tokio::test]
  async fn test_strict_rule_failure_is_per_item() {
    let mut client = client();
    client
      .eprints
      .insert(7, b"<eprints><eprint><eprintid>7</eprintid><doi>bogus</doi></eprint></eprints>".to_vec());
    let harvester = Harvester::new(client, MemoryStore::new(), RuleEngine::cls().strict(true));
    let report = harvester.harvest_eprint_ids(&[7, 85447]).await.unwrap();

    assert_eq!(report.eprints.len(), 1);
    assert_eq!(report.failures[0].0, "7");
    assert!(report.failures[0].1.contains("normalize_publisher"));
    assert!(!harvester.store().has_key("7").await.unwrap());
  }

  #[traced_test]
  #[tokio::test]
  async fn test_harvest_eprint_ids() {
    let harvester = Harvester::new(client(), MemoryStore::new(), RuleEngine::cls());
    let report = harvester.harvest_eprint_ids(&[85447, 2, 3]).await.unwrap();

    assert_eq!(report.eprints.len(), 1);
    let eprint = &report.eprints.eprint[0];
    assert_eq!(eprint.eprint_id, Some(85447));
    assert_eq!(eprint.id_number, "CaltechAUTHORS:CLEO_AT.2018.JTh5C.8");
    assert_eq!(report.failures.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(), ["2", "3"]);

    let stored = harvester.store().get("85447").await.unwrap().unwrap();
    assert_eq!(stored.title, "The stored one");
  }
}
