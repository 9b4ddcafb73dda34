//! HTTP access to CrossRef, DataCite and an EPrints repository.
//!
//! [`MetadataClient`] is the seam the harvester works against; it hands back
//! raw response bodies and leaves crosswalking to the caller. A missing record
//! (HTTP 404) is `Ok(None)` rather than an error, so a harvest can fall
//! through from one registry to the next.

use reqwest::StatusCode;

use super::*;

/// Source of raw metadata documents.
#[async_trait]
pub trait MetadataClient: Send + Sync {
  /// CrossRef works JSON for a bare DOI.
  async fn crossref_works(&self, doi: &str) -> Result<Option<Vec<u8>>>;

  /// DataCite works JSON for a bare DOI.
  async fn datacite_works(&self, doi: &str) -> Result<Option<Vec<u8>>>;

  /// EPrints XML for a record in the configured repository.
  async fn eprint_xml(&self, eprint_id: u64) -> Result<Option<Vec<u8>>>;
}

/// Endpoints and credentials used by [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// CrossRef works endpoint.
  pub crossref_url: String,
  /// DataCite works endpoint.
  pub datacite_url: String,
  /// Base URL of the EPrints repository, e.g. `https://authors.library.caltech.edu`.
  pub eprints_url:  String,
  /// Contact address sent in the user agent, as CrossRef asks of polite clients.
  pub mailto:       String,
  /// EPrints REST user name.
  pub username:     Option<String>,
  /// EPrints REST password.
  pub password:     Option<String>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      crossref_url: "https://api.crossref.org/works".to_string(),
      datacite_url: "https://api.datacite.org/works".to_string(),
      eprints_url:  String::new(),
      mailto:       String::new(),
      username:     None,
      password:     None,
    }
  }
}

/// [`MetadataClient`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpClient {
  client: reqwest::Client,
  api:    ApiConfig,
}

impl HttpClient {
  /// Builds a client for the given endpoints.
  ///
  /// # Errors
  ///
  /// Returns [`EPrintsError::Network`] if the TLS backend cannot be set up.
  pub fn new(api: ApiConfig) -> Result<Self> {
    let mut user_agent = format!("eprinttools/{}", env!("CARGO_PKG_VERSION"));
    if !api.mailto.is_empty() {
      user_agent.push_str(&format!(" (mailto:{})", api.mailto));
    }
    let client = reqwest::Client::builder().user_agent(user_agent).build()?;
    Ok(Self { client, api })
  }

  /// The configured endpoints.
  pub fn api(&self) -> &ApiConfig { &self.api }

  /// CrossRef works URL for a DOI.
  pub fn crossref_url(&self, doi: &str) -> String { join_url(&self.api.crossref_url, doi) }

  /// DataCite works URL for a DOI.
  pub fn datacite_url(&self, doi: &str) -> String { join_url(&self.api.datacite_url, doi) }

  /// EPrints REST URL of a record.
  ///
  /// # Errors
  ///
  /// Returns [`EPrintsError::Config`] when no repository URL is configured.
  pub fn eprint_url(&self, eprint_id: u64) -> Result<String> {
    if self.api.eprints_url.is_empty() {
      return Err(EPrintsError::Config("no EPrints repository URL configured".to_string()));
    }
    Ok(join_url(&self.api.eprints_url, &format!("rest/eprint/{eprint_id}.xml")))
  }

  async fn fetch(&self, url: &str, authenticate: bool) -> Result<Option<Vec<u8>>> {
    debug!("Fetching {url}");
    let mut request = self.client.get(url);
    if let (true, Some(username)) = (authenticate, self.api.username.as_ref()) {
      request = request.basic_auth(username, self.api.password.as_ref());
    }

    let response = request.send().await?;
    match response.status() {
      StatusCode::NOT_FOUND => {
        debug!("{url} not found");
        Ok(None)
      },
      status if status.is_success() => {
        let data = response.bytes().await?;
        trace!("{url} response: {}", String::from_utf8_lossy(&data));
        Ok(Some(data.to_vec()))
      },
      status => Err(EPrintsError::ApiError(format!("{url} returned {status}"))),
    }
  }
}

#[async_trait]
impl MetadataClient for HttpClient {
  async fn crossref_works(&self, doi: &str) -> Result<Option<Vec<u8>>> {
    self.fetch(&self.crossref_url(doi), false).await
  }

  async fn datacite_works(&self, doi: &str) -> Result<Option<Vec<u8>>> {
    self.fetch(&self.datacite_url(doi), false).await
  }

  async fn eprint_xml(&self, eprint_id: u64) -> Result<Option<Vec<u8>>> {
    let url = self.eprint_url(eprint_id)?;
    self.fetch(&url, true).await
  }
}

fn join_url(base: &str, path: &str) -> String {
  format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
