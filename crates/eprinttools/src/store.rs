//! Keyed storage for harvested records.
//!
//! The harvester only needs `put`, `get` and `has_key`. [`MemoryStore`] keeps
//! records in a map and is what tests and one-off conversions use;
//! [`Database`](crate::database::Database) persists them in SQLite.

use tokio::sync::RwLock;

use super::*;

/// A key/value store of [`EPrint`] records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Stores `eprint` under `key`, replacing any previous record.
  async fn put(&self, key: &str, eprint: &EPrint) -> Result<()>;

  /// Fetches the record stored under `key`.
  async fn get(&self, key: &str) -> Result<Option<EPrint>>;

  /// Whether a record is stored under `key`.
  async fn has_key(&self, key: &str) -> Result<bool> { Ok(self.get(key).await?.is_some()) }

  /// All keys, sorted.
  async fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
  records: RwLock<BTreeMap<String, EPrint>>,
}

impl MemoryStore {
  /// An empty store.
  pub fn new() -> Self { Self::default() }

  /// Number of stored records.
  pub async fn len(&self) -> usize { self.records.read().await.len() }

  /// Whether the store is empty.
  pub async fn is_empty(&self) -> bool { self.records.read().await.is_empty() }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn put(&self, key: &str, eprint: &EPrint) -> Result<()> {
    trace!("Storing {key}");
    self.records.write().await.insert(key.to_string(), eprint.clone());
    Ok(())
  }

  async fn get(&self, key: &str) -> Result<Option<EPrint>> {
    Ok(self.records.read().await.get(key).cloned())
  }

  async fn has_key(&self, key: &str) -> Result<bool> {
    Ok(self.records.read().await.contains_key(key))
  }

  async fn keys(&self) -> Result<Vec<String>> {
    Ok(self.records.read().await.keys().cloned().collect())
  }
}
