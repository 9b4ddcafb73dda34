//! SQLite-backed [`DocumentStore`].
//!
//! Records are stored as their JSON mirror next to a few columns pulled out
//! for listing: publication date, last modification and record status.
//!
//! # Examples
//!
//! ```no_run
//! # use eprinttools::{database::Database, store::DocumentStore, EPrint};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(Database::default_path()).await?;
//! db.put("10.1364/prj.437518", &EPrint::default()).await?;
//! assert!(db.has_key("10.1364/prj.437518").await?);
//! # Ok(())
//! # }
//! ```

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use super::*;
use crate::store::DocumentStore;

/// Handle on the SQLite record store.
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Opens the database at `path`, creating the file, its parent directory
  /// and the schema as needed.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let conn = Connection::open(path).await?;

    conn
      .call(|conn| {
        conn.execute_batch(include_str!(concat!(
          env!("CARGO_MANIFEST_DIR"),
          "/migrations/init.sql"
        )))?;
        Ok(())
      })
      .await?;

    debug!("Opened record store at {}", path.display());
    Ok(Self { conn })
  }

  /// Returns the default path for the database file.
  ///
  /// - On Unix: `~/.local/share/eprinttools/eprints.db`
  /// - On macOS: `~/Library/Application Support/eprinttools/eprints.db`
  /// - On Windows: `%APPDATA%\eprinttools\eprints.db`
  /// - Fallback: `./eprinttools/eprints.db`
  pub fn default_path() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("eprinttools").join("eprints.db")
  }

  /// Deletes the record stored under `key`, returning whether one existed.
  pub async fn remove(&self, key: &str) -> Result<bool> {
    let key = key.to_string();
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM eprints WHERE key = ?1", params![key])?))
      .await?;
    Ok(removed > 0)
  }

  /// Number of stored records.
  pub async fn count(&self) -> Result<usize> {
    let count = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM eprints", [], |row| row.get::<_, i64>(0))?)
      })
      .await?;
    Ok(count.max(0) as usize)
  }

  /// Keys of records with the given status, newest publication date first.
  pub async fn keys_with_status(&self, status: &str) -> Result<Vec<String>> {
    let status = status.to_string();
    self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare_cached("SELECT key FROM eprints WHERE status = ?1 ORDER BY pubdate DESC, key")?;
        let keys = stmt
          .query_map(params![status], |row| row.get::<_, String>(0))?
          .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
      })
      .await
      .map_err(EPrintsError::from)
  }
}

#[async_trait]
impl DocumentStore for Database {
  async fn put(&self, key: &str, eprint: &EPrint) -> Result<()> {
    let key = key.to_string();
    let src = serde_json::to_string(eprint)?;
    let pubdate = eprint.publication_date().map(String::from);
    let lastmod = Some(eprint.lastmod.clone()).filter(|s| !s.is_empty());
    let status = Some(eprint.eprint_status.clone()).filter(|s| !s.is_empty());

    trace!("Storing {key}");
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "REPLACE INTO eprints (key, src, pubdate, lastmod, status) VALUES (?1, ?2, ?3, ?4, ?5)",
          params![key, src, pubdate, lastmod, status],
        )?;
        Ok(())
      })
      .await
      .map_err(EPrintsError::from)
  }

  async fn get(&self, key: &str) -> Result<Option<EPrint>> {
    let key = key.to_string();
    let src = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row("SELECT src FROM eprints WHERE key = ?1", params![key], |row| {
              row.get::<_, String>(0)
            })
            .optional()?,
        )
      })
      .await?;
    src.map(|src| serde_json::from_str(&src).map_err(EPrintsError::from)).transpose()
  }

  async fn has_key(&self, key: &str) -> Result<bool> {
    let key = key.to_string();
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row("SELECT 1 FROM eprints WHERE key = ?1", params![key], |_| Ok(()))
            .optional()?,
        )
      })
      .await?;
    Ok(found.is_some())
  }

  async fn keys(&self) -> Result<Vec<String>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare_cached("SELECT key FROM eprints ORDER BY key")?;
        let keys = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
      })
      .await
      .map_err(EPrintsError::from)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn setup_test_db() -> (Database, PathBuf, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("test.db");
    let db = Database::open(&path).await.unwrap();
    (db, path, dir)
  }

  fn sample() -> EPrint {
    EPrint {
      eprint_id: Some(85447),
      eprint_status: "archive".into(),
      title: "Co-prime photonic beamforming".into(),
      date: "2022-04-29".into(),
      date_type: "published".into(),
      creators: vec![Item::person("Fatemi", "Reza")],
      ..EPrint::default()
    }
  }

  #[traced_test]
  #[tokio::test]
  async fn test_database_creation() {
    let (db, path, _dir) = setup_test_db().await;
    assert!(path.exists());
    assert_eq!(db.count().await.unwrap(), 0);
  }

  #[traced_test]
  #[test]
  fn test_default_path() {
    let path = Database::default_path();
    assert!(path.ends_with("eprinttools/eprints.db") || path.ends_with("eprinttools\\eprints.db"));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_put_get_replace() {
    let (db, _path, _dir) = setup_test_db().await;
    let mut eprint = sample();
    db.put("85447", &eprint).await.unwrap();
    assert_eq!(db.get("85447").await.unwrap(), Some(eprint.clone()));

    eprint.title = "Updated".into();
    db.put("85447", &eprint).await.unwrap();
    assert_eq!(db.count().await.unwrap(), 1);
    assert_eq!(db.get("85447").await.unwrap().unwrap().title, "Updated");
  }

  #[traced_test]
  #[tokio::test]
  async fn test_missing_key() {
    let (db, _path, _dir) = setup_test_db().await;
    assert_eq!(db.get("nope").await.unwrap(), None);
    assert!(!db.has_key("nope").await.unwrap());
    assert!(!db.remove("nope").await.unwrap());
  }

  #[traced_test]
  #[tokio::test]
  async fn test_keys_and_status() {
    let (db, _path, _dir) = setup_test_db().await;
    db.put("b", &sample()).await.unwrap();
    db.put("a", &EPrint { eprint_status: "inbox".into(), ..sample() }).await.unwrap();
    assert_eq!(db.keys().await.unwrap(), vec!["a", "b"]);
    assert_eq!(db.keys_with_status("archive").await.unwrap(), vec!["b"]);

    assert!(db.remove("a").await.unwrap());
    assert_eq!(db.keys().await.unwrap(), vec!["b"]);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_persistence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    {
      let db = Database::open(&path).await.unwrap();
      db.put("85447", &sample()).await.unwrap();
    }
    let db = Database::open(&path).await.unwrap();
    assert!(db.has_key("85447").await.unwrap());
  }
}
