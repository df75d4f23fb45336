//! JSON file backend for the market store.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error};

use super::{merge_over_defaults, MarketRepository, StoreError};
use crate::models::MarketDocument;

/// The whole document in one pretty-printed JSON file.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse stored contents, surfacing corruption instead of resetting.
    pub fn parse(&self, contents: &str) -> Result<MarketDocument, StoreError> {
        merge_over_defaults(contents).map_err(|e| StoreError::Corruption {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl MarketRepository for JsonFileRepository {
    async fn load(&self) -> Result<MarketDocument, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store at {}, starting from defaults", self.path.display());
                return Ok(MarketDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        match self.parse(&contents) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                error!("{}; previous data will be overwritten by defaults", e);
                Ok(MarketDocument::default())
            }
        }
    }

    async fn save(&self, doc: &MarketDocument) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(doc)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::transaction;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("market_db.json"));
        let doc = repo.load().await.unwrap();
        assert_eq!(doc, MarketDocument::default());
        assert!(!repo.path().exists());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("nested/market_db.json"));

        let mut doc = MarketDocument::default();
        doc.keywords.push("tumbler".to_string());
        repo.save(&doc).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), doc);
        // Only the target remains; the temp file was renamed over it
        let entries = std::fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn corrupt_file_resets_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market_db.json");
        std::fs::write(&path, "{\"keywords\": [").unwrap();

        let repo = JsonFileRepository::new(&path);
        assert!(matches!(
            repo.parse("{\"keywords\": ["),
            Err(StoreError::Corruption { .. })
        ));
        assert_eq!(repo.load().await.unwrap(), MarketDocument::default());
    }

    #[tokio::test]
    async fn existing_keys_are_kept_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market_db.json");
        std::fs::write(&path, r#"{"keywords": [], "insights": {}}"#).unwrap();

        let doc = JsonFileRepository::new(&path).load().await.unwrap();
        assert!(doc.keywords.is_empty());
    }

    #[tokio::test]
    async fn transaction_persists_the_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("market_db.json"));

        let added = transaction(&repo, |doc| doc.add_keyword("tumbler")).await.unwrap();
        assert!(added);
        assert!(repo.load().await.unwrap().keywords.contains(&"tumbler".to_string()));
    }
}
