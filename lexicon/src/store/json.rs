use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{Document, Store};
use crate::error::CatalogResult;

/// Pretty-printed JSON object on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Store for JsonFile {
    async fn load(&self) -> CatalogResult<Option<Document>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        // a `null` list is read as empty
        let parsed: BTreeMap<String, Option<Vec<String>>> = serde_json::from_str(&raw)?;
        let document = parsed
            .into_iter()
            .map(|(category, words)| (category, words.unwrap_or_default()))
            .collect();
        Ok(Some(document))
    }

    async fn save(&self, document: &Document) -> CatalogResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, json).await?;
        tracing::debug!(path = %self.path.display(), "word document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFile::new(dir.path().join("nothing.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFile::new(dir.path().join("data").join("words.json"));
        let mut document = Document::new();
        document.insert("fructe".into(), vec!["mar".into(), "para".into()]);

        store.save(&document).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(document));
    }

    #[tokio::test]
    async fn null_lists_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, r#"{"animale": null, "orase": ["cluj"]}"#).unwrap();

        let document = JsonFile::new(&path).load().await.unwrap().unwrap();

        assert_eq!(document["animale"], Vec::<String>::new());
        assert_eq!(document["orase"], vec!["cluj".to_string()]);
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = JsonFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, crate::CatalogError::Json(_)));
    }
}
