use std::sync::Mutex;

use async_trait::async_trait;

use super::{Document, Store};
use crate::error::CatalogResult;

/// Keeps the document in memory; used by tests and offline tooling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(document: Document) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }

    /// What the last `save` wrote.
    pub fn snapshot(&self) -> Option<Document> {
        self.document.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> CatalogResult<Option<Document>> {
        Ok(self.snapshot())
    }

    async fn save(&self, document: &Document) -> CatalogResult<()> {
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(document.clone());
        Ok(())
    }
}
