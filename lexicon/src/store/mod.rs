mod json;
mod memory;

pub use json::JsonFile;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CatalogResult;

/// The persisted form: category name to word list, exactly as written on disk.
/// Nothing here is normalised yet.
pub type Document = BTreeMap<String, Vec<String>>;

/// Where the catalog document is kept.
#[async_trait]
pub trait Store: Send + Sync {
    /// `None` when no document has been written yet.
    async fn load(&self) -> CatalogResult<Option<Document>>;
    async fn save(&self, document: &Document) -> CatalogResult<()>;
}
