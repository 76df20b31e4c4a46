use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::domain::{FileEntry, NAMESPACE_SEPARATOR};
use tracing::{debug, warn};

mod s3;

pub use s3::{S3ObjectStore, S3Settings};

/// MIME types accepted for document uploads (PDF and PowerPoint decks).
pub const ACCEPTED_DOCUMENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Raw item as reported by the object store, before placeholder filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// Follow continuation tokens until the listing is complete.
    pub exhaustive: bool,
}

impl ListOptions {
    pub fn exhaustive() -> Self {
        Self { exhaustive: true }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list(&self, prefix: &str, options: ListOptions) -> Result<Vec<StoredObject>>;
    async fn remove(&self, path: &str) -> Result<()>;
    /// Stores `body` under `path` and returns the stored key.
    async fn upload(&self, path: &str, body: Vec<u8>, content_type: Option<&str>)
        -> Result<String>;
    async fn presign_download(&self, path: &str, expires_in: Duration) -> Result<String>;
}

/// Lists user files under a namespace prefix.
///
/// Listing is always exhaustive, placeholder "folder" markers and empty
/// objects are dropped, and a failed listing degrades to no files.
#[derive(Clone)]
pub struct ObjectListing {
    store: Arc<dyn ObjectStore>,
}

impl ObjectListing {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub async fn list(&self, prefix: &str) -> Vec<FileEntry> {
        match self.store.list(prefix, ListOptions::exhaustive()).await {
            Ok(items) => {
                let total = items.len();
                let files = surfaced_files(items);
                debug!(prefix, total, surfaced = files.len(), "listed objects");
                files
            }
            Err(err) => {
                warn!(prefix, "object listing failed, showing no files: {err:#}");
                Vec::new()
            }
        }
    }
}

/// Keeps only real files: known non-zero size and a key not ending in the separator.
pub fn surfaced_files(items: impl IntoIterator<Item = StoredObject>) -> Vec<FileEntry> {
    items
        .into_iter()
        .filter_map(|item| match item.size {
            Some(size) if size > 0 && !item.path.ends_with(NAMESPACE_SEPARATOR) => Some(FileEntry {
                key: item.path,
                last_modified: item.last_modified,
                size,
            }),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    pub key: String,
    pub content_type: &'static str,
}

pub fn accepted_document_type(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).iter().find_map(|mime| {
        ACCEPTED_DOCUMENT_TYPES
            .iter()
            .copied()
            .find(|accepted| *accepted == mime.essence_str())
    })
}

/// Validates a local document and derives its key under `prefix`.
pub fn prepare_document_upload(prefix: &str, local_path: &Path) -> Result<PreparedUpload> {
    let file_name = local_path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("'{}' has no usable file name", local_path.display()))?;
    let content_type = accepted_document_type(local_path).ok_or_else(|| {
        anyhow!("unsupported file type for '{file_name}': only PDF and PowerPoint documents are accepted")
    })?;

    let mut key = prefix.to_string();
    if !key.is_empty() && !key.ends_with(NAMESPACE_SEPARATOR) {
        key.push(NAMESPACE_SEPARATOR);
    }
    key.push_str(file_name);

    Ok(PreparedUpload { key, content_type })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
