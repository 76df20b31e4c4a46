use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{NamespaceId, Purpose};
use storage::{ListOptions, ObjectListing, ObjectStore, StoredObject};

/// Serves a fixed set of pages; non-exhaustive listings only see the first one.
struct PagedStore {
    pages: Vec<Vec<StoredObject>>,
}

#[async_trait]
impl ObjectStore for PagedStore {
    async fn list(&self, prefix: &str, options: ListOptions) -> Result<Vec<StoredObject>> {
        let pages = if options.exhaustive {
            self.pages.len()
        } else {
            1
        };
        Ok(self
            .pages
            .iter()
            .take(pages)
            .flatten()
            .filter(|item| item.path.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        Err(anyhow!("read-only store: {path}"))
    }

    async fn upload(
        &self,
        path: &str,
        _body: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String> {
        Err(anyhow!("read-only store: {path}"))
    }

    async fn presign_download(&self, path: &str, _expires_in: Duration) -> Result<String> {
        Err(anyhow!("read-only store: {path}"))
    }
}

fn object(path: String, size: Option<u64>) -> StoredObject {
    StoredObject {
        path,
        size,
        last_modified: None,
    }
}

#[tokio::test]
async fn namespace_listing_spans_pages_and_hides_placeholders() {
    let alice = NamespaceId::new("us-east-1:alice");
    let bob = NamespaceId::new("us-east-1:bob");
    let prefix = alice.prefix(Purpose::Quizzes);

    let store = PagedStore {
        pages: vec![
            vec![
                object(prefix.clone(), Some(0)),
                object(alice.object_key(Purpose::Quizzes, "week1.pdf"), Some(900)),
            ],
            vec![
                object(alice.object_key(Purpose::Quizzes, "week2.pptx"), Some(1200)),
                object(format!("{prefix}drafts/"), None),
                object(bob.object_key(Purpose::Quizzes, "secret.pdf"), Some(50)),
            ],
        ],
    };
    let listing = ObjectListing::new(Arc::new(store));

    let files = listing.list(&prefix).await;
    let names: Vec<&str> = files.iter().map(|f| f.file_name()).collect();

    assert_eq!(names, vec!["week1.pdf", "week2.pptx"]);
    assert!(files.iter().all(|f| f.key.starts_with(&prefix)));
}
