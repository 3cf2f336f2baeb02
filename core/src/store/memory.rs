/// In-memory document store.
///
/// Same contract as the persistent store, backed by a HashMap. This is the
/// fake-store injection point for tests and single-process demos.
use crate::error::Result;
use crate::store::{assemble_tree, Document, DocumentStore, Subscription, Watchers};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, Document>>,
    watchers: Watchers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_path(&self, path: &str) -> Document {
        let docs = self.docs.read().await;
        if let Some(doc) = docs.get(path) {
            return doc.clone();
        }
        let prefix = format!("{}/", path);
        let children: Vec<(String, Document)> = docs
            .iter()
            .filter_map(|(key, doc)| {
                key.strip_prefix(&prefix)
                    .map(|rel| (rel.to_string(), doc.clone()))
            })
            .collect();
        assemble_tree(children)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Document> {
        Ok(self.read_path(path).await)
    }

    async fn set(&self, path: &str, doc: Document) -> Result<()> {
        {
            let mut docs = self.docs.write().await;
            if doc.is_null() {
                docs.remove(path);
            } else {
                docs.insert(path.to_string(), doc.clone());
            }
        }
        self.watchers.notify(path, &doc).await;
        for ancestor in self.watchers.watched_ancestors(path).await {
            let snapshot = self.read_path(&ancestor).await;
            self.watchers.notify(&ancestor, &snapshot).await;
        }
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        let current = self.read_path(path).await;
        Ok(self.watchers.attach(path, current).await)
    }
}
