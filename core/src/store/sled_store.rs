/// Persistent document store on sled.
///
/// One key per document path, JSON bytes as the value, flushed on every
/// write. Subscriptions are in-process only: a watcher sees writes made
/// through this handle (and its clones), not writes from another process.
use crate::error::{FiresideError, Result};
use crate::store::{assemble_tree, Document, DocumentStore, Subscription, Watchers};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    watchers: Arc<Watchers>,
}

impl SledStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let db = sled::open(data_dir.join("documents.db"))
            .map_err(|e| FiresideError::Store(format!("Failed to open documents DB: {}", e)))?;
        Ok(Self {
            db,
            watchers: Arc::new(Watchers::default()),
        })
    }

    fn read_path(&self, path: &str) -> Result<Document> {
        if let Some(bytes) = self
            .db
            .get(path.as_bytes())
            .map_err(|e| FiresideError::Store(format!("Failed to read {}: {}", path, e)))?
        {
            let doc = serde_json::from_slice(&bytes)?;
            return Ok(doc);
        }

        let prefix = format!("{}/", path);
        let mut children = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, bytes) =
                entry.map_err(|e| FiresideError::Store(format!("Failed to scan {}: {}", path, e)))?;
            let key = String::from_utf8_lossy(&key).to_string();
            let rel = key[prefix.len()..].to_string();
            children.push((rel, serde_json::from_slice(&bytes)?));
        }
        Ok(assemble_tree(children))
    }
}

#[async_trait]
impl DocumentStore for SledStore {
    async fn get(&self, path: &str) -> Result<Document> {
        self.read_path(path)
    }

    async fn set(&self, path: &str, doc: Document) -> Result<()> {
        if doc.is_null() {
            self.db
                .remove(path.as_bytes())
                .map_err(|e| FiresideError::Store(format!("Failed to remove {}: {}", path, e)))?;
        } else {
            let bytes = serde_json::to_vec(&doc)?;
            self.db
                .insert(path.as_bytes(), bytes)
                .map_err(|e| FiresideError::Store(format!("Failed to write {}: {}", path, e)))?;
        }
        self.db
            .flush()
            .map_err(|e| FiresideError::Store(format!("Failed to flush DB: {}", e)))?;

        self.watchers.notify(path, &doc).await;
        for ancestor in self.watchers.watched_ancestors(path).await {
            let snapshot = self.read_path(&ancestor)?;
            self.watchers.notify(&ancestor, &snapshot).await;
        }
        Ok(())
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        let current = self.read_path(path)?;
        Ok(self.watchers.attach(path, current).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let store = SledStore::open(temp_dir.path()).unwrap();
        store.set("a/b", json!({"x": 1})).await.unwrap();
        drop(store);

        let store = SledStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.get("a/b").await.unwrap(), json!({"x": 1}));
    }

    #[tokio::test]
    async fn interior_path_assembles_from_prefix_scan() {
        let temp_dir = TempDir::new().unwrap();
        let store = SledStore::open(temp_dir.path()).unwrap();

        store.set("root/alice/bob", json!(1)).await.unwrap();
        store.set("root/alice/carol", json!(2)).await.unwrap();

        assert_eq!(
            store.get("root/alice").await.unwrap(),
            json!({"bob": 1, "carol": 2})
        );
        assert!(store.get("root/dave").await.unwrap().is_null());
    }

    #[tokio::test]
    async fn subscription_delivers_current_then_updates() {
        let temp_dir = TempDir::new().unwrap();
        let store = SledStore::open(temp_dir.path()).unwrap();

        let mut sub = store.subscribe("a/b").await.unwrap();
        assert!(sub.next().await.unwrap().is_null());

        store.set("a/b", json!("hello")).await.unwrap();
        assert_eq!(sub.next().await.unwrap(), json!("hello"));
    }
}
