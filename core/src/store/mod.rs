/// Keyed document store abstraction.
///
/// The remote database behind the chat core is a tree of JSON documents
/// addressed by slash-separated paths, offering exactly three primitives:
/// one-shot read, full-overwrite write, and a live subscription that
/// re-delivers the complete current value of a path on every change. No
/// multi-path transaction exists; the synchronizers are built on that
/// assumption.
///
/// The store is an explicit injected object (`SharedStore`), never a
/// process-wide singleton, so tests can swap in `MemoryStore`.
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

/// A stored document. Absent paths surface as `Value::Null`.
pub type Document = Value;

pub type SharedStore = Arc<dyn DocumentStore>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot read. Returns `Null` when nothing is stored at the path.
    /// A path with stored descendants but no document of its own reads as
    /// the assembled map of its children.
    async fn get(&self, path: &str) -> Result<Document>;

    /// Full overwrite of the document at `path`. Last write wins.
    async fn set(&self, path: &str, doc: Document) -> Result<()>;

    /// Live subscription: fires immediately with the current value, then on
    /// every change to the path (including changes to its descendants).
    async fn subscribe(&self, path: &str) -> Result<Subscription>;
}

/// Owned receiving end of a live subscription. Dropping it cancels delivery;
/// the store prunes the dead sender on its next notification.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Document>,
}

impl Subscription {
    /// Next full-value snapshot, or `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Document> {
        self.rx.recv().await
    }
}

/// Per-path subscriber bookkeeping shared by the store implementations.
#[derive(Default)]
pub(crate) struct Watchers {
    inner: RwLock<HashMap<String, Vec<mpsc::UnboundedSender<Document>>>>,
}

impl Watchers {
    /// Register a new subscriber and deliver the current value immediately.
    pub async fn attach(&self, path: &str, current: Document) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, this send cannot fail
        let _ = tx.send(current);
        self.inner
            .write()
            .await
            .entry(path.to_string())
            .or_default()
            .push(tx);
        Subscription { rx }
    }

    /// Deliver a snapshot to every live subscriber of `path`, pruning
    /// subscribers whose receiving end was dropped.
    pub async fn notify(&self, path: &str, doc: &Document) {
        let mut inner = self.inner.write().await;
        if let Some(subs) = inner.get_mut(path) {
            subs.retain(|tx| tx.send(doc.clone()).is_ok());
            if subs.is_empty() {
                inner.remove(path);
            }
        }
    }

    /// Watched paths that are strict ancestors of `path`. A write at `path`
    /// changes the assembled value of each of these.
    pub async fn watched_ancestors(&self, path: &str) -> Vec<String> {
        self.inner
            .read()
            .await
            .keys()
            .filter(|watched| {
                path.len() > watched.len()
                    && path.starts_with(watched.as_str())
                    && path.as_bytes()[watched.len()] == b'/'
            })
            .cloned()
            .collect()
    }
}

/// Build the value of an interior path out of its stored descendants, given
/// as (path-relative-to-the-interior-node, document) pairs. No descendants
/// means the path is absent.
pub(crate) fn assemble_tree(children: Vec<(String, Document)>) -> Document {
    if children.is_empty() {
        return Document::Null;
    }
    let mut root = serde_json::Map::new();
    for (rel, doc) in children {
        insert_at(&mut root, &rel, doc);
    }
    Value::Object(root)
}

fn insert_at(map: &mut serde_json::Map<String, Value>, rel: &str, doc: Document) {
    match rel.split_once('/') {
        None => {
            map.insert(rel.to_string(), doc);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(child) = entry {
                insert_at(child, rest, doc);
            }
        }
    }
}
