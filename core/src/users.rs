/// Participant directory: the `users/{name}` records the rest of the core
/// reads for recipient resolution.
///
/// Identity itself is out of scope — the caller supplies a stable name —
/// but someone has to write the directory records, so registration lives
/// here. Registering an existing name refreshes its token (login and
/// signup are the same write).
use crate::codec::{as_object, req_str};
use crate::error::Result;
use crate::paths;
use crate::store::{Document, SharedStore};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub auth_token: String,
}

pub struct UserDirectory {
    store: SharedStore,
}

impl UserDirectory {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Upsert the directory record for `name` and return the fresh bearer
    /// token.
    pub async fn register(&self, name: &str, email: &str) -> Result<String> {
        let path = paths::user(name)?;
        let token = mock_token(name, email);
        let record = UserRecord {
            email: email.to_string(),
            auth_token: token.clone(),
        };
        self.store.set(&path, serde_json::to_value(&record)?).await?;
        info!("Registered participant {}", name);
        Ok(token)
    }

    /// Exact-name lookup. `None` when no record exists.
    pub async fn lookup(&self, name: &str) -> Result<Option<UserRecord>> {
        let doc = self.store.get(&paths::user(name)?).await?;
        if doc.is_null() {
            return Ok(None);
        }
        Ok(Some(decode_user(&doc)?))
    }
}

fn decode_user(doc: &Document) -> Result<UserRecord> {
    let obj = as_object(doc, "user")?;
    Ok(UserRecord {
        email: req_str(obj, "user", "email")?,
        auth_token: req_str(obj, "user", "authToken")?,
    })
}

/// Unsigned placeholder token: base64 of name, email and the current time.
/// Stands in for a real auth service.
fn mock_token(name: &str, email: &str) -> String {
    let payload = format!("{}:{}:{}", name, email, chrono::Utc::now().timestamp_millis());
    general_purpose::STANDARD.encode(payload.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn register_then_lookup() {
        let store = Arc::new(MemoryStore::new());
        let directory = UserDirectory::new(store);

        let token = directory.register("Alice", "alice@example.com").await.unwrap();
        let record = directory.lookup("Alice").await.unwrap().unwrap();
        assert_eq!(record.email, "alice@example.com");
        assert_eq!(record.auth_token, token);
    }

    #[tokio::test]
    async fn re_register_refreshes_record() {
        let store = Arc::new(MemoryStore::new());
        let directory = UserDirectory::new(store);

        directory.register("Alice", "old@example.com").await.unwrap();
        directory.register("Alice", "new@example.com").await.unwrap();

        let record = directory.lookup("Alice").await.unwrap().unwrap();
        assert_eq!(record.email, "new@example.com");
    }

    #[tokio::test]
    async fn lookup_of_unknown_name_is_none() {
        let store = Arc::new(MemoryStore::new());
        let directory = UserDirectory::new(store);
        assert!(directory.lookup("nobody").await.unwrap().is_none());
    }
}
