/// Dashboard synchronizer: the conversation-list view and recipient lookup.
use crate::codec::{as_object, decode_ledger};
use crate::error::{FiresideError, Result};
use crate::ledger::ConversationStatus;
use crate::paths;
use crate::store::{Document, SharedStore, Subscription};

pub struct DashboardSync {
    store: SharedStore,
}

impl DashboardSync {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Live feed of all of `owner`'s conversations, each reduced to a
    /// display summary. Re-emits the whole list on any ledger change.
    pub async fn list_conversations(&self, owner: &str) -> Result<ConversationFeed> {
        let sub = self.store.subscribe(&paths::history(owner)?).await?;
        Ok(ConversationFeed { sub })
    }

    /// Case-insensitive lookup of `query` against the participant
    /// directory. Returns the canonical stored name; no ledger is created
    /// or touched on a miss.
    pub async fn resolve_recipient(&self, query: &str) -> Result<String> {
        let doc = self.store.get(&paths::users()).await?;
        if doc.is_null() {
            return Err(FiresideError::RecipientUnknown(query.to_string()));
        }
        let users = as_object(&doc, paths::USERS_TAG)?;
        let wanted = query.to_lowercase();
        users
            .keys()
            .find(|name| name.to_lowercase() == wanted)
            .cloned()
            .ok_or_else(|| FiresideError::RecipientUnknown(query.to_string()))
    }
}

/// Live view of one participant's conversation list.
pub struct ConversationFeed {
    sub: Subscription,
}

impl ConversationFeed {
    /// Next snapshot: (peer name, display summary) rows sorted by peer
    /// name. The stored map is unordered, sorting keeps the list stable.
    pub async fn next(&mut self) -> Option<Result<Vec<(String, ConversationStatus)>>> {
        let doc = self.sub.next().await?;
        Some(reduce(&doc))
    }
}

fn reduce(doc: &Document) -> Result<Vec<(String, ConversationStatus)>> {
    if doc.is_null() {
        return Ok(Vec::new());
    }
    let ledgers = as_object(doc, paths::MESSAGE_HISTORY_TAG)?;
    let mut rows = Vec::with_capacity(ledgers.len());
    for (peer, ledger_doc) in ledgers {
        let ledger = decode_ledger(ledger_doc)?;
        rows.push((peer.clone(), ledger.status()));
    }
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reduce_maps_every_ledger_state() {
        let doc = json!({
            "carol": {
                "messages": [{"sender": "carol", "text": "hey", "sentAtMillis": 1}],
                "notificationTracker": {"count": 2, "isRead": false},
            },
            "bob": {
                "messages": [{"sender": "bob", "text": "hi", "sentAtMillis": 1}],
                "notificationTracker": {"count": 0, "isRead": true},
            },
            "dave": {},
        });

        let rows = reduce(&doc).unwrap();
        assert_eq!(
            rows,
            vec![
                ("bob".to_string(), ConversationStatus::Read),
                ("carol".to_string(), ConversationStatus::Unread(2)),
                ("dave".to_string(), ConversationStatus::NoMessages),
            ]
        );
    }

    #[test]
    fn reduce_of_absent_map_is_empty() {
        assert!(reduce(&Document::Null).unwrap().is_empty());
    }

    #[test]
    fn reduce_rejects_malformed_ledger() {
        let doc = json!({"bob": {"messages": 42}});
        assert!(matches!(
            reduce(&doc),
            Err(FiresideError::Decode(_))
        ));
    }
}
