/// Chat synchronizer: send, delete and fetch across the two mirrored ledger
/// paths of a conversation.
///
/// Every mutation is a read-modify-write of a whole ledger document, applied
/// once per direction. The store offers no cross-path transaction, so the
/// two writes of a send or delete are independent: a failure between them
/// leaves the conversation transiently one-sided. That weak-consistency
/// window is surfaced to the caller (error + warning log), never papered
/// over with retries. Two callers racing on the same ledger path can also
/// clobber each other's write (last write wins); accepted, see the design
/// notes.
use crate::codec::{decode_ledger, encode_ledger};
use crate::error::Result;
use crate::ledger::{ConversationLedger, Message};
use crate::paths;
use crate::store::{SharedStore, Subscription};
use tracing::{debug, warn};

pub struct ChatSync {
    store: SharedStore,
}

impl ChatSync {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Send a message from `from` to `to`.
    ///
    /// The sender's ledger is written first with the tracker untouched; the
    /// recipient's ledger is written second with its tracker advanced. If
    /// the sender-side write fails the send is abandoned (nothing assumed
    /// sent); if only the recipient-side write fails, the sender already
    /// sees the message and the error reports the asymmetry.
    pub async fn send_message(
        &self,
        from: &str,
        to: &str,
        text: &str,
        sent_at_millis: i64,
    ) -> Result<()> {
        let message = Message::new(from, text, sent_at_millis);

        self.apply_send(&message, from, to, false).await?;
        if let Err(e) = self.apply_send(&message, to, from, true).await {
            warn!(
                "Message from {} reached only the sender's ledger; {}'s copy is behind until the next send",
                from, to
            );
            return Err(e);
        }
        debug!("Message from {} to {} written to both ledgers", from, to);
        Ok(())
    }

    async fn apply_send(
        &self,
        message: &Message,
        owner: &str,
        peer: &str,
        notify: bool,
    ) -> Result<()> {
        let path = paths::ledger(owner, peer)?;
        let mut ledger = decode_ledger(&self.store.get(&path).await?)?;
        ledger.add_message(message.clone());
        if notify {
            ledger.notification_tracker.receive_message();
        }
        self.store.set(&path, encode_ledger(&ledger)?).await
    }

    /// Delete a message from both sides of the conversation between `name1`
    /// and `name2`. Each side independently removes the first structurally
    /// equal entry; the notification trackers are untouched. Both sides are
    /// attempted even if the first fails; a one-sided outcome leaves the
    /// ledgers diverged until reconciled by hand.
    pub async fn delete_message(&self, message: &Message, name1: &str, name2: &str) -> Result<()> {
        let first = self.apply_delete(message, name1, name2).await;
        let second = self.apply_delete(message, name2, name1).await;
        if first.is_ok() != second.is_ok() {
            warn!(
                "Delete applied to only one of the {}/{} ledgers; message lists diverged",
                name1, name2
            );
        }
        first.and(second)
    }

    async fn apply_delete(&self, message: &Message, owner: &str, peer: &str) -> Result<()> {
        let path = paths::ledger(owner, peer)?;
        let doc = self.store.get(&path).await?;
        if doc.is_null() {
            // Nothing stored, nothing to remove
            return Ok(());
        }
        let mut ledger = decode_ledger(&doc)?;
        if !ledger.find_and_remove_message(message) {
            return Ok(());
        }
        self.store.set(&path, encode_ledger(&ledger)?).await
    }

    /// Open the conversation `owner` has with `peer`.
    ///
    /// Returns a live feed that replaces the caller's view of the message
    /// list on every change. Separately, exactly once per call, the ledger
    /// is read back and its tracker marked read — opening the conversation
    /// clears the badge no matter how many live updates follow. Dropping
    /// the feed cancels the subscription.
    pub async fn fetch_ledger(&self, owner: &str, peer: &str) -> Result<LedgerFeed> {
        let path = paths::ledger(owner, peer)?;
        let sub = self.store.subscribe(&path).await?;

        let doc = self.store.get(&path).await?;
        if !doc.is_null() {
            let mut ledger = decode_ledger(&doc)?;
            ledger.notification_tracker.mark_as_read();
            self.store.set(&path, encode_ledger(&ledger)?).await?;
        }

        Ok(LedgerFeed { sub })
    }

    /// Create an empty ledger at path(name1, name2) unless one already
    /// exists, so the conversation shows up on dashboards before the first
    /// message. Call once per direction.
    pub async fn ensure_ledger_exists(&self, name1: &str, name2: &str) -> Result<()> {
        let path = paths::ledger(name1, name2)?;
        if self.store.get(&path).await?.is_null() {
            self.store
                .set(&path, encode_ledger(&ConversationLedger::default())?)
                .await?;
        }
        Ok(())
    }
}

/// Live view of one ledger's message list.
pub struct LedgerFeed {
    sub: Subscription,
}

impl LedgerFeed {
    /// Next full replacement of the message sequence. `None` once the store
    /// side is gone.
    pub async fn next(&mut self) -> Option<Result<Vec<Message>>> {
        let doc = self.sub.next().await?;
        Some(decode_ledger(&doc).map(|ledger| ledger.messages))
    }
}
