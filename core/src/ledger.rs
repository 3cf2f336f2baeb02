/// Conversation data model: messages, the per-ledger notification tracker,
/// and the dashboard reduction of a ledger.
///
/// Every conversation between A and B exists twice in the store: one ledger
/// under A for B and one under B for A, each carrying its own full copy of
/// the message list and its own notification state. The synchronizers in
/// `chat` keep the two copies in step; nothing in this module touches the
/// store.
use serde::{Deserialize, Serialize};
use std::fmt;

/// One chat message. Immutable once created; structural equality over all
/// three fields is the only identity a message has (there is no server-side
/// message id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender: String,
    pub text: String,
    pub sent_at_millis: i64,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>, sent_at_millis: i64) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            sent_at_millis,
        }
    }
}

/// Unread-badge state of one ledger.
///
/// Two states only: read (count 0) and unread (count > 0). `count` is a u32
/// so a negative count is unrepresentable; the decode boundary rejects
/// negative wire values before they reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTracker {
    pub count: u32,
    pub is_read: bool,
}

impl NotificationTracker {
    /// A message arrived on the owner's ledger: bump the badge and flip the
    /// ledger to unread. Applied only on the recipient side of a send.
    pub fn receive_message(&mut self) {
        self.count += 1;
        self.is_read = false;
    }

    /// The owner opened the conversation. Idempotent.
    pub fn mark_as_read(&mut self) {
        self.count = 0;
        self.is_read = true;
    }
}

impl Default for NotificationTracker {
    fn default() -> Self {
        Self {
            count: 0,
            is_read: true,
        }
    }
}

/// One participant's stored copy of a conversation: the full message list in
/// insertion order plus the owner's notification state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationLedger {
    pub messages: Vec<Message>,
    pub notification_tracker: NotificationTracker,
}

impl ConversationLedger {
    /// Append a message. The list is append-only; order is insertion order.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Remove the first structurally-equal message, if any. At most one
    /// entry is removed; duplicates (same sender, text and timestamp) are
    /// indistinguishable, so the earliest match is taken.
    pub fn find_and_remove_message(&mut self, message: &Message) -> bool {
        match self.messages.iter().position(|m| m == message) {
            Some(idx) => {
                self.messages.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Reduce this ledger to its dashboard summary.
    pub fn status(&self) -> ConversationStatus {
        if self.messages.is_empty() {
            ConversationStatus::NoMessages
        } else if self.notification_tracker.is_read {
            ConversationStatus::Read
        } else {
            ConversationStatus::Unread(self.notification_tracker.count)
        }
    }
}

/// Dashboard summary of one conversation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    /// Ledger exists but no message was ever exchanged.
    NoMessages,
    /// All messages seen by the owner.
    Read,
    /// Unseen messages pending for the owner.
    Unread(u32),
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::NoMessages => write!(f, "start a conversation"),
            ConversationStatus::Read => write!(f, "read"),
            ConversationStatus::Unread(n) => write!(f, "{} new messages", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ledger_is_empty_and_read() {
        let ledger = ConversationLedger::default();
        assert!(ledger.messages.is_empty());
        assert_eq!(ledger.notification_tracker.count, 0);
        assert!(ledger.notification_tracker.is_read);
        assert_eq!(ledger.status(), ConversationStatus::NoMessages);
    }

    #[test]
    fn receive_transitions_read_to_unread() {
        let mut tracker = NotificationTracker::default();
        tracker.receive_message();
        assert_eq!(tracker.count, 1);
        assert!(!tracker.is_read);

        tracker.receive_message();
        assert_eq!(tracker.count, 2);
        assert!(!tracker.is_read);
    }

    #[test]
    fn mark_as_read_is_idempotent() {
        let mut tracker = NotificationTracker::default();
        tracker.receive_message();
        tracker.mark_as_read();
        assert_eq!(tracker.count, 0);
        assert!(tracker.is_read);

        // Second mark is a no-op, not an error
        tracker.mark_as_read();
        assert_eq!(tracker.count, 0);
        assert!(tracker.is_read);
    }

    #[test]
    fn remove_takes_at_most_one_match() {
        let mut ledger = ConversationLedger::default();
        let msg = Message::new("bob", "hi", 1000);
        ledger.add_message(msg.clone());
        ledger.add_message(msg.clone());

        assert!(ledger.find_and_remove_message(&msg));
        assert_eq!(ledger.messages.len(), 1);

        assert!(ledger.find_and_remove_message(&msg));
        assert!(ledger.messages.is_empty());

        // Nothing left to remove
        assert!(!ledger.find_and_remove_message(&msg));
    }

    #[test]
    fn remove_requires_structural_equality() {
        let mut ledger = ConversationLedger::default();
        ledger.add_message(Message::new("bob", "hi", 1000));

        assert!(!ledger.find_and_remove_message(&Message::new("bob", "hi", 1001)));
        assert!(!ledger.find_and_remove_message(&Message::new("alice", "hi", 1000)));
        assert_eq!(ledger.messages.len(), 1);
    }

    #[test]
    fn status_reflects_tracker() {
        let mut ledger = ConversationLedger::default();
        ledger.add_message(Message::new("bob", "hi", 1000));
        ledger.notification_tracker.receive_message();
        assert_eq!(ledger.status(), ConversationStatus::Unread(1));
        assert_eq!(ledger.status().to_string(), "1 new messages");

        ledger.notification_tracker.mark_as_read();
        assert_eq!(ledger.status(), ConversationStatus::Read);
        assert_eq!(ledger.status().to_string(), "read");
    }
}
