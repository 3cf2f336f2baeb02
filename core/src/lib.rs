/// Fireside - dual-ledger chat synchronization core
///
/// Two named participants exchange short text messages over a shared
/// document store. Each conversation is stored twice (once per participant),
/// and every send/delete/mark-read is applied to both copies without
/// multi-document transactions. This crate is the synchronization core:
/// data model, notification state machine, dual-write protocols and the
/// dashboard reduction; UI and real identity are out of scope.

pub mod chat;
pub mod codec;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ledger;
pub mod paths;
pub mod store;
pub mod users;

pub use chat::{ChatSync, LedgerFeed};
pub use config::Config;
pub use dashboard::{ConversationFeed, DashboardSync};
pub use error::{FiresideError, Result};
pub use ledger::{ConversationLedger, ConversationStatus, Message, NotificationTracker};
pub use store::{Document, DocumentStore, MemoryStore, SharedStore, SledStore, Subscription};
pub use users::{UserDirectory, UserRecord};
