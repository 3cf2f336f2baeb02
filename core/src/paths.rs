/// Document path scheme for the shared store.
///
/// All documents live under a single root tag:
///   fireside_chat/messageHistory/{owner}/{peer}  -> ConversationLedger
///   fireside_chat/messageHistory/{owner}         -> map of peer -> ledger
///   fireside_chat/users/{name}                   -> { email, authToken }
use crate::error::{FiresideError, Result};

pub const ROOT_TAG: &str = "fireside_chat";
pub const USERS_TAG: &str = "users";
pub const MESSAGE_HISTORY_TAG: &str = "messageHistory";

/// Participant names become path segments, so they must be non-empty and
/// must not contain the path separator.
pub fn check_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(FiresideError::InvalidName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(FiresideError::InvalidName(format!(
            "'{}' contains '/'",
            name
        )));
    }
    Ok(name)
}

/// Path of one directed ledger: owner's copy of the conversation with peer.
pub fn ledger(owner: &str, peer: &str) -> Result<String> {
    Ok(format!(
        "{}/{}/{}/{}",
        ROOT_TAG,
        MESSAGE_HISTORY_TAG,
        check_name(owner)?,
        check_name(peer)?
    ))
}

/// Path of the map holding all of owner's ledgers, keyed by peer name.
pub fn history(owner: &str) -> Result<String> {
    Ok(format!(
        "{}/{}/{}",
        ROOT_TAG,
        MESSAGE_HISTORY_TAG,
        check_name(owner)?
    ))
}

/// Path of one participant directory record.
pub fn user(name: &str) -> Result<String> {
    Ok(format!("{}/{}/{}", ROOT_TAG, USERS_TAG, check_name(name)?))
}

/// Path of the whole participant directory.
pub fn users() -> String {
    format!("{}/{}", ROOT_TAG, USERS_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ledger_path() {
        assert_eq!(
            ledger("alice", "bob").unwrap(),
            "fireside_chat/messageHistory/alice/bob"
        );
    }

    #[test]
    fn rejects_separator_in_name() {
        assert!(matches!(
            ledger("al/ice", "bob"),
            Err(FiresideError::InvalidName(_))
        ));
        assert!(matches!(user(""), Err(FiresideError::InvalidName(_))));
    }
}
