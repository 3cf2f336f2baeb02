/// Schema-driven encode/decode between the ledger entities and the store's
/// JSON document format.
///
/// Decoding is explicit and validated: a wrong-typed field is rejected as
/// `FiresideError::Decode` naming the offending field instead of being cast
/// through. Two lenient cases are deliberate:
///   - an absent document (Null) decodes to a fresh empty ledger, because
///     "not found" is a valid empty state, never an error;
///   - a missing `messages` array or `notificationTracker` object falls back
///     to its default, since stores commonly drop empty collections.
use crate::error::{FiresideError, Result};
use crate::ledger::{ConversationLedger, Message, NotificationTracker};
use crate::store::Document;
use serde_json::Value;

pub fn encode_ledger(ledger: &ConversationLedger) -> Result<Document> {
    Ok(serde_json::to_value(ledger)?)
}

pub fn decode_ledger(doc: &Document) -> Result<ConversationLedger> {
    if doc.is_null() {
        return Ok(ConversationLedger::default());
    }
    let obj = as_object(doc, "ledger")?;

    let messages = match obj.get("messages") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => decode_messages(value)?,
    };
    let notification_tracker = match obj.get("notificationTracker") {
        None | Some(Value::Null) => NotificationTracker::default(),
        Some(value) => decode_tracker(value)?,
    };

    Ok(ConversationLedger {
        messages,
        notification_tracker,
    })
}

fn decode_messages(value: &Value) -> Result<Vec<Message>> {
    let items = value
        .as_array()
        .ok_or_else(|| decode_err("messages", "expected an array"))?;

    let mut messages = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        messages.push(decode_message(item, idx)?);
    }
    Ok(messages)
}

fn decode_message(value: &Value, idx: usize) -> Result<Message> {
    let ctx = format!("messages[{}]", idx);
    let obj = as_object(value, &ctx)?;
    Ok(Message {
        sender: req_str(obj, &ctx, "sender")?,
        text: req_str(obj, &ctx, "text")?,
        sent_at_millis: req_i64(obj, &ctx, "sentAtMillis")?,
    })
}

fn decode_tracker(value: &Value) -> Result<NotificationTracker> {
    let ctx = "notificationTracker";
    let obj = as_object(value, ctx)?;

    let count = req_i64(obj, ctx, "count")?;
    if count < 0 || count > u32::MAX as i64 {
        return Err(decode_err(
            "notificationTracker.count",
            &format!("out of range: {}", count),
        ));
    }
    let is_read = obj
        .get("isRead")
        .and_then(Value::as_bool)
        .ok_or_else(|| decode_err("notificationTracker.isRead", "expected a bool"))?;

    Ok(NotificationTracker {
        count: count as u32,
        is_read,
    })
}

// ─── Field helpers ───────────────────────────────────────────────────────────

pub(crate) fn decode_err(field: &str, reason: &str) -> FiresideError {
    FiresideError::Decode(format!("{}: {}", field, reason))
}

pub(crate) fn as_object<'a>(
    value: &'a Value,
    ctx: &str,
) -> Result<&'a serde_json::Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| decode_err(ctx, "expected an object"))
}

pub(crate) fn req_str(obj: &serde_json::Map<String, Value>, ctx: &str, key: &str) -> Result<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| decode_err(&format!("{}.{}", ctx, key), "expected a string"))
}

fn req_i64(obj: &serde_json::Map<String, Value>, ctx: &str, key: &str) -> Result<i64> {
    obj.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| decode_err(&format!("{}.{}", ctx, key), "expected an integer"))
}
