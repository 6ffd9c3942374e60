//! Response Normalizer — collapses any `BackendReply` shape into one string.

use serde_json::Value;

use crate::retrieval::BackendReply;

/// Keys searched, in priority order, on a keyed reply.
const REPLY_KEYS: [&str; 4] = ["text", "content", "answer", "result"];

/// Collapses a reply into a single string.
///
/// 1. Keyed reply: the first present key of `text`, `content`, `answer`, `result`.
/// 2. Reply with a `content` attribute: that content.
/// 3. Anything else: the whole reply, stringified.
pub fn normalize_reply(reply: &BackendReply) -> String {
    match reply {
        BackendReply::Text(text) => text.clone(),
        BackendReply::Structured(fields) => REPLY_KEYS
            .iter()
            .find_map(|key| fields.get(*key))
            .map(value_to_string)
            .unwrap_or_else(|| stringify(reply)),
        BackendReply::Message(message) => message.content.clone().unwrap_or_default(),
        BackendReply::Batch(_) => stringify(reply),
    }
}

/// List-aware variant: a batch of replies becomes the concatenation of each
/// element's normalized text, in order, with no separator.
pub fn normalize_replies(reply: &BackendReply) -> String {
    match reply {
        BackendReply::Batch(replies) => replies.iter().map(normalize_replies).collect(),
        other => normalize_reply(other),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn stringify(reply: &BackendReply) -> String {
    serde_json::to_string(reply).unwrap_or_default()
}
