//! Display list of a chat view and the operations that fold events into it.

use std::cmp::Ordering;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::context::OwnerContext;
use crate::models::{AiEvent, ChatMessageEntry};

pub const AI_SENDER_ID: i64 = 0;
pub const AI_SENDER_NM: &str = "AI";

/// One rendered line in a chat view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    /// Stable across updates of the same message.
    pub key: String,
    pub msg_id: Option<i64>,
    pub sender_id: Option<i64>,
    pub sender_nm: Option<String>,
    pub content: String,
    pub content_type: Option<String>,
    pub sent_dt: Option<String>,
    pub translated_text: Option<String>,
    pub ai_msg_id: Option<String>,
    pub bot_variant: Option<String>,
    pub ai_event: Option<AiEvent>,
    pub error_msg: Option<String>,
}

impl UiMessage {
    pub fn is_ai(&self) -> bool {
        self.ai_msg_id.is_some()
    }

    pub fn is_mine(&self, owner: &OwnerContext) -> bool {
        !self.is_ai() && owner.is_owner(self.sender_id)
    }

    /// Still receiving tokens.
    pub fn is_streaming(&self) -> bool {
        self.is_ai() && !self.ai_event.is_some_and(|e| e.is_terminal())
    }
}

/// Partial update for one AI message. Absent fields leave the message as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiPatch {
    pub bot_variant: Option<String>,
    pub ai_event: Option<AiEvent>,
    pub error_msg: Option<String>,
    /// Concatenated after the base text.
    pub append_text: Option<String>,
    /// Replaces the accumulated text before `append_text` is applied.
    pub set_text: Option<String>,
    pub dt: Option<String>,
}

pub fn to_ui_message(entry: &ChatMessageEntry) -> UiMessage {
    let key = match entry.id {
        Some(id) => format!("msg-{id}"),
        None => format!("local-{}", Uuid::new_v4()),
    };
    UiMessage {
        key,
        msg_id: entry.id,
        sender_id: entry.sender_id,
        sender_nm: entry.sender_nm.clone(),
        content: entry.content.clone().unwrap_or_default(),
        content_type: entry.content_type.clone(),
        sent_dt: entry.timestamp().map(str::to_owned),
        translated_text: entry.translated_text.clone(),
        ai_msg_id: None,
        bot_variant: None,
        ai_event: None,
        error_msg: None,
    }
}

/// Appends a human message. No deduplication happens here.
pub fn push_human_message(list: &mut Vec<UiMessage>, entry: &ChatMessageEntry) {
    list.push(to_ui_message(entry));
}

/// Merges `patch` into the message correlated with `ai_msg_id`, creating it
/// at the end of the list on first sight. Other messages are not touched.
pub fn upsert_ai_message(list: &mut Vec<UiMessage>, ai_msg_id: &str, patch: AiPatch) {
    let AiPatch {
        bot_variant,
        ai_event,
        error_msg,
        append_text,
        set_text,
        dt,
    } = patch;

    match list
        .iter_mut()
        .find(|m| m.ai_msg_id.as_deref() == Some(ai_msg_id))
    {
        Some(existing) => {
            let mut content = set_text.unwrap_or_else(|| std::mem::take(&mut existing.content));
            if let Some(delta) = append_text {
                content.push_str(&delta);
            }
            existing.content = content;
            if bot_variant.is_some() {
                existing.bot_variant = bot_variant;
            }
            if ai_event.is_some() {
                existing.ai_event = ai_event;
            }
            if error_msg.is_some() {
                existing.error_msg = error_msg;
            }
            if dt.is_some() {
                existing.sent_dt = dt;
            }
        }
        None => {
            let mut content = set_text.unwrap_or_default();
            if let Some(delta) = append_text {
                content.push_str(&delta);
            }
            list.push(UiMessage {
                key: format!("ai-{ai_msg_id}"),
                msg_id: None,
                sender_id: Some(AI_SENDER_ID),
                sender_nm: Some(AI_SENDER_NM.to_string()),
                content,
                content_type: None,
                sent_dt: Some(dt.unwrap_or_else(now_timestamp)),
                translated_text: None,
                ai_msg_id: Some(ai_msg_id.to_string()),
                bot_variant,
                ai_event,
                error_msg,
            });
        }
    }
}

/// Orders a history batch oldest first: by numeric id when both sides have
/// one, otherwise by `sentDt`/`createdDt` text.
pub fn sort_history_asc(mut entries: Vec<ChatMessageEntry>) -> Vec<ChatMessageEntry> {
    // Insertion sort: the mixed comparator is not a total order, which
    // slice::sort_by does not accept.
    for i in 1..entries.len() {
        let mut j = i;
        while j > 0 && history_order(&entries[j - 1], &entries[j]) == Ordering::Greater {
            entries.swap(j - 1, j);
            j -= 1;
        }
    }
    entries
}

fn history_order(a: &ChatMessageEntry, b: &ChatMessageEntry) -> Ordering {
    match (a.id, b.id) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.timestamp().unwrap_or("").cmp(b.timestamp().unwrap_or("")),
    }
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
