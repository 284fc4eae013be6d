//! Classification of server-pushed chat events.
//!
//! A pushed frame is either an AI stream event (has a recognised `aiEvent`)
//! or a plain chat row. AI events map onto [`upsert_ai_message`] patches.

use serde_json::Value;
use tracing::warn;

use crate::chat::reducer::{upsert_ai_message, AiPatch, UiMessage};
use crate::models::{AiEvent, ChatMessageEntry};
use crate::normalize::adapt_in_chat_message;
use crate::normalize::probe::{unwrap_record, Record};

/// Shown when an ERROR event carries no message of its own.
pub const DEFAULT_AI_ERROR: &str = "AI response failed.";

const AI_EVENT: &[&str] = &["aiEvent", "AI_EVENT"];
const AI_MSG_ID: &[&str] = &["aiMsgId", "AI_MSG_ID"];
const BOT_VARIANT: &[&str] = &["botVariant", "BOT_VARIANT"];
const DELTA: &[&str] = &["delta", "token", "text"];
const FINAL_TEXT: &[&str] = &["answer", "content"];
const ERROR_MSG: &[&str] = &["errorMsg", "ERROR_MSG", "message", "error"];
const EVENT_DT: &[&str] = &["dt", "eventDt", "sentDt", "SENT_DT"];
const SEQ: &[&str] = &["seq", "SEQ"];

#[derive(Debug, Clone, PartialEq)]
pub struct AiStreamEvent {
    pub ai_msg_id: String,
    pub event: AiEvent,
    pub bot_variant: Option<String>,
    pub delta: Option<String>,
    pub final_text: Option<String>,
    pub error_msg: Option<String>,
    pub dt: Option<String>,
    /// Per-reply sequence number, when the transport provides one.
    pub seq: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Ai(AiStreamEvent),
    Human(ChatMessageEntry),
}

/// Classifies one pushed JSON value.
///
/// Returns `None` only for an AI event that cannot be correlated (no
/// `aiMsgId`); such an event has no message to attach to.
pub fn parse_stream_event(raw: &Value) -> Option<ChatEvent> {
    // AI events keep `result.answer` as payload, so they are not unwrapped
    // unless the discriminant itself sits inside an envelope.
    let top = Record::of(raw);
    let record = if top.has_any(AI_EVENT) {
        top
    } else {
        unwrap_record(raw)
    };

    let Some(event) = record.code::<AiEvent>(AI_EVENT) else {
        return Some(ChatEvent::Human(adapt_in_chat_message(raw)));
    };
    let Some(ai_msg_id) = record.id_string(AI_MSG_ID) else {
        warn!("Dropping {event} event without aiMsgId");
        return None;
    };

    Some(ChatEvent::Ai(AiStreamEvent {
        ai_msg_id,
        event,
        bot_variant: record.string(BOT_VARIANT),
        delta: record.text(DELTA),
        final_text: record
            .string(FINAL_TEXT)
            .or_else(|| record.nested("result").string(&["answer"])),
        error_msg: record.string(ERROR_MSG),
        dt: record.string(EVENT_DT),
        seq: record.int(SEQ).and_then(|n| u64::try_from(n).ok()),
    }))
}

/// Translates an AI stream event into its reducer patch.
pub fn ai_patch(event: AiStreamEvent) -> AiPatch {
    let AiStreamEvent {
        event: kind,
        bot_variant,
        delta,
        final_text,
        error_msg,
        dt,
        ..
    } = event;
    match kind {
        AiEvent::Start => AiPatch {
            set_text: Some(String::new()),
            ai_event: Some(kind),
            bot_variant,
            dt,
            ..Default::default()
        },
        AiEvent::Token => AiPatch {
            append_text: delta,
            ai_event: Some(kind),
            bot_variant,
            ..Default::default()
        },
        AiEvent::Done => AiPatch {
            set_text: final_text,
            ai_event: Some(kind),
            bot_variant,
            ..Default::default()
        },
        AiEvent::Error => {
            let msg = error_msg.unwrap_or_else(|| DEFAULT_AI_ERROR.to_string());
            AiPatch {
                set_text: Some(msg.clone()),
                error_msg: Some(msg),
                ai_event: Some(kind),
                bot_variant,
                ..Default::default()
            }
        }
    }
}

pub fn apply_ai_event(list: &mut Vec<UiMessage>, event: AiStreamEvent) {
    let ai_msg_id = event.ai_msg_id.clone();
    upsert_ai_message(list, &ai_msg_id, ai_patch(event));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ai(raw: Value) -> AiStreamEvent {
        match parse_stream_event(&raw) {
            Some(ChatEvent::Ai(e)) => e,
            other => panic!("expected AI event, got {other:?}"),
        }
    }

    fn fold(events: &[Value]) -> Vec<UiMessage> {
        let mut list = Vec::new();
        for raw in events {
            apply_ai_event(&mut list, ai(raw.clone()));
        }
        list
    }

    #[test]
    fn plain_rows_are_human_messages() {
        let event = parse_stream_event(&json!({ "MSG_ID": 4, "CONTENT": "hey" }));
        match event {
            Some(ChatEvent::Human(entry)) => {
                assert_eq!(entry.id, Some(4));
                assert_eq!(entry.content.as_deref(), Some("hey"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_ai_event_falls_back_to_human() {
        let event = parse_stream_event(&json!({ "aiEvent": "PING", "content": "x" }));
        assert!(matches!(event, Some(ChatEvent::Human(_))));
    }

    #[test]
    fn only_first_ai_event_alias_classifies() {
        let event = parse_stream_event(&json!({ "aiEvent": "PING", "AI_EVENT": "TOKEN", "aiMsgId": "m" }));
        assert!(matches!(event, Some(ChatEvent::Human(_))));
    }

    #[test]
    fn ai_event_without_id_is_dropped() {
        assert_eq!(parse_stream_event(&json!({ "aiEvent": "TOKEN", "delta": "a" })), None);
    }

    #[test]
    fn delta_aliases_and_whitespace() {
        assert_eq!(ai(json!({ "aiEvent": "TOKEN", "aiMsgId": "m", "token": " " })).delta.as_deref(), Some(" "));
        assert_eq!(ai(json!({ "aiEvent": "token", "aiMsgId": 5, "text": "b" })).delta.as_deref(), Some("b"));
    }

    #[test]
    fn final_text_from_nested_result() {
        let e = ai(json!({ "aiEvent": "DONE", "aiMsgId": "m", "result": { "answer": "42" } }));
        assert_eq!(e.final_text.as_deref(), Some("42"));
    }

    #[test]
    fn enveloped_ai_event_is_recognised() {
        let e = ai(json!({ "data": { "aiEvent": "START", "aiMsgId": "m", "botVariant": "fast" } }));
        assert_eq!(e.event, AiEvent::Start);
        assert_eq!(e.bot_variant.as_deref(), Some("fast"));
    }

    #[test]
    fn start_token_done_yields_single_message() {
        let list = fold(&[
            json!({ "aiEvent": "START", "aiMsgId": "x", "botVariant": "v1" }),
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "a" }),
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "b" }),
            json!({ "aiEvent": "DONE", "aiMsgId": "x" }),
        ]);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].content, "ab");
        assert_eq!(list[0].ai_event, Some(AiEvent::Done));
        assert_eq!(list[0].bot_variant.as_deref(), Some("v1"));
    }

    #[test]
    fn done_answer_overrides_tokens() {
        let list = fold(&[
            json!({ "aiEvent": "START", "aiMsgId": "x" }),
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "partial" }),
            json!({ "aiEvent": "DONE", "aiMsgId": "x", "answer": "final answer" }),
        ]);
        assert_eq!(list[0].content, "final answer");
    }

    #[test]
    fn start_clears_previous_content() {
        let list = fold(&[
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "stale" }),
            json!({ "aiEvent": "START", "aiMsgId": "x" }),
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "fresh" }),
        ]);
        assert_eq!(list[0].content, "fresh");
    }

    #[test]
    fn error_shows_message_and_ends_stream() {
        let list = fold(&[
            json!({ "aiEvent": "START", "aiMsgId": "x" }),
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "half" }),
            json!({ "aiEvent": "ERROR", "aiMsgId": "x", "errorMsg": "quota exceeded" }),
        ]);
        assert_eq!(list[0].content, "quota exceeded");
        assert_eq!(list[0].error_msg.as_deref(), Some("quota exceeded"));
        assert!(!list[0].is_streaming());
    }

    #[test]
    fn error_without_text_uses_default() {
        let list = fold(&[json!({ "aiEvent": "ERROR", "aiMsgId": "x" })]);
        assert_eq!(list[0].content, DEFAULT_AI_ERROR);
    }

    #[test]
    fn tokens_after_error_still_append() {
        let list = fold(&[
            json!({ "aiEvent": "ERROR", "aiMsgId": "x", "errorMsg": "oops" }),
            json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "!" }),
        ]);
        assert_eq!(list[0].content, "oops!");
    }

    #[test]
    fn seq_is_parsed_when_present() {
        let e = ai(json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "a", "seq": "3" }));
        assert_eq!(e.seq, Some(3));
        let e = ai(json!({ "aiEvent": "TOKEN", "aiMsgId": "x", "delta": "a", "seq": -1 }));
        assert_eq!(e.seq, None);
    }
}
