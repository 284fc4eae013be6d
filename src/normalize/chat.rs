use serde_json::Value;

use crate::models::{ChatMessageDraft, ChatMessageEntry, ChatRoomEntry};
use crate::normalize::patch::Payload;
use crate::normalize::probe::{list_items, unwrap_record};

// ── Room keys ────────────────────────────────────────────────────────────────

const ROOM_ID: &[&str] = &["roomId", "ROOM_ID", "id", "ID"];
const ROOM_OWNER_ID: &[&str] = &["ownerId", "OWNER_ID", "userId", "USER_ID"];
const ROOM_NM: &[&str] = &["roomNm", "ROOM_NM", "roomName", "ROOM_NAME"];
const ROOM_TYPE: &[&str] = &["roomType", "ROOM_TYPE", "roomTypeCd", "ROOM_TYPE_CD"];
const ROOM_DESC: &[&str] = &["roomDesc", "ROOM_DESC", "description", "DESCRIPTION"];
const LAST_MSG_CONTENT: &[&str] = &["lastMsgContent", "LAST_MSG_CONTENT", "lastMessage", "LAST_MESSAGE"];
const LAST_MSG_DT: &[&str] = &["lastMsgDt", "LAST_MSG_DT", "lastMessageDt", "LAST_MESSAGE_DT"];
const CREATED_DT: &[&str] = &["createdDt", "CREATED_DT"];
const CREATED_BY: &[&str] = &["createdBy", "CREATED_BY"];
const UPDATED_DT: &[&str] = &["updatedDt", "UPDATED_DT"];
const UPDATED_BY: &[&str] = &["updatedBy", "UPDATED_BY"];

// ── Message keys ─────────────────────────────────────────────────────────────

const MSG_ID: &[&str] = &["msgId", "MSG_ID", "messageId", "MESSAGE_ID", "id", "ID"];
const MSG_ROOM_ID: &[&str] = &["roomId", "ROOM_ID"];
const SENDER_ID: &[&str] = &["senderId", "SENDER_ID", "userId", "USER_ID"];
const SENDER_NM: &[&str] = &["senderNm", "SENDER_NM", "senderName", "SENDER_NAME", "userNm", "USER_NM"];
const CONTENT: &[&str] = &["content", "CONTENT", "msgContent", "MSG_CONTENT", "message", "MESSAGE"];
const CONTENT_TYPE: &[&str] = &["contentType", "CONTENT_TYPE", "msgType", "MSG_TYPE"];
const SENT_DT: &[&str] = &["sentDt", "SENT_DT", "sendDt", "SEND_DT"];
const TRANSLATED_TEXT: &[&str] = &["translatedText", "TRANSLATED_TEXT"];
const TRANSLATE_ERROR_MSG: &[&str] = &["translateErrorMsg", "TRANSLATE_ERROR_MSG"];
const ENGINE: &[&str] = &["engine", "ENGINE"];
const SOURCE_LANG: &[&str] = &["sourceLang", "SOURCE_LANG"];
const TARGET_LANG: &[&str] = &["targetLang", "TARGET_LANG"];

pub fn adapt_in_chat_room(raw: &Value) -> ChatRoomEntry {
    let r = unwrap_record(raw);
    ChatRoomEntry {
        id: r.int(ROOM_ID),
        owner_id: r.int(ROOM_OWNER_ID),
        room_nm: r.string(ROOM_NM),
        room_type: r.string(ROOM_TYPE),
        room_desc: r.string(ROOM_DESC),
        last_msg_content: r.string(LAST_MSG_CONTENT),
        last_msg_dt: r.string(LAST_MSG_DT),
        created_dt: r.string(CREATED_DT),
        created_by: r.id_string(CREATED_BY),
        updated_dt: r.string(UPDATED_DT),
        updated_by: r.id_string(UPDATED_BY),
    }
}

/// Extracts every room from a list response, whatever its envelope.
pub fn adapt_in_chat_rooms(raw: &Value) -> Vec<ChatRoomEntry> {
    list_items(raw).iter().map(adapt_in_chat_room).collect()
}

pub fn adapt_in_chat_message(raw: &Value) -> ChatMessageEntry {
    let r = unwrap_record(raw);
    ChatMessageEntry {
        id: r.int(MSG_ID),
        room_id: r.int(MSG_ROOM_ID),
        sender_id: r.int(SENDER_ID),
        sender_nm: r.string(SENDER_NM),
        content: r.string(CONTENT),
        content_type: r.string(CONTENT_TYPE),
        sent_dt: r.string(SENT_DT),
        created_dt: r.string(CREATED_DT),
        translated_text: r.string(TRANSLATED_TEXT),
        translate_error_msg: r.string(TRANSLATE_ERROR_MSG),
        engine: r.string(ENGINE),
        source_lang: r.string(SOURCE_LANG),
        target_lang: r.string(TARGET_LANG),
    }
}

pub fn adapt_in_chat_messages(raw: &Value) -> Vec<ChatMessageEntry> {
    list_items(raw).iter().map(adapt_in_chat_message).collect()
}

/// Body of a STOMP SEND for a new chat line.
pub fn adapt_out_chat_message(draft: &ChatMessageDraft) -> Payload {
    Payload::new()
        .or_insert("roomId", draft.room_id)
        .optional("senderId", draft.sender_id.as_ref())
        .optional("senderNm", draft.sender_nm.as_ref())
        .or_insert("content", draft.content.as_str())
        .or_insert("contentType", draft.content_type.as_deref().unwrap_or("TEXT"))
}
