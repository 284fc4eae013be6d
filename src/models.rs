use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::patch::Patch;
use crate::normalize::probe::CodeEnum;

/// Placeholder shown for records whose title never arrived.
pub const UNTITLED: &str = "(제목 없음)";

// ── Codes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::Doing => "DOING",
            TaskStatus::Done => "DONE",
        }
    }
}

impl CodeEnum for TaskStatus {
    const ALL: &'static [Self] = &[TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    fn code(self) -> &'static str {
        self.as_str()
    }
}

/// Ledger direction: money in or money out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IoType {
    In,
    #[default]
    Out,
}

impl IoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IoType::In => "IN",
            IoType::Out => "OUT",
        }
    }
}

impl CodeEnum for IoType {
    const ALL: &'static [Self] = &[IoType::In, IoType::Out];

    fn code(self) -> &'static str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum YnFlag {
    Y,
    #[default]
    N,
}

impl YnFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            YnFlag::Y => "Y",
            YnFlag::N => "N",
        }
    }

    pub fn is_yes(&self) -> bool {
        *self == YnFlag::Y
    }
}

impl From<bool> for YnFlag {
    fn from(yes: bool) -> Self {
        if yes {
            YnFlag::Y
        } else {
            YnFlag::N
        }
    }
}

/// Lifecycle marker of a streamed AI reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AiEvent {
    Start,
    Token,
    Done,
    Error,
}

impl AiEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiEvent::Start => "START",
            AiEvent::Token => "TOKEN",
            AiEvent::Done => "DONE",
            AiEvent::Error => "ERROR",
        }
    }

    /// DONE and ERROR both end a reply.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AiEvent::Done | AiEvent::Error)
    }
}

impl CodeEnum for AiEvent {
    const ALL: &'static [Self] = &[AiEvent::Start, AiEvent::Token, AiEvent::Done, AiEvent::Error];

    fn code(self) -> &'static str {
        self.as_str()
    }
}

macro_rules! code_display {
    ($($ty:ty),*) => {$(
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$ty> for Value {
            fn from(code: $ty) -> Self {
                Value::String(code.as_str().to_string())
            }
        }
    )*};
}

code_display!(TaskStatus, IoType, YnFlag, AiEvent);

// ── Inbound records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub status_cd: TaskStatus,
    pub priority: Option<i64>,
    pub due_dt: Option<String>,
    pub created_dt: Option<String>,
    pub updated_dt: Option<String>,
}

impl Task {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diary {
    pub diary_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub diary_dt: Option<String>,
    pub mood: Option<String>,
    pub weather: Option<String>,
    pub public_yn: YnFlag,
    pub created_dt: Option<String>,
    pub updated_dt: Option<String>,
}

impl Diary {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub ledger_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub io_type: IoType,
    pub amount: Option<f64>,
    pub category_nm: Option<String>,
    pub memo: Option<String>,
    pub use_dt: Option<String>,
    pub created_dt: Option<String>,
}

impl LedgerRow {
    /// Amount with its sign taken from the io type; missing amounts count as zero.
    pub fn signed_amount(&self) -> f64 {
        let amount = self.amount.unwrap_or(0.0);
        match self.io_type {
            IoType::In => amount,
            IoType::Out => -amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationEntry {
    pub reservation_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub title: Option<String>,
    pub place: Option<String>,
    pub start_dt: Option<String>,
    pub end_dt: Option<String>,
    pub memo: Option<String>,
    pub alarm_yn: YnFlag,
    pub status_cd: Option<String>,
    pub created_dt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoomEntry {
    pub id: Option<i64>,
    pub owner_id: Option<i64>,
    pub room_nm: Option<String>,
    pub room_type: Option<String>,
    pub room_desc: Option<String>,
    pub last_msg_content: Option<String>,
    pub last_msg_dt: Option<String>,
    pub created_dt: Option<String>,
    pub created_by: Option<String>,
    pub updated_dt: Option<String>,
    pub updated_by: Option<String>,
}

impl ChatRoomEntry {
    pub fn display_name(&self) -> &str {
        self.room_nm.as_deref().unwrap_or(UNTITLED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageEntry {
    pub id: Option<i64>,
    pub room_id: Option<i64>,
    pub sender_id: Option<i64>,
    pub sender_nm: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
    pub sent_dt: Option<String>,
    pub created_dt: Option<String>,
    pub translated_text: Option<String>,
    pub translate_error_msg: Option<String>,
    pub engine: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

impl ChatMessageEntry {
    /// `sentDt`, falling back to `createdDt`.
    pub fn timestamp(&self) -> Option<&str> {
        self.sent_dt.as_deref().or(self.created_dt.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopProductSummary {
    pub product_id: Option<i64>,
    pub product_nm: Option<String>,
    pub price: Option<f64>,
    pub sale_price: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub category_nm: Option<String>,
    pub sold_out_yn: YnFlag,
}

impl ShopProductSummary {
    /// Sale price when one is set, else the list price.
    pub fn effective_price(&self) -> Option<f64> {
        self.sale_price.or(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopProductDetail {
    #[serde(flatten)]
    pub summary: ShopProductSummary,
    pub description: Option<String>,
    pub stock_qty: Option<i64>,
    pub image_urls: Vec<String>,
}

// ── Outbound updates ─────────────────────────────────────────────────────────
//
// Every field is a `Patch`: unset fields are left out of the payload, explicit
// nulls are sent as `null`.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub task_id: Patch<i64>,
    pub title: Patch<String>,
    pub content: Patch<String>,
    pub status_cd: Patch<TaskStatus>,
    pub priority: Patch<i64>,
    pub due_dt: Patch<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiaryUpdate {
    pub diary_id: Patch<i64>,
    pub title: Patch<String>,
    pub content: Patch<String>,
    pub diary_dt: Patch<String>,
    pub mood: Patch<String>,
    pub weather: Patch<String>,
    pub public_yn: Patch<YnFlag>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerUpdate {
    pub ledger_id: Patch<i64>,
    pub io_type: Patch<IoType>,
    pub amount: Patch<f64>,
    pub category_nm: Patch<String>,
    pub memo: Patch<String>,
    pub use_dt: Patch<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationUpdate {
    pub reservation_id: Patch<i64>,
    pub title: Patch<String>,
    pub place: Patch<String>,
    pub start_dt: Patch<String>,
    pub end_dt: Patch<String>,
    pub memo: Patch<String>,
    pub alarm_yn: Patch<YnFlag>,
}

/// A chat line typed by the user, before the server assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessageDraft {
    pub room_id: i64,
    pub sender_id: Option<i64>,
    pub sender_nm: Option<String>,
    pub content: String,
    pub content_type: Option<String>,
}

impl ChatMessageDraft {
    pub fn text(room_id: i64, content: impl Into<String>) -> Self {
        Self {
            room_id,
            sender_id: None,
            sender_nm: None,
            content: content.into(),
            content_type: None,
        }
    }
}
