//! REST client for the life backend.
//!
//! Responses are read as loose JSON and handed to the `adapt_in_*`
//! normalizers; writes go through the `adapt_out_*` payload builders. No
//! call ever deserializes straight into a typed record.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::context::OwnerContext;
use crate::errors::AppError;
use crate::models::{
    ChatMessageEntry, ChatRoomEntry, Diary, DiaryUpdate, LedgerRow, LedgerUpdate,
    ReservationEntry, ReservationUpdate, ShopProductDetail, ShopProductSummary, Task, TaskUpdate,
};
use crate::normalize::probe::Record;
use crate::normalize::{
    adapt_in_chat_messages, adapt_in_chat_rooms, adapt_in_diary, adapt_in_ledger_row,
    adapt_in_product_detail, adapt_in_product_summary, adapt_in_reservation, adapt_in_task,
    adapt_out_diary, adapt_out_ledger_row, adapt_out_reservation, adapt_out_task, list_items,
    parse_lenient, Payload,
};

const REJECT_MSG: &[&str] = &["msg", "message", "MSG", "MESSAGE"];
const DEFAULT_REJECT_MSG: &str = "request rejected";

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    owner: OwnerContext,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let http = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            owner: config.owner,
        })
    }

    pub fn with_owner(mut self, owner: OwnerContext) -> Self {
        self.owner = owner;
        self
    }

    pub fn owner(&self) -> OwnerContext {
        self.owner
    }

    // ── Raw transport ────────────────────────────────────────────────────────

    /// GETs `path` and returns the parsed body. The owner id, when known, is
    /// sent as an `ownerId` query parameter.
    pub async fn get_value(&self, path: &str, query: &[(&str, String)]) -> Result<Value, AppError> {
        let url = self.url(path);
        let mut params: Vec<(&str, String)> = query.to_vec();
        if let Some(owner_id) = self.owner.owner_id {
            params.push(("ownerId", owner_id.to_string()));
        }
        debug!(%url, ?params, "GET");

        let resp = self.http.get(&url).query(&params).send().await?;
        read_body(url, resp).await
    }

    pub async fn post_value(&self, path: &str, body: &Value) -> Result<Value, AppError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let resp = self.http.post(&url).json(body).send().await?;
        read_body(url, resp).await
    }

    // ── Tasks, diary, ledger, reservations ───────────────────────────────────

    pub async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let body = self.get_value("/api/tasks", &[]).await?;
        Ok(list_items(&body).iter().map(adapt_in_task).collect())
    }

    pub async fn save_task(&self, update: &TaskUpdate) -> Result<Value, AppError> {
        self.save("/api/tasks/save", adapt_out_task(update)).await
    }

    pub async fn list_diaries(&self) -> Result<Vec<Diary>, AppError> {
        let body = self.get_value("/api/diaries", &[]).await?;
        Ok(list_items(&body).iter().map(adapt_in_diary).collect())
    }

    pub async fn save_diary(&self, update: &DiaryUpdate) -> Result<Value, AppError> {
        self.save("/api/diaries/save", adapt_out_diary(update)).await
    }

    pub async fn list_ledger(&self) -> Result<Vec<LedgerRow>, AppError> {
        let body = self.get_value("/api/ledger", &[]).await?;
        Ok(list_items(&body).iter().map(adapt_in_ledger_row).collect())
    }

    pub async fn save_ledger_row(&self, update: &LedgerUpdate) -> Result<Value, AppError> {
        self.save("/api/ledger/save", adapt_out_ledger_row(update)).await
    }

    pub async fn list_reservations(&self) -> Result<Vec<ReservationEntry>, AppError> {
        let body = self.get_value("/api/reservations", &[]).await?;
        Ok(list_items(&body).iter().map(adapt_in_reservation).collect())
    }

    pub async fn save_reservation(&self, update: &ReservationUpdate) -> Result<Value, AppError> {
        self.save("/api/reservations/save", adapt_out_reservation(update)).await
    }

    // ── Chat ─────────────────────────────────────────────────────────────────

    pub async fn list_chat_rooms(&self) -> Result<Vec<ChatRoomEntry>, AppError> {
        let body = self.get_value("/api/chat/rooms", &[]).await?;
        Ok(adapt_in_chat_rooms(&body))
    }

    /// Message history of a room, in whatever order the server sent it.
    pub async fn chat_history(&self, room_id: i64) -> Result<Vec<ChatMessageEntry>, AppError> {
        let body = self
            .get_value(&format!("/api/chat/rooms/{room_id}/messages"), &[])
            .await?;
        Ok(adapt_in_chat_messages(&body))
    }

    pub async fn join_room(&self, room_id: i64) -> Result<Value, AppError> {
        let payload = self.with_owner_id(Payload::new().or_insert("roomId", room_id));
        self.post_value(&format!("/api/chat/rooms/{room_id}/join"), &payload.into_value())
            .await
    }

    // ── Shop ─────────────────────────────────────────────────────────────────

    pub async fn list_products(&self) -> Result<Vec<ShopProductSummary>, AppError> {
        let body = self.get_value("/api/shop/products", &[]).await?;
        Ok(list_items(&body).iter().map(adapt_in_product_summary).collect())
    }

    pub async fn product_detail(&self, product_id: i64) -> Result<ShopProductDetail, AppError> {
        let body = self
            .get_value(&format!("/api/shop/products/{product_id}"), &[])
            .await?;
        Ok(adapt_in_product_detail(&body))
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    async fn save(&self, path: &str, payload: Payload) -> Result<Value, AppError> {
        let payload = self.with_owner_id(payload);
        self.post_value(path, &payload.into_value()).await
    }

    fn with_owner_id(&self, payload: Payload) -> Payload {
        match self.owner.owner_id {
            Some(owner_id) => payload.or_insert("ownerId", owner_id),
            None => payload,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn read_body(url: String, resp: reqwest::Response) -> Result<Value, AppError> {
    let status = resp.status();
    if !status.is_success() {
        warn!(%url, status = status.as_u16(), "Backend returned an error status");
        return Err(AppError::Status {
            status: status.as_u16(),
            url,
        });
    }
    let text = resp.text().await?;
    check_envelope(parse_lenient(&text))
}

/// Fails with [`AppError::Rejected`] when the envelope says `ok: false`.
/// Bodies without an `ok` flag pass through untouched.
pub fn check_envelope(body: Value) -> Result<Value, AppError> {
    let record = Record::of(&body);
    if record.flag(&["ok", "OK"]) == Some(false) {
        let msg = record
            .string(REJECT_MSG)
            .unwrap_or_else(|| DEFAULT_REJECT_MSG.to_string());
        return Err(AppError::Rejected { msg });
    }
    Ok(body)
}
