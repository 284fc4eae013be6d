use serde_json::Value;
use tracing::warn;

use crate::normalize::probe::{parse_lenient, Record};

const OWNER_KEYS: &[&str] = &["ownerId", "OWNER_ID", "userId", "USER_ID", "id"];

/// Identity of the signed-in user, handed to whatever needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerContext {
    pub owner_id: Option<i64>,
}

impl OwnerContext {
    pub fn new(owner_id: i64) -> Self {
        Self {
            owner_id: Some(owner_id),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Reads an owner id from a stored raw value: a bare number, a quoted
    /// number, or a JSON object carrying `ownerId`/`userId`. Anything else
    /// yields an anonymous context.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::anonymous();
        }
        let parsed = match parse_lenient(trimmed) {
            Value::Null => Value::String(trimmed.to_string()),
            other => other,
        };
        let wrapped = serde_json::json!({ "id": parsed });
        let owner_id = match &parsed {
            Value::Object(_) => Record::of(&parsed).int(OWNER_KEYS),
            _ => Record::of(&wrapped).int(&["id"]),
        };
        if owner_id.is_none() {
            warn!("Ignoring unreadable owner id value");
        }
        Self { owner_id }
    }

    pub fn is_owner(&self, id: Option<i64>) -> bool {
        matches!((self.owner_id, id), (Some(a), Some(b)) if a == b)
    }
}
