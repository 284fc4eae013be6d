//! Outbound mutation payloads.
//!
//! A partial update must tell "leave this field alone" apart from "clear this
//! field", so each field is a [`Patch`] and [`Payload`] only writes the ones
//! that were actually provided.

use serde::Serialize;
use serde_json::{Map, Value};

/// A field in a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// Not provided; the key is omitted.
    Unset,
    /// Explicitly cleared; sent as `null`.
    Null,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Set(v) => Patch::Set(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Set(v) => Patch::Set(f(v)),
        }
    }
}

/// `None` is an explicit null: the caller provided the field.
impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Null,
        }
    }
}

/// Flat JSON object sent to insert/update endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `key` unless the patch is unset.
    pub fn field<T: Clone + Into<Value>>(mut self, key: &str, patch: &Patch<T>) -> Self {
        match patch {
            Patch::Unset => {}
            Patch::Null => {
                self.0.insert(key.to_string(), Value::Null);
            }
            Patch::Set(v) => {
                self.0.insert(key.to_string(), v.clone().into());
            }
        }
        self
    }

    /// Writes `key` when `value` is present; never writes `null`.
    pub fn optional<T: Clone + Into<Value>>(self, key: &str, value: Option<&T>) -> Self {
        match value {
            Some(v) => self.field(key, &Patch::Set(v.clone())),
            None => self,
        }
    }

    /// Writes `key` only if it is not already present.
    pub fn or_insert(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.entry(key.to_string()).or_insert_with(|| value.into());
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
