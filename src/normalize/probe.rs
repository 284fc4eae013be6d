//! Shape probing over untrusted JSON.
//!
//! The backend wraps payloads inconsistently (`{ok, result, msg}`, bare rows,
//! `result.rows`, `data.item`, ...) and mixes camelCase with
//! SCREAMING_SNAKE_CASE keys. Everything here is total: a value that does not
//! have the expected shape yields `None`, never an error.

use serde_json::{Map, Value};

/// Upper bound on envelope levels followed by the unwrap functions.
pub const ENVELOPE_DEPTH: usize = 5;

/// Keys that may hold a nested record, in priority order.
const RECORD_KEYS: [&str; 3] = ["result", "data", "item"];

/// Keys that may hold a list of rows, in priority order.
const LIST_KEYS: [&str; 3] = ["result", "rows", "list"];

/// Enums carried as short string codes (`"TODO"`, `"OUT"`, ...).
pub trait CodeEnum: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn code(self) -> &'static str;

    /// Case-insensitive lookup by code.
    fn from_code(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(raw))
    }
}

/// Borrowed view of a JSON object. An absent object behaves like `{}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Record<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Record<'a> {
    /// Views `value` as a record without descending into envelopes.
    pub fn of(value: &'a Value) -> Self {
        Self { fields: value.as_object() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.map_or(true, Map::is_empty)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields?.get(key)
    }

    pub fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.get(k).is_some_and(|v| !v.is_null()))
    }

    /// The object stored under `key`, or an empty record.
    pub fn nested(&self, key: &str) -> Record<'a> {
        self.get(key).map(Record::of).unwrap_or_default()
    }

    pub fn string(&self, keys: &[&str]) -> Option<String> {
        pick_string(*self, keys)
    }

    pub fn text(&self, keys: &[&str]) -> Option<String> {
        pick_text(*self, keys)
    }

    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        pick_number(*self, keys)
    }

    pub fn int(&self, keys: &[&str]) -> Option<i64> {
        pick_int(*self, keys)
    }

    pub fn id_string(&self, keys: &[&str]) -> Option<String> {
        pick_id_string(*self, keys)
    }

    pub fn flag(&self, keys: &[&str]) -> Option<bool> {
        pick_flag(*self, keys)
    }

    pub fn code<T: CodeEnum>(&self, keys: &[&str]) -> Option<T> {
        pick_code(*self, keys)
    }

    pub fn string_list(&self, keys: &[&str]) -> Option<Vec<String>> {
        pick_string_list(*self, keys)
    }
}

/// Descends through `result` / `data` / `item` wrappers to the innermost
/// object, following at most [`ENVELOPE_DEPTH`] levels.
///
/// Returns an empty record when `value` is not an object.
pub fn unwrap_record(value: &Value) -> Record<'_> {
    let Some(mut current) = value.as_object() else {
        return Record::empty();
    };
    for _ in 0..ENVELOPE_DEPTH {
        match RECORD_KEYS
            .iter()
            .find_map(|k| current.get(*k).and_then(Value::as_object))
        {
            Some(inner) => current = inner,
            None => break,
        }
    }
    Record {
        fields: Some(current),
    }
}

/// Finds the first array reachable through envelope keys.
///
/// At each level a bare array wins, then an array under `result` / `rows` /
/// `list`; otherwise the walk continues into the nested record the same way
/// [`unwrap_record`] would. `None` means no array was found within
/// [`ENVELOPE_DEPTH`] levels.
pub fn unwrap_list(value: &Value) -> Option<&[Value]> {
    let mut current = value;
    for _ in 0..ENVELOPE_DEPTH {
        if let Value::Array(items) = current {
            return Some(items.as_slice());
        }
        let fields = current.as_object()?;
        if let Some(items) = LIST_KEYS
            .iter()
            .find_map(|k| fields.get(*k).and_then(Value::as_array))
        {
            return Some(items.as_slice());
        }
        current = RECORD_KEYS
            .iter()
            .find_map(|k| fields.get(*k).filter(|v| v.is_object()))?;
    }
    None
}

/// Like [`unwrap_list`] but yields an empty slice when nothing was found.
pub fn list_items(value: &Value) -> &[Value] {
    unwrap_list(value).unwrap_or(&[])
}

/// First candidate holding a string that is not blank.
pub fn pick_string(record: Record<'_>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    })
}

/// First candidate holding any string, blank included.
///
/// Streaming deltas are often a lone space or newline, which
/// [`pick_string`] would discard.
pub fn pick_text(record: Record<'_>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| record.get(key)?.as_str().map(str::to_owned))
}

/// First candidate holding a finite number or a numeric string.
pub fn pick_number(record: Record<'_>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| record.get(key).and_then(number_value))
}

/// [`pick_number`] restricted to whole numbers that fit in an `i64`.
pub fn pick_int(record: Record<'_>, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| record.get(key).and_then(int_value))
}

/// Identifier as text: a non-blank string, or a number in decimal form.
pub fn pick_id_string(record: Record<'_>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Y/N style flag. Accepts `Y`/`N`, `YES`/`NO`, `TRUE`/`FALSE` (any case),
/// booleans, and `1`/`0` as number or string.
///
/// Only the first candidate holding a boolean, number or non-blank string is
/// read; if that value is not a recognised flag the result is `None`.
pub fn pick_flag(record: Record<'_>, keys: &[&str]) -> Option<bool> {
    let value = keys.iter().find_map(|key| match record.get(key)? {
        Value::String(s) if s.trim().is_empty() => None,
        v @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) => Some(v),
        _ => None,
    })?;
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" | "1" => Some(true),
            "N" | "NO" | "FALSE" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Code of the first non-blank string candidate, if it is one of `T`'s.
/// A later alias is never consulted once an earlier one holds a string.
pub fn pick_code<T: CodeEnum>(record: Record<'_>, keys: &[&str]) -> Option<T> {
    pick_string(record, keys).and_then(|code| T::from_code(&code))
}

/// Non-blank strings from an array, or from a comma-separated string.
pub fn pick_string_list(record: Record<'_>, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter().find_map(|key| {
        let items: Vec<String> = match record.get(key)? {
            Value::Array(values) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            Value::String(joined) => joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            _ => return None,
        };
        (!items.is_empty()).then_some(items)
    })
}

/// Parses raw JSON text, yielding `Null` when it is malformed.
pub fn parse_lenient(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or(Value::Null)
}

fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn int_value(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let n = number_value(value)?;
    let in_range = n >= i64::MIN as f64 && n < i64::MAX as f64;
    (n.fract() == 0.0 && in_range).then_some(n as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nest(levels: usize, key: &str, inner: Value) -> Value {
        (0..levels).fold(inner, |acc, _| json!({ key: acc }))
    }

    #[test]
    fn unwrap_record_descends_envelopes_in_priority_order() {
        let raw = json!({
            "ok": true,
            "data": { "wrong": 1 },
            "result": { "item": { "taskId": 3 } }
        });
        let record = unwrap_record(&raw);
        assert_eq!(record.int(&["taskId"]), Some(3));
        assert!(record.get("wrong").is_none());
    }

    #[test]
    fn unwrap_record_stops_after_five_levels() {
        let raw = nest(7, "result", json!({ "deep": true }));
        let expected = nest(2, "result", json!({ "deep": true }));
        let record = unwrap_record(&raw);
        assert_eq!(
            Value::Object(record.fields.cloned().unwrap_or_default()),
            expected
        );
    }

    #[test]
    fn unwrap_record_of_non_object_is_empty() {
        assert!(unwrap_record(&json!([1, 2])).is_empty());
        assert!(unwrap_record(&json!("text")).is_empty());
        assert!(unwrap_record(&Value::Null).is_empty());
    }

    #[test]
    fn unwrap_record_ignores_scalar_envelope_keys() {
        let raw = json!({ "result": "ok", "title": "x" });
        assert_eq!(unwrap_record(&raw).string(&["title"]).as_deref(), Some("x"));
    }

    #[test]
    fn unwrap_list_finds_rows_under_result() {
        let raw = json!({ "result": { "rows": [{ "a": 1 }, { "a": 2 }] } });
        assert_eq!(unwrap_list(&raw).map(<[Value]>::len), Some(2));
    }

    #[test]
    fn unwrap_list_accepts_bare_array_and_data_list() {
        assert_eq!(unwrap_list(&json!([1])).map(<[Value]>::len), Some(1));
        let raw = json!({ "data": { "item": { "list": [1, 2, 3] } } });
        assert_eq!(unwrap_list(&raw).map(<[Value]>::len), Some(3));
    }

    #[test]
    fn unwrap_list_without_array_is_none() {
        assert!(unwrap_list(&json!({ "result": { "count": 0 } })).is_none());
        assert!(unwrap_list(&json!(42)).is_none());
        assert!(list_items(&json!({ "msg": "nothing" })).is_empty());
    }

    #[test]
    fn unwrap_list_is_bounded() {
        let raw = nest(9, "result", json!([1]));
        assert!(unwrap_list(&raw).is_none());
        let raw = nest(4, "result", json!([1]));
        assert_eq!(unwrap_list(&raw).map(<[Value]>::len), Some(1));
    }

    #[test]
    fn pick_string_skips_blank_and_mistyped_candidates() {
        let raw = json!({ "senderNm": "  ", "SENDER_NM": 12, "name": "Kim" });
        let record = Record::of(&raw);
        assert_eq!(
            pick_string(record, &["senderNm", "SENDER_NM", "name"]).as_deref(),
            Some("Kim")
        );
        assert_eq!(pick_string(record, &["senderNm", "SENDER_NM"]), None);
    }

    #[test]
    fn pick_text_keeps_whitespace() {
        let raw = json!({ "delta": " " });
        assert_eq!(Record::of(&raw).text(&["delta"]).as_deref(), Some(" "));
    }

    #[test]
    fn pick_number_coerces_numeric_strings() {
        let raw = json!({ "a": "12.5", "b": " 7 ", "c": "abc", "d": "", "e": "inf" });
        let record = Record::of(&raw);
        assert_eq!(record.number(&["a"]), Some(12.5));
        assert_eq!(record.number(&["b"]), Some(7.0));
        assert_eq!(record.number(&["c", "d", "e"]), None);
        assert_eq!(record.number(&["c", "a"]), Some(12.5));
    }

    #[test]
    fn pick_int_rejects_fractions() {
        let raw = json!({ "a": 7.5, "b": "9", "c": 3 });
        let record = Record::of(&raw);
        assert_eq!(record.int(&["a", "b"]), Some(9));
        assert_eq!(record.int(&["c"]), Some(3));
        assert_eq!(record.int(&["a"]), None);
    }

    #[test]
    fn pick_id_string_renders_numbers() {
        let raw = json!({ "aiMsgId": 991, "other": " abc " });
        let record = Record::of(&raw);
        assert_eq!(record.id_string(&["aiMsgId"]).as_deref(), Some("991"));
        assert_eq!(record.id_string(&["other"]).as_deref(), Some("abc"));
    }

    #[test]
    fn pick_flag_understands_common_spellings() {
        let raw = json!({ "a": "y", "b": false, "c": 1, "d": "maybe" });
        let record = Record::of(&raw);
        assert_eq!(record.flag(&["a"]), Some(true));
        assert_eq!(record.flag(&["b"]), Some(false));
        assert_eq!(record.flag(&["c"]), Some(true));
        assert_eq!(record.flag(&["d"]), None);
    }

    #[test]
    fn pick_flag_reads_only_the_first_populated_alias() {
        let raw = json!({ "publicYn": "maybe", "PUBLIC_YN": "Y", "blank": " ", "late": "N" });
        let record = Record::of(&raw);
        assert_eq!(record.flag(&["publicYn", "PUBLIC_YN"]), None);
        assert_eq!(record.flag(&["missing", "blank", "late"]), Some(false));
    }

    #[test]
    fn pick_code_does_not_fall_through_to_later_aliases() {
        use crate::models::TaskStatus;

        let raw = json!({ "statusCd": "ARCHIVED", "STATUS_CD": "DONE", "other": 3, "alt": "doing" });
        let record = Record::of(&raw);
        assert_eq!(record.code::<TaskStatus>(&["statusCd", "STATUS_CD"]), None);
        assert_eq!(record.code::<TaskStatus>(&["other", "alt"]), Some(TaskStatus::Doing));
    }

    #[test]
    fn pick_string_list_splits_and_trims() {
        let raw = json!({ "csv": "a.png, ,b.png", "arr": ["x", 3, " "] });
        let record = Record::of(&raw);
        assert_eq!(
            record.string_list(&["csv"]),
            Some(vec!["a.png".to_string(), "b.png".to_string()])
        );
        assert_eq!(record.string_list(&["arr"]), Some(vec!["x".to_string()]));
        assert_eq!(record.string_list(&["missing"]), None);
    }

    #[test]
    fn parse_lenient_swallows_malformed_input() {
        assert_eq!(parse_lenient("{not json"), Value::Null);
        assert_eq!(parse_lenient("17"), json!(17));
    }
}
