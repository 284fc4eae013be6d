use serde_json::Value;

use crate::models::{ReservationEntry, ReservationUpdate, YnFlag};
use crate::normalize::patch::Payload;
use crate::normalize::probe::unwrap_record;

const RESERVATION_ID: &[&str] = &["reservationId", "RESERVATION_ID", "rsvId", "RSV_ID", "id", "ID"];
const OWNER_ID: &[&str] = &["ownerId", "OWNER_ID", "userId", "USER_ID"];
const TITLE: &[&str] = &["title", "TITLE", "rsvNm", "RSV_NM"];
const PLACE: &[&str] = &["place", "PLACE", "placeNm", "PLACE_NM"];
const START_DT: &[&str] = &["startDt", "START_DT", "rsvStartDt", "RSV_START_DT"];
const END_DT: &[&str] = &["endDt", "END_DT", "rsvEndDt", "RSV_END_DT"];
const MEMO: &[&str] = &["memo", "MEMO"];
const ALARM_YN: &[&str] = &["alarmYn", "ALARM_YN"];
const STATUS: &[&str] = &["statusCd", "STATUS_CD", "status", "STATUS"];
const CREATED_DT: &[&str] = &["createdDt", "CREATED_DT", "regDt", "REG_DT"];

pub fn adapt_in_reservation(raw: &Value) -> ReservationEntry {
    let r = unwrap_record(raw);
    ReservationEntry {
        reservation_id: r.int(RESERVATION_ID),
        owner_id: r.int(OWNER_ID),
        title: r.string(TITLE),
        place: r.string(PLACE),
        start_dt: r.string(START_DT),
        end_dt: r.string(END_DT),
        memo: r.string(MEMO),
        alarm_yn: r.flag(ALARM_YN).map(YnFlag::from).unwrap_or_default(),
        status_cd: r.string(STATUS),
        created_dt: r.string(CREATED_DT),
    }
}

pub fn adapt_out_reservation(update: &ReservationUpdate) -> Payload {
    Payload::new()
        .field("reservationId", &update.reservation_id)
        .field("title", &update.title)
        .field("place", &update.place)
        .field("startDt", &update.start_dt)
        .field("endDt", &update.end_dt)
        .field("memo", &update.memo)
        .field("alarmYn", &update.alarm_yn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::patch::Patch;
    use serde_json::json;

    #[test]
    fn reads_alias_keys() {
        let entry = adapt_in_reservation(&json!({
            "item": { "RSV_ID": 31, "RSV_NM": "Dentist", "PLACE_NM": "Seoul", "ALARM_YN": "Y" }
        }));
        assert_eq!(entry.reservation_id, Some(31));
        assert_eq!(entry.title.as_deref(), Some("Dentist"));
        assert_eq!(entry.place.as_deref(), Some("Seoul"));
        assert!(entry.alarm_yn.is_yes());
        assert_eq!(entry.end_dt, None);
    }

    #[test]
    fn mistyped_fields_become_null() {
        let entry = adapt_in_reservation(&json!({ "reservationId": "abc", "title": 5, "alarmYn": [] }));
        assert_eq!(entry.reservation_id, None);
        assert_eq!(entry.title, None);
        assert_eq!(entry.alarm_yn, YnFlag::N);
    }

    #[test]
    fn clearing_memo_sends_null() {
        let update = ReservationUpdate {
            reservation_id: Patch::Set(31),
            memo: Patch::Null,
            ..Default::default()
        };
        let payload = adapt_out_reservation(&update);
        assert_eq!(payload.len(), 2);
        assert_eq!(payload.get("memo"), Some(&Value::Null));
        assert!(!payload.contains_key("title"));
    }
}
