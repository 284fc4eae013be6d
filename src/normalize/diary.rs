use serde_json::Value;

use crate::models::{Diary, DiaryUpdate, YnFlag};
use crate::normalize::patch::Payload;
use crate::normalize::probe::unwrap_record;

const DIARY_ID: &[&str] = &["diaryId", "DIARY_ID", "id", "ID"];
const OWNER_ID: &[&str] = &["ownerId", "OWNER_ID", "userId", "USER_ID"];
const TITLE: &[&str] = &["title", "TITLE", "diaryTitle", "DIARY_TITLE"];
const CONTENT: &[&str] = &["content", "CONTENT", "diaryContent", "DIARY_CONTENT"];
const DIARY_DT: &[&str] = &["diaryDt", "DIARY_DT", "writeDt", "WRITE_DT"];
const MOOD: &[&str] = &["mood", "MOOD", "moodCd", "MOOD_CD"];
const WEATHER: &[&str] = &["weather", "WEATHER", "weatherCd", "WEATHER_CD"];
const PUBLIC_YN: &[&str] = &["publicYn", "PUBLIC_YN", "openYn", "OPEN_YN"];
const CREATED_DT: &[&str] = &["createdDt", "CREATED_DT", "regDt", "REG_DT"];
const UPDATED_DT: &[&str] = &["updatedDt", "UPDATED_DT", "modDt", "MOD_DT"];

pub fn adapt_in_diary(raw: &Value) -> Diary {
    let r = unwrap_record(raw);
    Diary {
        diary_id: r.int(DIARY_ID),
        owner_id: r.int(OWNER_ID),
        title: r.string(TITLE),
        content: r.string(CONTENT),
        diary_dt: r.string(DIARY_DT),
        mood: r.string(MOOD),
        weather: r.string(WEATHER),
        public_yn: r.flag(PUBLIC_YN).map(YnFlag::from).unwrap_or_default(),
        created_dt: r.string(CREATED_DT),
        updated_dt: r.string(UPDATED_DT),
    }
}

pub fn adapt_out_diary(update: &DiaryUpdate) -> Payload {
    Payload::new()
        .field("diaryId", &update.diary_id)
        .field("title", &update.title)
        .field("content", &update.content)
        .field("diaryDt", &update.diary_dt)
        .field("mood", &update.mood)
        .field("weather", &update.weather)
        .field("publicYn", &update.public_yn)
}
