use serde_json::Value;

use crate::models::{Task, TaskUpdate};
use crate::normalize::patch::Payload;
use crate::normalize::probe::unwrap_record;

const TASK_ID: &[&str] = &["taskId", "TASK_ID", "id", "ID"];
const OWNER_ID: &[&str] = &["ownerId", "OWNER_ID", "userId", "USER_ID"];
const TITLE: &[&str] = &["title", "TITLE", "taskNm", "TASK_NM"];
const CONTENT: &[&str] = &["content", "CONTENT", "taskDesc", "TASK_DESC"];
const STATUS: &[&str] = &["statusCd", "STATUS_CD", "status", "STATUS"];
const PRIORITY: &[&str] = &["priority", "PRIORITY", "priorityNo", "PRIORITY_NO"];
const DUE_DT: &[&str] = &["dueDt", "DUE_DT", "dueDate", "DUE_DATE"];
const CREATED_DT: &[&str] = &["createdDt", "CREATED_DT", "regDt", "REG_DT"];
const UPDATED_DT: &[&str] = &["updatedDt", "UPDATED_DT", "modDt", "MOD_DT"];

pub fn adapt_in_task(raw: &Value) -> Task {
    let r = unwrap_record(raw);
    Task {
        task_id: r.int(TASK_ID),
        owner_id: r.int(OWNER_ID),
        title: r.string(TITLE),
        content: r.string(CONTENT),
        status_cd: r.code(STATUS).unwrap_or_default(),
        priority: r.int(PRIORITY),
        due_dt: r.string(DUE_DT),
        created_dt: r.string(CREATED_DT),
        updated_dt: r.string(UPDATED_DT),
    }
}

pub fn adapt_out_task(update: &TaskUpdate) -> Payload {
    Payload::new()
        .field("taskId", &update.task_id)
        .field("title", &update.title)
        .field("content", &update.content)
        .field("statusCd", &update.status_cd)
        .field("priority", &update.priority)
        .field("dueDt", &update.due_dt)
}
