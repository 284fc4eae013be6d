use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use life_client::api::BackendClient;
use life_client::config::ClientConfig;
use life_client::context::OwnerContext;
use life_client::errors::AppError;
use life_client::models::{LedgerUpdate, TaskStatus, TaskUpdate};
use life_client::normalize::Patch;

async fn spawn_backend(app: Router) -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ClientConfig::new(format!("http://{addr}"))
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "ok": true, "result": body }))
}

async fn history(
    Path(room_id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    Json(json!({
        "data": {
            "list": [
                { "MSG_ID": 2, "ROOM_ID": room_id, "CONTENT": "second", "SENT_DT": "2024-01-01T10:01:00" },
                { "MSG_ID": 1, "ROOM_ID": room_id, "CONTENT": "first", "SENT_DT": "2024-01-01T10:00:00" },
                { "MSG_ID": 3, "ROOM_ID": room_id, "CONTENT": query.get("ownerId").cloned().unwrap_or_default() }
            ]
        }
    }))
}

fn backend() -> Router {
    Router::new()
        .route(
            "/api/chat/rooms",
            get(|| async {
                Json(json!({
                    "ok": true,
                    "result": { "rows": [
                        { "ROOM_ID": 5, "ROOM_NM": "Team A", "LAST_MSG_CONTENT": "hi" },
                        { "roomId": "6", "roomNm": "   " }
                    ]}
                }))
            }),
        )
        .route("/api/chat/rooms/{id}/messages", get(history))
        .route("/api/chat/rooms/{id}/join", post(echo))
        .route(
            "/api/tasks",
            get(|| async { Json(json!({ "ok": false, "msg": "login required" })) }),
        )
        .route("/api/tasks/save", post(echo))
        .route("/api/ledger/save", post(echo))
        .route(
            "/api/diaries",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/shop/products", get(|| async { "<html>maintenance</html>" }))
        .route(
            "/api/shop/products/{id}",
            get(|Path(id): Path<i64>| async move {
                Json(json!({
                    "result": {
                        "item": {
                            "PRODUCT_ID": id,
                            "PRODUCT_NM": "Mug",
                            "PRICE": "12000",
                            "SALE_PRICE": "",
                            "IMAGE_URLS": "a.png, b.png"
                        }
                    }
                }))
            }),
        )
}

#[tokio::test]
async fn rooms_are_normalized_from_nested_rows() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap();

    let rooms = client.list_chat_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].id, Some(5));
    assert_eq!(rooms[0].room_nm.as_deref(), Some("Team A"));
    assert_eq!(rooms[0].last_msg_content.as_deref(), Some("hi"));
    assert_eq!(rooms[1].id, Some(6));
    assert_eq!(rooms[1].room_nm, None);
    assert_eq!(rooms[1].display_name(), "(제목 없음)");
}

#[tokio::test]
async fn history_sends_owner_and_unwraps_list() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap().with_owner(OwnerContext::new(42));

    let messages = client.chat_history(9).await.unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].id, Some(2));
    assert_eq!(messages[1].room_id, Some(9));
    assert_eq!(messages[2].content.as_deref(), Some("42"));
}

#[tokio::test]
async fn ok_false_becomes_rejected() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap();

    let err = client.list_tasks().await.unwrap_err();
    assert!(err.is_rejected());
    assert!(matches!(err, AppError::Rejected { msg } if msg == "login required"));
}

#[tokio::test]
async fn error_status_is_reported() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap();

    let err = client.list_diaries().await.unwrap_err();
    assert!(matches!(err, AppError::Status { status: 500, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn non_json_body_reads_as_empty_list() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap();

    assert!(client.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn product_detail_is_unwrapped() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap();

    let detail = client.product_detail(3).await.unwrap();
    assert_eq!(detail.summary.product_id, Some(3));
    assert_eq!(detail.summary.price, Some(12000.0));
    assert_eq!(detail.summary.sale_price, None);
    assert_eq!(detail.summary.effective_price(), Some(12000.0));
    assert_eq!(detail.image_urls, ["a.png", "b.png"]);
}

#[tokio::test]
async fn save_payload_omits_unset_and_keeps_null() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap().with_owner(OwnerContext::new(7));

    let update = TaskUpdate {
        task_id: Patch::Set(11),
        status_cd: Patch::Set(TaskStatus::Done),
        due_dt: Patch::Null,
        ..Default::default()
    };
    let echoed = client.save_task(&update).await.unwrap();
    assert_eq!(
        echoed["result"],
        json!({ "taskId": 11, "statusCd": "DONE", "dueDt": null, "ownerId": 7 })
    );
}

#[tokio::test]
async fn anonymous_save_has_no_owner() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap();

    let update = LedgerUpdate {
        amount: Patch::Set(1500.0),
        ..Default::default()
    };
    let echoed = client.save_ledger_row(&update).await.unwrap();
    assert_eq!(echoed["result"], json!({ "amount": 1500.0 }));
}

#[tokio::test]
async fn join_room_posts_room_and_owner() {
    let config = spawn_backend(backend()).await;
    let client = BackendClient::new(&config).unwrap().with_owner(OwnerContext::new(1));

    let echoed = client.join_room(5).await.unwrap();
    assert_eq!(echoed["result"], json!({ "roomId": 5, "ownerId": 1 }));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(&ClientConfig::new(format!("http://{addr}"))).unwrap();
    let err = client.list_chat_rooms().await.unwrap_err();
    assert!(matches!(err, AppError::Http(_)));
    assert!(err.is_transport());
}
