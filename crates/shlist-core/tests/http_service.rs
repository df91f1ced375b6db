//! HttpListService against a local stand-in for the list service
//!
//! The server records every request line so tests can assert on exactly
//! what went over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use shlist_core::{
    ActiveLists, Category, HistoryLists, HttpListService, Identity, ListService, MemorySecretStore,
    NewList, ShlistError, SyncStore,
};

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    fn record(&self, line: String, body: Option<Value>) {
        self.requests.lock().unwrap().push(line);
        if let Some(body) = body {
            self.bodies.lock().unwrap().push(body);
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

fn list_json(id: i64, enabled: bool) -> Value {
    json!({
        "id": id,
        "name": format!("LIST {}", id),
        "createdDate": "2024-05-01T10:20:30.000+00:00",
        "enabled": enabled,
        "items": [{"id": id * 10, "name": "EGGS"}]
    })
}

async fn active_list(
    State(recorder): State<Recorder>,
    Path(client_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    recorder.record(
        format!(
            "GET /active-list/{} page={} size={}",
            client_id,
            query.get("page").cloned().unwrap_or_default(),
            query.get("size").cloned().unwrap_or_default()
        ),
        None,
    );
    Json(json!({
        "content": [list_json(3, true), list_json(2, true)],
        "totalElements": 2,
        "totalPages": 1,
        "number": 0,
        "size": 5
    }))
}

async fn history_list(
    State(recorder): State<Recorder>,
    Path(client_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page = query.get("page").cloned().unwrap_or_default();
    recorder.record(format!("GET /history-list/{} page={}", client_id, page), None);
    Json(json!({
        "content": [list_json(7, false)],
        "totalElements": 1,
        "totalPages": 1,
        "number": 0
    }))
}

async fn create(State(recorder): State<Recorder>, Json(body): Json<Value>) -> Response {
    let too_short = body["name"].as_str().map_or(true, |name| name.len() < 5);
    recorder.record("POST /create".to_string(), Some(body));

    if too_short {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": 400,
                "message": "Validation error",
                "path": "/api/v1/shlists/create",
                "timestamp": 1714557600000u64,
                "validationErrors": {"name": "size must be between 5 and 30"}
            })),
        )
            .into_response();
    }
    Json(json!({"message": "List is created."})).into_response()
}

async fn completed(
    State(recorder): State<Recorder>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorder.record(format!("PATCH /{}/completed", id), Some(body));
    Json(json!({"message": "List is completed."}))
}

async fn update(
    State(recorder): State<Recorder>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorder.record(format!("PUT /{}/update", id), Some(body));
    Json(json!({"message": "List is updated."}))
}

async fn remove(State(recorder): State<Recorder>, Path(id): Path<i64>) -> Response {
    recorder.record(format!("DELETE /{}/delete", id), None);
    if id == 404 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({"message": "List is deleted."})).into_response()
}

async fn spawn_server(recorder: Recorder) -> String {
    let app = Router::new()
        .route("/api/v1/shlists/create", post(create))
        .route("/api/v1/shlists/active-list/:client_id", get(active_list))
        .route("/api/v1/shlists/history-list/:client_id", get(history_list))
        .route("/api/v1/shlists/:id/completed", patch(completed))
        .route("/api/v1/shlists/:id/update", put(update))
        .route("/api/v1/shlists/:id/delete", delete(remove))
        .with_state(recorder);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn store_for(base_url: &str) -> Arc<SyncStore> {
    let service = HttpListService::new(base_url, Duration::from_secs(5)).unwrap();
    Arc::new(SyncStore::new(
        Arc::new(service),
        Identity::new(MemorySecretStore::new()),
    ))
}

#[tokio::test]
async fn fetch_sends_page_and_size() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let service = HttpListService::new(&base_url, Duration::from_secs(5)).unwrap();

    let page = service
        .fetch_page(Category::Active, "client-1", 0)
        .await
        .unwrap();

    assert_eq!(page.content.len(), 2);
    assert_eq!(page.total_pages, 1);
    assert_eq!(
        recorder.requests(),
        vec!["GET /active-list/client-1 page=0 size=5"]
    );
}

#[tokio::test]
async fn create_sends_uppercased_body_with_client_id() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let store = store_for(&base_url);
    let active = ActiveLists::new(Arc::clone(&store));

    let outcome = active
        .create(&NewList::new("  weekly milk  ", ["eggs", " bread "]))
        .await
        .unwrap();
    assert_eq!(outcome.ack.message, "List is created.");

    let client_id = store.client_id().await.unwrap();
    assert_eq!(
        recorder.bodies()[0],
        json!({
            "name": "WEEKLY MILK",
            "items": [{"name": "EGGS"}, {"name": "BREAD"}],
            "clientId": client_id
        })
    );
    assert_eq!(
        recorder.requests(),
        vec![
            "POST /create".to_string(),
            format!("GET /active-list/{} page=0 size=5", client_id),
        ]
    );
}

#[tokio::test]
async fn server_validation_errors_are_surfaced() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let active = ActiveLists::new(store_for(&base_url));

    let err = active
        .create(&NewList::new("tea", ["green"]))
        .await
        .unwrap_err();

    match err {
        ShlistError::ValidationFailed { fields, .. } => {
            assert_eq!(fields["name"], "size must be between 5 and 30");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // No refetch after a failed create
    assert_eq!(recorder.requests(), vec!["POST /create"]);
}

#[tokio::test]
async fn complete_uses_patch_endpoint() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let store = store_for(&base_url);
    let active = ActiveLists::new(Arc::clone(&store));

    active.complete(42).await.unwrap();

    assert_eq!(recorder.requests()[0], "PATCH /42/completed");
    assert_eq!(recorder.bodies()[0], json!({"enabled": false}));
    assert!(store.history_refresh_pending());
}

#[tokio::test]
async fn update_uses_put_endpoint() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let active = ActiveLists::new(store_for(&base_url));

    active
        .update(3, &NewList::new("weekend", ["jam"]))
        .await
        .unwrap();

    assert_eq!(recorder.requests()[0], "PUT /3/update");
    assert_eq!(recorder.bodies()[0]["name"], "WEEKEND");
}

#[tokio::test]
async fn delete_only_after_confirmation() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let history = HistoryLists::new(store_for(&base_url));

    assert!(history.delete(7, |_| false).await.unwrap().is_none());
    assert!(recorder.requests().is_empty());

    assert!(history.delete(7, |_| true).await.unwrap().is_some());
    let deletes: Vec<_> = recorder
        .requests()
        .into_iter()
        .filter(|r| r.starts_with("DELETE"))
        .collect();
    assert_eq!(deletes, vec!["DELETE /7/delete"]);
}

#[tokio::test]
async fn missing_list_is_not_found() {
    let recorder = Recorder::default();
    let base_url = spawn_server(recorder.clone()).await;
    let service = HttpListService::new(&base_url, Duration::from_secs(5)).unwrap();

    let err = service.delete(404).await.unwrap_err();
    assert!(matches!(err, ShlistError::NotFound { .. }));
}

#[tokio::test]
async fn unreachable_service_is_network_failure() {
    // Reserve a port, then free it so nothing is listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let history = HistoryLists::new(store_for(&format!("http://{}", addr)));
    let err = history.refresh().await.unwrap_err();

    match err {
        ShlistError::FetchFailed { category, source } => {
            assert_eq!(category, Category::Completed);
            assert!(matches!(*source, ShlistError::NetworkFailed { .. }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(history.snapshot().await.lists.is_empty());
}
