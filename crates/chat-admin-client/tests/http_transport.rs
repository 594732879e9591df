use std::rc::Rc;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chat_admin_client::{AdminClientConfig, HttpAdminTransport};
use chat_admin_core::{
    AdminError, AdminTransport, ApiRequest, ChatId, ChatSelection, EditGate, ModeSelection,
    MutationOutcome, PageView, PermissionField, PermissionsPage, ResourceCache, SchemePage,
    TracingNotifier, TransportError, VerificationMode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

#[derive(Clone, Default)]
struct MockAdminState {
    scheme_mode: Arc<Mutex<Option<String>>>,
    scheme_bodies: Arc<Mutex<Vec<Value>>>,
}

struct MockAdminHandle {
    base_url: String,
    state: MockAdminState,
    _shutdown: oneshot::Sender<()>,
}

#[derive(Deserialize)]
struct ToggleQuery {
    value: bool,
}

fn permission(id: i64, first_name: &str, readable: bool) -> Value {
    json!({
        "id": id,
        "user": {"first_name": first_name, "last_name": "Tester"},
        "readable": readable,
        "writable": false,
        "customized": false
    })
}

async fn chat_permissions() -> Json<Value> {
    Json(json!({
        "chat": {"id": 1, "title": "Mock Chat", "is_take_over": false},
        "permissions": [permission(10, "Ann", false), permission(11, "Bob", true)]
    }))
}

async fn chat_scheme(State(state): State<MockAdminState>) -> Json<Value> {
    let mode = state.scheme_mode.lock().await.clone();
    Json(json!({
        "chat": {"id": 1, "title": "Mock Chat"},
        "scheme": {"id": 3, "verification_mode": mode}
    }))
}

async fn save_scheme(State(state): State<MockAdminState>, Json(body): Json<Value>) -> Json<Value> {
    let mode = body
        .get("verification_mode")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    *state.scheme_mode.lock().await = mode;
    state.scheme_bodies.lock().await.push(body);
    Json(json!({"ok": true}))
}

async fn toggle_field(
    Path((id, field)): Path<(i64, String)>,
    Query(query): Query<ToggleQuery>,
) -> (StatusCode, Json<Value>) {
    if field != "readable" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"errors": [format!("field {field} is locked")]})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"permission": permission(id, "Ann", query.value)})),
    )
}

async fn withdraw(Path((_id, _segment)): Path<(i64, String)>) -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "withdraw exploded")
}

async fn start_mock_admin() -> MockAdminHandle {
    let state = MockAdminState::default();
    let router = Router::new()
        .route("/admin/api/chats/:chat/permissions", get(chat_permissions))
        .route(
            "/admin/api/chats/:chat/scheme",
            get(chat_scheme).put(save_scheme),
        )
        .route(
            "/admin/api/permissions/:id/:segment",
            axum::routing::put(toggle_field).delete(withdraw),
        )
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock admin listener");
    let addr = listener.local_addr().expect("mock admin local_addr");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        if let Err(err) = server.await {
            tracing::error!(error = %err, "mock admin server failed");
        }
    });

    MockAdminHandle {
        base_url: format!("http://{addr}"),
        state,
        _shutdown: shutdown_tx,
    }
}

fn transport_for(handle: &MockAdminHandle) -> HttpAdminTransport {
    HttpAdminTransport::new(AdminClientConfig::new(handle.base_url.as_str())).expect("transport")
}

#[tokio::test]
async fn responses_are_camelized() {
    let handle = start_mock_admin().await;
    let transport = transport_for(&handle);

    let value = transport
        .send(ApiRequest::get("/admin/api/chats/1/permissions"))
        .await
        .expect("permissions");

    assert_eq!(value["chat"]["isTakeOver"], json!(false));
    assert_eq!(value["permissions"][0]["user"]["firstName"], json!("Ann"));
}

#[tokio::test]
async fn rejected_status_with_errors_body_is_passed_through() {
    let handle = start_mock_admin().await;
    let transport = transport_for(&handle);

    let value = transport
        .send(ApiRequest::put("/admin/api/permissions/10/writable?value=true"))
        .await
        .expect("body with errors");

    assert_eq!(value, json!({"errors": ["field writable is locked"]}));
}

#[tokio::test]
async fn plain_server_error_is_a_transport_error() {
    let handle = start_mock_admin().await;
    let transport = transport_for(&handle);

    let result = transport
        .send(ApiRequest::delete("/admin/api/permissions/10/withdraw"))
        .await;

    assert_eq!(
        result,
        Err(TransportError::Http {
            status: 500,
            body: "withdraw exploded".to_string(),
        })
    );
}

#[tokio::test]
async fn permissions_page_round_trip() {
    let handle = start_mock_admin().await;
    let cache = Rc::new(ResourceCache::new(transport_for(&handle)));
    let page = PermissionsPage::new(cache, TracingNotifier);

    let chat = page
        .sync(&ChatSelection::loaded(ChatId(1)))
        .await
        .expect("sync");
    assert_eq!(chat.map(|chat| chat.title), Some("Mock Chat".to_string()));

    let outcome = page
        .toggle_field(PermissionField::Readable, 0, true)
        .await
        .expect("toggle");
    assert_eq!(outcome, MutationOutcome::Applied);
    assert!(page.records()[0].readable);

    let rejected = page.toggle_field(PermissionField::Writable, 1, true).await;
    assert_eq!(
        rejected,
        Err(AdminError::Application(vec![
            "field writable is locked".to_string()
        ]))
    );

    assert!(page.withdraw(1).await.is_err());
    assert_eq!(page.records().len(), 2);

    let PageView::Loaded(view) = page.view() else {
        panic!("expected loaded view");
    };
    assert_eq!(view.title, "管理员权限 / Mock Chat");
    assert_eq!(view.rows[1].display_name, "Bob Tester");
}

#[tokio::test]
async fn scheme_page_saves_and_refetches() {
    let handle = start_mock_admin().await;
    let cache = Rc::new(ResourceCache::new(transport_for(&handle)));
    let page = SchemePage::new(cache, TracingNotifier);
    let arithmetic = ModeSelection::Named(VerificationMode::Arithmetic);

    page.sync(&ChatSelection::loaded(ChatId(1)))
        .await
        .expect("sync");
    assert_eq!(page.mode(), ModeSelection::SystemDefault);

    page.select(arithmetic);
    page.confirm().await.expect("confirm");

    assert_eq!(page.gate(), EditGate::Committed);
    assert_eq!(page.mode(), arithmetic);
    assert_eq!(
        *handle.state.scheme_bodies.lock().await,
        vec![json!({"verification_mode": "arithmetic"})]
    );

    page.select(ModeSelection::SystemDefault);
    page.confirm().await.expect("confirm default");
    assert_eq!(
        handle.state.scheme_bodies.lock().await.last(),
        Some(&json!({"verification_mode": null}))
    );
    assert_eq!(page.mode(), ModeSelection::SystemDefault);
}
