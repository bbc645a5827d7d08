#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use haven_admin::gateway::HttpGateway;
use haven_admin::session::{Session, SessionGuard};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map, Value};

pub const TOKEN: &str = "integration-token";
pub const PASSWORD: &str = "s3cret";

#[derive(Clone, Default)]
struct StoreState {
    collections: Arc<Mutex<HashMap<String, Vec<Map<String, Value>>>>>,
    offline: Arc<Mutex<bool>>,
}

/// Document store and identity provider served in-process on a free port
pub struct TestStore {
    pub base_url: String,
    state: StoreState,
}

impl TestStore {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test store")?;

        let state = StoreState::default();
        let app = Router::new()
            .route("/api/:collection", get(list).post(create))
            .route("/api/:collection/:id", get(fetch).patch(update).delete(remove))
            .route("/auth/login", post(login))
            .with_state(state.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        })
    }

    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth", self.base_url)
    }

    pub fn gateway(&self) -> Result<HttpGateway> {
        Ok(HttpGateway::new(&self.api_url(), Duration::from_secs(5))?.with_token(TOKEN))
    }

    pub fn seed(&self, collection: &str, docs: Vec<Value>) {
        let mut collections = self.state.collections.lock().unwrap();
        let store = collections.entry(collection.to_string()).or_default();
        for doc in docs {
            if let Value::Object(map) = doc {
                store.push(map);
            }
        }
    }

    pub fn docs(&self, collection: &str) -> Vec<Value> {
        self.state
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| docs.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    /// Answer every data call with a plain-text 500
    pub fn set_offline(&self, offline: bool) {
        *self.state.offline.lock().unwrap() = offline;
    }
}

pub fn tip(i: usize) -> Value {
    json!({
        "id": format!("tip-{:02}", i),
        "title": format!("Tip {}", i),
        "content": format!("Practice suggestion number {}", i),
        "category": "grounding",
        "createdAt": { "seconds": 1_700_000_000 + i as i64 * 60, "nanoseconds": 0 },
    })
}

pub fn authenticated_guard() -> SessionGuard {
    let now = Utc::now();
    SessionGuard::from_session(Session {
        email: "admin@example.com".to_string(),
        user_id: Some("admin-1".to_string()),
        token: TOKEN.to_string(),
        issued_at: now,
        expires_at: now + chrono::Duration::hours(1),
    })
}

fn authorize(headers: &HeaderMap, state: &StoreState) -> Option<Response> {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == expected);
    if !authorized {
        return Some((StatusCode::UNAUTHORIZED, Json(json!({ "message": "missing or invalid token" }))).into_response());
    }
    if *state.offline.lock().unwrap() {
        return Some((StatusCode::INTERNAL_SERVER_ERROR, "store offline").into_response());
    }
    None
}

fn not_found(id: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": format!("document {} not found", id) }))).into_response()
}

async fn list(State(state): State<StoreState>, Path(collection): Path<String>, headers: HeaderMap) -> Response {
    if let Some(denied) = authorize(&headers, &state) {
        return denied;
    }
    let docs: Vec<Value> = state
        .collections
        .lock()
        .unwrap()
        .get(&collection)
        .map(|docs| docs.iter().cloned().map(Value::Object).collect())
        .unwrap_or_default();
    Json(json!({ "success": true, "data": docs })).into_response()
}

async fn fetch(
    State(state): State<StoreState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = authorize(&headers, &state) {
        return denied;
    }
    let collections = state.collections.lock().unwrap();
    match collections
        .get(&collection)
        .and_then(|docs| docs.iter().find(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())))
    {
        Some(doc) => Json(Value::Object(doc.clone())).into_response(),
        None => not_found(&id),
    }
}

async fn create(
    State(state): State<StoreState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if let Some(denied) = authorize(&headers, &state) {
        return denied;
    }
    let mut doc = body;
    doc.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
    state
        .collections
        .lock()
        .unwrap()
        .entry(collection)
        .or_default()
        .push(doc.clone());
    (StatusCode::CREATED, Json(json!({ "data": doc }))).into_response()
}

/// Merges the patch and answers 204, like stores that do not echo documents
async fn update(
    State(state): State<StoreState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    if let Some(denied) = authorize(&headers, &state) {
        return denied;
    }
    let mut collections = state.collections.lock().unwrap();
    let doc = collections
        .get_mut(&collection)
        .and_then(|docs| docs.iter_mut().find(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())));
    match doc {
        Some(doc) => {
            for (key, value) in body {
                if key != "id" {
                    doc.insert(key, value);
                }
            }
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&id),
    }
}

async fn remove(
    State(state): State<StoreState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = authorize(&headers, &state) {
        return denied;
    }
    let mut collections = state.collections.lock().unwrap();
    let Some(docs) = collections.get_mut(&collection) else {
        return not_found(&id);
    };
    let before = docs.len();
    docs.retain(|d| d.get("id").and_then(Value::as_str) != Some(id.as_str()));
    if docs.len() == before {
        return not_found(&id);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
    if email.is_empty() || password != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "code": 400, "message": "INVALID_PASSWORD" } })),
        )
            .into_response();
    }

    let now = Utc::now().timestamp();
    let claims = json!({ "sub": "admin-1", "email": email, "iat": now, "exp": now + 3600 });
    let token = match encode(&Header::default(), &claims, &EncodingKey::from_secret(b"provider-secret")) {
        Ok(token) => token,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    Json(json!({ "idToken": token, "localId": "admin-1", "expiresIn": "3600" })).into_response()
}
