//! Fake token-auth API for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use tokengate_core::auth::{Credentials, KeyValueStore, MemoryStore, SessionState, TokenStore};
use tokengate_core::AuthClient;

pub const GOOD_PASSWORD: &str = "password123";
pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const NO_HEADERS_EMAIL: &str = "noheaders@example.com";
pub const FIRST_TOKEN: &str = "tok-1";
pub const ROTATED_TOKEN: &str = "tok-2";
pub const CLIENT_ID: &str = "cli-1";

/// Requests seen by the fake server, as "METHOD /path".
#[derive(Clone, Default)]
pub struct FakeApi {
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, entry: &str) {
        self.requests.lock().unwrap().push(entry.to_string());
    }
}

fn user_json(id: i64, email: &str, name: Option<&str>) -> Value {
    json!({
        "data": {
            "id": id,
            "email": email,
            "uid": email,
            "provider": "email",
            "name": name,
            "allow_password_change": false
        }
    })
}

fn authenticated(token: &str, uid: &str, body: Value) -> Response {
    let headers = [
        ("access-token", token.to_string()),
        ("uid", uid.to_string()),
        ("client", CLIENT_ID.to_string()),
    ];
    (StatusCode::OK, headers, Json(body)).into_response()
}

async fn sign_in(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    api.record("POST /auth/sign_in");
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if password != GOOD_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "success": false,
                "errors": ["Invalid login credentials. Please try again."]
            })),
        )
            .into_response();
    }
    if email == NO_HEADERS_EMAIL {
        return (StatusCode::OK, Json(user_json(9, email, None))).into_response();
    }
    authenticated(FIRST_TOKEN, email, user_json(1, email, None))
}

async fn register(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    api.record("POST /auth");
    let email = body["email"].as_str().unwrap_or_default();

    if email == TAKEN_EMAIL {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "error",
                "errors": {
                    "email": ["has already been taken"],
                    "full_messages": ["Email has already been taken"]
                }
            })),
        )
            .into_response();
    }
    if body["password"] != body["password_confirmation"] {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"status": "error", "errors": {"full_messages": ["Password confirmation doesn't match"]}})),
        )
            .into_response();
    }
    let name = body["name"].as_str();
    authenticated(FIRST_TOKEN, email, user_json(2, email, name))
}

async fn validate_token(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    api.record("GET /auth/validate_token");
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let token = header("access-token");
    let uid = header("uid");
    let client = header("client");

    let token_ok = token == FIRST_TOKEN || token == ROTATED_TOKEN;
    if !token_ok || client != CLIENT_ID || uid.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "errors": ["Invalid login credentials"]})),
        )
            .into_response();
    }
    authenticated(ROTATED_TOKEN, &uid, user_json(1, &uid, None))
}

/// Start the fake API on an ephemeral port. Returns its base URL.
pub async fn spawn_api(api: FakeApi) -> String {
    let app = Router::new()
        .route("/auth/sign_in", post(sign_in))
        .route("/auth", post(register))
        .route("/auth/validate_token", get(validate_token))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Client over a fresh in-memory store.
pub fn client(base_url: &str) -> AuthClient {
    client_with_backend(base_url, Arc::new(MemoryStore::new()))
}

/// Client over the given backend, with the session computed from it.
pub fn client_with_backend(base_url: &str, backend: Arc<dyn KeyValueStore>) -> AuthClient {
    let store = TokenStore::new(backend);
    let session = SessionState::from_store(&store);
    AuthClient::new(base_url, store, session).unwrap()
}

/// In-memory backend whose `n`th call to `set` (1-based) fails.
pub struct FailOnWrite {
    inner: MemoryStore,
    fail_on: usize,
    writes: AtomicUsize,
}

impl FailOnWrite {
    pub fn new(fail_on: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
            writes: AtomicUsize::new(0),
        }
    }
}

impl KeyValueStore for FailOnWrite {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.writes.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
            anyhow::bail!("disk full");
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.inner.remove(key)
    }
}

pub fn credentials(token: &str, uid: &str) -> Credentials {
    Credentials {
        access_token: token.to_string(),
        uid: uid.to_string(),
        client: CLIENT_ID.to_string(),
    }
}
