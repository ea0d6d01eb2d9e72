//! In-memory stand-in for a reqres-style users API.
//!
//! Routes live under `/api`. Every request must carry the configured
//! `x-api-key`, and any route accepts `?delay_ms=N` to answer slowly.

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_KEY: &str = "reqres-free-v1";

const SEED: [(&str, &str); 12] = [
    ("George", "Bluth"),
    ("Janet", "Weaver"),
    ("Emma", "Wong"),
    ("Eve", "Holt"),
    ("Charles", "Morris"),
    ("Tracey", "Ramos"),
    ("Michael", "Lawson"),
    ("Lindsay", "Ferguson"),
    ("Tobias", "Funke"),
    ("Byron", "Fields"),
    ("George", "Edwards"),
    ("Rachel", "Howell"),
];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct Store {
    users: HashMap<u64, User>,
    next_id: u64,
}

impl Store {
    pub fn seeded() -> Self {
        let users: HashMap<u64, User> = SEED
            .iter()
            .zip(1u64..)
            .map(|((first, last), id)| {
                let user = User {
                    id,
                    email: format!("{}.{}@reqres.in", first.to_lowercase(), last.to_lowercase()),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                };
                (id, user)
            })
            .collect();
        let next_id = users.len() as u64 + 1;
        Self { users, next_id }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    api_key: Arc<str>,
}

#[derive(Deserialize)]
struct Delay {
    delay_ms: Option<u64>,
}

pub fn app() -> Router {
    app_with_key(API_KEY)
}

pub fn app_with_key(api_key: &str) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::seeded())),
        api_key: Arc::from(api_key),
    };
    let api = Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/headers", get(echo_headers));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), gate))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn gate(
    State(state): State<AppState>,
    Query(delay): Query<Delay>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(ms) = delay.delay_ms {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
    let key = request.headers().get("x-api-key").and_then(|v| v.to_str().ok());
    if key != Some(state.api_key.as_ref()) {
        tracing::debug!(uri = %request.uri(), "rejected request without valid api key");
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Missing API key"}))).into_response();
    }
    next.run(request).await
}

async fn get_user(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let store = state.store.read().await;
    match store.users.get(&id) {
        Some(user) => Json(json!({"data": user})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn create_user(
    State(state): State<AppState>,
    Json(mut body): Json<Map<String, Value>>,
) -> (StatusCode, Json<Map<String, Value>>) {
    let mut store = state.store.write().await;
    let id = store.next_id;
    store.next_id += 1;
    body.insert("id".to_string(), Value::String(id.to_string()));
    body.insert("createdAt".to_string(), Value::String(chrono::Utc::now().to_rfc3339()));
    (StatusCode::CREATED, Json(body))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(mut body): Json<Map<String, Value>>,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    let store = state.store.read().await;
    if !store.users.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    body.insert("updatedAt".to_string(), Value::String(chrono::Utc::now().to_rfc3339()));
    Ok(Json(body))
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<u64>) -> StatusCode {
    let mut store = state.store.write().await;
    match store.users.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn echo_headers(headers: HeaderMap) -> Json<Map<String, Value>> {
    let echoed = headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), Value::String(value.to_string())))
        })
        .collect();
    Json(echoed)
}
