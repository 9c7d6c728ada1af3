//! In-memory implementation of the public key endpoints.
//!
//! Keys belong to a single authenticated user. Every response carries
//! rate-limit headers so clients can exercise metadata handling.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_LOGIN: &str = "octocat";
pub const RATE_LIMIT: u32 = 5000;
pub const RATE_RESET: i64 = 1_700_000_000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Key {
    pub id: u64,
    pub key: String,
    pub url: String,
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateKey {
    pub key: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct EditKey {
    pub key: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize)]
pub struct FieldError {
    pub resource: &'static str,
    pub field: &'static str,
    pub code: &'static str,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

pub struct Store {
    login: String,
    public_url: String,
    next_id: u64,
    keys: BTreeMap<u64, Key>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            message: "Not Found",
            errors: Vec::new(),
        }),
    )
}

fn missing(field: &'static str) -> FieldError {
    FieldError {
        resource: "PublicKey",
        field,
        code: "missing_field",
    }
}

/// Router for `login`, with resource URLs rooted at `public_url`.
pub fn app_with(login: &str, public_url: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        login: login.to_string(),
        public_url: public_url.trim_end_matches('/').to_string(),
        next_id: 1,
        keys: BTreeMap::new(),
    }));
    Router::new()
        .route("/users/{user}/keys", get(list_user_keys))
        .route("/user/keys", get(list_keys).post(create_key))
        .route("/user/keys/{id}", get(get_key).patch(edit_key).delete(delete_key))
        .with_state(db)
        .layer(middleware::map_response(rate_headers))
}

pub fn app() -> Router {
    app_with(DEFAULT_LOGIN, "http://localhost:3000")
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let public_url = format!("http://{}", listener.local_addr()?);
    axum::serve(listener, app_with(DEFAULT_LOGIN, &public_url)).await
}

async fn rate_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(RATE_LIMIT));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(RATE_LIMIT - 1));
    headers.insert("x-ratelimit-reset", HeaderValue::from(RATE_RESET));
    response
}

async fn list_keys(State(db): State<Db>) -> Json<Vec<Key>> {
    let store = db.read().await;
    Json(store.keys.values().cloned().collect())
}

async fn list_user_keys(State(db): State<Db>, Path(user): Path<String>) -> ApiResult<Json<Vec<Key>>> {
    let store = db.read().await;
    if user != store.login {
        return Err(not_found());
    }
    Ok(Json(store.keys.values().cloned().collect()))
}

async fn create_key(State(db): State<Db>, Json(input): Json<CreateKey>) -> ApiResult<(StatusCode, Json<Key>)> {
    let (key, title) = match (input.key, input.title) {
        (Some(key), Some(title)) if !key.is_empty() => (key, title),
        (key, title) => {
            let mut errors = Vec::new();
            if key.map_or(true, |k| k.is_empty()) {
                errors.push(missing("key"));
            }
            if title.is_none() {
                errors.push(missing("title"));
            }
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody {
                    message: "Validation Failed",
                    errors,
                }),
            ));
        }
    };

    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;
    let created = Key {
        id,
        key,
        url: format!("{}/user/keys/{id}", store.public_url),
        title,
    };
    store.keys.insert(id, created.clone());
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_key(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Key>> {
    let store = db.read().await;
    store.keys.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn edit_key(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<EditKey>,
) -> ApiResult<Json<Key>> {
    let mut store = db.write().await;
    let key = store.keys.get_mut(&id).ok_or_else(not_found)?;
    if let Some(material) = input.key {
        key.key = material;
    }
    if let Some(title) = input.title {
        key.title = title;
    }
    Ok(Json(key.clone()))
}

async fn delete_key(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .keys
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}
