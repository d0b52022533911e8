use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Prefix every route is mounted under, matching the public service.
pub const BASE_PATH: &str = "/v2";

pub const PET_STATUSES: [&str; 3] = ["available", "pending", "sold"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub name: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_status: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

/// Envelope the service uses for mutation results and errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct PetStore {
    pets: HashMap<i64, Pet>,
    users: HashMap<String, User>,
    orders: HashMap<i64, Order>,
}

pub type Db = Arc<RwLock<PetStore>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(PetStore::default()));
    let routes = Router::new()
        .route("/pet", post(add_pet))
        .route("/pet/findByStatus", get(find_pets_by_status))
        .route("/pet/{pet_id}", get(get_pet).delete(delete_pet))
        .route("/user", post(create_user))
        .route("/user/login", get(login_user))
        .route("/user/logout", get(logout_user))
        .route(
            "/user/{username}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/store/order", post(place_order))
        .route("/store/order/{order_id}", get(get_order).delete(delete_order))
        .with_state(db);
    Router::new().nest(BASE_PATH, routes)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn api_response(status: StatusCode, kind: &str, message: impl Into<String>) -> Response {
    let body = ApiResponse {
        code: status.as_u16(),
        kind: kind.to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

fn ok_message(message: impl Into<String>) -> Response {
    api_response(StatusCode::OK, "unknown", message)
}

fn error(status: StatusCode, message: &str) -> Response {
    api_response(status, "error", message)
}

/// Numeric ids that overflow `i64` cannot name a stored entity, so they are
/// "not found" rather than malformed.
fn parse_id(raw: &str) -> Result<i64, StatusCode> {
    match raw.parse::<i64>() {
        Ok(id) => Ok(id),
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => {
            Err(StatusCode::NOT_FOUND)
        }
        Err(_) => Err(StatusCode::BAD_REQUEST),
    }
}

fn is_numeric_username(username: &str) -> bool {
    !username.is_empty() && username.bytes().all(|b| b.is_ascii_digit())
}

/// One past the largest stored id. Once `i64::MAX` is taken, the lowest free
/// positive id is handed out instead.
fn fresh_id(taken: impl Iterator<Item = i64>) -> i64 {
    let taken: HashSet<i64> = taken.collect();
    let Some(max) = taken.iter().copied().max() else {
        return 1;
    };
    max.max(0)
        .checked_add(1)
        .or_else(|| (1..i64::MAX).find(|id| !taken.contains(id)))
        .unwrap_or_default()
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

// --- pet ---

async fn add_pet(State(db): State<Db>, body: String) -> Response {
    let Ok(mut pet) = serde_json::from_str::<Pet>(&body) else {
        return error(StatusCode::METHOD_NOT_ALLOWED, "Invalid input");
    };
    let mut store = db.write().await;
    let id = match pet.id {
        Some(id) if id != 0 => id,
        _ => fresh_id(store.pets.keys().copied()),
    };
    pet.id = Some(id);
    store.pets.insert(id, pet.clone());
    debug!(id, "pet stored");
    Json(pet).into_response()
}

#[derive(Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

async fn find_pets_by_status(State(db): State<Db>, Query(query): Query<StatusQuery>) -> Response {
    let requested: Vec<&str> = query
        .status
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .collect();
    if requested.iter().any(|s| !PET_STATUSES.contains(s)) {
        return error(StatusCode::BAD_REQUEST, "Invalid status value");
    }

    let store = db.read().await;
    let mut pets: Vec<Pet> = store
        .pets
        .values()
        .filter(|pet| {
            pet.status
                .as_deref()
                .is_some_and(|status| requested.contains(&status))
        })
        .cloned()
        .collect();
    pets.sort_by_key(|pet| pet.id);
    Json(pets).into_response()
}

async fn get_pet(State(db): State<Db>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(StatusCode::NOT_FOUND) => return error(StatusCode::NOT_FOUND, "Pet not found"),
        Err(status) => return error(status, "Invalid ID supplied"),
    };
    match db.read().await.pets.get(&id) {
        Some(pet) => Json(pet.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Pet not found"),
    }
}

async fn delete_pet(State(db): State<Db>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(StatusCode::NOT_FOUND) => return StatusCode::NOT_FOUND.into_response(),
        Err(status) => return error(status, "Invalid ID supplied"),
    };
    match db.write().await.pets.remove(&id) {
        Some(_) => ok_message(id.to_string()),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// --- user ---

/// Any JSON is accepted; non-object bodies fall back to an empty user.
fn parse_user(body: &str) -> Result<User, Response> {
    let value: Value =
        serde_json::from_str(body).map_err(|_| error(StatusCode::BAD_REQUEST, "bad input"))?;
    if !value.is_object() {
        return Ok(User::default());
    }
    serde_json::from_value(value).map_err(|_| error(StatusCode::BAD_REQUEST, "bad input"))
}

async fn create_user(State(db): State<Db>, body: String) -> Response {
    let mut user = match parse_user(&body) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    let id = match user.id {
        Some(id) if id != 0 => id,
        _ => fresh_id(store.users.values().filter_map(|u| u.id)),
    };
    user.id = Some(id);
    if let Some(username) = user.username.clone() {
        debug!(%username, "user stored");
        store.users.insert(username, user);
    }
    ok_message(id.to_string())
}

#[derive(Deserialize)]
struct LoginQuery {
    username: Option<String>,
    password: Option<String>,
}

async fn login_user(Query(query): Query<LoginQuery>) -> Response {
    let username = query.username.unwrap_or_default();
    let password = query.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Invalid username/password supplied");
    }

    let now = now_millis();
    let expires = (now / 1000 + 3600).to_string();
    let mut response = ok_message(format!("logged in user session:{now}"));
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-rate-limit"),
        HeaderValue::from_static("5000"),
    );
    if let Ok(value) = HeaderValue::from_str(&expires) {
        headers.insert(HeaderName::from_static("x-expires-after"), value);
    }
    response
}

async fn logout_user() -> Response {
    ok_message("ok")
}

async fn get_user(State(db): State<Db>, Path(username): Path<String>) -> Response {
    if is_numeric_username(&username) {
        return error(StatusCode::BAD_REQUEST, "Invalid username supplied");
    }
    match db.read().await.users.get(&username) {
        Some(user) => Json(user.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn update_user(State(db): State<Db>, Path(username): Path<String>, body: String) -> Response {
    if is_numeric_username(&username) {
        return error(StatusCode::BAD_REQUEST, "Invalid username supplied");
    }
    let mut user = match parse_user(&body) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let mut store = db.write().await;
    let Some(previous) = store.users.remove(&username) else {
        return error(StatusCode::NOT_FOUND, "User not found");
    };
    let key = user.username.clone().unwrap_or(username);
    user.username = Some(key.clone());
    if user.id.is_none() {
        user.id = previous.id;
    }
    let id = user.id.unwrap_or_default();
    store.users.insert(key, user);
    ok_message(id.to_string())
}

async fn delete_user(State(db): State<Db>, Path(username): Path<String>) -> Response {
    if is_numeric_username(&username) {
        return error(StatusCode::BAD_REQUEST, "Invalid username supplied");
    }
    match db.write().await.users.remove(&username) {
        Some(_) => ok_message(username),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// --- store ---

async fn place_order(State(db): State<Db>, body: String) -> Response {
    let Ok(mut order) = serde_json::from_str::<Order>(&body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid Order");
    };
    let mut store = db.write().await;
    let id = match order.id {
        Some(id) if id != 0 => id,
        _ => fresh_id(store.orders.keys().copied()),
    };
    order.id = Some(id);
    store.orders.insert(id, order.clone());
    debug!(id, "order stored");
    Json(order).into_response()
}

async fn get_order(State(db): State<Db>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(StatusCode::NOT_FOUND) => return error(StatusCode::NOT_FOUND, "Order not found"),
        Err(status) => return error(status, "Invalid ID supplied"),
    };
    match db.read().await.orders.get(&id) {
        Some(order) => Json(order.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn delete_order(State(db): State<Db>, Path(raw): Path<String>) -> Response {
    let id = match parse_id(&raw) {
        Ok(id) => id,
        Err(StatusCode::NOT_FOUND) => return StatusCode::NOT_FOUND.into_response(),
        Err(status) => return error(status, "Invalid ID supplied"),
    };
    match db.write().await.orders.remove(&id) {
        Some(_) => ok_message(id.to_string()),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
