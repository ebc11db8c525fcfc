//! In-memory implementation of the launch API for local development and
//! integration tests.
//!
//! Serves `GET /json/{resource}` with the upstream response envelope,
//! 25 records per page, bearer or query-key authentication and simple
//! filtering. The dataset is shared (`Db`) so tests can mutate records while
//! a client is polling.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

/// The only API key the mock accepts.
pub const MOCK_API_KEY: &str = "3f0e9b52-8c1d-4a7e-9d6b-5e2a1c4f7b90";

pub const PAGE_SIZE: usize = 25;

pub const RESOURCES: [&str; 7] = [
    "companies",
    "launches",
    "locations",
    "missions",
    "pads",
    "tags",
    "vehicles",
];

pub type Db = Arc<RwLock<HashMap<String, Vec<Value>>>>;

/// Response envelope shared by every resource.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub errors: Vec<String>,
    pub valid_auth: bool,
    pub count: usize,
    pub limit: usize,
    pub total: usize,
    pub last_page: usize,
    pub result: Vec<Value>,
}

/// Seed dataset: 51 launches plus a handful of records for the other
/// resources.
pub fn seed() -> HashMap<String, Vec<Value>> {
    let mut data: HashMap<String, Vec<Value>> = RESOURCES.iter().map(|r| (r.to_string(), Vec::new())).collect();

    let launches = (1..=51)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Launch {id}"),
                "slug": format!("launch-{id}"),
                "provider": {"id": 1 + id % 3},
                "modified": "2023-01-01T00:00:00Z",
            })
        })
        .collect();
    data.insert("launches".to_string(), launches);
    data.insert(
        "companies".to_string(),
        vec![
            json!({"id": 1, "name": "SpaceX", "country": {"code": "US"}, "inactive": false}),
            json!({"id": 2, "name": "Rocket Lab", "country": {"code": "NZ"}, "inactive": false}),
        ],
    );
    data.insert(
        "pads".to_string(),
        vec![json!({"id": 1, "name": "LC-39A", "location": {"state": "FL"}})],
    );
    data.insert("tags".to_string(), vec![json!({"id": 1, "text": "Crewed"})]);
    data.insert("vehicles".to_string(), vec![json!({"id": 1, "name": "Falcon 9"})]);
    data
}

pub fn new_db() -> Db {
    Arc::new(RwLock::new(seed()))
}

pub fn app() -> Router {
    app_with(new_db())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/json/{resource}", get(list_resource))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, new_db()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock launch API listening");
    }
    axum::serve(listener, app_with(db)).await
}

fn authorized(headers: &HeaderMap, query: &HashMap<String, String>) -> bool {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer == Some(MOCK_API_KEY) || query.get("key").map(String::as_str) == Some(MOCK_API_KEY)
}

fn parse_since(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
        })
}

/// Field equality, comparing numbers and strings by their text.
///
/// `<entity>_id` matches a nested `<entity>.id` and `country_code` matches
/// `country.code`, mirroring how the upstream API filters.
fn field_matches(record: &Map<String, Value>, key: &str, expected: &str) -> bool {
    let nested = match key {
        "country_code" => record.get("country").and_then(|c| c.get("code")),
        _ => key
            .strip_suffix("_id")
            .and_then(|entity| record.get(entity))
            .and_then(|entity| entity.get("id")),
    };
    match nested.or_else(|| record.get(key)) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == expected,
        Some(Value::Bool(b)) => (if *b { "1" } else { "0" }) == expected,
        _ => false,
    }
}

async fn list_resource(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Envelope>, (StatusCode, Json<Envelope>)> {
    let reject = |status: StatusCode, valid_auth: bool, error: &str| {
        (
            status,
            Json(Envelope {
                errors: vec![error.to_string()],
                valid_auth,
                count: 0,
                limit: PAGE_SIZE,
                total: 0,
                last_page: 1,
                result: Vec::new(),
            }),
        )
    };

    if !authorized(&headers, &query) {
        return Err(reject(StatusCode::UNAUTHORIZED, false, "Invalid API key"));
    }

    let data = db.read().await;
    let records = data
        .get(&resource)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, true, "Unknown resource"))?;

    let page = match query.get("page") {
        Some(p) => p
            .parse::<usize>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| reject(StatusCode::BAD_REQUEST, true, "Invalid page"))?,
        None => 1,
    };
    let since = match query.get("modified_since") {
        Some(s) => Some(parse_since(s).ok_or_else(|| reject(StatusCode::BAD_REQUEST, true, "Invalid modified_since"))?),
        None => None,
    };

    let matching: Vec<Value> = records
        .iter()
        .filter(|record| {
            let Some(fields) = record.as_object() else {
                return false;
            };
            let modified_ok = since.map_or(true, |since| {
                fields
                    .get("modified")
                    .and_then(Value::as_str)
                    .and_then(parse_since)
                    .is_some_and(|modified| modified >= since)
            });
            let filters_ok = query
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "page" | "key" | "modified_since"))
                .all(|(k, v)| field_matches(fields, k, v));
            modified_ok && filters_ok
        })
        .cloned()
        .collect();

    let total = matching.len();
    let last_page = total.div_ceil(PAGE_SIZE).max(1);
    let result: Vec<Value> = matching.into_iter().skip((page - 1) * PAGE_SIZE).take(PAGE_SIZE).collect();
    debug!(%resource, page, total, "serving page");

    Ok(Json(Envelope {
        errors: Vec::new(),
        valid_auth: true,
        count: result.len(),
        limit: PAGE_SIZE,
        total,
        last_page,
        result,
    }))
}
