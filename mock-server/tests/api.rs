use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, new_db, Envelope, MOCK_API_KEY};
use serde_json::json;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {MOCK_API_KEY}"))
        .body(String::new())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_key_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/json/launches").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let envelope: Envelope = body_json(resp).await;
    assert!(!envelope.valid_auth);
    assert!(envelope.result.is_empty());
}

#[tokio::test]
async fn query_key_is_accepted() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("/json/tags?key={MOCK_API_KEY}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Envelope = body_json(resp).await;
    assert!(envelope.valid_auth);
    assert_eq!(envelope.result.len(), 1);
}

// --- routing ---

#[tokio::test]
async fn unknown_resource_returns_404() {
    let resp = app().oneshot(authed("/json/satellites")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- pagination ---

#[tokio::test]
async fn launches_paginate_in_pages_of_25() {
    for (page, expected) in [(1, 25), (2, 25), (3, 1), (4, 0)] {
        let resp = app().oneshot(authed(&format!("/json/launches?page={page}"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let envelope: Envelope = body_json(resp).await;
        assert_eq!(envelope.last_page, 3);
        assert_eq!(envelope.total, 51);
        assert_eq!(envelope.result.len(), expected, "page {page}");
    }
}

#[tokio::test]
async fn bad_page_returns_400() {
    let resp = app().oneshot(authed("/json/launches?page=0")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- filtering ---

#[tokio::test]
async fn filters_by_id_and_nested_ids() {
    let resp = app().oneshot(authed("/json/launches?id=7")).await.unwrap();
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(envelope.result.len(), 1);
    assert_eq!(envelope.result[0]["name"], "Launch 7");

    let resp = app().oneshot(authed("/json/companies?country_code=NZ")).await.unwrap();
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(envelope.result.len(), 1);
    assert_eq!(envelope.result[0]["name"], "Rocket Lab");
}

#[tokio::test]
async fn modified_since_sees_only_recent_changes() {
    let db = new_db();
    {
        let mut data = db.write().await;
        let launches = data.get_mut("launches").unwrap();
        launches[6]["modified"] = json!("2024-06-01T00:00:00Z");
        launches.push(json!({"id": 99, "name": "Launch 99", "modified": "2024-06-02T00:00:00Z"}));
    }

    let resp = app_with(db)
        .oneshot(authed("/json/launches?modified_since=2024-01-01T00:00:00.000Z"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Envelope = body_json(resp).await;
    let ids: Vec<i64> = envelope.result.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![7, 99]);
}
