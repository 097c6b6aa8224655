// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use std::time::Duration;

use biosimilar_news_monitor::api::{self, AppState, NEWS_CACHE_CONTROL};
use biosimilar_news_monitor::ingest::providers::feed::FeedSource;
use biosimilar_news_monitor::ingest::NewsSource;
use biosimilar_news_monitor::NewsPipeline;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    let sources: Vec<Box<dyn NewsSource>> = vec![
        Box::new(FeedSource::from_fixture(
            "EMA",
            include_str!("fixtures/ema_atom.xml"),
        )),
        Box::new(FeedSource::from_fixture("Broken", "not a feed")),
    ];
    let pipeline = NewsPipeline::new(sources, Duration::from_secs(5));
    api::router(AppState::new(pipeline))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<String>, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let cache = resp
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, cache, v)
}

#[tokio::test]
async fn health_returns_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn news_clamps_days_and_sets_cache_headers() {
    let (status, cache, v) = get_json(test_router(), "/api/news?days=400").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some(NEWS_CACHE_CONTROL));
    assert_eq!(v["lookbackDays"], 365);
    assert!(v["generatedAt"].is_string());
    assert!(v["items"].is_array());

    let errors = v["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["company"], "Broken");
}

#[tokio::test]
async fn news_without_usable_days_uses_default() {
    let (_, _, v) = get_json(test_router(), "/api/news").await;
    assert_eq!(v["lookbackDays"], 60);

    let (_, _, v) = get_json(test_router(), "/api/news?days=soon").await;
    assert_eq!(v["lookbackDays"], 60);

    let (_, _, v) = get_json(test_router(), "/api/news?days=1").await;
    assert_eq!(v["lookbackDays"], 7);
}

#[tokio::test]
async fn categories_lists_the_taxonomy_with_follow_ups() {
    let (status, _, v) = get_json(test_router(), "/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    let cats = v.as_array().expect("array");
    assert_eq!(cats.len(), 9);
    assert_eq!(cats[0]["id"], "regulatory-approvals");
    assert_eq!(cats[0]["priorityClass"], "regulatory-approval");
    assert!(cats
        .iter()
        .all(|c| c["followUpActions"].as_array().is_some_and(|a| !a.is_empty())));
}

#[tokio::test]
async fn single_category_by_id() {
    let (status, _, v) = get_json(test_router(), "/api/categories/legal-ip").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["name"], "Legal & IP");
    assert_eq!(v["priorityClass"], "significant-event");

    let req = Request::builder()
        .uri("/api/categories/weather")
        .body(Body::empty())
        .unwrap();
    let resp = test_router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn news_items_carry_a_priority_label() {
    let (_, _, v) = get_json(test_router(), "/api/news?days=365").await;
    for item in v["items"].as_array().expect("items array") {
        let label = item["priorityLabel"].as_str().expect("label");
        assert!(label.ends_with(" Priority"), "{label}");
    }
}
