//! HTTP-level tests driving the router in-process.

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use recommend_api::{router, AppState};
use recommend_cache::LocalCounterStore;
use recommend_catalog::SqliteCatalog;
use recommend_core::config::RecommendationConfig;
use recommend_core::ProductType;
use recommend_personalization::{RecommendationEngine, VisitRecorder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

fn app() -> Router {
    let catalog = Arc::new(SqliteCatalog::open_in_memory().unwrap());
    catalog.insert_product("Laptop", ProductType::Electronics).unwrap();
    catalog.insert_product("Phone", ProductType::Electronics).unwrap();
    catalog.insert_product("Puzzle", ProductType::Toy).unwrap();
    catalog.insert_product("Tablet", ProductType::Electronics).unwrap();

    let counters = Arc::new(LocalCounterStore::new(1800));
    router(AppState {
        catalog: catalog.clone(),
        recorder: Arc::new(VisitRecorder::new(counters.clone(), false)),
        engine: Arc::new(RecommendationEngine::new(catalog, counters)),
        recommendations: RecommendationConfig::default(),
        node_id: "test-node".to_string(),
        start_time: Instant::now(),
    })
}

async fn get(app: &Router, uri: &str, session: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(session) = session {
        request = request.header(COOKIE, format!("SESSION={session}"));
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_products() {
    let app = app();
    let response = get(&app, "/product", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
    assert_eq!(body[2]["type"], "TOY");
    assert_eq!(body[2]["name"], "Puzzle");
}

#[tokio::test]
async fn test_new_session_gets_cookie() {
    let app = app();
    let response = get(&app, "/product/1", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("SESSION="));
    assert!(cookie.contains("HttpOnly"));

    // An existing session is not re-issued.
    let response = get(&app, "/product/1", Some("known-session")).await;
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_unknown_product() {
    let app = app();
    let response = get(&app, "/product/99", Some("s1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"], "product_not_found");

    let response = get(&app, "/product/99/recommendations", Some("s1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(ids(&json(response).await).is_empty());
}

#[tokio::test]
async fn test_views_drive_product_recommendations() {
    let app = app();
    for _ in 0..3 {
        get(&app, "/product/4", Some("s1")).await;
    }
    get(&app, "/product/2", Some("s2")).await;

    let response = get(&app, "/product/1/recommendations", None).await;
    assert_eq!(ids(&json(response).await), vec![4, 2]);

    let response = get(&app, "/product/1/recommendations?limit=1", None).await;
    assert_eq!(ids(&json(response).await), vec![4]);
}

#[tokio::test]
async fn test_session_recommendations() {
    let app = app();
    let response = get(&app, "/product/recommendations", Some("fresh")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(ids(&json(response).await).is_empty());

    get(&app, "/product/3", Some("viewer")).await;

    let response = get(&app, "/product/recommendations?limit=2", Some("viewer")).await;
    let body = json(response).await;
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["type"], "TOY");
    assert_eq!(products[1]["type"], "ELECTRONICS");
}

#[tokio::test]
async fn test_probes() {
    let app = app();
    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["node_id"], "test-node");

    assert_eq!(get(&app, "/ready", None).await.status(), StatusCode::OK);
    assert_eq!(get(&app, "/live", None).await.status(), StatusCode::OK);
}
