//! REST API handlers for products, recommendations and operational endpoints.

use crate::session::SessionId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use recommend_catalog::CatalogStore;
use recommend_core::config::RecommendationConfig;
use recommend_core::{Product, ProductId, RecommendError};
use recommend_personalization::{RecommendationEngine, VisitRecorder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub recorder: Arc<VisitRecorder>,
    pub engine: Arc<RecommendationEngine>,
    pub recommendations: RecommendationConfig,
    pub node_id: String,
    pub start_time: Instant,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Maximum number of products to return (default 10).
    pub limit: Option<usize>,
}

fn store_failure(e: RecommendError, context: &'static str) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "{context}");
    metrics::counter!("api.errors").increment(1);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "store_unavailable".to_string(),
            message: context.to_string(),
        }),
    )
}

/// GET /product — All products.
#[utoipa::path(
    get,
    path = "/product",
    tag = "Products",
    responses(
        (status = 200, description = "All catalog products", body = [Product]),
        (status = 500, description = "Catalog unavailable", body = ErrorResponse),
    )
)]
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    state
        .catalog
        .find_all()
        .await
        .map(Json)
        .map_err(|e| store_failure(e, "Failed to list products"))
}

/// GET /product/{product_id} — Product detail; counts as a view for the session.
#[utoipa::path(
    get,
    path = "/product/{product_id}",
    tag = "Products",
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "No such product", body = ErrorResponse),
        (status = 500, description = "Catalog unavailable", body = ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Path(product_id): Path<ProductId>,
) -> ApiResult<Product> {
    let product = state
        .catalog
        .find_by_id(product_id)
        .await
        .map_err(|e| store_failure(e, "Failed to load product"))?;

    match product {
        Some(product) => {
            state.recorder.record_view(session.as_str(), &product).await;
            Ok(Json(product))
        }
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "product_not_found".to_string(),
                message: format!("No product with id {product_id}"),
            }),
        )),
    }
}

/// GET /product/{product_id}/recommendations — Same-type products, most viewed first.
#[utoipa::path(
    get,
    path = "/product/{product_id}/recommendations",
    tag = "Recommendations",
    params(("product_id" = i64, Path, description = "Product id"), LimitParams),
    responses(
        (status = 200, description = "Recommended products; empty for an unknown product", body = [Product]),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn product_recommendations(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<Product>> {
    let limit = state.recommendations.resolve_limit(params.limit);
    state
        .engine
        .recommend_for(product_id, limit)
        .await
        .map(Json)
        .map_err(|e| store_failure(e, "Failed to compute product recommendations"))
}

/// GET /product/recommendations — Recommendations from the session's viewing history.
#[utoipa::path(
    get,
    path = "/product/recommendations",
    tag = "Recommendations",
    params(LimitParams),
    responses(
        (status = 200, description = "Recommended products; empty for a session without views", body = [Product]),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn session_recommendations(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Query(params): Query<LimitParams>,
) -> ApiResult<Vec<Product>> {
    let limit = state.recommendations.resolve_limit(params.limit);
    state
        .engine
        .recommend_for_session(session.as_str(), limit)
        .await
        .map(Json)
        .map_err(|e| store_failure(e, "Failed to compute session recommendations"))
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe; ready once the catalog answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses(
        (status = 200, description = "Ready to serve traffic"),
        (status = 503, description = "Catalog not reachable"),
    )
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog.find_by_id(0).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
}
