//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Recommendation API",
        version = "0.1.0",
        description = "Product catalog with counter-driven recommendations.\n\nViewing a product updates global and per-session hit counters, which rank same-type and personal recommendations.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Products", description = "Catalog listing and product detail"),
        (name = "Recommendations", description = "Per-product and per-session recommendations"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Products
        crate::rest::list_products,
        crate::rest::get_product,
        // Recommendations
        crate::rest::product_recommendations,
        crate::rest::session_recommendations,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        recommend_core::Product,
        recommend_core::ProductType,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;
