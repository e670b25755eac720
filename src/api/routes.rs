//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::admin_routes;
use super::middleware::{admin_required, stamp_request_url};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::ADMIN_ROUTE_PREFIX;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Super administrator routes
        .nest(
            ADMIN_ROUTE_PREFIX,
            admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_required,
            )),
        )
        // Global middleware
        .layer(middleware::from_fn(stamp_request_url))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Lin CMS admin service"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, database) = match state.database.ping().await {
        Ok(_) => (
            StatusCode::OK,
            ServiceStatus {
                status: "healthy",
                error: None,
            },
        ),
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ServiceStatus {
                    status: "unhealthy",
                    error: Some(e.to_string()),
                },
            )
        }
    };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK {
            "healthy"
        } else {
            "degraded"
        },
        database,
    };

    (status_code, Json(response))
}
