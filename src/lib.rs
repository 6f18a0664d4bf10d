pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use axum::{routing::get, Json, Router};
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::models::report::ReportSettings;
use crate::services::report_service::ReportService;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::visibility::visible_scope,
        routes::report::client_jobs,
        routes::report::daily_lineup,
        routes::report::export_client_jobs,
    ),
    tags((name = "reports", description = "Recruitment pipeline reports"))
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(pool: PgPool, settings: ReportSettings) -> Self {
        let report_service = ReportService::new(pool.clone(), settings);
        Self {
            pool,
            report_service,
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Full application router. Everything under `/api` requires a bearer token.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/visibility/scope",
            get(routes::visibility::visible_scope),
        )
        .route("/api/reports/client-jobs", get(routes::report::client_jobs))
        .route(
            "/api/reports/client-jobs/export",
            get(routes::report::export_client_jobs),
        )
        .route(
            "/api/reports/daily-lineup",
            get(routes::report::daily_lineup),
        )
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(protected)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
