use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::report_dto::{ClientJobReportResponse, DailyLineupResponse, ReportQuery};
use crate::middleware::auth::Claims;
use crate::services::export_service::ExportService;
use crate::utils::time::now;
use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/reports/client-jobs",
    params(ReportQuery),
    responses(
        (status = 200, description = "Client/job report page", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
)]
#[axum::debug_handler]
pub async fn client_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ClientJobReportResponse>> {
    let actor = claims.actor_id()?;
    let filters = query.into_filters(state.report_service.settings())?;
    let report = state
        .report_service
        .client_jobs(actor, claims.role.as_deref(), &filters)
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/reports/daily-lineup",
    params(ReportQuery),
    responses(
        (status = 200, description = "Daily lineup report page", body = Json<serde_json::Value>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
)]
#[axum::debug_handler]
pub async fn daily_lineup(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<DailyLineupResponse>> {
    let actor = claims.actor_id()?;
    let filters = query.into_filters(state.report_service.settings())?;
    let report = state
        .report_service
        .daily_lineup(actor, claims.role.as_deref(), &filters)
        .await?;
    Ok(Json(report))
}

/// Export every filtered client/job row as XLSX. Pagination parameters are ignored.
#[utoipa::path(
    get,
    path = "/api/reports/client-jobs/export",
    params(ReportQuery),
    responses(
        (status = 200, description = "XLSX workbook"),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
)]
#[axum::debug_handler]
pub async fn export_client_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse> {
    let actor = claims.actor_id()?;
    let mut filters = query.into_filters(state.report_service.settings())?;
    filters.page = 1;
    filters.limit = u32::MAX;

    let report = state
        .report_service
        .client_jobs(actor, claims.role.as_deref(), &filters)
        .await?;

    let generated_at = now();
    let buffer = ExportService::generate_client_jobs_xlsx(&report.rows, &report.totals, generated_at)?;
    let disposition = format!(
        "attachment; filename=\"client_jobs_{}.xlsx\"",
        generated_at.format("%Y%m%d")
    );

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
