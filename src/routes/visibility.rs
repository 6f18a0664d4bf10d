use axum::{extract::State, Extension, Json};

use crate::dto::report_dto::VisibleIdsResponse;
use crate::middleware::auth::Claims;
use crate::{error::Result, AppState};

/// User ids and assigned job ids the caller may see.
#[utoipa::path(
    get,
    path = "/api/visibility/scope",
    responses(
        (status = 200, description = "Visibility scope of the caller", body = Json<serde_json::Value>),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
)]
#[axum::debug_handler]
pub async fn visible_scope(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<VisibleIdsResponse>> {
    let actor = claims.actor_id()?;
    let scope = state
        .report_service
        .visible_ids(actor, claims.role.as_deref())
        .await?;
    Ok(Json(scope))
}
