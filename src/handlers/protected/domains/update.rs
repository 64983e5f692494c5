// handlers/protected/domains/update.rs - PATCH /api/domains/:id handler

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;

use crate::app::AppState;
use crate::database::models::TenantDomain;
use crate::middleware::{ApiResponse, ApiResult, TenantScope};
use crate::services::DomainSettings;

use super::json_body;

/// PATCH /api/domains/:id - Change `isPrimary`, `isActive` or `sslStatus`
pub async fn patch(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i32>,
    payload: Result<Json<DomainSettings>, JsonRejection>,
) -> ApiResult<TenantDomain> {
    let settings = json_body(payload)?;
    let updated = state.resolver.update_domain(scope.tenant_id(), id, settings).await?;
    Ok(ApiResponse::success(updated))
}
