// handlers/protected/domains/delete.rs - DELETE /api/domains/:id handler

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, TenantScope};

pub async fn delete(State(state): State<AppState>, scope: TenantScope, Path(id): Path<i32>) -> ApiResult<()> {
    state.resolver.remove_domain(scope.tenant_id(), id).await?;
    Ok(ApiResponse::no_content())
}
