// handlers/protected/domains/list.rs - GET /api/domains handler

use axum::extract::State;

use crate::app::AppState;
use crate::database::models::TenantDomain;
use crate::middleware::{ApiResponse, ApiResult, TenantScope};

/// GET /api/domains - All domains bound to the tenant, primary first
pub async fn get(State(state): State<AppState>, scope: TenantScope) -> ApiResult<Vec<TenantDomain>> {
    let domains = state.resolver.get_tenant_domains(scope.tenant_id()).await?;
    Ok(ApiResponse::success(domains))
}
