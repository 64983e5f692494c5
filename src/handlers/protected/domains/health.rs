// handlers/protected/domains/health.rs - GET /api/domains/:id/health handler

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, TenantScope};
use crate::tenancy::DomainHealth;

/// GET /api/domains/:id/health - Probe one of the tenant's domains
///
/// An unreachable domain is still a 200; see `isReachable` and `error`.
pub async fn get(State(state): State<AppState>, scope: TenantScope, Path(id): Path<i32>) -> ApiResult<DomainHealth> {
    let health = state.resolver.check_domain_health_by_id(scope.tenant_id(), id).await?;
    Ok(ApiResponse::success(health))
}
