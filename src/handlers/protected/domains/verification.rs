// handlers/protected/domains/verification.rs - Domain ownership verification
//
// POST /api/domains/:id/verification          issue token, status -> pending
// POST /api/domains/:id/verification/confirm  fetch token from the domain, status -> verified

use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::TenantDomain;
use crate::middleware::{ApiResponse, ApiResult, TenantScope};
use crate::tenancy::VerificationChallenge;

pub async fn start(
    State(state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i32>,
) -> ApiResult<VerificationChallenge> {
    let challenge = state.resolver.initiate_verification(scope.tenant_id(), id).await?;
    Ok(ApiResponse::success(challenge))
}

pub async fn confirm(State(state): State<AppState>, scope: TenantScope, Path(id): Path<i32>) -> ApiResult<TenantDomain> {
    let verified = state.resolver.confirm_verification(scope.tenant_id(), id).await?;
    Ok(ApiResponse::success(verified))
}
