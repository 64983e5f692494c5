// handlers/protected/tenant.rs - GET /api/tenant/context handler

use crate::middleware::{ApiResponse, ApiResult, TenantScope};
use crate::tenancy::RequestTenantContext;

/// GET /api/tenant/context - The tenant attached to this request and how it was found
pub async fn context_get(TenantScope(context): TenantScope) -> ApiResult<RequestTenantContext> {
    Ok(ApiResponse::success(context))
}
