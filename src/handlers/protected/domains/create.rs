// handlers/protected/domains/create.rs - POST /api/domains handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{DomainType, TenantDomain};
use crate::middleware::{ApiResponse, ApiResult, TenantScope};

use super::json_body;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainRequest {
    pub domain: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(rename = "type", default)]
    pub domain_type: DomainType,
}

/**
 * POST /api/domains - Bind a domain to the tenant
 *
 * ```json
 * { "domain": "www.acme.com", "isPrimary": false, "type": "custom" }
 * ```
 *
 * 201 with the created binding, 400 for malformed or reserved domains,
 * 409 when the domain is already bound.
 */
pub async fn post(
    State(state): State<AppState>,
    scope: TenantScope,
    payload: Result<Json<CreateDomainRequest>, JsonRejection>,
) -> ApiResult<TenantDomain> {
    let request = json_body(payload)?;

    let created = state
        .resolver
        .add_domain(scope.tenant_id(), &request.domain, request.is_primary, request.domain_type)
        .await?;

    Ok(ApiResponse::created(created))
}
