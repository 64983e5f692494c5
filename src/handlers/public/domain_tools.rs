// handlers/public/domain_tools.rs - Operator tooling for domains
//
// GET /api/domain-tools/health?domain=  probe any domain by name
// GET /api/domain-tools/resolve?host=   run tenant resolution for a host
//
// Both answer 404 unless `security.enable_domain_tools` is set (off in production).

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DomainResolver;
use crate::tenancy::{normalize_host, DomainHealth};

#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub host: Option<String>,
}

fn ensure_enabled(state: &AppState, path: &str) -> Result<(), ApiError> {
    if state.config.security.enable_domain_tools {
        Ok(())
    } else {
        Err(ApiError::not_found(format!("No route for {}", path)))
    }
}

/// GET /api/domain-tools/health?domain= - Reachability of a domain by name
pub async fn health(State(state): State<AppState>, Query(query): Query<HealthQuery>) -> ApiResult<DomainHealth> {
    ensure_enabled(&state, "/api/domain-tools/health")?;
    let domain = query
        .domain
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'domain' is required"))?;

    Ok(ApiResponse::success(state.resolver.check_domain_health(&domain).await))
}

/// GET /api/domain-tools/resolve?host= - Debug view of tenant resolution
///
/// Answers 200 either way; a failed resolution is `{success: false, error}`.
/// The tenant's other bindings and any verification token are never included.
pub async fn resolve(State(state): State<AppState>, Query(query): Query<ResolveQuery>) -> Result<Json<Value>, ApiError> {
    ensure_enabled(&state, "/api/domain-tools/resolve")?;
    let host = query
        .host
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'host' is required"))?;
    let expose_details = state.config.security.expose_error_details;

    let result = match state.resolver.resolve_tenant_from_domain(&host).await {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!("Debug resolution of '{}' failed: {}", host, e);
            let error = if expose_details {
                e.to_string()
            } else {
                "Unable to resolve tenant for this host".to_string()
            };
            return Ok(Json(json!({ "success": false, "error": error })));
        }
    };

    let access_error = DomainResolver::validate_tenant_access(&result.tenant)
        .err()
        .map(|e| e.to_string());

    let mut tenant = result.tenant;
    tenant.domains.clear();
    let tenant_domain = result.tenant_domain.map(|mut binding| {
        binding.verification_token = None;
        binding
    });

    Ok(Json(json!({
        "success": true,
        "data": {
            "host": host,
            "normalizedHost": normalize_host(&host),
            "resolvedBy": result.resolved_by,
            "tenant": tenant,
            "tenantDomain": tenant_domain,
            "accessible": access_error.is_none(),
            "accessError": access_error,
        }
    })))
}
