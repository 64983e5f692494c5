use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};

use crate::app::AppState;
use crate::config::TenancyConfig;
use crate::error::ApiError;
use crate::services::DomainResolver;
use crate::tenancy::{normalize_host, DomainResolutionInfo, RequestTenantContext, ResolvedBy, TenancyError};

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_DOMAIN_HEADER: &str = "x-tenant-domain";

const GENERIC_RESOLUTION_MESSAGE: &str = "Unable to determine tenant for this request";

/// Attaches a [`RequestTenantContext`] to tenant-scoped requests.
///
/// Precedence: `X-Tenant-Id` header, then the portal domain with a bearer
/// token, then domain resolution of `X-Tenant-Domain` or `Host`.
pub async fn tenant_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    let tenancy = &state.config.tenancy;

    if is_bypass_path(&path, tenancy) || !is_tenant_api_path(&path, tenancy) {
        return Ok(next.run(request).await);
    }

    match resolve_request_tenant(&state, request.headers(), &path).await {
        Ok(Some(context)) => {
            debug!(
                "Tenant {} attached to {} ({})",
                context.tenant_id,
                path,
                context.resolved_by().map(|r| r.as_str()).unwrap_or("header")
            );
            request.extensions_mut().insert(context);
        }
        Ok(None) => debug!("Portal public path {} served without tenant", path),
        Err(e) => return Err(reject(e, state.config.security.expose_error_details)),
    }

    Ok(next.run(request).await)
}

async fn resolve_request_tenant(
    state: &AppState,
    headers: &HeaderMap,
    path: &str,
) -> Result<Option<RequestTenantContext>, TenancyError> {
    let resolver = &state.resolver;

    if let Some(raw) = headers.get(TENANT_ID_HEADER) {
        let tenant_id = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i32>().ok())
            .ok_or_else(|| TenancyError::bad_request("X-Tenant-Id header must be an integer"))?;

        let tenant = resolver.load_active_tenant(tenant_id).await?;
        return Ok(Some(RequestTenantContext {
            tenant_id,
            tenant,
            domain_resolution: None,
        }));
    }

    let raw_host = header_str(headers, TENANT_DOMAIN_HEADER)
        .or_else(|| header_str(headers, header::HOST.as_str()))
        .ok_or_else(|| TenancyError::bad_request("Missing X-Tenant-Domain or Host header"))?;
    let host = normalize_host(raw_host);

    if host == resolver.config().portal_domain {
        if is_portal_public_path(path, resolver.config()) {
            return Ok(None);
        }

        let token = bearer_token(headers)
            .ok_or_else(|| TenancyError::bad_request("Portal requests require a Bearer token"))?;
        let tenant_id = state
            .claims
            .tenant_id(token)
            .map_err(|e| TenancyError::bad_request(e.to_string()))?
            .ok_or_else(|| TenancyError::bad_request("Bearer token carries no tenantId claim"))?;

        let tenant = resolver.load_active_tenant(tenant_id).await?;
        return Ok(Some(RequestTenantContext {
            tenant_id,
            tenant,
            domain_resolution: Some(DomainResolutionInfo {
                original_domain: raw_host.to_string(),
                resolved_by: ResolvedBy::PortalJwt,
                tenant_domain: None,
            }),
        }));
    }

    let result = resolver.resolve_tenant_from_domain(&host).await?;
    if let Err(e) = DomainResolver::validate_tenant_access(&result.tenant) {
        warn!("Rejected tenant {} for host '{}': {}", result.tenant.id, host, e);
        return Err(e);
    }

    Ok(Some(RequestTenantContext {
        tenant_id: result.tenant.id,
        tenant: result.tenant,
        domain_resolution: Some(DomainResolutionInfo {
            original_domain: raw_host.to_string(),
            resolved_by: result.resolved_by,
            tenant_domain: result.tenant_domain,
        }),
    }))
}

/// Resolution failures become 400; the cause is hidden unless details are exposed.
fn reject(err: TenancyError, expose_details: bool) -> ApiError {
    if let TenancyError::Store(db) = err {
        error!("Tenant store failure during resolution: {}", db);
        return ApiError::internal_server_error("An error occurred while processing your request");
    }

    warn!("Tenant resolution failed: {}", err);
    if expose_details {
        ApiError::bad_request(err.to_string())
    } else {
        ApiError::bad_request(GENERIC_RESOLUTION_MESSAGE)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, header::AUTHORIZATION.as_str())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// `/api/pages` and `/pages` both count as the `/pages` prefix.
fn strip_api_prefix(path: &str) -> &str {
    match path.strip_prefix("/api") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('/'))
}

pub fn is_bypass_path(path: &str, config: &TenancyConfig) -> bool {
    config.bypass_prefixes.iter().any(|p| has_prefix(path, p))
}

pub fn is_tenant_api_path(path: &str, config: &TenancyConfig) -> bool {
    let scoped = strip_api_prefix(path);
    config.api_prefixes.iter().any(|p| has_prefix(scoped, p))
        || config.docs_markers.iter().any(|m| path.contains(m.as_str()))
}

fn is_portal_public_path(path: &str, config: &TenancyConfig) -> bool {
    let scoped = strip_api_prefix(path);
    config.portal_public_paths.iter().any(|p| has_prefix(scoped, p))
}

/// Tenant context attached by [`tenant_context_middleware`]
#[derive(Debug, Clone)]
pub struct TenantScope(pub RequestTenantContext);

impl TenantScope {
    pub fn tenant_id(&self) -> i32 {
        self.0.tenant_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestTenantContext>()
            .cloned()
            .map(TenantScope)
            .ok_or_else(|| ApiError::bad_request("No tenant context for this request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TenancyConfig {
        TenancyConfig::for_root("softellio.com")
    }

    #[test]
    fn api_paths_match_with_or_without_api_prefix() {
        let config = config();
        assert!(is_tenant_api_path("/api/domains", &config));
        assert!(is_tenant_api_path("/api/domains/4/health", &config));
        assert!(is_tenant_api_path("/pages/admin", &config));
        assert!(is_tenant_api_path("/api/tenant/context", &config));
        assert!(is_tenant_api_path("/static/api-docs/index.html", &config));
        assert!(!is_tenant_api_path("/assets/app.js", &config));
        assert!(!is_tenant_api_path("/pagesx", &config));
        assert!(!is_tenant_api_path("/api/domain-tools/resolve", &config));
    }

    #[test]
    fn bypass_covers_admin_health_and_metrics() {
        let config = config();
        assert!(is_bypass_path("/health", &config));
        assert!(is_bypass_path("/api/super-admin/tenants", &config));
        assert!(is_bypass_path("/metrics", &config));
        assert!(!is_bypass_path("/healthz", &config));
        assert!(!is_bypass_path("/api/domains", &config));
    }

    #[test]
    fn portal_public_paths_allow_login() {
        let config = config();
        assert!(is_portal_public_path("/auth/login", &config));
        assert!(is_portal_public_path("/api/auth/refresh", &config));
        assert!(!is_portal_public_path("/pages/admin", &config));
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn rejection_hides_details_unless_exposed() {
        let err = || TenancyError::DomainResolution { host: "secret.test".into() };
        assert!(reject(err(), true).message().contains("secret.test"));
        assert_eq!(reject(err(), false).message(), GENERIC_RESOLUTION_MESSAGE);
        assert_eq!(reject(TenancyError::TenantSuspended { tenant_id: 9 }, false).status_code(), 400);
    }
}
