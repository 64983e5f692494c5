// handlers/public/system.rs - GET / and GET /health handlers

use axum::{extract::State, http::Uri, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - Service information
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let tenancy = &state.config.tenancy;

    Json(json!({
        "success": true,
        "data": {
            "name": "CMS API (Rust)",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant CMS API with domain-based tenant resolution",
            "environment": state.config.environment,
            "rootDomain": tenancy.root_domain,
            "portalDomain": tenancy.portal_domain,
            "endpoints": {
                "health": "/health (public)",
                "tenant": "/api/tenant/context (tenant)",
                "domains": "/api/domains[/:id[/health|/verification[/confirm]]] (tenant)",
                "tools": "/api/domain-tools/health?domain=, /api/domain-tools/resolve?host= (public)",
            }
        }
    }))
}

/// GET /health - Liveness plus tenant store connectivity
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if let Err(e) = state.store.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }
    })))
}

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::{AppConfig, Environment};
    use crate::database::models::{NewTenantDomain, Tenant, TenantDomain, TenantDomainChanges};
    use crate::database::{DatabaseError, TenantStore};
    use crate::tenancy::HttpDomainProbe;

    /// Store whose backing database never answers
    struct DownStore;

    fn down() -> DatabaseError {
        DatabaseError::ConfigMissing("DATABASE_URL")
    }

    #[async_trait]
    impl TenantStore for DownStore {
        async fn find_tenant_by_id(&self, _id: i32, _active_only: bool) -> Result<Option<Tenant>, DatabaseError> {
            Err(down())
        }
        async fn find_tenant_by_slug(&self, _slug: &str) -> Result<Option<Tenant>, DatabaseError> {
            Err(down())
        }
        async fn find_tenant_domain_by_domain(&self, _domain: &str) -> Result<Option<TenantDomain>, DatabaseError> {
            Err(down())
        }
        async fn list_tenant_domains(&self, _tenant_id: i32) -> Result<Vec<TenantDomain>, DatabaseError> {
            Err(down())
        }
        async fn create_tenant_domain(&self, _input: NewTenantDomain) -> Result<TenantDomain, DatabaseError> {
            Err(down())
        }
        async fn update_tenant_domain(
            &self,
            _id: i32,
            _changes: TenantDomainChanges,
        ) -> Result<TenantDomain, DatabaseError> {
            Err(down())
        }
        async fn delete_tenant_domain(&self, _id: i32) -> Result<(), DatabaseError> {
            Err(down())
        }
        async fn ping(&self) -> Result<(), DatabaseError> {
            Err(down())
        }
    }

    #[tokio::test]
    async fn unreachable_store_reports_service_unavailable() {
        let probe = Arc::new(HttpDomainProbe::new(Duration::from_secs(1)).unwrap());
        let state = AppState::new(AppConfig::defaults(Environment::Development), Arc::new(DownStore), probe);

        let err = health(State(state)).await.unwrap_err();

        assert_eq!(err.status_code(), 503);
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
        assert_eq!(err.message(), "Database unavailable");
    }
}
