use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::TenantStore;
use crate::handlers::{protected, public};
use crate::middleware::tenant_context_middleware;
use crate::services::DomainResolver;
use crate::tenancy::{DomainProbe, JwtClaimsReader, TokenClaimsReader};

/// Shared, read-only application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn TenantStore>,
    pub resolver: Arc<DomainResolver>,
    pub claims: Arc<dyn TokenClaimsReader>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn TenantStore>, probe: Arc<dyn DomainProbe>) -> Self {
        let claims = Arc::new(JwtClaimsReader::from_secret(config.security.jwt_secret.as_deref()));
        Self::with_claims(config, store, probe, claims)
    }

    pub fn with_claims(
        config: AppConfig,
        store: Arc<dyn TenantStore>,
        probe: Arc<dyn DomainProbe>,
        claims: Arc<dyn TokenClaimsReader>,
    ) -> Self {
        let resolver = DomainResolver::new(store.clone(), Arc::new(config.tenancy.clone()), probe);
        Self {
            config: Arc::new(config),
            store,
            resolver: Arc::new(resolver),
            claims,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/domain-tools/health", get(public::domain_tools_health))
        .route("/api/domain-tools/resolve", get(public::domain_tools_resolve))
        // Tenant scoped
        .merge(tenant_routes())
        .fallback(public::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), tenant_context_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn tenant_routes() -> Router<AppState> {
    use protected::domains;

    Router::new()
        .route("/api/tenant/context", get(protected::tenant_context_get))
        .route("/api/domains", get(domains::domain_list).post(domains::domain_create))
        .route(
            "/api/domains/:id",
            patch(domains::domain_update).delete(domains::domain_delete),
        )
        .route("/api/domains/:id/health", get(domains::domain_health))
        .route("/api/domains/:id/verification", post(domains::domain_verification_start))
        .route(
            "/api/domains/:id/verification/confirm",
            post(domains::domain_verification_confirm),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}
