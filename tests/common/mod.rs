#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use cms_api_rust::config::{AppConfig, Environment, TenancyConfig};
use cms_api_rust::database::models::{Tenant, TenantStatus};
use cms_api_rust::database::MemoryTenantStore;
use cms_api_rust::tenancy::{DomainHealth, DomainProbe};
use cms_api_rust::{build_router, AppState};

pub const ROOT: &str = "softellio.com";
pub const PORTAL: &str = "portal.softellio.com";

/// Probe that never touches the network
#[derive(Default)]
pub struct StubProbe {
    published_token: Mutex<Option<String>>,
}

impl StubProbe {
    pub fn publish(&self, token: &str) {
        *self.published_token.lock().unwrap() = Some(token.to_string());
    }
}

#[async_trait]
impl DomainProbe for StubProbe {
    async fn check(&self, domain: &str) -> DomainHealth {
        DomainHealth {
            domain: domain.to_string(),
            is_reachable: true,
            response_time: 5,
            status_code: Some(200),
            error: None,
            checked_at: Utc::now(),
        }
    }

    async fn fetch_verification_token(&self, _domain: &str) -> Result<Option<String>, String> {
        Ok(self.published_token.lock().unwrap().clone())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryTenantStore>,
    pub probe: Arc<StubProbe>,
}

/// Defaults for `environment`, re-rooted on `softellio.com`
pub fn test_config(environment: Environment) -> AppConfig {
    let mut config = AppConfig::defaults(environment);
    let mut tenancy = TenancyConfig::for_root(ROOT);
    tenancy.require_verified_custom_domains = config.tenancy.require_verified_custom_domains;
    tenancy.health_check_timeout_ms = 1_000;
    config.tenancy = tenancy;
    config.database.url = None;
    config.security.jwt_secret = None;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(Environment::Development)).await
}

/// Router over a memory store holding demo(1), acme(7), beta(8) and suspended frozen(9)
pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let store = Arc::new(MemoryTenantStore::new());
    store.insert_tenant(Tenant::new(1, "Demo", "demo")).await;
    store.insert_tenant(Tenant::new(7, "Acme", "acme")).await;
    store.insert_tenant(Tenant::new(8, "Beta", "beta")).await;
    store
        .insert_tenant(Tenant::new(9, "Frozen", "frozen").with_status(TenantStatus::Suspended))
        .await;

    let probe = Arc::new(StubProbe::default());
    let state = AppState::new(config, store.clone(), probe.clone());

    TestApp {
        router: build_router(state),
        store,
        probe,
    }
}

pub fn request(method: Method, path: &str, headers: &[(&str, &str)], body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(path: &str, headers: &[(&str, &str)]) -> Request<Body> {
    request(Method::GET, path, headers, None)
}

impl TestApp {
    /// Run one request in-process; an empty body comes back as `Value::Null`
    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("failed to read body")?;

        if bytes.is_empty() {
            return Ok((status, Value::Null));
        }
        let body = serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
        Ok((status, body))
    }
}

/// Unsigned-for-our-purposes token; the server only inspects the payload
pub fn token(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"upstream-auth-secret")).unwrap()
}
