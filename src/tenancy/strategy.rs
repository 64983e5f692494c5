//! Ordered tenant resolution strategies.
//!
//! Each strategy looks at an already normalized host and either claims it or
//! passes. [`STRATEGIES`] fixes the precedence: explicit custom ownership,
//! then the `<slug>.<root>` convention, then the platform default, then the
//! fallback tenant. The first strategy returning a match wins.

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::warn;

use crate::config::TenancyConfig;
use crate::database::models::{DomainType, Tenant, TenantDomain};
use crate::database::TenantStore;

use super::error::TenancyError;
use super::host::{is_root_host, subdomain_label};
use super::types::ResolvedBy;

/// A strategy's claim on a host, before the tenant's access is validated.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub tenant: Tenant,
    pub tenant_domain: Option<TenantDomain>,
    pub resolved_by: ResolvedBy,
}

pub type StrategyFn = for<'a> fn(
    &'a str,
    &'a TenancyConfig,
    &'a dyn TenantStore,
) -> BoxFuture<'a, Result<Option<Resolution>, TenancyError>>;

pub const STRATEGIES: [(ResolvedBy, StrategyFn); 4] = [
    (ResolvedBy::CustomDomain, custom_domain),
    (ResolvedBy::Subdomain, subdomain),
    (ResolvedBy::Default, default_tenant),
    (ResolvedBy::Fallback, fallback_tenant),
];

/// Registered, active custom domain bound to an existing tenant.
pub fn custom_domain<'a>(
    host: &'a str,
    config: &'a TenancyConfig,
    store: &'a dyn TenantStore,
) -> BoxFuture<'a, Result<Option<Resolution>, TenancyError>> {
    async move {
        let Some(binding) = store.find_tenant_domain_by_domain(host).await? else {
            return Ok(None);
        };

        if binding.domain_type != DomainType::Custom || !binding.is_active {
            return Ok(None);
        }
        if config.require_verified_custom_domains && !binding.is_verified() {
            return Ok(None);
        }

        match store.find_tenant_by_id(binding.tenant_id, false).await? {
            Some(tenant) => Ok(Some(Resolution {
                tenant,
                tenant_domain: Some(binding),
                resolved_by: ResolvedBy::CustomDomain,
            })),
            None => {
                warn!("Domain '{}' is bound to missing tenant {}", host, binding.tenant_id);
                Ok(None)
            }
        }
    }
    .boxed()
}

/// `<slug>.<root>` for an active tenant with that slug.
pub fn subdomain<'a>(
    host: &'a str,
    config: &'a TenancyConfig,
    store: &'a dyn TenantStore,
) -> BoxFuture<'a, Result<Option<Resolution>, TenancyError>> {
    async move {
        let Some(slug) = subdomain_label(host, &config.root_domain) else {
            return Ok(None);
        };

        let tenant = store
            .find_tenant_by_slug(slug)
            .await?
            .filter(|tenant| tenant.is_active);

        Ok(tenant.map(|tenant| Resolution {
            tenant,
            tenant_domain: None,
            resolved_by: ResolvedBy::Subdomain,
        }))
    }
    .boxed()
}

/// Bare root domain (or a local alias) maps to the configured default tenant.
pub fn default_tenant<'a>(
    host: &'a str,
    config: &'a TenancyConfig,
    store: &'a dyn TenantStore,
) -> BoxFuture<'a, Result<Option<Resolution>, TenancyError>> {
    async move {
        if !is_root_host(host, config) {
            return Ok(None);
        }
        let Some(id) = config.default_tenant_id else {
            return Ok(None);
        };
        configured_tenant(store, id, ResolvedBy::Default).await
    }
    .boxed()
}

/// Anything left over goes to the fallback tenant, when one is configured.
pub fn fallback_tenant<'a>(
    _host: &'a str,
    config: &'a TenancyConfig,
    store: &'a dyn TenantStore,
) -> BoxFuture<'a, Result<Option<Resolution>, TenancyError>> {
    async move {
        let Some(id) = config.fallback_tenant_id else {
            return Ok(None);
        };
        configured_tenant(store, id, ResolvedBy::Fallback).await
    }
    .boxed()
}

async fn configured_tenant(
    store: &dyn TenantStore,
    id: i32,
    resolved_by: ResolvedBy,
) -> Result<Option<Resolution>, TenancyError> {
    let tenant = store.find_tenant_by_id(id, false).await?;
    if tenant.is_none() {
        warn!("Configured {} tenant {} does not exist", resolved_by, id);
    }
    Ok(tenant.map(|tenant| Resolution {
        tenant,
        tenant_domain: None,
        resolved_by,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewTenantDomain, VerificationStatus};
    use crate::database::MemoryTenantStore;

    async fn store_with_acme() -> MemoryTenantStore {
        let store = MemoryTenantStore::new();
        store.insert_tenant(Tenant::new(7, "Acme", "acme")).await;
        store.insert_tenant(Tenant::new(1, "Demo", "demo")).await;
        store
    }

    fn custom(domain: &str, verification_status: VerificationStatus) -> NewTenantDomain {
        NewTenantDomain {
            tenant_id: 7,
            domain: domain.to_string(),
            domain_type: DomainType::Custom,
            is_primary: false,
            verification_status,
            verification_token: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn custom_domain_requires_verification_when_configured() {
        let store = store_with_acme().await;
        store
            .create_tenant_domain(custom("acme.example.com", VerificationStatus::Pending))
            .await
            .unwrap();

        let mut config = TenancyConfig::for_root("softellio.com");
        assert!(custom_domain("acme.example.com", &config, &store).await.unwrap().is_some());

        config.require_verified_custom_domains = true;
        assert!(custom_domain("acme.example.com", &config, &store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn custom_domain_skips_subdomain_typed_and_inactive_bindings() {
        let store = store_with_acme().await;
        let mut binding = custom("acme.softellio.com", VerificationStatus::Verified);
        binding.domain_type = DomainType::Subdomain;
        store.create_tenant_domain(binding).await.unwrap();
        let mut inactive = custom("old.example.com", VerificationStatus::Verified);
        inactive.is_active = false;
        store.create_tenant_domain(inactive).await.unwrap();

        let config = TenancyConfig::for_root("softellio.com");
        assert!(custom_domain("acme.softellio.com", &config, &store).await.unwrap().is_none());
        assert!(custom_domain("old.example.com", &config, &store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn subdomain_ignores_inactive_tenants() {
        let store = store_with_acme().await;
        store.insert_tenant(Tenant::new(9, "Gone", "gone").inactive()).await;
        let config = TenancyConfig::for_root("softellio.com");

        let hit = subdomain("acme.softellio.com", &config, &store).await.unwrap().unwrap();
        assert_eq!(hit.tenant.id, 7);
        assert_eq!(hit.resolved_by, ResolvedBy::Subdomain);
        assert!(subdomain("gone.softellio.com", &config, &store).await.unwrap().is_none());
        assert!(subdomain("acme.other.com", &config, &store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn default_and_fallback_need_configuration() {
        let store = store_with_acme().await;
        let mut config = TenancyConfig::for_root("softellio.com");

        assert!(default_tenant("softellio.com", &config, &store).await.unwrap().is_none());
        assert!(fallback_tenant("x.test", &config, &store).await.unwrap().is_none());

        config.default_tenant_id = Some(1);
        config.fallback_tenant_id = Some(7);
        let default = default_tenant("softellio.com", &config, &store).await.unwrap().unwrap();
        assert_eq!((default.tenant.id, default.resolved_by), (1, ResolvedBy::Default));
        assert!(default_tenant("www.softellio.com", &config, &store).await.unwrap().is_none());

        let fallback = fallback_tenant("x.test", &config, &store).await.unwrap().unwrap();
        assert_eq!((fallback.tenant.id, fallback.resolved_by), (7, ResolvedBy::Fallback));
    }

    #[test]
    fn strategies_run_in_precedence_order() {
        let order: Vec<ResolvedBy> = STRATEGIES.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(
            order,
            vec![ResolvedBy::CustomDomain, ResolvedBy::Subdomain, ResolvedBy::Default, ResolvedBy::Fallback]
        );
    }
}
