use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TenancyConfig;
use crate::database::models::{
    DomainType, NewTenantDomain, SslStatus, Tenant, TenantDomain, TenantDomainChanges, TenantStatus,
    VerificationStatus,
};
use crate::database::{DatabaseError, TenantStore};
use crate::tenancy::host::{is_reserved_domain, normalize_host, subdomain_label, validate_domain_format};
use crate::tenancy::probe::{DomainProbe, VERIFICATION_PATH};
use crate::tenancy::strategy::STRATEGIES;
use crate::tenancy::{ConflictScope, DomainHealth, DomainResolutionResult, TenancyError, VerificationChallenge};

/// Settings a tenant may change on one of its domains
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSettings {
    pub is_primary: Option<bool>,
    pub is_active: Option<bool>,
    pub ssl_status: Option<SslStatus>,
}

impl DomainSettings {
    fn is_empty(&self) -> bool {
        self.is_primary.is_none() && self.is_active.is_none() && self.ssl_status.is_none()
    }
}

/// Maps hosts to tenants and manages tenant domain bindings
pub struct DomainResolver {
    store: Arc<dyn TenantStore>,
    config: Arc<TenancyConfig>,
    probe: Arc<dyn DomainProbe>,
}

impl DomainResolver {
    pub fn new(store: Arc<dyn TenantStore>, config: Arc<TenancyConfig>, probe: Arc<dyn DomainProbe>) -> Self {
        Self { store, config, probe }
    }

    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }

    /// Run the strategy chain for a raw host value; first match wins.
    ///
    /// The returned tenant has not been access-checked yet, callers must
    /// pass it through [`DomainResolver::validate_tenant_access`].
    pub async fn resolve_tenant_from_domain(&self, host_header: &str) -> Result<DomainResolutionResult, TenancyError> {
        let host = normalize_host(host_header);
        if host.is_empty() {
            return Err(TenancyError::DomainResolution { host: host_header.trim().to_string() });
        }

        for (tag, strategy) in STRATEGIES.iter() {
            let Some(resolution) = strategy(&host, self.config.as_ref(), self.store.as_ref()).await? else {
                continue;
            };

            debug!("Resolved '{}' to tenant {} via {}", host, resolution.tenant.id, tag);

            let mut tenant = resolution.tenant;
            tenant.domains = self.store.list_tenant_domains(tenant.id).await?;

            return Ok(DomainResolutionResult {
                tenant,
                tenant_domain: resolution.tenant_domain,
                resolved_by: resolution.resolved_by,
            });
        }

        warn!("No tenant resolution strategy matched '{}'", host);
        Err(TenancyError::DomainResolution { host })
    }

    /// Reject tenants that are inactive or suspended
    pub fn validate_tenant_access(tenant: &Tenant) -> Result<(), TenancyError> {
        if !tenant.is_active {
            return Err(TenancyError::TenantInactive { tenant_id: tenant.id });
        }
        if tenant.status == TenantStatus::Suspended {
            return Err(TenancyError::TenantSuspended { tenant_id: tenant.id });
        }
        Ok(())
    }

    /// Direct lookup by id for explicit tenant headers and portal tokens
    pub async fn load_active_tenant(&self, tenant_id: i32) -> Result<Tenant, TenancyError> {
        let tenant = self
            .store
            .find_tenant_by_id(tenant_id, true)
            .await?
            .ok_or_else(|| TenancyError::bad_request(format!("Tenant {} not found or inactive", tenant_id)))?;
        Self::validate_tenant_access(&tenant)?;
        Ok(tenant)
    }

    pub async fn get_tenant_domains(&self, tenant_id: i32) -> Result<Vec<TenantDomain>, TenancyError> {
        Ok(self.store.list_tenant_domains(tenant_id).await?)
    }

    pub async fn add_custom_domain(
        &self,
        tenant_id: i32,
        domain: &str,
        is_primary: bool,
    ) -> Result<TenantDomain, TenancyError> {
        self.add_domain(tenant_id, domain, is_primary, DomainType::Custom).await
    }

    /// Validate and bind a domain to the tenant.
    ///
    /// Custom domains start unverified with a fresh verification token.
    /// Subdomain bindings must be the tenant's own `<slug>.<root>` and are
    /// verified from the start.
    pub async fn add_domain(
        &self,
        tenant_id: i32,
        domain: &str,
        is_primary: bool,
        domain_type: DomainType,
    ) -> Result<TenantDomain, TenancyError> {
        let domain = normalize_host(domain);
        validate_domain_format(&domain)?;

        match domain_type {
            DomainType::Custom => {
                if is_reserved_domain(&domain, &self.config) {
                    return Err(TenancyError::ReservedDomain(domain));
                }
            }
            DomainType::Subdomain => self.check_own_subdomain(tenant_id, &domain).await?,
        }

        if let Some(existing) = self.store.find_tenant_domain_by_domain(&domain).await? {
            return Err(conflict(domain, tenant_id, &existing));
        }

        let (verification_status, verification_token) = match domain_type {
            DomainType::Custom => (VerificationStatus::Unverified, Some(generate_verification_token(&domain))),
            DomainType::Subdomain => (VerificationStatus::Verified, None),
        };

        let input = NewTenantDomain {
            tenant_id,
            domain: domain.clone(),
            domain_type,
            is_primary,
            verification_status,
            verification_token,
            is_active: true,
        };

        match self.store.create_tenant_domain(input).await {
            Ok(created) => {
                info!("Tenant {} added {} domain '{}'", tenant_id, domain_type, created.domain);
                Ok(created)
            }
            Err(DatabaseError::UniqueViolation(_)) => {
                // Lost a race with a concurrent add of the same domain
                let holder = self.store.find_tenant_domain_by_domain(&domain).await?;
                Err(match holder {
                    Some(existing) => conflict(domain, tenant_id, &existing),
                    None => TenancyError::DomainConflict { domain, scope: ConflictScope::OtherTenant },
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn check_own_subdomain(&self, tenant_id: i32, domain: &str) -> Result<(), TenancyError> {
        let label = subdomain_label(domain, &self.config.root_domain).ok_or_else(|| {
            TenancyError::invalid_domain(domain, format!("subdomains must look like <slug>.{}", self.config.root_domain))
        })?;

        let tenant = self
            .store
            .find_tenant_by_id(tenant_id, false)
            .await?
            .ok_or_else(|| TenancyError::not_found(format!("Tenant {} not found", tenant_id)))?;

        if tenant.slug != label {
            return Err(TenancyError::invalid_domain(
                domain,
                format!("subdomain must match the tenant slug '{}'", tenant.slug),
            ));
        }
        Ok(())
    }

    pub async fn update_domain(
        &self,
        tenant_id: i32,
        domain_id: i32,
        settings: DomainSettings,
    ) -> Result<TenantDomain, TenancyError> {
        if settings.is_empty() {
            return Err(TenancyError::bad_request("No domain settings to update"));
        }

        let domain = self.owned_domain(tenant_id, domain_id).await?;
        let changes = TenantDomainChanges {
            is_primary: settings.is_primary,
            is_active: settings.is_active,
            ssl_status: settings.ssl_status,
            ..Default::default()
        };

        let updated = self.store.update_tenant_domain(domain.id, changes).await?;
        info!("Tenant {} updated domain '{}'", tenant_id, updated.domain);
        Ok(updated)
    }

    pub async fn remove_domain(&self, tenant_id: i32, domain_id: i32) -> Result<(), TenancyError> {
        let domain = self.owned_domain(tenant_id, domain_id).await?;
        self.store.delete_tenant_domain(domain.id).await?;
        info!("Tenant {} removed domain '{}'", tenant_id, domain.domain);
        Ok(())
    }

    /// Probe a domain, bounded by the configured timeout. Never fails.
    pub async fn check_domain_health(&self, domain: &str) -> DomainHealth {
        let domain = normalize_host(domain);
        if let Err(e) = validate_domain_format(&domain) {
            return DomainHealth::unreachable(domain, 0, e.to_string());
        }

        let timeout = self.config.health_check_timeout();
        match tokio::time::timeout(timeout, self.probe.check(&domain)).await {
            Ok(health) => health,
            Err(_) => DomainHealth::unreachable(
                domain,
                timeout.as_millis() as u64,
                format!("health check timed out after {}ms", timeout.as_millis()),
            ),
        }
    }

    pub async fn check_domain_health_by_id(&self, tenant_id: i32, domain_id: i32) -> Result<DomainHealth, TenancyError> {
        let domain = self.owned_domain(tenant_id, domain_id).await?;
        Ok(self.check_domain_health(&domain.domain).await)
    }

    /// Issue a fresh token and move the domain to `pending`
    pub async fn initiate_verification(&self, tenant_id: i32, domain_id: i32) -> Result<VerificationChallenge, TenancyError> {
        let domain = self.owned_domain(tenant_id, domain_id).await?;

        if domain.domain_type == DomainType::Subdomain {
            return Err(TenancyError::bad_request("Platform subdomains do not need verification"));
        }
        if domain.is_verified() {
            return Err(TenancyError::bad_request(format!("Domain '{}' is already verified", domain.domain)));
        }

        let token = generate_verification_token(&domain.domain);
        let requested_at = Utc::now();
        let changes = TenantDomainChanges {
            verification_status: Some(VerificationStatus::Pending),
            verification_token: Some(token.clone()),
            verification_requested_at: Some(requested_at),
            ..Default::default()
        };
        let updated = self.store.update_tenant_domain(domain.id, changes).await?;

        info!("Verification started for domain '{}'", updated.domain);

        Ok(VerificationChallenge {
            domain_id: updated.id,
            verification_url: format!("http://{}{}", updated.domain, VERIFICATION_PATH),
            domain: updated.domain,
            verification_token: token,
            expires_at: self.verification_deadline(requested_at),
        })
    }

    /// Check the published token and mark the domain verified
    pub async fn confirm_verification(&self, tenant_id: i32, domain_id: i32) -> Result<TenantDomain, TenancyError> {
        let domain = self.owned_domain(tenant_id, domain_id).await?;

        if domain.is_verified() {
            return Ok(domain);
        }
        if domain.verification_status != VerificationStatus::Pending {
            return Err(TenancyError::bad_request(format!(
                "Verification has not been started for '{}'",
                domain.domain
            )));
        }

        if let Some(deadline) = domain
            .verification_requested_at
            .and_then(|requested_at| self.verification_deadline(requested_at))
        {
            if Utc::now() >= deadline {
                return Err(TenancyError::VerificationExpired(domain.domain));
            }
        }

        let expected = domain
            .verification_token
            .as_deref()
            .ok_or_else(|| TenancyError::bad_request("Domain has no verification token, start verification again"))?;

        let timeout = self.config.health_check_timeout();
        let published = match tokio::time::timeout(timeout, self.probe.fetch_verification_token(&domain.domain)).await {
            Ok(Ok(token)) => token,
            Ok(Err(e)) => {
                return Err(TenancyError::bad_request(format!("Could not fetch verification token: {}", e)));
            }
            Err(_) => {
                return Err(TenancyError::bad_request(format!(
                    "Fetching verification token timed out after {}ms",
                    timeout.as_millis()
                )));
            }
        };

        if published.as_deref() != Some(expected) {
            warn!("Verification token mismatch for domain '{}'", domain.domain);
            return Err(TenancyError::bad_request(format!(
                "Verification token not found at http://{}{}",
                domain.domain, VERIFICATION_PATH
            )));
        }

        let changes = TenantDomainChanges {
            verification_status: Some(VerificationStatus::Verified),
            verified_at: Some(Utc::now()),
            ..Default::default()
        };
        let verified = self.store.update_tenant_domain(domain.id, changes).await?;
        info!("Domain '{}' verified for tenant {}", verified.domain, tenant_id);
        Ok(verified)
    }

    /// When a token issued at `requested_at` stops being accepted; `None` if it never does
    fn verification_deadline(&self, requested_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let ttl = self.config.verification_ttl()?;
        requested_at.checked_add_signed(ttl)
    }

    /// Domain by id, only if it belongs to the tenant
    async fn owned_domain(&self, tenant_id: i32, domain_id: i32) -> Result<TenantDomain, TenancyError> {
        self.store
            .list_tenant_domains(tenant_id)
            .await?
            .into_iter()
            .find(|d| d.id == domain_id)
            .ok_or_else(|| TenancyError::not_found(format!("Domain {} not found", domain_id)))
    }
}

fn conflict(domain: String, tenant_id: i32, existing: &TenantDomain) -> TenancyError {
    let scope = if existing.tenant_id == tenant_id {
        ConflictScope::SameTenant
    } else {
        ConflictScope::OtherTenant
    };
    TenancyError::DomainConflict { domain, scope }
}

/// Random token bound to the domain name
fn generate_verification_token(domain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(domain.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    format!("cms-verify-{}", &hash[..32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryTenantStore;
    use crate::tenancy::ResolvedBy;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Probe returning canned answers, optionally slow
    #[derive(Default)]
    struct CannedProbe {
        published_token: Mutex<Option<String>>,
        delay: Option<Duration>,
    }

    impl CannedProbe {
        fn publish(&self, token: &str) {
            *self.published_token.lock().unwrap() = Some(token.to_string());
        }
    }

    #[async_trait]
    impl DomainProbe for CannedProbe {
        async fn check(&self, domain: &str) -> DomainHealth {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            DomainHealth {
                domain: domain.to_string(),
                is_reachable: true,
                response_time: 12,
                status_code: Some(200),
                error: None,
                checked_at: Utc::now(),
            }
        }

        async fn fetch_verification_token(&self, _domain: &str) -> Result<Option<String>, String> {
            Ok(self.published_token.lock().unwrap().clone())
        }
    }

    struct Fixture {
        store: Arc<MemoryTenantStore>,
        probe: Arc<CannedProbe>,
        resolver: DomainResolver,
    }

    async fn fixture_with(config: TenancyConfig, probe: CannedProbe) -> Fixture {
        let store = Arc::new(MemoryTenantStore::new());
        store.insert_tenant(Tenant::new(1, "Demo", "demo")).await;
        store.insert_tenant(Tenant::new(7, "Acme", "acme")).await;
        store.insert_tenant(Tenant::new(8, "Beta", "beta")).await;
        store
            .insert_tenant(Tenant::new(9, "Frozen", "frozen").with_status(TenantStatus::Suspended))
            .await;
        let probe = Arc::new(probe);
        let resolver = DomainResolver::new(store.clone(), Arc::new(config), probe.clone());
        Fixture { store, probe, resolver }
    }

    async fn fixture() -> Fixture {
        fixture_with(TenancyConfig::for_root("softellio.com"), CannedProbe::default()).await
    }

    #[tokio::test]
    async fn registered_custom_domain_resolves_to_its_tenant() {
        let f = fixture().await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", true).await.unwrap();

        let result = f.resolver.resolve_tenant_from_domain("acme.example.com").await.unwrap();
        assert_eq!(result.tenant.id, 7);
        assert_eq!(result.resolved_by, ResolvedBy::CustomDomain);
        assert_eq!(result.tenant_domain.map(|d| d.id), Some(added.id));
        assert_eq!(result.tenant.domains.len(), 1);
    }

    #[tokio::test]
    async fn slug_subdomain_resolves_without_binding() {
        let f = fixture().await;

        let result = f.resolver.resolve_tenant_from_domain("ACME.softellio.com:443").await.unwrap();
        assert_eq!(result.tenant.id, 7);
        assert_eq!(result.resolved_by, ResolvedBy::Subdomain);
        assert!(result.tenant_domain.is_none());
    }

    #[tokio::test]
    async fn custom_binding_beats_slug_subdomain() {
        let f = fixture().await;
        // Tenant 8 owns slug "beta", but tenant 7 holds an explicit binding for the same host
        f.store
            .create_tenant_domain(NewTenantDomain {
                tenant_id: 7,
                domain: "beta.softellio.com".into(),
                domain_type: DomainType::Custom,
                is_primary: false,
                verification_status: VerificationStatus::Verified,
                verification_token: None,
                is_active: true,
            })
            .await
            .unwrap();

        let result = f.resolver.resolve_tenant_from_domain("beta.softellio.com").await.unwrap();
        assert_eq!(result.tenant.id, 7);
        assert_eq!(result.resolved_by, ResolvedBy::CustomDomain);
    }

    #[tokio::test]
    async fn unknown_host_without_fallback_fails_naming_host() {
        let f = fixture().await;

        let err = f.resolver.resolve_tenant_from_domain("unknown-garbage.test").await.unwrap_err();
        assert!(matches!(&err, TenancyError::DomainResolution { host } if host == "unknown-garbage.test"));
        assert!(err.to_string().contains("unknown-garbage.test"));
    }

    #[tokio::test]
    async fn root_and_fallback_use_configured_tenants() {
        let mut config = TenancyConfig::for_root("softellio.com");
        config.default_tenant_id = Some(1);
        config.fallback_tenant_id = Some(8);
        let f = fixture_with(config, CannedProbe::default()).await;

        let root = f.resolver.resolve_tenant_from_domain("https://softellio.com/").await.unwrap();
        assert_eq!((root.tenant.id, root.resolved_by), (1, ResolvedBy::Default));

        let other = f.resolver.resolve_tenant_from_domain("unknown-garbage.test").await.unwrap();
        assert_eq!((other.tenant.id, other.resolved_by), (8, ResolvedBy::Fallback));
    }

    #[tokio::test]
    async fn suspended_tenant_resolves_but_fails_validation() {
        let f = fixture().await;

        let result = f.resolver.resolve_tenant_from_domain("frozen.softellio.com").await.unwrap();
        assert_eq!(result.tenant.id, 9);
        assert!(matches!(
            DomainResolver::validate_tenant_access(&result.tenant),
            Err(TenancyError::TenantSuspended { tenant_id: 9 })
        ));
    }

    #[tokio::test]
    async fn inactive_tenant_fails_validation_and_direct_lookup() {
        let f = fixture().await;
        f.store.insert_tenant(Tenant::new(10, "Off", "off").inactive()).await;

        let tenant = f.store.find_tenant_by_id(10, false).await.unwrap().unwrap();
        assert!(matches!(
            DomainResolver::validate_tenant_access(&tenant),
            Err(TenancyError::TenantInactive { tenant_id: 10 })
        ));
        assert!(matches!(f.resolver.load_active_tenant(10).await, Err(TenancyError::BadRequest(_))));
        assert!(matches!(f.resolver.load_active_tenant(9).await, Err(TenancyError::TenantSuspended { .. })));
        assert_eq!(f.resolver.load_active_tenant(7).await.unwrap().slug, "acme");
    }

    #[tokio::test]
    async fn added_domain_is_normalized_and_pending_verification() {
        let f = fixture().await;

        let added = f.resolver.add_custom_domain(7, "HTTPS://Example.COM/", false).await.unwrap();
        assert_eq!(added.domain, "example.com");
        assert_eq!(added.domain_type, DomainType::Custom);
        assert_eq!(added.verification_status, VerificationStatus::Unverified);
        assert!(added.verification_token.as_deref().unwrap().starts_with("cms-verify-"));
    }

    #[tokio::test]
    async fn duplicate_domain_conflict_names_owner() {
        let f = fixture().await;
        f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();

        let same = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap_err();
        assert!(matches!(same, TenancyError::DomainConflict { scope: ConflictScope::SameTenant, .. }));
        assert!(same.to_string().contains("already registered to this tenant"));

        let other = f.resolver.add_custom_domain(8, "Acme.Example.com", false).await.unwrap_err();
        assert!(matches!(other, TenancyError::DomainConflict { scope: ConflictScope::OtherTenant, .. }));
        assert!(other.to_string().contains("already registered to another tenant"));
    }

    #[tokio::test]
    async fn reserved_domains_never_reach_the_store() {
        let f = fixture().await;

        for domain in ["softellio.com", "platform.softellio.com", "portal.softellio.com"] {
            let err = f.resolver.add_custom_domain(7, domain, false).await.unwrap_err();
            assert!(matches!(err, TenancyError::ReservedDomain(_)), "{domain}");
        }
        assert!(f.resolver.get_tenant_domains(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_domains_are_rejected() {
        let f = fixture().await;

        for domain in ["localhost", "-bad.example.com", "bad_domain.com"] {
            let err = f.resolver.add_custom_domain(7, domain, false).await.unwrap_err();
            assert!(matches!(err, TenancyError::InvalidDomainFormat { .. }), "{domain}");
        }
    }

    #[tokio::test]
    async fn subdomain_binding_must_match_own_slug() {
        let f = fixture().await;

        let own = f.resolver.add_domain(7, "acme.softellio.com", false, DomainType::Subdomain).await.unwrap();
        assert_eq!(own.verification_status, VerificationStatus::Verified);

        let foreign = f.resolver.add_domain(7, "beta.softellio.com", false, DomainType::Subdomain).await;
        assert!(matches!(foreign, Err(TenancyError::InvalidDomainFormat { .. })));

        let outside = f.resolver.add_domain(7, "acme.example.com", false, DomainType::Subdomain).await;
        assert!(matches!(outside, Err(TenancyError::InvalidDomainFormat { .. })));
    }

    #[tokio::test]
    async fn other_tenants_cannot_touch_a_domain() {
        let f = fixture().await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();

        let settings = DomainSettings { is_active: Some(false), ..Default::default() };
        let update = f.resolver.update_domain(8, added.id, settings).await;
        assert!(matches!(update, Err(TenancyError::NotFound(_))));

        let remove = f.resolver.remove_domain(8, added.id).await;
        assert!(matches!(remove, Err(TenancyError::NotFound(_))));

        let still_there = f.store.find_tenant_domain_by_domain("acme.example.com").await.unwrap().unwrap();
        assert!(still_there.is_active);

        f.resolver.remove_domain(7, added.id).await.unwrap();
        assert!(f.resolver.get_tenant_domains(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn setting_primary_demotes_previous_primary() {
        let f = fixture().await;
        let first = f.resolver.add_custom_domain(7, "one.example.com", true).await.unwrap();
        let second = f.resolver.add_custom_domain(7, "two.example.com", true).await.unwrap();

        let primaries = |domains: Vec<TenantDomain>| domains.into_iter().filter(|d| d.is_primary).map(|d| d.id).collect::<Vec<_>>();
        assert_eq!(primaries(f.resolver.get_tenant_domains(7).await.unwrap()), vec![second.id]);

        let settings = DomainSettings { is_primary: Some(true), ..Default::default() };
        f.resolver.update_domain(7, first.id, settings).await.unwrap();
        assert_eq!(primaries(f.resolver.get_tenant_domains(7).await.unwrap()), vec![first.id]);
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let f = fixture().await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();
        let result = f.resolver.update_domain(7, added.id, DomainSettings::default()).await;
        assert!(matches!(result, Err(TenancyError::BadRequest(_))));
    }

    #[tokio::test]
    async fn health_check_reports_instead_of_failing() {
        let mut config = TenancyConfig::for_root("softellio.com");
        config.health_check_timeout_ms = 50;
        let probe = CannedProbe { delay: Some(Duration::from_secs(5)), ..Default::default() };
        let f = fixture_with(config, probe).await;

        let slow = f.resolver.check_domain_health("slow.example.com").await;
        assert!(!slow.is_reachable);
        assert!(slow.error.unwrap().contains("timed out"));

        let invalid = f.resolver.check_domain_health("not a domain").await;
        assert!(!invalid.is_reachable);
        assert!(invalid.error.is_some());
    }

    #[tokio::test]
    async fn health_check_by_id_is_tenant_scoped() {
        let f = fixture().await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();

        let health = f.resolver.check_domain_health_by_id(7, added.id).await.unwrap();
        assert!(health.is_reachable);
        assert_eq!(health.status_code, Some(200));
        assert!(matches!(
            f.resolver.check_domain_health_by_id(8, added.id).await,
            Err(TenancyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn verification_moves_through_pending_to_verified() {
        let f = fixture().await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();

        let not_started = f.resolver.confirm_verification(7, added.id).await;
        assert!(matches!(not_started, Err(TenancyError::BadRequest(_))));

        let challenge = f.resolver.initiate_verification(7, added.id).await.unwrap();
        assert_eq!(challenge.domain, "acme.example.com");
        assert!(challenge.verification_url.ends_with(VERIFICATION_PATH));
        assert!(challenge.expires_at.is_none());

        let pending = f.store.find_tenant_domain_by_domain("acme.example.com").await.unwrap().unwrap();
        assert_eq!(pending.verification_status, VerificationStatus::Pending);

        f.probe.publish("some-other-token");
        assert!(matches!(f.resolver.confirm_verification(7, added.id).await, Err(TenancyError::BadRequest(_))));

        f.probe.publish(&challenge.verification_token);
        let verified = f.resolver.confirm_verification(7, added.id).await.unwrap();
        assert_eq!(verified.verification_status, VerificationStatus::Verified);
        assert!(verified.verified_at.is_some());

        let again = f.resolver.initiate_verification(7, added.id).await;
        assert!(matches!(again, Err(TenancyError::BadRequest(_))));
    }

    #[tokio::test]
    async fn expired_verification_token_is_refused() {
        let mut config = TenancyConfig::for_root("softellio.com");
        config.verification_ttl_hours = Some(0);
        let f = fixture_with(config, CannedProbe::default()).await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();

        let challenge = f.resolver.initiate_verification(7, added.id).await.unwrap();
        assert!(challenge.expires_at.is_some());
        f.probe.publish(&challenge.verification_token);

        let result = f.resolver.confirm_verification(7, added.id).await;
        assert!(matches!(result, Err(TenancyError::VerificationExpired(_))));
    }

    #[tokio::test]
    async fn huge_verification_ttl_never_expires() {
        let mut config = TenancyConfig::for_root("softellio.com");
        config.verification_ttl_hours = Some(100_000_000_000);
        let f = fixture_with(config, CannedProbe::default()).await;
        let added = f.resolver.add_custom_domain(7, "acme.example.com", false).await.unwrap();

        let challenge = f.resolver.initiate_verification(7, added.id).await.unwrap();
        assert!(challenge.expires_at.is_none());
        f.probe.publish(&challenge.verification_token);

        let verified = f.resolver.confirm_verification(7, added.id).await.unwrap();
        assert_eq!(verified.verification_status, VerificationStatus::Verified);
    }

    #[test]
    fn verification_tokens_are_unique() {
        let a = generate_verification_token("acme.example.com");
        let b = generate_verification_token("acme.example.com");
        assert_ne!(a, b);
        assert_eq!(a.len(), "cms-verify-".len() + 32);
    }
}
