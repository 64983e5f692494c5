use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{NewTenantDomain, Tenant, TenantDomain, TenantDomainChanges};
use super::store::TenantStore;

#[derive(Default)]
struct MemoryState {
    tenants: BTreeMap<i32, Tenant>,
    domains: BTreeMap<i32, TenantDomain>,
    next_domain_id: i32,
}

impl MemoryState {
    fn demote_siblings(&mut self, tenant_id: i32, keep_id: i32) {
        let now = Utc::now();
        for domain in self.domains.values_mut() {
            if domain.tenant_id == tenant_id && domain.id != keep_id && domain.is_primary {
                domain.is_primary = false;
                domain.updated_at = now;
            }
        }
    }
}

/// In-process [`TenantStore`] for tests and database-less development.
///
/// Every mutation runs under one write lock, so uniqueness and primary
/// demotion are atomic just like the Postgres transaction.
#[derive(Default)]
pub struct MemoryTenantStore {
    state: RwLock<MemoryState>,
}

impl MemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a tenant record
    pub async fn insert_tenant(&self, tenant: Tenant) {
        let mut state = self.state.write().await;
        state.tenants.insert(tenant.id, tenant);
    }

    /// Store holding only the demo tenant (id 1), the development default tenant
    pub async fn seeded_for_development() -> Self {
        let store = Self::new();
        store.insert_tenant(Tenant::new(1, "Demo", "demo")).await;
        store
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn find_tenant_by_id(&self, id: i32, active_only: bool) -> Result<Option<Tenant>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .tenants
            .get(&id)
            .filter(|t| !active_only || t.is_active)
            .cloned())
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.tenants.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_tenant_domain_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.domains.values().find(|d| d.domain == domain).cloned())
    }

    async fn list_tenant_domains(&self, tenant_id: i32) -> Result<Vec<TenantDomain>, DatabaseError> {
        let state = self.state.read().await;
        let mut domains: Vec<TenantDomain> = state
            .domains
            .values()
            .filter(|d| d.tenant_id == tenant_id)
            .cloned()
            .collect();
        domains.sort_by_key(|d| (!d.is_primary, d.id));
        Ok(domains)
    }

    async fn create_tenant_domain(&self, input: NewTenantDomain) -> Result<TenantDomain, DatabaseError> {
        let mut state = self.state.write().await;

        if state.domains.values().any(|d| d.domain == input.domain) {
            return Err(DatabaseError::UniqueViolation(input.domain));
        }

        state.next_domain_id += 1;
        let now = Utc::now();
        let domain = TenantDomain {
            id: state.next_domain_id,
            tenant_id: input.tenant_id,
            domain: input.domain,
            domain_type: input.domain_type,
            is_primary: input.is_primary,
            verification_status: input.verification_status,
            verification_token: input.verification_token,
            verification_requested_at: None,
            verified_at: None,
            ssl_status: Default::default(),
            ssl_expires_at: None,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        if domain.is_primary {
            state.demote_siblings(domain.tenant_id, domain.id);
        }
        state.domains.insert(domain.id, domain.clone());
        Ok(domain)
    }

    async fn update_tenant_domain(
        &self,
        id: i32,
        changes: TenantDomainChanges,
    ) -> Result<TenantDomain, DatabaseError> {
        let mut state = self.state.write().await;

        let updated = {
            let domain = state
                .domains
                .get_mut(&id)
                .ok_or_else(|| DatabaseError::NotFound(format!("tenant domain {}", id)))?;
            changes.apply_to(domain);
            domain.clone()
        };

        if changes.is_primary == Some(true) {
            state.demote_siblings(updated.tenant_id, updated.id);
        }
        Ok(updated)
    }

    async fn delete_tenant_domain(&self, id: i32) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        state
            .domains
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("tenant domain {}", id)))
    }
}
