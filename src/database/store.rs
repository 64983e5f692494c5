use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{NewTenantDomain, Tenant, TenantDomain, TenantDomainChanges};

/// Tenant and domain persistence consumed by the resolution core.
///
/// Implementations must report a duplicate `domain` on create as
/// [`DatabaseError::UniqueViolation`], and must demote the tenant's other
/// domains in the same atomic step whenever a create or update marks a
/// domain primary.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// `active_only` restricts the lookup to tenants with `is_active` set.
    async fn find_tenant_by_id(&self, id: i32, active_only: bool) -> Result<Option<Tenant>, DatabaseError>;

    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DatabaseError>;

    async fn find_tenant_domain_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>, DatabaseError>;

    async fn list_tenant_domains(&self, tenant_id: i32) -> Result<Vec<TenantDomain>, DatabaseError>;

    async fn create_tenant_domain(&self, input: NewTenantDomain) -> Result<TenantDomain, DatabaseError>;

    async fn update_tenant_domain(
        &self,
        id: i32,
        changes: TenantDomainChanges,
    ) -> Result<TenantDomain, DatabaseError>;

    async fn delete_tenant_domain(&self, id: i32) -> Result<(), DatabaseError>;

    /// Connectivity check used by `/health`
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
