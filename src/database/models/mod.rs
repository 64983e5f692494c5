pub mod tenant;
pub mod tenant_domain;

pub use tenant::{Tenant, TenantStatus};
pub use tenant_domain::{
    DomainType, NewTenantDomain, SslStatus, TenantDomain, TenantDomainChanges, VerificationStatus,
};
