use thiserror::Error;

use crate::database::DatabaseError;

/// Which tenant already holds a conflicting domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictScope {
    SameTenant,
    OtherTenant,
}

/// Failures of tenant resolution and domain management
#[derive(Debug, Error)]
pub enum TenancyError {
    #[error("Unable to resolve tenant for domain '{host}'")]
    DomainResolution { host: String },

    #[error("Tenant {tenant_id} is inactive")]
    TenantInactive { tenant_id: i32 },

    #[error("Tenant {tenant_id} is suspended")]
    TenantSuspended { tenant_id: i32 },

    #[error("{}", conflict_message(.domain, .scope))]
    DomainConflict { domain: String, scope: ConflictScope },

    #[error("Domain '{0}' is reserved by the platform")]
    ReservedDomain(String),

    #[error("Invalid domain '{domain}': {reason}")]
    InvalidDomainFormat { domain: String, reason: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Verification token for '{0}' has expired, start verification again")]
    VerificationExpired(String),

    #[error("Tenant store error: {0}")]
    Store(#[from] DatabaseError),
}

fn conflict_message(domain: &str, scope: &ConflictScope) -> String {
    match scope {
        ConflictScope::SameTenant => format!("Domain '{}' is already registered to this tenant", domain),
        ConflictScope::OtherTenant => format!("Domain '{}' is already registered to another tenant", domain),
    }
}

impl TenancyError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        TenancyError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        TenancyError::NotFound(message.into())
    }

    pub fn invalid_domain(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        TenancyError::InvalidDomainFormat {
            domain: domain.into(),
            reason: reason.into(),
        }
    }
}
