use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::database::models::{Tenant, TenantDomain};

/// Which rule produced a tenant for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    CustomDomain,
    Subdomain,
    Default,
    Fallback,
    PortalJwt,
}

impl ResolvedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedBy::CustomDomain => "custom_domain",
            ResolvedBy::Subdomain => "subdomain",
            ResolvedBy::Default => "default",
            ResolvedBy::Fallback => "fallback",
            ResolvedBy::PortalJwt => "portal_jwt",
        }
    }
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one resolution attempt. Not persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResolutionResult {
    pub tenant: Tenant,
    /// The binding that matched; absent for subdomain, default and fallback.
    pub tenant_domain: Option<TenantDomain>,
    pub resolved_by: ResolvedBy,
}

/// How the request's tenant was found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResolutionInfo {
    pub original_domain: String,
    pub resolved_by: ResolvedBy,
    pub tenant_domain: Option<TenantDomain>,
}

/// Tenant attached to a request by the tenant-context middleware.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTenantContext {
    pub tenant_id: i32,
    pub tenant: Tenant,
    pub domain_resolution: Option<DomainResolutionInfo>,
}

impl RequestTenantContext {
    pub fn resolved_by(&self) -> Option<ResolvedBy> {
        self.domain_resolution.as_ref().map(|info| info.resolved_by)
    }
}

/// Result of a reachability probe. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainHealth {
    pub domain: String,
    pub is_reachable: bool,
    /// Milliseconds until the response (or failure) arrived
    pub response_time: u64,
    pub status_code: Option<u16>,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl DomainHealth {
    pub fn unreachable(domain: impl Into<String>, response_time: u64, error: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            is_reachable: false,
            response_time,
            status_code: None,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }
}

/// Instructions returned when domain verification starts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationChallenge {
    pub domain_id: i32,
    pub domain: String,
    pub verification_token: String,
    /// Where the token must be served for ownership confirmation
    pub verification_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}
