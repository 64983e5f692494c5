use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    /// `<slug>.<root>` binding issued by the platform.
    Subdomain,
    /// Externally owned domain pointed at the platform.
    #[default]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SslStatus {
    #[default]
    None,
    Pending,
    Active,
    Failed,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($ty), other)),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(DomainType { Subdomain => "subdomain", Custom => "custom" });
text_enum!(VerificationStatus {
    Unverified => "unverified",
    Pending => "pending",
    Verified => "verified",
});
text_enum!(SslStatus {
    None => "none",
    Pending => "pending",
    Active => "active",
    Failed => "failed",
});

/// Binding of one domain name to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDomain {
    pub id: i32,
    pub tenant_id: i32,
    /// Normalized: lowercase, no scheme, port, path or trailing dot.
    pub domain: String,
    #[serde(rename = "type")]
    pub domain_type: DomainType,
    pub is_primary: bool,
    pub verification_status: VerificationStatus,
    pub verification_token: Option<String>,
    pub verification_requested_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_status: SslStatus,
    pub ssl_expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantDomain {
    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }
}

/// Fields for a new domain row; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewTenantDomain {
    pub tenant_id: i32,
    pub domain: String,
    pub domain_type: DomainType,
    pub is_primary: bool,
    pub verification_status: VerificationStatus,
    pub verification_token: Option<String>,
    pub is_active: bool,
}

/// Partial update of a domain row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct TenantDomainChanges {
    pub is_primary: Option<bool>,
    pub is_active: Option<bool>,
    pub verification_status: Option<VerificationStatus>,
    pub verification_token: Option<String>,
    pub verification_requested_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_status: Option<SslStatus>,
    pub ssl_expires_at: Option<DateTime<Utc>>,
}

impl TenantDomainChanges {
    /// Apply onto an in-memory row, stamping `updated_at`.
    pub fn apply_to(&self, domain: &mut TenantDomain) {
        if let Some(v) = self.is_primary {
            domain.is_primary = v;
        }
        if let Some(v) = self.is_active {
            domain.is_active = v;
        }
        if let Some(v) = self.verification_status {
            domain.verification_status = v;
        }
        if let Some(v) = &self.verification_token {
            domain.verification_token = Some(v.clone());
        }
        if let Some(v) = self.verification_requested_at {
            domain.verification_requested_at = Some(v);
        }
        if let Some(v) = self.verified_at {
            domain.verified_at = Some(v);
        }
        if let Some(v) = self.ssl_status {
            domain.ssl_status = v;
        }
        if let Some(v) = self.ssl_expires_at {
            domain.ssl_expires_at = Some(v);
        }
        domain.updated_at = Utc::now();
    }
}
