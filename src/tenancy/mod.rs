//! Tenant resolution primitives shared by the resolver service and the
//! request middleware.

pub mod claims;
pub mod error;
pub mod host;
pub mod probe;
pub mod strategy;
pub mod types;

pub use claims::{ClaimsError, JwtClaimsReader, TokenClaimsReader};
pub use error::{ConflictScope, TenancyError};
pub use host::normalize_host;
pub use probe::{DomainProbe, HttpDomainProbe};
pub use types::{
    DomainHealth, DomainResolutionInfo, DomainResolutionResult, RequestTenantContext, ResolvedBy,
    VerificationChallenge,
};
