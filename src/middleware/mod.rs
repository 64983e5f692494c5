pub mod response;
pub mod tenant_context;

pub use response::{ApiResponse, ApiResult};
pub use tenant_context::{tenant_context_middleware, TenantScope, TENANT_DOMAIN_HEADER, TENANT_ID_HEADER};
