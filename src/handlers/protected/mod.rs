// handlers/protected/mod.rs - Tenant-scoped handlers
//
// Every handler here takes the tenant id from TenantScope, never from the
// request body or path.

pub mod domains;
pub mod tenant;

pub use tenant::context_get as tenant_context_get;
