// handlers/public/mod.rs - Public handlers (no tenant context)
//
// Route Prefix: none for service endpoints, /api/domain-tools/* for
// operator tooling. These paths are either bypassed or outside the tenant
// API prefixes, so tenant_context_middleware never resolves a tenant here.

pub mod domain_tools;
pub mod system;

pub use domain_tools::{health as domain_tools_health, resolve as domain_tools_resolve};
pub use system::{health, not_found, root};
