// handlers/mod.rs - Handler tiers
//
// Public (no tenant context) and Protected (tenant context attached by
// tenant_context_middleware).
pub mod public; // /, /health, /api/domain-tools/*
pub mod protected; // /api/tenant/*, /api/domains/*
