use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub tenancy: TenancyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. Absent means the in-memory store (development only).
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// When set, bearer tokens on the portal domain are signature-checked as well.
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Include the underlying cause in tenant-resolution failures.
    pub expose_error_details: bool,
    /// Serve the anonymous `/api/domain-tools` endpoints.
    pub enable_domain_tools: bool,
}

/// Platform topology and routing rules for tenant resolution.
///
/// Built once at startup and shared read-only by the resolver and the
/// request middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    pub root_domain: String,
    pub portal_domain: String,
    pub default_tenant_id: Option<i32>,
    pub fallback_tenant_id: Option<i32>,
    /// Extra reserved domains. The root domain and everything beneath it are always reserved.
    pub reserved_domains: Vec<String>,
    /// Hosts that behave like the bare root domain.
    pub local_hosts: Vec<String>,
    /// Tenant-scoped path prefixes, matched after an optional `/api` prefix.
    pub api_prefixes: Vec<String>,
    pub docs_markers: Vec<String>,
    /// Paths that never get a tenant context (super-admin, health, metrics).
    pub bypass_prefixes: Vec<String>,
    /// Paths on the portal domain that are served before a tenant is known.
    pub portal_public_paths: Vec<String>,
    pub require_verified_custom_domains: bool,
    pub health_check_timeout_ms: u64,
    /// Verification token lifetime; `None` keeps tokens valid until re-issued.
    pub verification_ttl_hours: Option<u64>,
}

impl TenancyConfig {
    /// Settings for a platform rooted at `root_domain`, portal on `portal.<root>`.
    pub fn for_root(root_domain: impl Into<String>) -> Self {
        let root_domain = root_domain.into().to_ascii_lowercase();
        Self {
            portal_domain: format!("portal.{}", root_domain),
            root_domain,
            default_tenant_id: None,
            fallback_tenant_id: None,
            reserved_domains: Vec::new(),
            local_hosts: Vec::new(),
            api_prefixes: [
                "/auth",
                "/pages",
                "/blog",
                "/references",
                "/media",
                "/domains",
                "/users",
                "/tenant",
                "/monitoring",
                "/social-media",
                "/settings",
                "/menus",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            docs_markers: vec!["/api-docs".to_string(), "/swagger".to_string()],
            bypass_prefixes: vec![
                "/api/super-admin".to_string(),
                "/super-admin".to_string(),
                "/health".to_string(),
                "/api/health".to_string(),
                "/metrics".to_string(),
            ],
            portal_public_paths: vec![
                "/auth/login".to_string(),
                "/auth/refresh".to_string(),
                "/auth/forgot-password".to_string(),
            ],
            require_verified_custom_domains: false,
            health_check_timeout_ms: 5_000,
            verification_ttl_hours: None,
        }
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_millis(self.health_check_timeout_ms)
    }

    /// `None` when unset or too large to represent; tokens then never expire
    pub fn verification_ttl(&self) -> Option<chrono::Duration> {
        let hours = i64::try_from(self.verification_ttl_hours?).ok()?;
        chrono::Duration::try_hours(hours)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::defaults(environment).with_env_overrides()
    }

    /// Built-in settings for an environment, without env overrides
    pub fn defaults(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("CMS_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SECURITY_EXPOSE_ERROR_DETAILS") {
            self.security.expose_error_details =
                v.parse().unwrap_or(self.security.expose_error_details);
        }
        if let Ok(v) = env::var("SECURITY_DOMAIN_TOOLS") {
            self.security.enable_domain_tools = v.parse().unwrap_or(self.security.enable_domain_tools);
        }

        // Tenancy overrides
        if let Ok(v) = env::var("TENANCY_ROOT_DOMAIN") {
            let root = v.trim().to_ascii_lowercase();
            // Portal follows the root unless set explicitly below
            self.tenancy.portal_domain = format!("portal.{}", root);
            self.tenancy.root_domain = root;
        }
        if let Ok(v) = env::var("TENANCY_PORTAL_DOMAIN") {
            self.tenancy.portal_domain = v.trim().to_ascii_lowercase();
        }
        if let Ok(v) = env::var("TENANCY_DEFAULT_TENANT_ID") {
            self.tenancy.default_tenant_id = v.parse().ok();
        }
        if let Ok(v) = env::var("TENANCY_FALLBACK_TENANT_ID") {
            self.tenancy.fallback_tenant_id = v.parse().ok();
        }
        if let Ok(v) = env::var("TENANCY_RESERVED_DOMAINS") {
            self.tenancy.reserved_domains = split_list(&v)
                .into_iter()
                .map(|d| d.to_ascii_lowercase())
                .collect();
        }
        if let Ok(v) = env::var("TENANCY_LOCAL_HOSTS") {
            self.tenancy.local_hosts = split_list(&v);
        }
        if let Ok(v) = env::var("TENANCY_API_PREFIXES") {
            self.tenancy.api_prefixes = split_list(&v);
        }
        if let Ok(v) = env::var("TENANCY_BYPASS_PREFIXES") {
            self.tenancy.bypass_prefixes = split_list(&v);
        }
        if let Ok(v) = env::var("TENANCY_REQUIRE_VERIFIED_DOMAINS") {
            self.tenancy.require_verified_custom_domains =
                v.parse().unwrap_or(self.tenancy.require_verified_custom_domains);
        }
        if let Ok(v) = env::var("TENANCY_HEALTH_CHECK_TIMEOUT_MS") {
            self.tenancy.health_check_timeout_ms =
                v.parse().unwrap_or(self.tenancy.health_check_timeout_ms);
        }
        if let Ok(v) = env::var("TENANCY_VERIFICATION_TTL_HOURS") {
            self.tenancy.verification_ttl_hours = v.parse().ok();
        }

        self
    }

    fn development() -> Self {
        let mut tenancy = TenancyConfig::for_root("localhost.test");
        tenancy.local_hosts = vec!["localhost".to_string(), "127.0.0.1".to_string()];
        tenancy.default_tenant_id = Some(1);

        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: None,
                expose_error_details: true,
                enable_domain_tools: true,
            },
            tenancy,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: None,
                expose_error_details: true,
                enable_domain_tools: true,
            },
            tenancy: TenancyConfig::for_root("staging.example.com"),
        }
    }

    fn production() -> Self {
        let mut tenancy = TenancyConfig::for_root("example.com");
        tenancy.require_verified_custom_domains = true;
        tenancy.health_check_timeout_ms = 3_000;

        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: None,
                expose_error_details: false,
                enable_domain_tools: false,
            },
            tenancy,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.security.expose_error_details);
        assert!(config.tenancy.local_hosts.contains(&"localhost".to_string()));
        assert_eq!(config.tenancy.default_tenant_id, Some(1));
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.environment.is_production());
        assert!(!config.security.expose_error_details);
        assert!(!config.security.enable_domain_tools);
        assert!(config.tenancy.require_verified_custom_domains);
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn portal_follows_root_domain() {
        let tenancy = TenancyConfig::for_root("Softellio.com");
        assert_eq!(tenancy.root_domain, "softellio.com");
        assert_eq!(tenancy.portal_domain, "portal.softellio.com");
        assert_eq!(tenancy.health_check_timeout(), Duration::from_secs(5));
        assert!(tenancy.verification_ttl().is_none());
    }

    #[test]
    fn oversized_verification_ttl_means_no_expiry() {
        let mut tenancy = TenancyConfig::for_root("softellio.com");
        tenancy.verification_ttl_hours = Some(48);
        assert_eq!(tenancy.verification_ttl(), Some(chrono::Duration::hours(48)));

        for hours in [u64::MAX, i64::MAX as u64, 100_000_000_000_000_000] {
            tenancy.verification_ttl_hours = Some(hours);
            assert!(tenancy.verification_ttl().is_none(), "{hours}");
        }
    }

    #[test]
    fn splits_comma_lists() {
        assert_eq!(split_list(" a, b ,,c"), vec!["a", "b", "c"]);
    }
}
